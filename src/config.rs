use log::{info, warn};
use std::{env, fmt::Display, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub jwt_secret: String,
	/// Token lifetime in minutes.
	pub jwt_maxage: i64,
	pub admin_login: String,
	pub admin_password_hash: String,
	pub host: String,
	pub port: u16,
	pub max_connections: u32,
}

impl Config {
	pub fn init() -> Config {
		let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
		let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
		let admin_password_hash =
			env::var("ADMIN_PASSWORD_HASH").expect("ADMIN_PASSWORD_HASH must be set");

		Config {
			database_url,
			jwt_secret,
			jwt_maxage: try_load("JWT_MAXAGE", "60"),
			admin_login: try_load("ADMIN_LOGIN", "admin"),
			admin_password_hash,
			host: try_load("SERVER_HOST", "127.0.0.1"),
			port: try_load("SERVER_PORT", "8000"),
			max_connections: try_load("DB_MAX_CONNECTIONS", "10"),
		}
	}
}

/// Client side settings of the cache policy engine.
#[derive(Debug, Clone)]
pub struct CacheEngineConfig {
	pub settings_url: String,
	pub refresh_interval: Duration,
	pub version: String,
	pub preload_urls: Vec<String>,
}

impl CacheEngineConfig {
	pub fn init() -> CacheEngineConfig {
		let refresh_secs: u64 = try_load("CACHE_REFRESH_SECS", "300");
		let preload: String = try_load("CACHE_PRELOAD_URLS", "");

		CacheEngineConfig {
			settings_url: try_load(
				"CACHE_SETTINGS_URL",
				"http://127.0.0.1:8000/api/cache-settings",
			),
			refresh_interval: Duration::from_secs(refresh_secs.max(1)),
			version: try_load("CACHE_POLICY_VERSION", env!("CARGO_PKG_VERSION")),
			preload_urls: preload
				.split(',')
				.map(str::trim)
				.filter(|url| !url.is_empty())
				.map(String::from)
				.collect(),
		}
	}
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
	T::Err: Display,
{
	let raw = env::var(key).unwrap_or_else(|_| {
		info!("{key} not set, using default: {default}");
		default.to_string()
	});

	match raw.parse() {
		Ok(value) => value,
		Err(e) => {
			warn!("Invalid {key} value: {e}, using default: {default}");
			default
				.parse()
				.unwrap_or_else(|_| panic!("default for {key} must parse"))
		}
	}
}
