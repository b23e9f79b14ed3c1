//! Runs URLs through a cache policy engine configured from `CACHE_*`
//! variables and reports where each response came from.
//!
//! Usage: `cache-probe <url>...`. Every URL is requested twice so the
//! second line shows what the cache kept.

use dental_catalog::{
	cache::{CachePolicyEngine, FetchRequest, HttpFetcher, HttpSettingsSource},
	config::CacheEngineConfig,
};
use dotenv::dotenv;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() {
	if std::env::var_os("RUST_LOG").is_none() {
		std::env::set_var("RUST_LOG", "dental_catalog=info");
	}
	dotenv().ok();
	env_logger::init();

	let urls: Vec<String> = std::env::args().skip(1).collect();
	if urls.is_empty() {
		error!("🔥 Usage: cache-probe <url>...");
		std::process::exit(1);
	}

	let config = CacheEngineConfig::init();
	let client = reqwest::Client::new();
	let engine = CachePolicyEngine::launch(
		&config,
		Arc::new(HttpFetcher::new(client.clone())),
		Arc::new(HttpSettingsSource::new(client, &config.settings_url)),
	)
	.await;

	info!(
		"cache policy {} active, {} entries preloaded",
		engine.active_version(),
		engine.store().len()
	);

	for url in &urls {
		for _ in 0..2 {
			match engine.handle(&FetchRequest::get(url)).await {
				Ok(resp) => println!(
					"{url} {} {:?} {} bytes",
					resp.response.status,
					resp.source,
					resp.response.body.len()
				),
				Err(e) => println!("{url} error: {e}"),
			}
		}
		engine.settle().await;
	}
}
