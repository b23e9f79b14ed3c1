use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use super::{CacheError, FetchRequest};

/// Flat key/value mapping as stored on the server and pushed to clients.
pub type SettingsPatch = BTreeMap<String, Value>;

pub const CACHE_ENABLED: &str = "cacheEnabled";
pub const CACHE_STRATEGY: &str = "cacheStrategy";
pub const STATIC_ASSETS_ENABLED: &str = "staticAssetsEnabled";
pub const STATIC_ASSETS_DURATION: &str = "staticAssetsDuration";
pub const STATIC_ASSETS_MAX_SIZE: &str = "staticAssetsMaxSize";
pub const API_DATA_ENABLED: &str = "apiDataEnabled";
pub const API_DATA_DURATION: &str = "apiDataDuration";
pub const API_ENDPOINTS: &str = "apiEndpoints";
pub const PAGES_ENABLED: &str = "pagesEnabled";
pub const PAGES_DURATION: &str = "pagesDuration";
pub const PAGES_PRELOAD: &str = "pagesPreload";

const STATIC_EXTENSIONS: [&str; 14] = [
	"js", "mjs", "css", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "woff", "woff2",
	"ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
	CacheFirst,
	NetworkFirst,
	StaleWhileRevalidate,
}

impl Strategy {
	pub fn as_str(&self) -> &'static str {
		match self {
			Strategy::CacheFirst => "cache-first",
			Strategy::NetworkFirst => "network-first",
			Strategy::StaleWhileRevalidate => "stale-while-revalidate",
		}
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Strategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().replace('_', "-").as_str() {
			"cache-first" => Ok(Strategy::CacheFirst),
			"network-first" => Ok(Strategy::NetworkFirst),
			"stale-while-revalidate" => Ok(Strategy::StaleWhileRevalidate),
			other => Err(format!("unknown strategy {other:?}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
	StaticAsset,
	ApiData,
	Page,
}

impl ResourceClass {
	pub const ALL: [ResourceClass; 3] = [
		ResourceClass::StaticAsset,
		ResourceClass::ApiData,
		ResourceClass::Page,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceClass::StaticAsset => "static-asset",
			ResourceClass::ApiData => "api-data",
			ResourceClass::Page => "page",
		}
	}

	pub fn default_strategy(&self) -> Strategy {
		match self {
			ResourceClass::StaticAsset => Strategy::CacheFirst,
			ResourceClass::ApiData => Strategy::NetworkFirst,
			ResourceClass::Page => Strategy::StaleWhileRevalidate,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPolicy {
	pub enabled: bool,
	pub max_age: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
	pub enabled: bool,
	/// Overrides the per-class default strategy when set.
	pub strategy: Option<Strategy>,
	pub static_assets: ClassPolicy,
	pub static_assets_max_size_mb: u64,
	pub api_data: ClassPolicy,
	/// Path prefixes treated as API data.
	pub api_endpoints: Vec<String>,
	pub pages: ClassPolicy,
	pub pages_preload: bool,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			strategy: None,
			static_assets: ClassPolicy {
				enabled: true,
				max_age: Duration::from_secs(7 * 24 * 60 * 60),
			},
			static_assets_max_size_mb: 50,
			api_data: ClassPolicy {
				enabled: true,
				max_age: Duration::from_secs(5 * 60),
			},
			api_endpoints: vec!["/api/".to_string()],
			pages: ClassPolicy {
				enabled: true,
				max_age: Duration::from_secs(60 * 60),
			},
			pages_preload: false,
		}
	}
}

impl CacheSettings {
	pub fn policy(&self, class: ResourceClass) -> &ClassPolicy {
		match class {
			ResourceClass::StaticAsset => &self.static_assets,
			ResourceClass::ApiData => &self.api_data,
			ResourceClass::Page => &self.pages,
		}
	}

	pub fn strategy_for(&self, class: ResourceClass) -> Strategy {
		self.strategy.unwrap_or_else(|| class.default_strategy())
	}

	/// Byte budget of a class partition, if it has one.
	pub fn max_bytes(&self, class: ResourceClass) -> Option<u64> {
		match class {
			ResourceClass::StaticAsset => {
				Some(self.static_assets_max_size_mb.saturating_mul(1024 * 1024))
			}
			_ => None,
		}
	}

	pub fn resource_class(&self, url: &str) -> ResourceClass {
		let path = request_path(url);

		if self
			.api_endpoints
			.iter()
			.any(|prefix| path.starts_with(prefix.as_str()))
		{
			return ResourceClass::ApiData;
		}

		let is_static = path
			.rsplit('/')
			.next()
			.and_then(|segment| segment.rsplit_once('.'))
			.map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
			.unwrap_or(false);

		if is_static {
			ResourceClass::StaticAsset
		} else {
			ResourceClass::Page
		}
	}

	/// `None` means the request goes straight to the network.
	pub fn cacheable_class(&self, request: &FetchRequest) -> Option<ResourceClass> {
		if !self.enabled || !request.is_get() {
			return None;
		}

		let class = self.resource_class(&request.url);
		self.policy(class).enabled.then_some(class)
	}

	/// Returns a copy with `patch` applied. Unknown keys and invalid values
	/// are skipped, keeping the current value for that key.
	pub fn merged(&self, patch: &SettingsPatch) -> CacheSettings {
		let mut next = self.clone();

		for (key, value) in patch {
			if let Err(e) = next.apply(key, value) {
				warn!("{e}");
			}
		}

		next
	}

	/// Checks every key of `patch` without applying it.
	pub fn validate_patch(patch: &SettingsPatch) -> Result<(), CacheError> {
		let mut scratch = CacheSettings::default();
		for (key, value) in patch {
			scratch.apply(key, value)?;
		}

		Ok(())
	}

	pub fn apply(&mut self, key: &str, value: &Value) -> Result<(), CacheError> {
		match key {
			CACHE_ENABLED => self.enabled = as_bool(key, value)?,
			CACHE_STRATEGY => self.strategy = as_strategy(key, value)?,
			STATIC_ASSETS_ENABLED => self.static_assets.enabled = as_bool(key, value)?,
			STATIC_ASSETS_DURATION => self.static_assets.max_age = as_seconds(key, value)?,
			STATIC_ASSETS_MAX_SIZE => self.static_assets_max_size_mb = as_u64(key, value)?,
			API_DATA_ENABLED => self.api_data.enabled = as_bool(key, value)?,
			API_DATA_DURATION => self.api_data.max_age = as_seconds(key, value)?,
			API_ENDPOINTS => self.api_endpoints = as_list(key, value)?,
			PAGES_ENABLED => self.pages.enabled = as_bool(key, value)?,
			PAGES_DURATION => self.pages.max_age = as_seconds(key, value)?,
			PAGES_PRELOAD => self.pages_preload = as_bool(key, value)?,
			_ => return Err(invalid(key, "unknown key")),
		}

		Ok(())
	}

	pub fn to_patch(&self) -> SettingsPatch {
		BTreeMap::from([
			(CACHE_ENABLED.to_string(), json!(self.enabled)),
			(
				CACHE_STRATEGY.to_string(),
				self.strategy.map_or(Value::Null, |s| json!(s.as_str())),
			),
			(
				STATIC_ASSETS_ENABLED.to_string(),
				json!(self.static_assets.enabled),
			),
			(
				STATIC_ASSETS_DURATION.to_string(),
				json!(self.static_assets.max_age.as_secs()),
			),
			(
				STATIC_ASSETS_MAX_SIZE.to_string(),
				json!(self.static_assets_max_size_mb),
			),
			(API_DATA_ENABLED.to_string(), json!(self.api_data.enabled)),
			(
				API_DATA_DURATION.to_string(),
				json!(self.api_data.max_age.as_secs()),
			),
			(API_ENDPOINTS.to_string(), json!(self.api_endpoints)),
			(PAGES_ENABLED.to_string(), json!(self.pages.enabled)),
			(PAGES_DURATION.to_string(), json!(self.pages.max_age.as_secs())),
			(PAGES_PRELOAD.to_string(), json!(self.pages_preload)),
		])
	}
}

/// Path part of an absolute or relative URL.
fn request_path(url: &str) -> String {
	match reqwest::Url::parse(url) {
		Ok(parsed) => parsed.path().to_string(),
		Err(_) => url
			.split(['?', '#'])
			.next()
			.unwrap_or_default()
			.to_string(),
	}
}

fn invalid(key: &str, reason: impl Into<String>) -> CacheError {
	CacheError::InvalidSettings {
		key: key.to_string(),
		reason: reason.into(),
	}
}

fn as_bool(key: &str, value: &Value) -> Result<bool, CacheError> {
	match value {
		Value::Bool(b) => Ok(*b),
		Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
		Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
		Value::String(s) => match s.trim().to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(true),
			"false" | "0" | "no" | "off" => Ok(false),
			_ => Err(invalid(key, format!("expected a boolean, got {s:?}"))),
		},
		other => Err(invalid(key, format!("expected a boolean, got {other}"))),
	}
}

fn as_u64(key: &str, value: &Value) -> Result<u64, CacheError> {
	let parsed = match value {
		Value::Number(n) => n
			.as_u64()
			.or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
		Value::String(s) => s.trim().parse::<u64>().ok(),
		_ => None,
	};

	parsed.ok_or_else(|| invalid(key, format!("expected a non-negative number, got {value}")))
}

fn as_seconds(key: &str, value: &Value) -> Result<Duration, CacheError> {
	as_u64(key, value).map(Duration::from_secs)
}

fn as_strategy(key: &str, value: &Value) -> Result<Option<Strategy>, CacheError> {
	match value {
		Value::Null => Ok(None),
		Value::String(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("auto") => {
			Ok(None)
		}
		Value::String(s) => s.parse().map(Some).map_err(|e| invalid(key, e)),
		other => Err(invalid(key, format!("expected a strategy name, got {other}"))),
	}
}

fn as_list(key: &str, value: &Value) -> Result<Vec<String>, CacheError> {
	match value {
		Value::Array(items) => items
			.iter()
			.map(|item| {
				item.as_str()
					.map(|s| s.trim().to_string())
					.ok_or_else(|| invalid(key, format!("expected a string, got {item}")))
			})
			.filter(|item| !matches!(item, Ok(s) if s.is_empty()))
			.collect(),
		Value::String(s) => Ok(s
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(String::from)
			.collect()),
		other => Err(invalid(key, format!("expected a list, got {other}"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn patch(pairs: &[(&str, Value)]) -> SettingsPatch {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[test]
	fn merge_is_commutative_per_key() {
		let base = CacheSettings::default();
		let a = patch(&[(API_DATA_DURATION, json!(60))]);
		let b = patch(&[(CACHE_STRATEGY, json!("network-first"))]);
		let both = patch(&[
			(API_DATA_DURATION, json!(60)),
			(CACHE_STRATEGY, json!("network-first")),
		]);

		let one_by_one = base.merged(&a).merged(&b);
		let reversed = base.merged(&b).merged(&a);
		let at_once = base.merged(&both);

		assert_eq!(one_by_one, at_once);
		assert_eq!(reversed, at_once);
		assert_eq!(at_once.api_data.max_age, Duration::from_secs(60));
		assert_eq!(at_once.strategy, Some(Strategy::NetworkFirst));
	}

	#[test]
	fn string_values_are_coerced() {
		let settings = CacheSettings::default().merged(&patch(&[
			(CACHE_ENABLED, json!("false")),
			(PAGES_DURATION, json!("120")),
			(PAGES_PRELOAD, json!(1)),
			(API_ENDPOINTS, json!("/api/clinics, /api/clinic")),
		]));

		assert!(!settings.enabled);
		assert_eq!(settings.pages.max_age, Duration::from_secs(120));
		assert!(settings.pages_preload);
		assert_eq!(settings.api_endpoints, vec!["/api/clinics", "/api/clinic"]);
	}

	#[test]
	fn invalid_values_keep_previous_setting() {
		let base = CacheSettings::default();
		let settings = base.merged(&patch(&[
			(API_DATA_DURATION, json!(-5)),
			(CACHE_STRATEGY, json!("cache-everything")),
			("somethingElse", json!(true)),
		]));

		assert_eq!(settings, base);
	}

	#[test]
	fn validate_patch_reports_the_offending_key() {
		let err = CacheSettings::validate_patch(&patch(&[(STATIC_ASSETS_ENABLED, json!("maybe"))]))
			.unwrap_err();

		assert!(matches!(err, CacheError::InvalidSettings { key, .. } if key == STATIC_ASSETS_ENABLED));
		assert!(CacheSettings::validate_patch(&CacheSettings::default().to_patch()).is_ok());
	}

	#[test]
	fn to_patch_round_trips_through_merge() {
		let custom = CacheSettings {
			strategy: Some(Strategy::StaleWhileRevalidate),
			pages_preload: true,
			..Default::default()
		};

		assert_eq!(CacheSettings::default().merged(&custom.to_patch()), custom);
	}

	#[test]
	fn strategy_override_and_defaults() {
		let mut settings = CacheSettings::default();
		assert_eq!(
			settings.strategy_for(ResourceClass::StaticAsset),
			Strategy::CacheFirst
		);
		assert_eq!(
			settings.strategy_for(ResourceClass::ApiData),
			Strategy::NetworkFirst
		);
		assert_eq!(
			settings.strategy_for(ResourceClass::Page),
			Strategy::StaleWhileRevalidate
		);

		settings.strategy = Some(Strategy::CacheFirst);
		for class in ResourceClass::ALL {
			assert_eq!(settings.strategy_for(class), Strategy::CacheFirst);
		}
	}

	#[test]
	fn classification() {
		let settings = CacheSettings::default();

		assert_eq!(
			settings.resource_class("https://dent.md/api/clinics?page=2"),
			ResourceClass::ApiData
		);
		assert_eq!(
			settings.resource_class("/static/js/main.4f2a.js"),
			ResourceClass::StaticAsset
		);
		assert_eq!(
			settings.resource_class("https://dent.md/logo.SVG"),
			ResourceClass::StaticAsset
		);
		assert_eq!(
			settings.resource_class("https://dent.md/ro/clinics/smile"),
			ResourceClass::Page
		);
		assert_eq!(settings.resource_class("/"), ResourceClass::Page);
	}

	#[test]
	fn non_get_and_disabled_classes_are_not_cacheable() {
		let mut settings = CacheSettings::default();
		let post = FetchRequest::new("POST", "/api/bookings");
		let page = FetchRequest::get("/clinics");

		assert_eq!(settings.cacheable_class(&post), None);
		assert_eq!(settings.cacheable_class(&page), Some(ResourceClass::Page));

		settings.pages.enabled = false;
		assert_eq!(settings.cacheable_class(&page), None);

		settings.pages.enabled = true;
		settings.enabled = false;
		assert_eq!(settings.cacheable_class(&page), None);
	}
}
