use async_trait::async_trait;
use serde::Deserialize;

use super::{CacheError, SettingsPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
	pub method: String,
	pub url: String,
}

impl FetchRequest {
	pub fn new(method: &str, url: &str) -> Self {
		Self {
			method: method.to_uppercase(),
			url: url.to_string(),
		}
	}

	pub fn get(url: &str) -> Self {
		Self::new("GET", url)
	}

	pub fn is_get(&self) -> bool {
		self.method.eq_ignore_ascii_case("GET")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
	pub status: u16,
	pub headers: Vec<(String, String)>,
	pub body: Vec<u8>,
}

impl CachedResponse {
	pub fn ok(body: impl Into<Vec<u8>>) -> Self {
		Self {
			status: 200,
			headers: Vec::new(),
			body: body.into(),
		}
	}

	/// Only 2xx responses are written to the cache.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// The network boundary. An `Err` means the request never produced a
/// response; HTTP error statuses come back as `Ok`.
#[async_trait]
pub trait Fetcher: Send + Sync {
	async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, CacheError>;
}

#[async_trait]
pub trait SettingsSource: Send + Sync {
	async fn fetch_settings(&self) -> Result<SettingsPatch, CacheError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
	client: reqwest::Client,
}

impl HttpFetcher {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Fetcher for HttpFetcher {
	async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, CacheError> {
		let method = reqwest::Method::from_bytes(request.method.as_bytes())
			.map_err(|e| CacheError::Network(e.to_string()))?;

		let response = self
			.client
			.request(method, request.url.as_str())
			.send()
			.await?;

		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value
					.to_str()
					.ok()
					.map(|v| (name.as_str().to_string(), v.to_string()))
			})
			.collect();
		let body = response.bytes().await?.to_vec();

		Ok(CachedResponse {
			status,
			headers,
			body,
		})
	}
}

#[derive(Debug, Deserialize)]
struct SettingsEnvelope {
	data: SettingsData,
}

#[derive(Debug, Deserialize)]
struct SettingsData {
	settings: SettingsPatch,
}

/// Pulls settings from `GET /api/cache-settings`.
#[derive(Debug, Clone)]
pub struct HttpSettingsSource {
	client: reqwest::Client,
	url: String,
}

impl HttpSettingsSource {
	pub fn new(client: reqwest::Client, url: &str) -> Self {
		Self {
			client,
			url: url.to_string(),
		}
	}
}

#[async_trait]
impl SettingsSource for HttpSettingsSource {
	async fn fetch_settings(&self) -> Result<SettingsPatch, CacheError> {
		let envelope: SettingsEnvelope = self
			.client
			.get(self.url.as_str())
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		Ok(envelope.data.settings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn methods_are_normalized() {
		let request = FetchRequest::new("get", "/");

		assert_eq!(request.method, "GET");
		assert!(request.is_get());
		assert!(!FetchRequest::new("post", "/").is_get());
	}

	#[test]
	fn settings_envelope_matches_server_response() {
		let body = r#"{"status":"success","data":{"settings":{"cacheEnabled":true,"pagesDuration":600}}}"#;
		let envelope: SettingsEnvelope = serde_json::from_str(body).unwrap();

		assert_eq!(envelope.data.settings["pagesDuration"], 600);
	}

	#[test]
	fn only_2xx_is_success() {
		let mut response = CachedResponse::ok("x");
		assert!(response.is_success());

		response.status = 304;
		assert!(!response.is_success());
		response.status = 503;
		assert!(!response.is_success());
	}
}
