use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
	/// Network failed and nothing usable was cached.
	#[error("resource unavailable: {url} ({reason})")]
	Unavailable { url: String, reason: String },

	#[error("network error: {0}")]
	Network(String),

	#[error("invalid cache setting `{key}`: {reason}")]
	InvalidSettings { key: String, reason: String },
}

impl From<reqwest::Error> for CacheError {
	fn from(e: reqwest::Error) -> Self {
		CacheError::Network(e.to_string())
	}
}
