use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// One key of the cache policy settings. Values are stored as JSON text.
#[derive(Debug, Deserialize, sqlx::FromRow, Serialize, Clone)]
pub struct CacheSettingRow {
	pub key: String,
	pub value: String,
	#[serde(rename = "updatedTs")]
	pub updated_ts: Option<DateTime<Utc>>,
}

impl CacheSettingRow {
	/// Values written by hand (`3600`, `true`) are valid JSON; anything else
	/// is kept as a plain string.
	pub fn json_value(&self) -> serde_json::Value {
		serde_json::from_str(&self.value)
			.unwrap_or_else(|_| serde_json::Value::String(self.value.clone()))
	}
}
