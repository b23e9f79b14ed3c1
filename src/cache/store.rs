use chrono::{DateTime, Utc};
use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
	time::Duration,
};

use super::{CachedResponse, ResourceClass};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
	pub response: CachedResponse,
	pub captured_at: DateTime<Utc>,
}

impl CacheEntry {
	/// Entries from the future (clock skew) count as fresh.
	pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
		match now.signed_duration_since(self.captured_at).to_std() {
			Ok(age) => age < max_age,
			Err(_) => true,
		}
	}

	fn size(&self) -> u64 {
		self.response.body.len() as u64
	}
}

/// Named partitions of cached responses, one per policy version and
/// resource class (`"<version>:<class>"`).
#[derive(Debug, Default)]
pub struct CacheStore {
	partitions: Mutex<HashMap<String, HashMap<String, CacheEntry>>>,
}

pub fn partition_name(version: &str, class: ResourceClass) -> String {
	format!("{version}:{}", class.as_str())
}

impl CacheStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<String, HashMap<String, CacheEntry>>> {
		self.partitions.lock().unwrap_or_else(|p| p.into_inner())
	}

	pub fn get(&self, partition: &str, key: &str) -> Option<CacheEntry> {
		self.lock()
			.get(partition)
			.and_then(|entries| entries.get(key))
			.cloned()
	}

	pub fn put(&self, partition: &str, key: &str, entry: CacheEntry) {
		self.put_bounded(partition, key, entry, None);
	}

	/// Inserts `entry`, then evicts the oldest captures of the partition
	/// until its bodies fit into `max_bytes`.
	pub fn put_bounded(&self, partition: &str, key: &str, entry: CacheEntry, max_bytes: Option<u64>) {
		let mut partitions = self.lock();
		let entries = partitions.entry(partition.to_string()).or_default();
		entries.insert(key.to_string(), entry);

		let Some(max_bytes) = max_bytes else {
			return;
		};

		let mut total: u64 = entries.values().map(CacheEntry::size).sum();
		if total <= max_bytes {
			return;
		}

		let mut by_age: Vec<(DateTime<Utc>, String)> = entries
			.iter()
			.map(|(k, e)| (e.captured_at, k.clone()))
			.collect();
		by_age.sort();

		for (_, oldest) in by_age {
			if total <= max_bytes {
				break;
			}
			if let Some(evicted) = entries.remove(&oldest) {
				total -= evicted.size();
			}
		}
	}

	pub fn clear_all(&self) {
		self.lock().clear();
	}

	/// Drops every partition that does not belong to `version`.
	pub fn retain_version(&self, version: &str) {
		let prefix = format!("{version}:");
		self.lock().retain(|name, _| name.starts_with(&prefix));
	}

	pub fn len(&self) -> usize {
		self.lock().values().map(HashMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn partition_len(&self, partition: &str) -> usize {
		self.lock().get(partition).map_or(0, HashMap::len)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn entry(body: &str, secs: i64) -> CacheEntry {
		CacheEntry {
			response: CachedResponse::ok(body),
			captured_at: Utc.timestamp_opt(secs, 0).unwrap(),
		}
	}

	#[test]
	fn freshness_is_strictly_less_than_max_age() {
		let e = entry("x", 1_000);
		let max_age = Duration::from_secs(60);

		assert!(e.is_fresh(Utc.timestamp_opt(1_059, 0).unwrap(), max_age));
		assert!(!e.is_fresh(Utc.timestamp_opt(1_060, 0).unwrap(), max_age));
		assert!(e.is_fresh(Utc.timestamp_opt(900, 0).unwrap(), max_age));
	}

	#[test]
	fn clearing_twice_is_a_no_op() {
		let store = CacheStore::new();
		store.put("v1:page", "/a", entry("a", 1));
		store.put("v1:api-data", "/api/b", entry("b", 1));
		assert_eq!(store.len(), 2);

		store.clear_all();
		assert!(store.is_empty());

		store.clear_all();
		assert!(store.is_empty());
	}

	#[test]
	fn byte_budget_evicts_oldest_first() {
		let store = CacheStore::new();
		let part = "v1:static-asset";

		store.put_bounded(part, "/a.js", entry("aaaa", 1), Some(10));
		store.put_bounded(part, "/b.js", entry("bbbb", 2), Some(10));
		store.put_bounded(part, "/c.js", entry("cccc", 3), Some(10));

		assert_eq!(store.partition_len(part), 2);
		assert!(store.get(part, "/a.js").is_none());
		assert!(store.get(part, "/c.js").is_some());
	}

	#[test]
	fn retain_version_drops_old_partitions() {
		let store = CacheStore::new();
		store.put(&partition_name("v1", ResourceClass::Page), "/", entry("old", 1));
		store.put(&partition_name("v2", ResourceClass::Page), "/", entry("new", 2));

		store.retain_version("v2");

		assert_eq!(store.len(), 1);
		assert!(store.get("v2:page", "/").is_some());
	}

	#[test]
	fn last_write_wins() {
		let store = CacheStore::new();
		store.put("v1:page", "/", entry("first", 1));
		store.put("v1:page", "/", entry("second", 2));

		assert_eq!(store.get("v1:page", "/").unwrap().response.body, b"second");
	}
}
