use log::{debug, info, warn};
use std::{
	sync::{Arc, Mutex, RwLock},
	time::Duration,
};
use tokio::{
	sync::mpsc,
	task::JoinHandle,
	time::{interval, MissedTickBehavior},
};

use super::{
	partition_name, CacheEntry, CacheError, CacheSettings, CacheStore, CachedResponse, Clock,
	FetchRequest, Fetcher, ResourceClass, SettingsPatch, SettingsSource, Strategy, SystemClock,
};
use crate::config::CacheEngineConfig;

/// Administrative messages pushed to a running engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	/// Merge into the current settings. Cached entries stay.
	ReplaceSettings(SettingsPatch),
	ClearAllCaches,
	/// Promote the pending policy version without waiting.
	ForceActivate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
	Network,
	Cache { fresh: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
	pub response: CachedResponse,
	pub source: ResponseSource,
}

impl EngineResponse {
	fn network(response: CachedResponse) -> Self {
		Self {
			response,
			source: ResponseSource::Network,
		}
	}

	fn cached(entry: CacheEntry, fresh: bool) -> Self {
		Self {
			response: entry.response,
			source: ResponseSource::Cache { fresh },
		}
	}
}

#[derive(Debug)]
struct Deployment {
	active: String,
	pending: Option<String>,
}

/// Writes `entry` into the partition of `version` only while that version is
/// still active. The deployment lock is held across the write, so an entry
/// fetched under a superseded policy never lands after activation pruned it.
fn store_if_active(
	deployment: &Mutex<Deployment>,
	store: &CacheStore,
	version: &str,
	class: ResourceClass,
	url: &str,
	entry: CacheEntry,
	max_bytes: Option<u64>,
) -> bool {
	let deployment = deployment.lock().unwrap_or_else(|p| p.into_inner());
	if deployment.active != version {
		debug!("dropping {url} fetched under superseded policy {version}");
		return false;
	}

	store.put_bounded(&partition_name(version, class), url, entry, max_bytes);
	true
}

pub struct CachePolicyEngine {
	fetcher: Arc<dyn Fetcher>,
	store: Arc<CacheStore>,
	settings: RwLock<Arc<CacheSettings>>,
	deployment: Arc<Mutex<Deployment>>,
	clock: Arc<dyn Clock>,
	preload_urls: Vec<String>,
	background: Mutex<Vec<JoinHandle<()>>>,
}

impl CachePolicyEngine {
	pub fn new(version: &str, fetcher: Arc<dyn Fetcher>, settings: CacheSettings) -> Self {
		Self {
			fetcher,
			store: Arc::new(CacheStore::new()),
			settings: RwLock::new(Arc::new(settings)),
			deployment: Arc::new(Mutex::new(Deployment {
				active: version.to_string(),
				pending: None,
			})),
			clock: Arc::new(SystemClock),
			preload_urls: Vec::new(),
			background: Mutex::new(Vec::new()),
		}
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn with_preload_urls(mut self, urls: Vec<String>) -> Self {
		self.preload_urls = urls;
		self
	}

	/// Builds an engine, loads the server settings once, warms the page
	/// cache and keeps pulling settings every `refresh_interval`.
	pub async fn launch(
		config: &CacheEngineConfig,
		fetcher: Arc<dyn Fetcher>,
		source: Arc<dyn SettingsSource>,
	) -> Arc<Self> {
		let engine = Arc::new(
			Self::new(&config.version, fetcher, CacheSettings::default())
				.with_preload_urls(config.preload_urls.clone()),
		);

		engine.refresh_settings(source.as_ref()).await;
		engine.preload_pages().await;
		engine.spawn_settings_refresh(source, config.refresh_interval);

		engine
	}

	pub fn settings(&self) -> Arc<CacheSettings> {
		Arc::clone(&self.settings.read().unwrap_or_else(|p| p.into_inner()))
	}

	pub fn store(&self) -> &CacheStore {
		&self.store
	}

	pub fn active_version(&self) -> String {
		self.deployment
			.lock()
			.unwrap_or_else(|p| p.into_inner())
			.active
			.clone()
	}

	pub fn pending_version(&self) -> Option<String> {
		self.deployment
			.lock()
			.unwrap_or_else(|p| p.into_inner())
			.pending
			.clone()
	}

	pub async fn handle(&self, request: &FetchRequest) -> Result<EngineResponse, CacheError> {
		let settings = self.settings();

		let Some(class) = settings.cacheable_class(request) else {
			return self.passthrough(request).await;
		};

		let version = self.active_version();
		let partition = partition_name(&version, class);
		let max_age = settings.policy(class).max_age;
		let max_bytes = settings.max_bytes(class);
		let cached = self.store.get(&partition, &request.url);

		match settings.strategy_for(class) {
			Strategy::CacheFirst => {
				if let Some(entry) = cached.as_ref() {
					if entry.is_fresh(self.clock.now(), max_age) {
						return Ok(EngineResponse::cached(entry.clone(), true));
					}
				}
				self.network_or_cached(request, &version, class, cached, max_age, max_bytes)
					.await
			}
			Strategy::NetworkFirst => {
				self.network_or_cached(request, &version, class, cached, max_age, max_bytes)
					.await
			}
			Strategy::StaleWhileRevalidate => match cached {
				Some(entry) => {
					let fresh = entry.is_fresh(self.clock.now(), max_age);
					self.revalidate_in_background(request.clone(), version, class, max_bytes);
					Ok(EngineResponse::cached(entry, fresh))
				}
				None => {
					self.network_or_cached(request, &version, class, None, max_age, max_bytes)
						.await
				}
			},
		}
	}

	async fn passthrough(&self, request: &FetchRequest) -> Result<EngineResponse, CacheError> {
		self.fetcher
			.fetch(request)
			.await
			.map(EngineResponse::network)
			.map_err(|e| CacheError::Unavailable {
				url: request.url.clone(),
				reason: e.to_string(),
			})
	}

	async fn network_or_cached(
		&self,
		request: &FetchRequest,
		version: &str,
		class: ResourceClass,
		cached: Option<CacheEntry>,
		max_age: Duration,
		max_bytes: Option<u64>,
	) -> Result<EngineResponse, CacheError> {
		match self.fetcher.fetch(request).await {
			Ok(response) => {
				if response.is_success() {
					let entry = CacheEntry {
						response: response.clone(),
						captured_at: self.clock.now(),
					};
					store_if_active(
						&self.deployment,
						&self.store,
						version,
						class,
						&request.url,
						entry,
						max_bytes,
					);
				}
				Ok(EngineResponse::network(response))
			}
			Err(e) => match cached {
				Some(entry) => {
					debug!("network failed for {}, serving cache: {e}", request.url);
					let fresh = entry.is_fresh(self.clock.now(), max_age);
					Ok(EngineResponse::cached(entry, fresh))
				}
				None => Err(CacheError::Unavailable {
					url: request.url.clone(),
					reason: e.to_string(),
				}),
			},
		}
	}

	fn revalidate_in_background(
		&self,
		request: FetchRequest,
		version: String,
		class: ResourceClass,
		max_bytes: Option<u64>,
	) {
		let Ok(runtime) = tokio::runtime::Handle::try_current() else {
			debug!("no runtime, skipping revalidation of {}", request.url);
			return;
		};

		let fetcher = Arc::clone(&self.fetcher);
		let store = Arc::clone(&self.store);
		let deployment = Arc::clone(&self.deployment);
		let clock = Arc::clone(&self.clock);

		let handle = runtime.spawn(async move {
			match fetcher.fetch(&request).await {
				Ok(response) if response.is_success() => {
					let entry = CacheEntry {
						response,
						captured_at: clock.now(),
					};
					store_if_active(
						&deployment,
						&store,
						&version,
						class,
						&request.url,
						entry,
						max_bytes,
					);
				}
				Ok(response) => debug!(
					"revalidation of {} returned {}",
					request.url, response.status
				),
				Err(e) => debug!("revalidation of {} failed: {e}", request.url),
			}
		});

		let mut background = self.background.lock().unwrap_or_else(|p| p.into_inner());
		background.retain(|task| !task.is_finished());
		background.push(handle);
	}

	/// Waits for background revalidations started so far.
	pub async fn settle(&self) {
		let tasks = std::mem::take(&mut *self.background.lock().unwrap_or_else(|p| p.into_inner()));
		for task in tasks {
			let _ = task.await;
		}
	}

	/// The merge runs under the write lock so concurrent patches compose.
	pub fn replace_settings(&self, patch: &SettingsPatch) {
		let mut settings = self.settings.write().unwrap_or_else(|p| p.into_inner());
		let next = settings.merged(patch);
		*settings = Arc::new(next);
	}

	pub fn clear_all_caches(&self) {
		self.store.clear_all();
	}

	/// Registers a new policy version. It becomes active on [`Self::force_activate`].
	pub fn install(&self, version: &str) {
		let mut deployment = self.deployment.lock().unwrap_or_else(|p| p.into_inner());
		if deployment.active != version {
			deployment.pending = Some(version.to_string());
		}
	}

	/// Returns `false` when there was nothing pending.
	pub async fn force_activate(&self) -> bool {
		let activated = {
			let mut deployment = self.deployment.lock().unwrap_or_else(|p| p.into_inner());
			match deployment.pending.take() {
				Some(version) => {
					deployment.active = version.clone();
					Some(version)
				}
				None => None,
			}
		};

		let Some(version) = activated else {
			return false;
		};

		self.store.retain_version(&version);
		info!("cache policy {version} activated");
		self.preload_pages().await;

		true
	}

	pub async fn execute(&self, command: Command) {
		match command {
			Command::ReplaceSettings(patch) => self.replace_settings(&patch),
			Command::ClearAllCaches => self.clear_all_caches(),
			Command::ForceActivate => {
				self.force_activate().await;
			}
		}
	}

	/// Pulls settings once. On failure the last known settings stay in
	/// place. Returns `true` when the settings changed, in which case every
	/// cached entry is dropped.
	pub async fn refresh_settings(&self, source: &dyn SettingsSource) -> bool {
		let patch = match source.fetch_settings().await {
			Ok(patch) => patch,
			Err(e) => {
				warn!("cache settings unavailable, keeping last known: {e}");
				return false;
			}
		};

		{
			let mut settings = self.settings.write().unwrap_or_else(|p| p.into_inner());
			let next = settings.merged(&patch);
			if next == **settings {
				return false;
			}
			*settings = Arc::new(next);
		}

		self.store.clear_all();
		info!("cache settings changed, caches cleared");

		true
	}

	/// Fetches the configured page URLs into the page partition when page
	/// preloading is on. Returns how many were stored.
	pub async fn preload_pages(&self) -> usize {
		let settings = self.settings();
		if !settings.enabled || !settings.pages.enabled || !settings.pages_preload {
			return 0;
		}

		let version = self.active_version();
		let mut stored = 0;

		for url in &self.preload_urls {
			match self.fetcher.fetch(&FetchRequest::get(url)).await {
				Ok(response) if response.is_success() => {
					let entry = CacheEntry {
						response,
						captured_at: self.clock.now(),
					};
					if store_if_active(
						&self.deployment,
						&self.store,
						&version,
						ResourceClass::Page,
						url,
						entry,
						None,
					) {
						stored += 1;
					}
				}
				Ok(response) => warn!("preload of {url} returned {}", response.status),
				Err(e) => warn!("preload of {url} failed: {e}"),
			}
		}

		stored
	}

	pub fn spawn_command_listener(self: &Arc<Self>, mut commands: mpsc::Receiver<Command>) -> JoinHandle<()> {
		let engine = Arc::clone(self);

		tokio::spawn(async move {
			while let Some(command) = commands.recv().await {
				debug!("cache command: {command:?}");
				engine.execute(command).await;
			}
		})
	}

	pub fn spawn_settings_refresh(
		self: &Arc<Self>,
		source: Arc<dyn SettingsSource>,
		every: Duration,
	) -> JoinHandle<()> {
		let engine = Arc::clone(self);

		tokio::spawn(async move {
			let mut ticker = interval(every);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			// the first tick fires immediately
			ticker.tick().await;

			loop {
				ticker.tick().await;
				engine.refresh_settings(source.as_ref()).await;
			}
		})
	}
}
