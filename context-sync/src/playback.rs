use crate::playback::catalog::CatalogItem;
use crate::playback::ledger::Ledger;
use crate::playback::media_id::MediaId;
use crate::playback::watch_record::WatchRecord;
use crate::store::KeyValueStore;
use crate::store::error::StoreError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub mod binder;
pub mod catalog;
pub mod ledger;
pub mod media_id;
pub mod watch_record;

/// Key under which the whole ledger is persisted.
pub const PLAYBACK_STATE_KEY: &str = "playback_state";

/// Durable mapping from media id to watch progress.
///
/// Every write rewrites the whole ledger with a single `set`, so readers always see either the
/// old or the new ledger. Nothing in here fails towards the caller: storage and parse errors are
/// logged and reads fall back to default records.
#[derive(Clone)]
pub struct PlaybackStore {
	key_value_store: Arc<dyn KeyValueStore>,
	write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl PlaybackStore {
	pub fn new(key_value_store: Arc<dyn KeyValueStore>) -> Self {
		Self {
			key_value_store,
			write_lock: Default::default(),
		}
	}

	pub async fn get(&self, id: &MediaId) -> WatchRecord {
		self.records().await.get(id).cloned().unwrap_or_default()
	}

	/// All records in the order they were first written.
	pub async fn records(&self) -> Ledger {
		self.read_ledger().await.unwrap_or_else(|error| {
			error!("Failed to read playback state, using empty state instead: {error}");
			Ledger::default()
		})
	}

	/// Replaces the record for `id`.
	pub async fn put(&self, id: MediaId, record: WatchRecord) {
		self.update(move |ledger| ledger.insert(id, record)).await;
	}

	/// Updates the display name only, progress is preserved.
	pub async fn set_name(&self, id: MediaId, name: String) {
		self.update(move |ledger| ledger.entry(id).name = name).await;
	}

	/// Updates the progress only, the display name is preserved.
	pub async fn record_progress(&self, id: MediaId, played_for: f64, viewed_at: DateTime<Utc>) {
		self.update(move |ledger| {
			let record = ledger.entry(id);
			record.played_for = played_for;
			record.viewed_at = Some(viewed_at);
		})
		.await;
	}

	/// Refreshes the names of all video items of a catalog listing in one write.
	pub async fn sync_catalog(&self, items: &[CatalogItem]) {
		self.update(|ledger| {
			for item in items.iter().filter(|item| item.is_video()) {
				ledger.entry(item.id.clone()).name.clone_from(&item.name);
			}
		})
		.await;
	}

	async fn update(&self, modify: impl FnOnce(&mut Ledger)) {
		let _write_guard = self.write_lock.lock().await;

		let mut ledger = match self.read_ledger().await {
			Ok(ledger) => ledger,
			Err(error) => {
				error!("Not updating playback state, failed to read it: {error}");
				return;
			}
		};
		modify(&mut ledger);

		let json = match serde_json::to_string(&ledger) {
			Ok(json) => json,
			Err(error) => {
				error!("Failed to serialize playback state: {error}");
				return;
			}
		};
		match self.key_value_store.set(PLAYBACK_STATE_KEY, &json).await {
			Ok(()) => debug!("Persisted playback state with {} records.", ledger.len()),
			Err(error) => error!("Failed to persist playback state: {error}"),
		}
	}

	/// A corrupt ledger reads as empty, only failures of the underlying store are errors.
	async fn read_ledger(&self) -> Result<Ledger, StoreError> {
		let Some(json) = self.key_value_store.get(PLAYBACK_STATE_KEY).await? else {
			return Ok(Ledger::default());
		};

		Ok(serde_json::from_str(&json).unwrap_or_else(|error| {
			warn!("Stored playback state is corrupt, treating it as empty: {error}");
			Ledger::default()
		}))
	}
}
