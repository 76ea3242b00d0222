use crate::playback::PlaybackStore;
use crate::playback::catalog::CatalogItem;
use crate::playback::media_id::MediaId;
use crate::session::Session;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Connects player events to the playback store.
#[derive(Clone)]
pub struct PlaybackBinder {
	playback_store: PlaybackStore,
	session: Arc<Session>,
}

impl PlaybackBinder {
	pub fn new(playback_store: PlaybackStore, session: Arc<Session>) -> Self {
		Self {
			playback_store,
			session,
		}
	}

	pub fn select_media(&self, id: MediaId) {
		info!("Selected media '{id}'.");
		self.session.select_media(id);
	}

	/// Called on every progress tick of the player.
	pub async fn on_progress(&self, current_time: f64) {
		let Some(id) = self.session.most_recent_media() else {
			debug!("Ignoring progress of {current_time}s, no media selected.");
			return;
		};

		debug!("Updating time for '{id}' to {current_time}s.");
		self.playback_store.record_progress(id, current_time, Utc::now()).await;
	}

	/// Offset to seek to once the selected media has been loaded. Only media that was actually
	/// played resumes.
	pub async fn resume_position(&self) -> Option<f64> {
		let id = self.session.most_recent_media()?;
		let record = self.playback_store.get(&id).await;
		(record.has_been_viewed() && record.played_for > 0.0).then_some(record.played_for)
	}

	pub async fn refresh_catalog(&self, items: &[CatalogItem]) {
		info!("Refreshing names from catalog with {} items.", items.len());
		self.playback_store.sync_catalog(items).await;
	}
}
