use crate::playback::media_id::MediaId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// State of one run of the client, shared between the player side and the sync side.
#[derive(Debug)]
pub struct Session {
	id: Uuid,
	started_at: DateTime<Utc>,
	most_recent_media: parking_lot::Mutex<Option<MediaId>>,
}

impl Session {
	pub fn new(started_at: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4(),
			started_at,
			most_recent_media: Default::default(),
		}
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	pub fn started_at(&self) -> DateTime<Utc> {
		self.started_at
	}

	pub fn most_recent_media(&self) -> Option<MediaId> {
		self.most_recent_media.lock().clone()
	}

	pub fn select_media(&self, id: MediaId) {
		*self.most_recent_media.lock() = Some(id);
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::new(Utc::now())
	}
}
