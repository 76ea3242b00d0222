use crate::client_context::played_for::format_played_for;
use crate::playback::PlaybackStore;
use crate::playback::media_id::MediaId;
use crate::playback::watch_record::WatchRecord;
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub mod played_for;

/// Personalization context pushed to the server. Rebuilt from scratch for every push and always
/// carries the full viewing history.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
	pub session_id: Uuid,
	pub start_time: DateTime<Utc>,
	/// Capture time of the snapshot.
	pub time_of_day: DateTime<Utc>,
	pub viewing_history: Vec<ViewingHistoryEntry>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_played_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewingHistoryEntry {
	pub id: MediaId,
	pub name: String,
	pub played_for: String,
	pub viewed_at: DateTime<Utc>,
}

impl ViewingHistoryEntry {
	/// Only records that were actually played make it into the history.
	fn from_record(id: &MediaId, record: &WatchRecord) -> Option<Self> {
		let viewed_at = record.viewed_at?;
		Some(Self {
			id: id.clone(),
			name: record.name.clone(),
			played_for: format_played_for(record.played_for),
			viewed_at,
		})
	}
}

#[derive(Clone)]
pub struct ContextBuilder {
	playback_store: PlaybackStore,
	session: Arc<Session>,
}

impl ContextBuilder {
	pub fn new(playback_store: PlaybackStore, session: Arc<Session>) -> Self {
		Self {
			playback_store,
			session,
		}
	}

	pub async fn build(&self) -> ContextSnapshot {
		self.build_at(Utc::now()).await
	}

	pub async fn build_at(&self, time_of_day: DateTime<Utc>) -> ContextSnapshot {
		let ledger = self.playback_store.records().await;
		if ledger.is_empty() {
			debug!("Nothing has been played yet, the viewing history is empty.");
		}

		let viewing_history = ledger
			.iter()
			.filter_map(|(id, record)| ViewingHistoryEntry::from_record(id, record))
			.collect();
		let last_played_name = self
			.session
			.most_recent_media()
			.and_then(|id| ledger.get(&id).map(|record| record.name.clone()))
			.filter(|name| !name.is_empty());

		ContextSnapshot {
			session_id: self.session.id(),
			start_time: self.session.started_at(),
			time_of_day,
			viewing_history,
			last_played_name,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::store::sqlite::SqliteKeyValueStore;
	use chrono::TimeZone;

	#[tokio::test]
	async fn should_build_empty_history_from_empty_store() {
		let (builder, _store, session) = context_builder().await;
		let now = time(0);

		let snapshot = builder.build_at(now).await;

		assert_eq!(
			ContextSnapshot {
				session_id: session.id(),
				start_time: session.started_at(),
				time_of_day: now,
				viewing_history: vec![],
				last_played_name: None,
			},
			snapshot
		);
	}

	#[tokio::test]
	async fn should_render_played_records_into_history() {
		let (builder, store, _session) = context_builder().await;
		store.put("v1".into(), WatchRecord::progress(42.0, time(1))).await;

		let snapshot = builder.build().await;

		assert_eq!(
			vec![ViewingHistoryEntry {
				id: "v1".into(),
				name: String::new(),
				played_for: "42 seconds".to_string(),
				viewed_at: time(1),
			}],
			snapshot.viewing_history
		);
	}

	#[tokio::test]
	async fn should_leave_out_records_that_were_never_played() {
		let (builder, store, _session) = context_builder().await;
		store.set_name("named".into(), "Only named".to_string()).await;
		store.record_progress("played".into(), 5.0, time(1)).await;

		let snapshot = builder.build().await;

		let ids = snapshot
			.viewing_history
			.iter()
			.map(|entry| entry.id.to_string())
			.collect::<Vec<_>>();
		assert_eq!(vec!["played"], ids);
	}

	#[tokio::test]
	async fn should_keep_store_order_instead_of_chronological_order() {
		let (builder, store, _session) = context_builder().await;
		store.record_progress("late".into(), 1.0, time(30)).await;
		store.record_progress("early".into(), 1.0, time(10)).await;

		let snapshot = builder.build().await;

		let ids = snapshot
			.viewing_history
			.iter()
			.map(|entry| entry.id.to_string())
			.collect::<Vec<_>>();
		assert_eq!(vec!["late", "early"], ids);
	}

	#[tokio::test]
	async fn building_should_not_modify_the_store() {
		let (builder, store, _session) = context_builder().await;
		store.record_progress("v1".into(), 65.5, time(1)).await;
		let before = store.records().await;

		let _ = builder.build().await;
		let _ = builder.build().await;

		assert_eq!(before, store.records().await);
		assert_eq!(65.5, store.get(&"v1".into()).await.played_for);
	}

	#[tokio::test]
	async fn should_name_the_most_recently_selected_media() {
		let (builder, store, session) = context_builder().await;
		store.set_name("v1".into(), "Movie".to_string()).await;

		assert_eq!(None, builder.build().await.last_played_name);

		session.select_media("v1".into());
		assert_eq!(Some("Movie".to_string()), builder.build().await.last_played_name);

		session.select_media("unnamed".into());
		assert_eq!(None, builder.build().await.last_played_name);
	}

	async fn context_builder() -> (ContextBuilder, PlaybackStore, Arc<Session>) {
		let key_value_store = SqliteKeyValueStore::new("sqlite::memory:")
			.await
			.expect("Failed to create in-memory SQLite database");
		let store = PlaybackStore::new(Arc::new(key_value_store));
		let session = Arc::new(Session::new(time(0)));
		let builder = ContextBuilder::new(store.clone(), session.clone());
		(builder, store, session)
	}

	fn time(second: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, second).unwrap()
	}
}
