use crate::client_context::ContextBuilder;
use crate::configuration::Configuration;
use crate::endpoint::{EndpointError, event_stream_url};
use crate::playback::PlaybackStore;
use crate::playback::binder::PlaybackBinder;
use crate::session::Session;
use crate::store::sqlite::SqliteKeyValueStore;
use crate::utils::time_source::TimeSource;
use anyhow::Context;
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub time_source: TimeSource,
	pub playback_store: PlaybackStore,
	pub session: Arc<Session>,
}

impl ApplicationContext {
	pub async fn new(configuration: Configuration, time_source: TimeSource) -> anyhow::Result<ApplicationContext> {
		let key_value_store = SqliteKeyValueStore::new(&configuration.database_url)
			.await
			.with_context(|| format!("Failed to open database '{}'", configuration.database_url))?;
		let playback_store = PlaybackStore::new(Arc::new(key_value_store));

		Ok(Self {
			configuration,
			time_source,
			playback_store,
			session: Arc::new(Session::default()),
		})
	}

	pub fn context_builder(&self) -> ContextBuilder {
		ContextBuilder::new(self.playback_store.clone(), self.session.clone())
	}

	pub fn playback_binder(&self) -> PlaybackBinder {
		PlaybackBinder::new(self.playback_store.clone(), self.session.clone())
	}

	pub fn event_stream_url(&self) -> Result<Url, EndpointError> {
		event_stream_url(&self.configuration.page_origin, &self.configuration.event_stream_path)
	}
}
