use crate::configuration::Configuration;
use crate::connection::connector::{Connector, WebSocketConnector};
use crate::context::ApplicationContext;
use crate::error::ContextSyncError;
use crate::playback::PlaybackStore;
use crate::playback::catalog::parse_catalog;
use crate::playback::media_id::MediaId;
use crate::playback::watch_record::WatchRecord;
use crate::player_bridge::{PlayerBridge, parse_seconds, resume_line};
use crate::sync_client::SyncClient;
use crate::utils::time_source::TimeSource;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(version, about = "Keeps a gallery server informed about what has been watched on this device")]
pub struct Commandline {
	#[arg(short = 'c', long = "config-file", default_value = "configuration.toml")]
	pub configuration_file_path: PathBuf,
	#[command(subcommand)]
	pub command: Option<BaseCommand>,
}

#[derive(clap::Subcommand, Debug, Default)]
pub enum BaseCommand {
	/// Sync with the gallery server and read player events from standard input
	#[default]
	Run,
	/// Print the configuration
	Configuration,
	/// Print the client context that would be pushed right now
	Context,
	/// Record playback progress for a media item
	Record {
		id: String,
		#[arg(value_parser = parse_seconds)]
		seconds: f64,
	},
	/// Print the position playback of a media item would resume at
	Resume { id: String },
	/// Refresh display names from a JSON catalog listing
	ImportCatalog { path: PathBuf },
}

impl Commandline {
	pub async fn run(self) -> Result<(), ContextSyncError> {
		let configuration = Configuration::from_file(&self.configuration_file_path)?;
		tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::try_new(&configuration.log_filters)?)
			// standard output belongs to the player
			.with_writer(std::io::stderr)
			.init();

		let time_source = TimeSource::default();
		let application_context = ApplicationContext::new(configuration, time_source).await?;

		let base_command = self.command.unwrap_or_default();
		match base_command {
			BaseCommand::Run => run(application_context).await?,
			BaseCommand::Configuration => println!("{:#?}", application_context.configuration),
			BaseCommand::Context => {
				let snapshot = application_context.context_builder().build().await;
				println!("{}", serde_json::to_string_pretty(&snapshot)?);
			}
			BaseCommand::Record { id, seconds } => {
				record(&application_context.playback_store, id.into(), seconds, Utc::now()).await;
			}
			BaseCommand::Resume { id } => {
				let binder = application_context.playback_binder();
				binder.select_media(id.into());
				print!("{}", resume_line(binder.resume_position().await));
			}
			BaseCommand::ImportCatalog { path } => {
				let json = tokio::fs::read_to_string(&path).await?;
				let items = parse_catalog(&json)?;
				application_context.playback_binder().refresh_catalog(&items).await;
			}
		}
		Ok(())
	}
}

/// Overwrites the stored progress of a media item and keeps its display name.
async fn record(playback_store: &PlaybackStore, id: MediaId, seconds: f64, viewed_at: DateTime<Utc>) {
	let record = WatchRecord {
		name: playback_store.get(&id).await.name,
		..WatchRecord::progress(seconds, viewed_at)
	};
	playback_store.put(id, record).await;
}

async fn run(application_context: ApplicationContext) -> Result<(), ContextSyncError> {
	let endpoint = application_context.event_stream_url()?;
	info!("Starting client context sync with '{endpoint}'.");

	let sync_client = SyncClient::new(
		endpoint,
		Connector::from(WebSocketConnector),
		application_context.context_builder(),
		application_context.time_source.clone(),
		application_context.configuration.push_interval,
		application_context.configuration.reconnect_delay,
	);
	let player_bridge = PlayerBridge::new(application_context.playback_binder());
	let player = async {
		if let Err(error) = player_bridge
			.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
			.await
		{
			error!("Reading player input failed: {error}");
		}
		info!("No more player events, continuing to sync.");
	};

	tokio::join!(sync_client.run(), player);
	Ok(())
}
