use crate::commandline::Commandline;
use crate::error::ContextSyncError;
use clap::Parser;

mod client_context;
mod commandline;
mod configuration;
mod connection;
mod context;
mod endpoint;
mod error;
mod message;
mod playback;
mod player_bridge;
mod session;
mod store;
mod sync_client;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ContextSyncError> {
	Commandline::parse().run().await
}
