use crate::client_context::ContextBuilder;
use crate::connection::connector::Connector;
use crate::connection::receiver::{MessageReceiver, ReceivedMessage};
use crate::connection::sender::MessageSender;
use crate::message::{EventType, IncomingEvent, OutgoingEvent};
use crate::utils::time_source::TimeSource;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

pub const PUSH_TIMER: &str = "push";
pub const RECONNECT_TIMER: &str = "reconnect";

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum ConnectionState {
	Connecting,
	Open,
	Closing,
	Closed,
}

/// Keeps one event stream connection alive for the lifetime of the process and pushes the
/// client context whenever a connection opens and every push interval while it stays open.
pub struct SyncClient {
	endpoint: Url,
	connector: Connector,
	context_builder: ContextBuilder,
	time_source: TimeSource,
	push_interval: Duration,
	reconnect_delay: Duration,
	state: watch::Sender<ConnectionState>,
}

impl SyncClient {
	pub fn new(
		endpoint: Url,
		connector: Connector,
		context_builder: ContextBuilder,
		time_source: TimeSource,
		push_interval: Duration,
		reconnect_delay: Duration,
	) -> Self {
		Self {
			endpoint,
			connector,
			context_builder,
			time_source,
			push_interval,
			reconnect_delay,
			state: watch::channel(ConnectionState::Closed).0,
		}
	}

	pub fn state(&self) -> watch::Receiver<ConnectionState> {
		self.state.subscribe()
	}

	/// Never returns. Every closed or failed connection schedules exactly one reconnect.
	pub async fn run(self) {
		loop {
			self.connect_and_sync().await;
			self.set_state(ConnectionState::Closed);

			info!("Reconnecting to event stream in {:?}.", self.reconnect_delay);
			self.time_source.sleep(RECONNECT_TIMER, self.reconnect_delay).await;
		}
	}

	async fn connect_and_sync(&self) {
		self.set_state(ConnectionState::Connecting);
		info!("Connecting to event stream at '{}'.", self.endpoint);

		let (message_sender, message_receiver) = match self.connector.connect(&self.endpoint).await {
			Ok(connection) => connection,
			Err(error) => {
				warn!("Failed to connect to event stream: {error}");
				return;
			}
		};

		self.set_state(ConnectionState::Open);
		info!("Event stream connected.");
		self.sync(&message_sender, message_receiver).await;

		self.set_state(ConnectionState::Closing);
		message_sender.close().await;
	}

	async fn sync(&self, message_sender: &MessageSender, mut message_receiver: MessageReceiver) {
		self.push_context(message_sender).await;

		let mut push_timer = self
			.time_source
			.interval_at(PUSH_TIMER, self.push_interval, self.push_interval);
		loop {
			tokio::select! {
				received = message_receiver.receive() => match received {
					ReceivedMessage::Event(event) => self.handle_event(event, message_sender).await,
					ReceivedMessage::Finished => {
						info!("Event stream closed.");
						break;
					}
				},
				() = push_timer.tick() => self.push_context(message_sender).await,
			}
		}
	}

	async fn handle_event(&self, event: IncomingEvent, message_sender: &MessageSender) {
		match event.event_type {
			EventType::Health => {
				debug!("Answering health check sent at {:?}.", event.time);
				let _ = message_sender.send(OutgoingEvent::health(Utc::now())).await;
			}
			EventType::ClientContext | EventType::Unknown => {
				debug!("Ignoring event of type {:?}.", event.event_type);
			}
		}
	}

	async fn push_context(&self, message_sender: &MessageSender) {
		let snapshot = self.context_builder.build().await;
		let history_length = snapshot.viewing_history.len();

		if message_sender
			.send(OutgoingEvent::client_context(Utc::now(), snapshot))
			.await
			.is_ok()
		{
			info!("Pushed client context with {history_length} viewed items.");
		}
	}

	fn set_state(&self, state: ConnectionState) {
		let previous = self.state.send_replace(state);
		debug!("Connection state {previous} -> {state}.");
	}
}
