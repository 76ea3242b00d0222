use crate::message::{OutgoingEvent, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Sink, SinkExt};
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, warn};

pub type MessageSender = Pin<Arc<dyn MessageSenderTrait + Send + Sync>>;

#[async_trait]
pub trait MessageSenderTrait {
	async fn send(&self, event: OutgoingEvent) -> Result<(), ()>;
	/// Closing an already closed connection does nothing.
	async fn close(&self);
}

pub struct SinkMessageSender<EventSink> {
	inner: tokio::sync::Mutex<SinkMessageSenderInner<EventSink>>,
}

struct SinkMessageSenderInner<EventSink> {
	event_sink: EventSink,
	closed: bool,
}

#[async_trait]
impl<EventSink, SinkError> MessageSenderTrait for SinkMessageSender<EventSink>
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	async fn send(&self, event: OutgoingEvent) -> Result<(), ()> {
		let mut inner = self.inner.lock().await;
		if inner.closed {
			warn!("Not sending '{:?}' event, the connection is closed.", event.event_type);
			return Err(());
		}

		let websocket_message = WebSocketMessage::from(&event);
		inner
			.event_sink
			.send(websocket_message)
			.await
			.map_err(|error| error!("Error while sending '{:?}' event: {error:?}", event.event_type))
	}

	async fn close(&self) {
		let mut inner = self.inner.lock().await;
		if inner.closed {
			return;
		}
		inner.closed = true;

		// errors only mean that the other side is gone already
		let _ = inner.event_sink.send(WebSocketMessage::Close(None)).await;
		let _ = inner.event_sink.close().await;
	}
}

impl<EventSink, SinkError> SinkMessageSender<EventSink>
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Unpin,
	SinkError: Debug + 'static,
{
	pub fn new(event_sink: EventSink) -> Self {
		let inner = SinkMessageSenderInner {
			event_sink,
			closed: false,
		};
		Self { inner: inner.into() }
	}
}

impl<EventSink, SinkError> From<SinkMessageSender<EventSink>> for MessageSender
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	fn from(sink_message_sender: SinkMessageSender<EventSink>) -> Self {
		Arc::pin(sink_message_sender)
	}
}
