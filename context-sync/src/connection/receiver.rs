use crate::message::{IncomingEvent, MessageError, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use tracing::{debug, error};

pub type MessageReceiver = Pin<Box<dyn MessageReceiverTrait + Unpin + Send>>;

#[derive(Debug, PartialEq)]
pub enum ReceivedMessage {
	Event(IncomingEvent),
	/// The server closed the connection or the transport failed.
	Finished,
}

#[async_trait]
pub trait MessageReceiverTrait {
	/// Receive the next well formed event, skipping anything that can't be parsed.
	async fn receive(&mut self) -> ReceivedMessage;
}

pub struct StreamMessageReceiver<EventStream> {
	event_stream: EventStream,
}

#[async_trait]
impl<EventStream> MessageReceiverTrait for StreamMessageReceiver<EventStream>
where
	EventStream: Stream<Item = WebSocketMessage> + Unpin + Send,
{
	async fn receive(&mut self) -> ReceivedMessage {
		loop {
			let Some(websocket_message) = self.event_stream.next().await else {
				return ReceivedMessage::Finished;
			};

			match websocket_message {
				WebSocketMessage::Close(frame) => {
					debug!("Server closed the event stream: {frame:?}");
					return ReceivedMessage::Finished;
				}
				// tungstenite answers pings by itself
				WebSocketMessage::Ping(_) | WebSocketMessage::Pong(_) | WebSocketMessage::Frame(_) => continue,
				websocket_message => match IncomingEvent::try_from(&websocket_message) {
					Ok(event) => return ReceivedMessage::Event(event),
					Err(MessageError::DeserializationFailed { error, json }) => {
						error!("Dropping malformed event: {error}, message was: {json}");
					}
					Err(MessageError::WrongMessageType(message)) => {
						debug!("Ignoring non-text message: {message:?}");
					}
				},
			}
		}
	}
}

impl<EventStream> StreamMessageReceiver<EventStream>
where
	EventStream: Stream<Item = WebSocketMessage>,
{
	pub fn new(event_stream: EventStream) -> Self {
		Self { event_stream }
	}
}

impl<EventStream> From<StreamMessageReceiver<EventStream>> for MessageReceiver
where
	EventStream: Stream<Item = WebSocketMessage> + Unpin + Send + 'static,
{
	fn from(stream_message_receiver: StreamMessageReceiver<EventStream>) -> Self {
		Box::pin(stream_message_receiver)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::message::EventType;

	#[tokio::test]
	async fn should_receive_events() {
		let mut receiver = receiver(vec![WebSocketMessage::text(
			r#"{"type": "health", "time": "2024-01-01T00:00:00Z", "payload": {}}"#,
		)]);

		let ReceivedMessage::Event(event) = receiver.receive().await else {
			panic!("Expected an event");
		};
		assert_eq!(EventType::Health, event.event_type);
		assert_eq!(ReceivedMessage::Finished, receiver.receive().await);
	}

	#[tokio::test]
	async fn should_skip_malformed_and_binary_messages() {
		let mut receiver = receiver(vec![
			WebSocketMessage::text("{not json"),
			WebSocketMessage::binary(vec![1, 2, 3]),
			WebSocketMessage::Ping(Default::default()),
			WebSocketMessage::text(r#"{"type": "somethingNew"}"#),
		]);

		let ReceivedMessage::Event(event) = receiver.receive().await else {
			panic!("Expected an event");
		};
		assert_eq!(EventType::Unknown, event.event_type);
	}

	#[tokio::test]
	async fn should_finish_on_close() {
		let mut receiver = receiver(vec![
			WebSocketMessage::Close(None),
			WebSocketMessage::text(r#"{"type": "health"}"#),
		]);

		assert_eq!(ReceivedMessage::Finished, receiver.receive().await);
	}

	fn receiver(messages: Vec<WebSocketMessage>) -> MessageReceiver {
		MessageReceiver::from(StreamMessageReceiver::new(futures_util::stream::iter(messages)))
	}
}
