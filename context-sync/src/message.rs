use crate::client_context::ContextSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type WebSocketMessage = tokio_tungstenite::tungstenite::Message;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
	/// Liveness check, sent by either side.
	Health,
	/// Personalization context, only ever sent by the client.
	ClientContext,
	#[serde(other)]
	Unknown,
}

/// Envelope of every message on the event stream.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Event<Payload> {
	#[serde(rename = "type")]
	pub event_type: EventType,
	pub time: DateTime<Utc>,
	pub payload: Payload,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Health {}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum OutgoingPayload {
	Health(Health),
	ClientContext(ContextSnapshot),
}

pub type OutgoingEvent = Event<OutgoingPayload>;

impl OutgoingEvent {
	pub fn health(time: DateTime<Utc>) -> Self {
		Self {
			event_type: EventType::Health,
			time,
			payload: OutgoingPayload::Health(Health {}),
		}
	}

	pub fn client_context(time: DateTime<Utc>, snapshot: ContextSnapshot) -> Self {
		Self {
			event_type: EventType::ClientContext,
			time,
			payload: OutgoingPayload::ClientContext(snapshot),
		}
	}
}

/// Inbound messages are only inspected by their type, the server is free to add
/// fields or omit the timestamp.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IncomingEvent {
	#[serde(rename = "type")]
	pub event_type: EventType,
	#[serde(default)]
	pub time: Option<DateTime<Utc>>,
	#[serde(default)]
	pub payload: serde_json::Value,
}

impl From<&OutgoingEvent> for WebSocketMessage {
	fn from(event: &OutgoingEvent) -> Self {
		let json = serde_json::to_string(event).expect("Failed to serialize event to JSON.");
		WebSocketMessage::text(json)
	}
}

#[derive(Debug)]
pub enum MessageError {
	DeserializationFailed { error: String, json: String },
	WrongMessageType(WebSocketMessage),
}

impl Display for MessageError {
	fn fmt(&self, formatter: &mut Formatter) -> Result<(), std::fmt::Error> {
		match self {
			MessageError::DeserializationFailed { error, json } => write!(
				formatter,
				"Failed to deserialize message with error: '{error}'; Message was '{json}'"
			),
			MessageError::WrongMessageType(message) => write!(
				formatter,
				"Wrong websocket message type. Expected text, got: {message:?}"
			),
		}
	}
}

impl std::error::Error for MessageError {}

impl TryFrom<&str> for IncomingEvent {
	type Error = MessageError;

	fn try_from(json: &str) -> Result<Self, Self::Error> {
		serde_json::from_str(json).map_err(|error| MessageError::DeserializationFailed {
			error: error.to_string(),
			json: json.to_string(),
		})
	}
}

impl TryFrom<&WebSocketMessage> for IncomingEvent {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		match websocket_message {
			WebSocketMessage::Text(json) => json.as_str().try_into(),
			_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
		}
	}
}
