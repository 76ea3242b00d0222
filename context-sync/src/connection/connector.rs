use crate::connection::event_stream::EventStream;
use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_tungstenite::tungstenite;
use tracing::debug;
use url::Url;

pub type Connector = Arc<dyn ConnectorTrait + Send + Sync>;

#[async_trait]
pub trait ConnectorTrait {
	/// Opens a new connection to the event stream.
	async fn connect(&self, endpoint: &Url) -> Result<(MessageSender, MessageReceiver), ConnectionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
	#[error("WebSocket handshake failed: {0}")]
	Handshake(#[from] tungstenite::Error),
	#[error("Connection refused: {0}")]
	Refused(String),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketConnector;

impl From<WebSocketConnector> for Connector {
	fn from(connector: WebSocketConnector) -> Self {
		Arc::new(connector)
	}
}

#[async_trait]
impl ConnectorTrait for WebSocketConnector {
	async fn connect(&self, endpoint: &Url) -> Result<(MessageSender, MessageReceiver), ConnectionError> {
		let (websocket, response) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;
		debug!("Handshake with '{endpoint}' completed with status {}.", response.status());

		let (websocket_sink, websocket_stream) = websocket.split();
		let message_sender = MessageSender::from(SinkMessageSender::new(websocket_sink));
		let message_receiver =
			MessageReceiver::from(StreamMessageReceiver::new(EventStream::from(websocket_stream)));
		Ok((message_sender, message_receiver))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use tokio::net::TcpListener;

	#[tokio::test]
	async fn connecting_without_a_server_should_fail() {
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
		let address = listener.local_addr().expect("No local address");
		drop(listener);
		let endpoint = Url::parse(&format!("ws://{address}/gallery/ws")).expect("Invalid url");

		let result = WebSocketConnector.connect(&endpoint).await;

		assert!(matches!(result, Err(ConnectionError::Handshake(_))));
	}
}
