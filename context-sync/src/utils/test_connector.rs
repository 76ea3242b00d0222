use crate::connection::connector::{ConnectionError, Connector, ConnectorTrait};
use crate::connection::event_stream::EventStream;
use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::message::{Event, WebSocketMessage};
use async_trait::async_trait;
use futures_channel::mpsc;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use url::Url;

/// Connector that hands the server side of every connection to a [`TestServer`].
pub struct TestConnector {
	connection_sender: mpsc::UnboundedSender<TestConnection>,
	attempts: AtomicUsize,
	refusals: AtomicUsize,
}

pub struct TestServer {
	connection_receiver: mpsc::UnboundedReceiver<TestConnection>,
	connector: Arc<TestConnector>,
}

impl TestConnector {
	pub fn new() -> (Connector, TestServer) {
		let (connection_sender, connection_receiver) = mpsc::unbounded();
		let connector = Arc::new(Self {
			connection_sender,
			attempts: AtomicUsize::new(0),
			refusals: AtomicUsize::new(0),
		});
		let server = TestServer {
			connection_receiver,
			connector: connector.clone(),
		};
		let connector: Connector = connector;
		(connector, server)
	}
}

#[async_trait]
impl ConnectorTrait for TestConnector {
	async fn connect(&self, endpoint: &Url) -> Result<(MessageSender, MessageReceiver), ConnectionError> {
		self.attempts.fetch_add(1, Ordering::SeqCst);
		let refused = self
			.refusals
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |refusals| refusals.checked_sub(1))
			.is_ok();
		if refused {
			return Err(ConnectionError::Refused(endpoint.to_string()));
		}

		let (client_sender, server_receiver) = mpsc::unbounded();
		let (server_sender, client_receiver) = mpsc::unbounded();

		let message_sender = MessageSender::from(SinkMessageSender::new(client_sender));
		let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(client_receiver));
		let connection = TestConnection {
			sender: Box::pin(server_sender.sink_map_err(|_error| ())),
			receiver: Box::pin(server_receiver),
		};
		self.connection_sender
			.unbounded_send(connection)
			.map_err(|_| ConnectionError::Refused("test server is gone".to_string()))?;

		Ok((message_sender, message_receiver))
	}
}

impl TestServer {
	pub async fn accept(&mut self) -> TestConnection {
		self.connection_receiver
			.next()
			.await
			.expect("Connector is gone, no more connections")
	}

	pub fn attempts(&self) -> usize {
		self.connector.attempts.load(Ordering::SeqCst)
	}

	pub fn refuse_next_attempts(&self, count: usize) {
		self.connector.refusals.store(count, Ordering::SeqCst);
	}
}

/// Server side of one connection.
pub struct TestConnection {
	sender: Pin<Box<dyn Sink<WebSocketMessage, Error = ()> + Unpin + Send>>,
	receiver: Pin<Box<dyn Stream<Item = WebSocketMessage> + Unpin + Send>>,
}

impl TestConnection {
	pub async fn send_raw(&mut self, message: WebSocketMessage) {
		self.sender
			.send(message)
			.await
			.expect("Failed to send message via TestConnection.");
	}

	pub async fn send_json(&mut self, json: serde_json::Value) {
		self.send_raw(WebSocketMessage::text(json.to_string())).await
	}

	pub async fn receive_raw(&mut self) -> Option<WebSocketMessage> {
		self.receiver.next().await
	}

	pub async fn receive_event<Payload: DeserializeOwned>(&mut self) -> Event<Payload> {
		let websocket_message = self.receive_raw().await.expect("Connection closed unexpectedly");
		let WebSocketMessage::Text(json) = websocket_message else {
			panic!("Received message with incorrect type: {websocket_message:?}");
		};
		serde_json::from_str(&json).expect("Failed to deserialize event")
	}

	pub async fn close(&mut self) {
		let _ = self.sender.send(WebSocketMessage::Close(None)).await;
		let _ = self.sender.close().await;
	}

	/// Waits until the client closed its side of the connection.
	pub async fn expect_closed(&mut self) {
		while let Some(message) = self.receive_raw().await {
			assert!(message.is_close(), "Expected close, got {message:?}");
		}
	}
}

impl<Socket> From<WebSocketStream<Socket>> for TestConnection
where
	Socket: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
	fn from(websocket: WebSocketStream<Socket>) -> Self {
		let (sender, receiver) = websocket.split();
		let sender = sender.sink_map_err(|_error| ());
		let receiver = EventStream::from(receiver);
		Self {
			sender: Box::pin(sender),
			receiver: Box::pin(receiver),
		}
	}
}
