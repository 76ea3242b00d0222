use crate::message::WebSocketMessage;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_tungstenite::tungstenite;
use tracing::{debug, warn};

/// Inbound half of a WebSocket as a plain stream of messages.
///
/// Ends right after the server's close frame or at the first transport error, tungstenite
/// reports the same closed connection more than once otherwise.
pub struct EventStream<WebSocketStream> {
	websocket_stream: WebSocketStream,
	finished: bool,
}

impl<WebSocketStream> From<WebSocketStream> for EventStream<WebSocketStream>
where
	WebSocketStream: Stream<Item = Result<WebSocketMessage, tungstenite::Error>>,
{
	fn from(websocket_stream: WebSocketStream) -> Self {
		Self {
			websocket_stream,
			finished: false,
		}
	}
}

impl<WebSocketStream> Stream for EventStream<WebSocketStream>
where
	WebSocketStream: Stream<Item = Result<WebSocketMessage, tungstenite::Error>> + Unpin,
{
	type Item = WebSocketMessage;

	fn poll_next(self: Pin<&mut Self>, context: &mut Context) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();
		if this.finished {
			return Poll::Ready(None);
		}

		let Poll::Ready(next) = this.websocket_stream.poll_next_unpin(context) else {
			return Poll::Pending;
		};
		match next {
			Some(Ok(message)) => {
				this.finished = message.is_close();
				Poll::Ready(Some(message))
			}
			Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed)) => {
				debug!("Event stream was closed.");
				this.finished = true;
				Poll::Ready(None)
			}
			Some(Err(error)) => {
				warn!("Event stream failed: {error}");
				this.finished = true;
				Poll::Ready(None)
			}
			None => {
				this.finished = true;
				Poll::Ready(None)
			}
		}
	}
}
