//! WebSocket transport for the browser connection.
//!
//! The connection layer never touches the socket directly; it drives a pair
//! of channels plus a liveness flag, so tests can substitute an in-memory
//! transport (see [`crate::testing`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::error::Result;

/// Channel endpoints a [`crate::Connection`] drives, independent of the wire.
pub struct TransportParts {
	/// Outbound raw JSON frames.
	pub outbound: mpsc::UnboundedSender<String>,
	/// Inbound raw JSON frames.
	pub inbound: mpsc::UnboundedReceiver<String>,
	/// Cleared once the underlying link goes away.
	pub connected: Arc<AtomicBool>,
}

/// Connects a WebSocket to `url` and pumps frames through channel pairs.
pub async fn connect(url: &str) -> Result<TransportParts> {
	let (stream, _) = connect_async(url).await?;
	let (mut sink, mut source) = stream.split();
	debug!(target = "shutter.transport", %url, "websocket connected");

	let connected = Arc::new(AtomicBool::new(true));
	let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
	let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

	let writer_connected = Arc::clone(&connected);
	tokio::spawn(async move {
		while let Some(frame) = outbound_rx.recv().await {
			trace!(target = "shutter.transport", len = frame.len(), "send");
			if let Err(err) = sink.send(Message::Text(frame)).await {
				warn!(target = "shutter.transport", error = %err, "websocket send failed");
				break;
			}
		}
		writer_connected.store(false, Ordering::SeqCst);
	});

	let reader_connected = Arc::clone(&connected);
	tokio::spawn(async move {
		while let Some(message) = source.next().await {
			match message {
				Ok(Message::Text(text)) => {
					if inbound_tx.send(text).is_err() {
						break;
					}
				}
				Ok(Message::Close(_)) => {
					debug!(target = "shutter.transport", "websocket closed by peer");
					break;
				}
				Ok(_) => {}
				Err(err) => {
					warn!(target = "shutter.transport", error = %err, "websocket receive failed");
					break;
				}
			}
		}
		reader_connected.store(false, Ordering::SeqCst);
	});

	Ok(TransportParts {
		outbound: outbound_tx,
		inbound: inbound_rx,
		connected,
	})
}
