//! In-memory transport for exercising the connection layer without a
//! browser.
//!
//! ```ignore
//! let (parts, mut remote) = channel_transport();
//! let connection = Connection::start(parts);
//!
//! let call = connection.execute(None, "Browser.getVersion", json!({}));
//! let sent = remote.next_sent().await.unwrap();
//! remote.inject_response(sent["id"].as_u64().unwrap(), json!({}));
//! call.await.unwrap();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::transport::TransportParts;

/// The browser side of a channel transport: inspect sent commands, inject
/// responses and events, cut the link.
pub struct TestRemote {
	sent: mpsc::UnboundedReceiver<String>,
	inject: mpsc::UnboundedSender<String>,
	connected: Arc<AtomicBool>,
}

/// Builds a channel-backed [`TransportParts`] plus its remote controller.
pub fn channel_transport() -> (TransportParts, TestRemote) {
	let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
	let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
	let connected = Arc::new(AtomicBool::new(true));

	let parts = TransportParts {
		outbound: outbound_tx,
		inbound: inbound_rx,
		connected: Arc::clone(&connected),
	};
	let remote = TestRemote {
		sent: outbound_rx,
		inject: inbound_tx,
		connected,
	};

	(parts, remote)
}

impl TestRemote {
	/// Next frame the connection sent, parsed as JSON.
	pub async fn next_sent(&mut self) -> Option<Value> {
		let frame = self.sent.recv().await?;
		serde_json::from_str(&frame).ok()
	}

	/// Injects a raw frame as if the browser had sent it.
	pub fn inject(&self, frame: Value) {
		let _ = self.inject.send(frame.to_string());
	}

	pub fn inject_response(&self, id: u64, result: Value) {
		self.inject(json!({ "id": id, "result": result }));
	}

	pub fn inject_error(&self, id: u64, code: i64, message: &str) {
		self.inject(json!({ "id": id, "error": { "code": code, "message": message } }));
	}

	pub fn inject_event(&self, session_id: Option<&str>, method: &str, params: Value) {
		match session_id {
			Some(session_id) => self.inject(json!({ "method": method, "params": params, "sessionId": session_id })),
			None => self.inject(json!({ "method": method, "params": params })),
		}
	}

	/// Simulates the link going away.
	pub fn disconnect(self) {
		self.connected.store(false, Ordering::SeqCst);
	}
}
