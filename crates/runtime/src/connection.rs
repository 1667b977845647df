//! Command/response correlation and event dispatch over a transport.
//!
//! Each command gets a unique id and a oneshot channel; the dispatch loop
//! completes the matching sender when the response arrives and routes
//! id-less frames to registered event waiters.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use shutter_protocol::{Command, Incoming};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::error::{Result, RuntimeError};
use crate::transport::TransportParts;

struct PendingCommand {
	method: String,
	tx: oneshot::Sender<Result<Value>>,
}

struct EventWaiter {
	session_id: Option<String>,
	method: String,
	tx: oneshot::Sender<Value>,
}

/// Correlates commands with responses and routes events to waiters.
pub struct Connection {
	next_id: AtomicU64,
	outbound: mpsc::UnboundedSender<String>,
	pending: Mutex<HashMap<u64, PendingCommand>>,
	waiters: Mutex<Vec<EventWaiter>>,
	connected: Arc<AtomicBool>,
}

impl Connection {
	/// Builds a connection over `parts` and spawns its dispatch loop.
	pub fn start(parts: TransportParts) -> Arc<Self> {
		let TransportParts { outbound, inbound, connected } = parts;
		let connection = Arc::new(Self {
			next_id: AtomicU64::new(1),
			outbound,
			pending: Mutex::new(HashMap::new()),
			waiters: Mutex::new(Vec::new()),
			connected,
		});

		tokio::spawn({
			let connection = Arc::clone(&connection);
			async move { connection.dispatch(inbound).await }
		});

		connection
	}

	/// `true` while the underlying transport is alive.
	pub fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	/// Sends `method` and awaits its correlated response.
	pub async fn execute(&self, session_id: Option<&str>, method: &str, params: Value) -> Result<Value> {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.pending.lock().insert(id, PendingCommand { method: method.to_string(), tx });

		let command = Command {
			id,
			method: method.to_string(),
			session_id: session_id.map(str::to_string),
			params,
		};
		let frame = serde_json::to_string(&command)?;
		trace!(target = "shutter.connection", id, method, "execute");

		if self.outbound.send(frame).is_err() {
			self.pending.lock().remove(&id);
			return Err(RuntimeError::ConnectionClosed);
		}

		rx.await.map_err(|_| RuntimeError::ConnectionClosed)?
	}

	/// Registers a one-shot waiter for `method` on `session_id`.
	///
	/// Register before issuing the command that triggers the event, or the
	/// event can fire unobserved.
	pub fn wait_for_event(&self, session_id: Option<&str>, method: &str) -> oneshot::Receiver<Value> {
		let (tx, rx) = oneshot::channel();
		self.waiters.lock().push(EventWaiter {
			session_id: session_id.map(str::to_string),
			method: method.to_string(),
			tx,
		});
		rx
	}

	async fn dispatch(&self, mut inbound: mpsc::UnboundedReceiver<String>) {
		while let Some(frame) = inbound.recv().await {
			let message: Incoming = match serde_json::from_str(&frame) {
				Ok(message) => message,
				Err(err) => {
					warn!(target = "shutter.connection", error = %err, "unparseable frame");
					continue;
				}
			};

			match message.id {
				Some(id) => self.complete(id, message),
				None => self.deliver_event(message),
			}
		}

		debug!(target = "shutter.connection", "transport drained; failing in-flight commands");
		self.connected.store(false, Ordering::SeqCst);
		self.fail_all_pending();
	}

	fn complete(&self, id: u64, message: Incoming) {
		let Some(pending) = self.pending.lock().remove(&id) else {
			debug!(target = "shutter.connection", id, "response for unknown command");
			return;
		};

		let outcome = match message.error {
			Some(error) => Err(RuntimeError::Protocol {
				method: pending.method,
				code: error.code,
				message: error.message,
			}),
			None => Ok(message.result.unwrap_or(Value::Null)),
		};
		let _ = pending.tx.send(outcome);
	}

	fn deliver_event(&self, message: Incoming) {
		let Some(method) = message.method else {
			return;
		};
		let params = message.params.unwrap_or(Value::Null);

		let mut waiters = self.waiters.lock();
		let position = waiters
			.iter()
			.position(|waiter| waiter.method == method && waiter.session_id == message.session_id);
		match position {
			Some(position) => {
				let waiter = waiters.remove(position);
				let _ = waiter.tx.send(params);
			}
			None => trace!(target = "shutter.connection", %method, "unobserved event"),
		}
	}

	fn fail_all_pending(&self) {
		let drained: Vec<PendingCommand> = {
			let mut pending = self.pending.lock();
			pending.drain().map(|(_, command)| command).collect()
		};
		for command in drained {
			let _ = command.tx.send(Err(RuntimeError::ConnectionClosed));
		}
	}
}
