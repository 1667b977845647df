//! Browser capability backed by the Chrome DevTools Protocol.
//!
//! "Launching" means connecting to a remote browser that already exposes a
//! debugger endpoint; the engine never spawns a process itself.

mod page;
mod session;

pub use page::CdpPage;
pub use session::CdpSession;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shutter_runtime::{Connection, probe, transport};
use tracing::debug;

use crate::capability::{BrowserEngine, BrowserSession};
use crate::error::{Result, ShutterError};

/// Engine that connects to a DevTools endpoint on demand.
pub struct CdpEngine {
	endpoint: String,
}

impl CdpEngine {
	/// `endpoint` is either a `ws(s)://` debugger URL used as-is, or an
	/// `http(s)://` base resolved via `/json/version`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}
}

#[async_trait]
impl BrowserEngine for CdpEngine {
	async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
		let ws_url = if self.endpoint.starts_with("ws") {
			self.endpoint.clone()
		} else {
			probe::fetch_version(&self.endpoint)
				.await
				.map_err(|err| ShutterError::BrowserLaunch(err.to_string()))?
				.web_socket_debugger_url
		};

		let parts = transport::connect(&ws_url)
			.await
			.map_err(|err| ShutterError::BrowserLaunch(err.to_string()))?;
		let connection = Connection::start(parts);
		debug!(target = "shutter.cdp", "browser session connected");

		Ok(Box::new(CdpSession::new(connection)))
	}
}

/// Runs one typed command against the connection.
pub(crate) async fn execute<P, R>(
	connection: &Connection,
	session_id: Option<&str>,
	method: &str,
	params: &P,
) -> Result<R>
where
	P: Serialize + Sync,
	R: DeserializeOwned,
{
	let reply = connection
		.execute(session_id, method, serde_json::to_value(params)?)
		.await?;
	Ok(serde_json::from_value(reply)?)
}
