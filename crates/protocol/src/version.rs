//! `/json/version` metadata from the DevTools HTTP endpoint.

use serde::Deserialize;

/// Response subset of `GET /json/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
}
