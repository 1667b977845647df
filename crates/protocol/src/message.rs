//! Command, response, and event envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command envelope sent to the browser.
///
/// ```json
/// {
///   "id": 42,
///   "method": "Page.navigate",
///   "sessionId": "ABC123",
///   "params": { "url": "https://example.com" }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Command {
	/// Unique id for correlating the response.
	pub id: u64,
	/// Domain-qualified method name.
	pub method: String,
	/// Attached target session, absent for browser-level commands.
	#[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	/// Method parameters as a JSON object.
	pub params: Value,
}

/// Protocol-level error attached to a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolError {
	pub code: i64,
	pub message: String,
}

/// Any frame received from the browser: a command response (has `id`) or
/// an event (has `method`).
#[derive(Debug, Clone, Deserialize)]
pub struct Incoming {
	pub id: Option<u64>,
	pub result: Option<Value>,
	pub error: Option<ProtocolError>,
	pub method: Option<String>,
	pub params: Option<Value>,
	#[serde(rename = "sessionId")]
	pub session_id: Option<String>,
}
