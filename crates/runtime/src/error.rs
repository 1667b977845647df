use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
	/// The DevTools HTTP endpoint could not be reached or understood.
	#[error("failed to reach browser endpoint {url}: {message}")]
	Endpoint { url: String, message: String },

	#[error("websocket error: {0}")]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

	/// The transport went away while a command was in flight.
	#[error("browser connection closed")]
	ConnectionClosed,

	/// The browser rejected a command.
	#[error("{method} failed: {message} (code {code})")]
	Protocol {
		method: String,
		code: i64,
		message: String,
	},

	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}
