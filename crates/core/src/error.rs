use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShutterError>;

#[derive(Debug, Error)]
pub enum ShutterError {
	/// The browser engine could not be started or reached.
	#[error("browser launch failed: {0}")]
	BrowserLaunch(String),

	/// A capture was attempted with no connected session.
	#[error("no connected browser session")]
	SessionUnavailable,

	#[error("navigation to {url} failed: {source}")]
	Navigation {
		url: String,
		#[source]
		source: anyhow::Error,
	},

	#[error("screenshot capture failed: {0}")]
	Screenshot(String),

	#[error("upload of {key} failed: {source}")]
	Upload {
		key: String,
		#[source]
		source: anyhow::Error,
	},

	#[error(transparent)]
	Runtime(#[from] shutter_runtime::RuntimeError),

	#[error(transparent)]
	Serialization(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}
