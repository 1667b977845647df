//! Upload store speaking plain HTTP PUT.

use async_trait::async_trait;
use shutter::capability::ObjectStore;
use shutter::error::{Result, ShutterError};
use tracing::debug;
use url::Url;

pub struct HttpObjectStore {
	client: reqwest::Client,
	base: Url,
	token: Option<String>,
}

impl HttpObjectStore {
	pub fn new(base: &str, token: Option<String>) -> Result<Self> {
		// A trailing slash keeps Url::join from replacing the last path
		// segment of the base.
		let normalized = if base.ends_with('/') {
			base.to_string()
		} else {
			format!("{base}/")
		};
		let base = Url::parse(&normalized)
			.map_err(|err| ShutterError::Anyhow(anyhow::anyhow!("invalid store URL {base}: {err}")))?;

		Ok(Self {
			client: reqwest::Client::new(),
			base,
			token,
		})
	}

	fn object_url(&self, key: &str) -> Result<Url> {
		self.base.join(key).map_err(|err| ShutterError::Upload {
			key: key.to_string(),
			source: err.into(),
		})
	}
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
	async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		let url = self.object_url(key)?;
		let mut request = self.client.put(url.clone()).body(bytes);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token);
		}

		let response = request.send().await.map_err(|err| ShutterError::Upload {
			key: key.to_string(),
			source: err.into(),
		})?;
		if !response.status().is_success() {
			return Err(ShutterError::Upload {
				key: key.to_string(),
				source: anyhow::anyhow!("unexpected status {}", response.status()),
			});
		}

		debug!(target = "shutter.store", key = %key, "uploaded");
		Ok(())
	}
}
