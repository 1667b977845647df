//! DevTools endpoint discovery over the browser's HTTP interface.

use std::time::Duration;

use shutter_protocol::VersionInfo;
use tracing::debug;

use crate::error::{Result, RuntimeError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves `/json/version` metadata from an `http(s)://` endpoint.
pub async fn fetch_version(endpoint: &str) -> Result<VersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(PROBE_TIMEOUT)
		.build()
		.map_err(|err| RuntimeError::Endpoint {
			url: endpoint.to_string(),
			message: format!("failed to create HTTP client: {err}"),
		})?;

	let url = format!("{}/json/version", endpoint.trim_end_matches('/'));
	let response = client.get(&url).send().await.map_err(|err| RuntimeError::Endpoint {
		url: url.clone(),
		message: err.to_string(),
	})?;

	if !response.status().is_success() {
		let message = format!("unexpected status {}", response.status());
		return Err(RuntimeError::Endpoint { url, message });
	}

	let info: VersionInfo = response.json().await.map_err(|err| RuntimeError::Endpoint {
		url: url.clone(),
		message: format!("invalid version payload: {err}"),
	})?;
	debug!(target = "shutter.probe", %url, browser = ?info.browser, "resolved debugger endpoint");
	Ok(info)
}
