//! Page operations over an attached DevTools target session.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use shutter_protocol::emulation::SetDeviceMetricsParams;
use shutter_protocol::page::{
	CaptureScreenshotParams, CaptureScreenshotReply, NavigateParams, NavigateReply,
	ScreenshotFormat,
};
use shutter_protocol::target::CloseTargetParams;
use shutter_runtime::Connection;
use tracing::debug;

use super::execute;
use crate::capability::PageHandle;
use crate::error::{Result, ShutterError};

const SCREENSHOT_QUALITY: u32 = 80;

pub struct CdpPage {
	connection: Arc<Connection>,
	session_id: String,
	target_id: String,
}

impl CdpPage {
	pub(crate) fn new(connection: Arc<Connection>, session_id: String, target_id: String) -> Self {
		Self {
			connection,
			session_id,
			target_id,
		}
	}

	/// Enables page-domain events so navigations can be awaited.
	pub(crate) async fn enable_events(&self) -> Result<()> {
		let _: Value = execute(&self.connection, Some(&self.session_id), "Page.enable", &json!({})).await?;
		Ok(())
	}
}

#[async_trait]
impl PageHandle for CdpPage {
	async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
		let params = SetDeviceMetricsParams {
			width,
			height,
			device_scale_factor: 1.0,
			mobile: false,
		};
		let _: Value = execute(
			&self.connection,
			Some(&self.session_id),
			"Emulation.setDeviceMetricsOverride",
			&params,
		)
		.await?;
		Ok(())
	}

	async fn goto(&self, url: &str) -> Result<()> {
		// Register before navigating so the load event cannot slip past.
		let loaded = self
			.connection
			.wait_for_event(Some(&self.session_id), "Page.loadEventFired");

		let reply: NavigateReply = execute(
			&self.connection,
			Some(&self.session_id),
			"Page.navigate",
			&NavigateParams { url: url.to_string() },
		)
		.await
		.map_err(|err| ShutterError::Navigation {
			url: url.to_string(),
			source: anyhow::Error::new(err),
		})?;

		if let Some(reason) = reply.error_text.filter(|text| !text.is_empty()) {
			return Err(ShutterError::Navigation {
				url: url.to_string(),
				source: anyhow::anyhow!(reason),
			});
		}

		loaded.await.map_err(|_| ShutterError::Navigation {
			url: url.to_string(),
			source: anyhow::anyhow!("connection closed before load event"),
		})?;
		debug!(target = "shutter.cdp", %url, "load event fired");
		Ok(())
	}

	async fn screenshot(&self) -> Result<Vec<u8>> {
		let params = CaptureScreenshotParams {
			format: ScreenshotFormat::Jpeg,
			quality: Some(SCREENSHOT_QUALITY),
		};
		let reply: CaptureScreenshotReply = execute(
			&self.connection,
			Some(&self.session_id),
			"Page.captureScreenshot",
			&params,
		)
		.await?;

		BASE64
			.decode(reply.data.as_bytes())
			.map_err(|err| ShutterError::Screenshot(format!("invalid image payload: {err}")))
	}

	async fn close(&self) -> Result<()> {
		let params = CloseTargetParams {
			target_id: self.target_id.clone(),
		};
		let _: Value = execute(&self.connection, None, "Target.closeTarget", &params).await?;
		Ok(())
	}
}
