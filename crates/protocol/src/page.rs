//! `Page` domain payloads: navigation and screenshot capture.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct NavigateParams {
	pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateReply {
	pub frame_id: String,
	/// Set when the navigation could not start (e.g. DNS failure).
	pub error_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
	pub format: ScreenshotFormat,
	/// Compression quality 0-100, jpeg only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quality: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
	Jpeg,
	Png,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureScreenshotReply {
	/// Base64-encoded image bytes.
	pub data: String,
}
