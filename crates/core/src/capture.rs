//! The fixed capture batch applied on every request.

use serde::Serialize;

/// Page the service captures.
pub const TARGET_URL: &str = "https://workers.cloudflare.com/";

/// Viewports captured per request, in order.
pub const CAPTURE_BATCH: [Viewport; 5] = [
	Viewport::new(1920, 1080),
	Viewport::new(1366, 768),
	Viewport::new(1536, 864),
	Viewport::new(360, 640),
	Viewport::new(414, 896),
];

/// A viewport size to render and capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Viewport {
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Object key for this viewport under `bucket`.
	pub fn object_key(&self, bucket: &str) -> String {
		format!("{}/screenshot_{}x{}.jpg", bucket, self.width, self.height)
	}
}
