//! Object store implementations behind the core `ObjectStore` seam.

mod fs;
mod http;

pub use fs::FsObjectStore;
pub use http::HttpObjectStore;

use std::sync::Arc;

use shutter::capability::ObjectStore;
use shutter::error::Result;

/// Builds the configured store: `http(s)://` targets upload remotely,
/// anything else is treated as a local directory.
pub fn from_target(target: &str, token: Option<String>) -> Result<Arc<dyn ObjectStore>> {
	if target.starts_with("http://") || target.starts_with("https://") {
		return Ok(Arc::new(HttpObjectStore::new(target, token)?));
	}
	let root = target.strip_prefix("file://").unwrap_or(target);
	Ok(Arc::new(FsObjectStore::new(root)))
}
