//! Local-directory store for development runs.

use std::path::PathBuf;

use async_trait::async_trait;
use shutter::capability::ObjectStore;
use shutter::error::Result;
use tracing::debug;

pub struct FsObjectStore {
	root: PathBuf,
}

impl FsObjectStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

#[async_trait]
impl ObjectStore for FsObjectStore {
	async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		let path = self.root.join(key);
		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::write(&path, bytes).await?;
		debug!(target = "shutter.store", path = %path.display(), "wrote capture");
		Ok(())
	}
}
