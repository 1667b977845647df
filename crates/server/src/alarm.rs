//! Durable single-deadline alarm persistence.
//!
//! The pending deadline lives in a JSON file under the state directory so
//! it survives process restarts; on startup the scheduler re-arms from
//! disk. At most one deadline is stored; arming again replaces it.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shutter::capability::DeadlineStore;
use shutter::error::Result;
use tokio::sync::Notify;
use tracing::debug;

const ALARM_FILE: &str = "alarm.json";

/// Persisted form of the pending deadline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PersistedAlarm {
	fire_at_ms: u64,
}

/// File-backed deadline store; wakes the scheduler whenever a deadline is
/// armed.
pub struct AlarmStore {
	path: PathBuf,
	rearmed: Notify,
}

impl AlarmStore {
	pub fn new(state_dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(state_dir)?;
		Ok(Self {
			path: state_dir.join(ALARM_FILE),
			rearmed: Notify::new(),
		})
	}

	/// Resolves once a new deadline is armed.
	pub async fn wait_for_rearm(&self) {
		self.rearmed.notified().await;
	}

	/// Forgets a fired deadline.
	pub fn clear(&self) -> Result<()> {
		match std::fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(err.into()),
		}
	}

	fn load(&self) -> Result<Option<SystemTime>> {
		let raw = match std::fs::read(&self.path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};
		let alarm: PersistedAlarm = serde_json::from_slice(&raw)?;
		Ok(Some(UNIX_EPOCH + Duration::from_millis(alarm.fire_at_ms)))
	}
}

#[async_trait]
impl DeadlineStore for AlarmStore {
	async fn pending(&self) -> Result<Option<SystemTime>> {
		self.load()
	}

	async fn schedule(&self, at: SystemTime) -> Result<()> {
		let fire_at_ms = at
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_millis() as u64)
			.unwrap_or(0);
		let raw = serde_json::to_vec(&PersistedAlarm { fire_at_ms })?;
		std::fs::write(&self.path, raw)?;
		debug!(target = "shutter.alarm", fire_at_ms, "deadline armed");
		self.rearmed.notify_one();
		Ok(())
	}
}
