//! Drives the controller's tick handler from the durable alarm.
//!
//! This is the host's recurring-timer facility: it sleeps until the armed
//! deadline, clears it (a fired alarm is no longer pending), and invokes
//! `handle_tick`. The tick handler itself decides whether to arm the next
//! deadline, so the lineage ends exactly when the controller stops
//! extending it.

use std::sync::Arc;
use std::time::SystemTime;

use shutter::capability::DeadlineStore;
use shutter::controller::CaptureController;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::alarm::AlarmStore;

/// Runs forever. A deadline armed while the loop is idle wakes it
/// immediately; one armed while sleeping re-checks the wake-up instant.
pub async fn run(alarm: Arc<AlarmStore>, controller: Arc<Mutex<CaptureController>>) {
	loop {
		let pending = match alarm.pending().await {
			Ok(pending) => pending,
			Err(err) => {
				warn!(target = "shutter.alarm", error = %err, "could not read deadline; timer paused");
				alarm.wait_for_rearm().await;
				continue;
			}
		};

		let Some(fire_at) = pending else {
			alarm.wait_for_rearm().await;
			continue;
		};

		if let Ok(remaining) = fire_at.duration_since(SystemTime::now()) {
			tokio::select! {
				_ = tokio::time::sleep(remaining) => {}
				_ = alarm.wait_for_rearm() => continue,
			}
		}

		if let Err(err) = alarm.clear() {
			warn!(target = "shutter.alarm", error = %err, "could not clear fired deadline");
		}
		debug!(target = "shutter.alarm", "tick");
		controller.lock().await.handle_tick().await;
	}
}
