//! Storage folder naming from the wall clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Width of one storage folder in seconds.
const BUCKET_SECONDS: u64 = 300;

/// Folder prefix for `now`: the wall clock floored to the nearest
/// five-minute boundary, rendered as UTC without a zone suffix.
pub fn time_bucket(now: SystemTime) -> String {
	let secs = now
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_secs())
		.unwrap_or(0);
	let floored = UNIX_EPOCH + Duration::from_secs(secs - secs % BUCKET_SECONDS);
	DateTime::<Utc>::from(floored)
		.format("%Y-%m-%dT%H:%M:%S")
		.to_string()
}
