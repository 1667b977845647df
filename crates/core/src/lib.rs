//! Session-keeping screenshot capture.
//!
//! A lifecycle controller keeps one browser session warm across capture
//! requests, renders a fixed page at a fixed batch of viewport sizes, and
//! uploads each image under a time-bucketed storage key. A self-extending
//! keep-alive timer tears the session down after an idle window so launch
//! cost is amortized without leaking the browser forever.

pub mod bucket;
pub mod capability;
pub mod capture;
pub mod cdp;
pub mod clock;
pub mod controller;
pub mod error;

pub use bucket::time_bucket;
pub use capability::{BrowserEngine, BrowserSession, DeadlineStore, ObjectStore, PageHandle};
pub use capture::{CAPTURE_BATCH, TARGET_URL, Viewport};
pub use clock::{Clock, SystemClock};
pub use controller::{CaptureController, CaptureOutcome};
pub use error::{Result, ShutterError};
