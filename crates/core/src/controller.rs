//! Session lifecycle controller: launch-reuse-expire plus the capture loop.
//!
//! The controller owns the single browser session and the idle budget that
//! decides when it is torn down. `handle_capture` services one inbound
//! request; `handle_tick` services one firing of the host's recurring
//! keep-alive timer. The host guarantees the two never run concurrently
//! against the same instance.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bucket::time_bucket;
use crate::capability::{BrowserEngine, BrowserSession, DeadlineStore, ObjectStore};
use crate::capture::{CAPTURE_BATCH, TARGET_URL};
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, ShutterError};

/// Seconds of idleness after which the session is torn down.
const KEEP_ALIVE_LIMIT_SECS: u64 = 60;
/// Seconds between keep-alive timer firings.
const TICK_SECS: u64 = 10;

/// Lifecycle of the single browser session this controller owns.
///
/// A tagged state instead of a nullable handle: "busy with no session" is
/// unrepresentable.
enum SessionState {
	NoSession,
	ActiveIdle { session: Box<dyn BrowserSession> },
	ActiveBusy { session: Box<dyn BrowserSession> },
}

impl SessionState {
	fn session(&self) -> Option<&dyn BrowserSession> {
		match self {
			Self::NoSession => None,
			Self::ActiveIdle { session } | Self::ActiveBusy { session } => Some(session.as_ref()),
		}
	}

	fn mark_busy(&mut self) {
		*self = match mem::replace(self, Self::NoSession) {
			Self::ActiveIdle { session } | Self::ActiveBusy { session } => Self::ActiveBusy { session },
			Self::NoSession => Self::NoSession,
		};
	}

	fn mark_idle(&mut self) {
		*self = match mem::replace(self, Self::NoSession) {
			Self::ActiveIdle { session } | Self::ActiveBusy { session } => Self::ActiveIdle { session },
			Self::NoSession => Self::NoSession,
		};
	}

	fn take(&mut self) -> Option<Box<dyn BrowserSession>> {
		match mem::replace(self, Self::NoSession) {
			Self::NoSession => None,
			Self::ActiveIdle { session } | Self::ActiveBusy { session } => Some(session),
		}
	}
}

/// Summary of one successful capture request.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
	/// Storage folder shared by this request's uploads.
	pub bucket: String,
	/// Number of images uploaded.
	pub uploaded: usize,
}

/// Keeps one browser session warm across capture requests and expires it
/// after an idle window.
pub struct CaptureController {
	engine: Arc<dyn BrowserEngine>,
	store: Arc<dyn ObjectStore>,
	deadlines: Arc<dyn DeadlineStore>,
	clock: Arc<dyn Clock>,
	state: SessionState,
	idle_seconds: u64,
}

impl CaptureController {
	pub fn new(
		engine: Arc<dyn BrowserEngine>,
		store: Arc<dyn ObjectStore>,
		deadlines: Arc<dyn DeadlineStore>,
	) -> Self {
		Self::with_clock(engine, store, deadlines, Arc::new(SystemClock))
	}

	pub fn with_clock(
		engine: Arc<dyn BrowserEngine>,
		store: Arc<dyn ObjectStore>,
		deadlines: Arc<dyn DeadlineStore>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			engine,
			store,
			deadlines,
			clock,
			state: SessionState::NoSession,
			idle_seconds: 0,
		}
	}

	/// `true` while a session handle is held (connected or not).
	pub fn has_session(&self) -> bool {
		self.state.session().is_some()
	}

	/// Seconds accumulated since the last capture request.
	pub fn idle_seconds(&self) -> u64 {
		self.idle_seconds
	}

	/// Services one capture request: render the fixed viewport batch and
	/// upload every image under one time bucket.
	pub async fn handle_capture(&mut self) -> Result<CaptureOutcome> {
		let bucket = time_bucket(self.clock.now());

		self.ensure_session().await;
		self.idle_seconds = 0;

		self.state.mark_busy();
		let result = self.run_batch(&bucket).await;
		self.state.mark_idle();
		let uploaded = result?;

		// Covers time spent navigating and uploading.
		self.idle_seconds = 0;

		if self.deadlines.pending().await?.is_none() {
			debug!(target = "shutter.capture", "arming keep-alive timer");
			self.deadlines
				.schedule(self.clock.now() + Duration::from_secs(TICK_SECS))
				.await?;
		}

		info!(target = "shutter.capture", bucket = %bucket, uploaded, "capture batch stored");
		Ok(CaptureOutcome { bucket, uploaded })
	}

	/// Services one keep-alive timer firing.
	pub async fn handle_tick(&mut self) {
		self.idle_seconds += TICK_SECS;

		if self.idle_seconds < KEEP_ALIVE_LIMIT_SECS {
			debug!(
				target = "shutter.capture",
				idle_seconds = self.idle_seconds,
				"session kept alive; extending lifespan"
			);
			let next = self.clock.now() + Duration::from_secs(TICK_SECS);
			if let Err(err) = self.deadlines.schedule(next).await {
				warn!(target = "shutter.capture", error = %err, "failed to re-arm keep-alive timer");
			}
			return;
		}

		info!(
			target = "shutter.capture",
			limit_seconds = KEEP_ALIVE_LIMIT_SECS,
			"idle limit exceeded"
		);
		if let Some(session) = self.state.take() {
			info!(target = "shutter.capture", "closing browser session");
			if let Err(err) = session.close().await {
				warn!(target = "shutter.capture", error = %err, "error closing browser session");
			}
		}
	}

	/// Closes any open session at process teardown.
	pub async fn shutdown(&mut self) {
		if let Some(session) = self.state.take() {
			if let Err(err) = session.close().await {
				warn!(target = "shutter.capture", error = %err, "error closing browser session");
			}
		}
	}

	/// Reuses the held session when it is still connected; otherwise drops
	/// it and attempts one launch. A failed launch is logged and tolerated:
	/// the request fails at the next page operation instead.
	async fn ensure_session(&mut self) {
		let connected = self
			.state
			.session()
			.is_some_and(|session| session.is_connected());
		if connected {
			return;
		}

		if self.state.session().is_some() {
			debug!(target = "shutter.capture", "dropping disconnected session");
			self.state = SessionState::NoSession;
		}

		info!(target = "shutter.capture", "starting new browser session");
		match self.engine.launch().await {
			Ok(session) => self.state = SessionState::ActiveIdle { session },
			Err(err) => {
				warn!(target = "shutter.capture", error = %err, "could not start browser session");
			}
		}
	}

	async fn run_batch(&self, bucket: &str) -> Result<usize> {
		let Some(session) = self.state.session() else {
			return Err(ShutterError::SessionUnavailable);
		};

		let page = session.new_page().await?;
		let mut uploaded = 0;
		for viewport in &CAPTURE_BATCH {
			page.set_viewport(viewport.width, viewport.height).await?;
			page.goto(TARGET_URL).await?;
			let image = page.screenshot().await?;
			let key = viewport.object_key(bucket);
			debug!(target = "shutter.capture", key = %key, bytes = image.len(), "uploading");
			self.store.put(&key, image).await?;
			uploaded += 1;
		}
		page.close().await?;

		Ok(uploaded)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::time::{SystemTime, UNIX_EPOCH};

	use async_trait::async_trait;

	use super::*;
	use crate::capability::PageHandle;

	// 2024-01-01T00:00:00Z
	const T0: u64 = 1_704_067_200;

	#[derive(Default)]
	struct EngineLog {
		launches: AtomicUsize,
		pages_opened: AtomicUsize,
		pages_closed: AtomicUsize,
		sessions_closed: AtomicUsize,
		screenshots: AtomicUsize,
		ops: Mutex<Vec<String>>,
	}

	impl EngineLog {
		fn op(&self, op: String) {
			self.ops.lock().expect("ops lock").push(op);
		}

		fn ops(&self) -> Vec<String> {
			self.ops.lock().expect("ops lock").clone()
		}
	}

	struct FakeEngine {
		log: Arc<EngineLog>,
		connected: Arc<AtomicBool>,
		fail_launch: bool,
		fail_close: bool,
		screenshot_failure_after: Option<usize>,
	}

	#[async_trait]
	impl BrowserEngine for FakeEngine {
		async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
			self.log.launches.fetch_add(1, Ordering::SeqCst);
			if self.fail_launch {
				return Err(ShutterError::BrowserLaunch("engine offline".to_string()));
			}
			self.connected.store(true, Ordering::SeqCst);
			Ok(Box::new(FakeSession {
				log: Arc::clone(&self.log),
				connected: Arc::clone(&self.connected),
				fail_close: self.fail_close,
				screenshot_failure_after: self.screenshot_failure_after,
			}))
		}
	}

	struct FakeSession {
		log: Arc<EngineLog>,
		connected: Arc<AtomicBool>,
		fail_close: bool,
		screenshot_failure_after: Option<usize>,
	}

	#[async_trait]
	impl BrowserSession for FakeSession {
		fn is_connected(&self) -> bool {
			self.connected.load(Ordering::SeqCst)
		}

		async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
			self.log.pages_opened.fetch_add(1, Ordering::SeqCst);
			Ok(Box::new(FakePage {
				log: Arc::clone(&self.log),
				screenshot_failure_after: self.screenshot_failure_after,
			}))
		}

		async fn close(&self) -> Result<()> {
			self.log.sessions_closed.fetch_add(1, Ordering::SeqCst);
			if self.fail_close {
				return Err(ShutterError::Anyhow(anyhow::anyhow!("close refused")));
			}
			Ok(())
		}
	}

	struct FakePage {
		log: Arc<EngineLog>,
		screenshot_failure_after: Option<usize>,
	}

	#[async_trait]
	impl PageHandle for FakePage {
		async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
			self.log.op(format!("viewport {width}x{height}"));
			Ok(())
		}

		async fn goto(&self, url: &str) -> Result<()> {
			self.log.op(format!("goto {url}"));
			Ok(())
		}

		async fn screenshot(&self) -> Result<Vec<u8>> {
			let taken = self.log.screenshots.fetch_add(1, Ordering::SeqCst);
			if self.screenshot_failure_after.is_some_and(|limit| taken >= limit) {
				return Err(ShutterError::Screenshot("renderer crashed".to_string()));
			}
			self.log.op("screenshot".to_string());
			Ok(vec![0xFF, 0xD8, taken as u8])
		}

		async fn close(&self) -> Result<()> {
			self.log.pages_closed.fetch_add(1, Ordering::SeqCst);
			self.log.op("page close".to_string());
			Ok(())
		}
	}

	#[derive(Default)]
	struct RecordingStore {
		puts: Mutex<Vec<String>>,
	}

	impl RecordingStore {
		fn keys(&self) -> Vec<String> {
			self.puts.lock().expect("puts lock").clone()
		}
	}

	#[async_trait]
	impl ObjectStore for RecordingStore {
		async fn put(&self, key: &str, _bytes: Vec<u8>) -> Result<()> {
			self.puts.lock().expect("puts lock").push(key.to_string());
			Ok(())
		}
	}

	#[derive(Default)]
	struct MemoryDeadlines {
		slot: Mutex<Option<SystemTime>>,
		schedules: AtomicUsize,
	}

	impl MemoryDeadlines {
		fn armed(&self) -> Option<SystemTime> {
			*self.slot.lock().expect("slot lock")
		}

		fn arm(&self, at: SystemTime) {
			*self.slot.lock().expect("slot lock") = Some(at);
		}

		/// What the host facility does when the deadline fires.
		fn fire(&self) {
			*self.slot.lock().expect("slot lock") = None;
		}
	}

	#[async_trait]
	impl DeadlineStore for MemoryDeadlines {
		async fn pending(&self) -> Result<Option<SystemTime>> {
			Ok(self.armed())
		}

		async fn schedule(&self, at: SystemTime) -> Result<()> {
			self.schedules.fetch_add(1, Ordering::SeqCst);
			self.arm(at);
			Ok(())
		}
	}

	struct ManualClock {
		now: Mutex<SystemTime>,
	}

	impl ManualClock {
		fn at(unix_secs: u64) -> Self {
			Self {
				now: Mutex::new(UNIX_EPOCH + Duration::from_secs(unix_secs)),
			}
		}

		fn advance(&self, by: Duration) {
			let mut now = self.now.lock().expect("clock lock");
			*now += by;
		}
	}

	impl Clock for ManualClock {
		fn now(&self) -> SystemTime {
			*self.now.lock().expect("clock lock")
		}
	}

	struct Harness {
		controller: CaptureController,
		log: Arc<EngineLog>,
		store: Arc<RecordingStore>,
		deadlines: Arc<MemoryDeadlines>,
		clock: Arc<ManualClock>,
		connected: Arc<AtomicBool>,
	}

	impl Harness {
		/// Fires the host timer: the facility clears the due deadline, then
		/// invokes the tick handler.
		async fn fire_tick(&mut self) {
			self.deadlines.fire();
			self.controller.handle_tick().await;
		}
	}

	fn harness() -> Harness {
		harness_with(|_| {})
	}

	fn harness_with(tweak: impl FnOnce(&mut FakeEngine)) -> Harness {
		let log = Arc::new(EngineLog::default());
		let connected = Arc::new(AtomicBool::new(false));
		let mut engine = FakeEngine {
			log: Arc::clone(&log),
			connected: Arc::clone(&connected),
			fail_launch: false,
			fail_close: false,
			screenshot_failure_after: None,
		};
		tweak(&mut engine);

		let store = Arc::new(RecordingStore::default());
		let deadlines = Arc::new(MemoryDeadlines::default());
		let clock = Arc::new(ManualClock::at(T0));
		let controller = CaptureController::with_clock(
			Arc::new(engine),
			Arc::clone(&store) as Arc<dyn ObjectStore>,
			Arc::clone(&deadlines) as Arc<dyn DeadlineStore>,
			Arc::clone(&clock) as Arc<dyn Clock>,
		);

		Harness {
			controller,
			log,
			store,
			deadlines,
			clock,
			connected,
		}
	}

	fn expected_keys(bucket: &str) -> Vec<String> {
		CAPTURE_BATCH.iter().map(|viewport| viewport.object_key(bucket)).collect()
	}

	#[tokio::test]
	async fn first_capture_launches_uploads_and_arms_the_timer() {
		let mut h = harness();

		let outcome = h.controller.handle_capture().await.expect("capture should succeed");

		assert_eq!(outcome.bucket, "2024-01-01T00:00:00");
		assert_eq!(outcome.uploaded, 5);
		assert_eq!(h.log.launches.load(Ordering::SeqCst), 1);
		assert_eq!(h.store.keys(), expected_keys("2024-01-01T00:00:00"));
		assert_eq!(h.controller.idle_seconds(), 0);
		assert_eq!(
			h.deadlines.armed(),
			Some(UNIX_EPOCH + Duration::from_secs(T0 + 10)),
		);
		assert_eq!(h.deadlines.schedules.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn connected_session_is_reused_across_captures() {
		let mut h = harness();

		h.controller.handle_capture().await.expect("first capture");
		h.clock.advance(Duration::from_secs(30));
		h.controller.handle_capture().await.expect("second capture");

		assert_eq!(h.log.launches.load(Ordering::SeqCst), 1);
		assert_eq!(h.store.keys().len(), 10);
		// Both batches fall into the same five-minute bucket.
		assert!(h.store.keys().iter().all(|key| key.starts_with("2024-01-01T00:00:00/")));
		// The first call armed the timer; the second saw it pending.
		assert_eq!(h.deadlines.schedules.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn disconnected_session_is_replaced_by_one_launch() {
		let mut h = harness();

		h.controller.handle_capture().await.expect("first capture");
		h.connected.store(false, Ordering::SeqCst);
		h.controller.handle_capture().await.expect("second capture");

		assert_eq!(h.log.launches.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn launch_failure_fails_the_request_without_retry() {
		let mut h = harness_with(|engine| engine.fail_launch = true);

		let err = h.controller.handle_capture().await.expect_err("capture should fail");

		assert!(matches!(err, ShutterError::SessionUnavailable));
		assert_eq!(h.log.launches.load(Ordering::SeqCst), 1);
		assert!(h.store.keys().is_empty());
		// The failure propagates before the timer is armed.
		assert!(h.deadlines.armed().is_none());
		assert!(!h.controller.has_session());
	}

	#[tokio::test]
	async fn idle_budget_resets_to_zero_on_capture() {
		let mut h = harness();

		h.controller.handle_capture().await.expect("warm-up capture");
		h.fire_tick().await;
		h.fire_tick().await;
		assert_eq!(h.controller.idle_seconds(), 20);

		h.controller.handle_capture().await.expect("capture");
		assert_eq!(h.controller.idle_seconds(), 0);
	}

	#[tokio::test]
	async fn session_survives_five_ticks_and_closes_on_the_sixth() {
		let mut h = harness();
		h.controller.handle_capture().await.expect("warm-up capture");
		let schedules_after_capture = h.deadlines.schedules.load(Ordering::SeqCst);

		for tick in 1..=5 {
			h.fire_tick().await;
			assert!(h.controller.has_session(), "session should survive tick {tick}");
			assert!(h.deadlines.armed().is_some(), "tick {tick} should re-arm the timer");
		}

		h.fire_tick().await;
		assert!(!h.controller.has_session(), "session should close on tick 6");
		assert_eq!(h.log.sessions_closed.load(Ordering::SeqCst), 1);
		// Five extensions, then the lineage ends: no seventh deadline.
		assert!(h.deadlines.armed().is_none());
		assert_eq!(h.deadlines.schedules.load(Ordering::SeqCst), schedules_after_capture + 5);
	}

	#[tokio::test]
	async fn capture_does_not_arm_a_second_deadline() {
		let mut h = harness();
		h.deadlines.arm(UNIX_EPOCH + Duration::from_secs(T0 + 7));

		h.controller.handle_capture().await.expect("capture");

		assert_eq!(h.deadlines.schedules.load(Ordering::SeqCst), 0);
		assert_eq!(h.deadlines.armed(), Some(UNIX_EPOCH + Duration::from_secs(T0 + 7)));
	}

	#[tokio::test]
	async fn batch_runs_strictly_in_viewport_order() {
		let mut h = harness();

		h.controller.handle_capture().await.expect("capture");

		let mut expected = Vec::new();
		for viewport in &CAPTURE_BATCH {
			expected.push(format!("viewport {}x{}", viewport.width, viewport.height));
			expected.push(format!("goto {TARGET_URL}"));
			expected.push("screenshot".to_string());
		}
		expected.push("page close".to_string());
		assert_eq!(h.log.ops(), expected);
	}

	#[tokio::test]
	async fn mid_batch_failure_keeps_earlier_uploads_and_aborts_the_rest() {
		let mut h = harness_with(|engine| engine.screenshot_failure_after = Some(2));

		let err = h.controller.handle_capture().await.expect_err("capture should fail");

		assert!(matches!(err, ShutterError::Screenshot(_)));
		// The first two viewports made it to the store; nothing is rolled back.
		assert_eq!(h.store.keys(), expected_keys("2024-01-01T00:00:00")[..2].to_vec());
		// The failure propagates before the page close and the timer arm.
		assert_eq!(h.log.pages_closed.load(Ordering::SeqCst), 0);
		assert!(h.deadlines.armed().is_none());
		// The session handle survives for the next request to reuse.
		assert!(h.controller.has_session());
	}

	#[tokio::test]
	async fn tick_swallows_session_close_failures() {
		let mut h = harness_with(|engine| engine.fail_close = true);
		h.controller.handle_capture().await.expect("warm-up capture");

		for _ in 0..6 {
			h.fire_tick().await;
		}

		assert!(!h.controller.has_session());
		assert_eq!(h.log.sessions_closed.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn capture_after_expiry_relaunches_and_restarts_the_timer() {
		let mut h = harness();
		h.controller.handle_capture().await.expect("first capture");

		for _ in 0..6 {
			h.fire_tick().await;
		}
		assert!(!h.controller.has_session());

		h.clock.advance(Duration::from_secs(600));
		h.controller.handle_capture().await.expect("second capture");

		assert_eq!(h.log.launches.load(Ordering::SeqCst), 2);
		assert!(h.deadlines.armed().is_some());
		// The later batch lands in a later bucket.
		assert!(h.store.keys().last().expect("uploads").starts_with("2024-01-01T00:10:00/"));
	}

	#[tokio::test]
	async fn shutdown_closes_the_held_session() {
		let mut h = harness();
		h.controller.handle_capture().await.expect("capture");

		h.controller.shutdown().await;

		assert!(!h.controller.has_session());
		assert_eq!(h.log.sessions_closed.load(Ordering::SeqCst), 1);
	}
}
