//! Shared in-memory fakes for server tests.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use async_trait::async_trait;
use shutter::capability::{BrowserEngine, BrowserSession, DeadlineStore, ObjectStore, PageHandle};
use shutter::controller::CaptureController;
use shutter::error::{Result, ShutterError};

/// Engine whose launch always fails; captures then fail with
/// `SessionUnavailable`.
pub(crate) struct NullEngine;

#[async_trait]
impl BrowserEngine for NullEngine {
	async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
		Err(ShutterError::BrowserLaunch("no engine in tests".to_string()))
	}
}

/// Engine that hands out pages returning a fixed image payload.
pub(crate) struct StubEngine;

#[async_trait]
impl BrowserEngine for StubEngine {
	async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
		Ok(Box::new(StubSession))
	}
}

struct StubSession;

#[async_trait]
impl BrowserSession for StubSession {
	fn is_connected(&self) -> bool {
		true
	}

	async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
		Ok(Box::new(StubPage))
	}

	async fn close(&self) -> Result<()> {
		Ok(())
	}
}

struct StubPage;

#[async_trait]
impl PageHandle for StubPage {
	async fn set_viewport(&self, _width: u32, _height: u32) -> Result<()> {
		Ok(())
	}

	async fn goto(&self, _url: &str) -> Result<()> {
		Ok(())
	}

	async fn screenshot(&self) -> Result<Vec<u8>> {
		Ok(vec![0xFF, 0xD8, 0xFF])
	}

	async fn close(&self) -> Result<()> {
		Ok(())
	}
}

/// Records uploaded keys in order.
#[derive(Default)]
pub(crate) struct MemoryStore {
	puts: Mutex<Vec<String>>,
}

impl MemoryStore {
	pub(crate) fn keys(&self) -> Vec<String> {
		self.puts.lock().expect("puts lock").clone()
	}
}

#[async_trait]
impl ObjectStore for MemoryStore {
	async fn put(&self, key: &str, _bytes: Vec<u8>) -> Result<()> {
		self.puts.lock().expect("puts lock").push(key.to_string());
		Ok(())
	}
}

/// Single-slot in-memory deadline store.
#[derive(Default)]
pub(crate) struct MemoryDeadlines {
	slot: Mutex<Option<SystemTime>>,
}

#[async_trait]
impl DeadlineStore for MemoryDeadlines {
	async fn pending(&self) -> Result<Option<SystemTime>> {
		Ok(*self.slot.lock().expect("slot lock"))
	}

	async fn schedule(&self, at: SystemTime) -> Result<()> {
		*self.slot.lock().expect("slot lock") = Some(at);
		Ok(())
	}
}

pub(crate) fn controller_with_null_engine(deadlines: Arc<dyn DeadlineStore>) -> CaptureController {
	CaptureController::new(Arc::new(NullEngine), Arc::new(MemoryStore::default()), deadlines)
}

pub(crate) fn controller_with_stub_engine() -> (CaptureController, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let controller = CaptureController::new(
		Arc::new(StubEngine),
		Arc::clone(&store) as Arc<dyn ObjectStore>,
		Arc::new(MemoryDeadlines::default()),
	);
	(controller, store)
}
