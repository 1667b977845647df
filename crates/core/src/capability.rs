//! Capability seams between the controller and its external collaborators.
//!
//! The controller's logic only ever sees these traits, so it can be
//! exercised against in-memory fakes without a browser, a store, or a
//! durable timer behind it.

use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::Result;

/// A browser automation engine able to start sessions on demand.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
	/// Starts (or connects to) a browser session.
	async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A live browser session capable of opening pages.
#[async_trait]
pub trait BrowserSession: Send + Sync {
	/// `true` while the session can still service page operations.
	fn is_connected(&self) -> bool;

	/// Opens a fresh page.
	async fn new_page(&self) -> Result<Box<dyn PageHandle>>;

	/// Closes the session and releases the browser.
	async fn close(&self) -> Result<()>;
}

/// An open page within a browser session.
#[async_trait]
pub trait PageHandle: Send + Sync {
	async fn set_viewport(&self, width: u32, height: u32) -> Result<()>;

	/// Navigates and waits for the page to finish loading.
	async fn goto(&self, url: &str) -> Result<()>;

	/// Captures the current viewport as encoded image bytes.
	async fn screenshot(&self) -> Result<Vec<u8>>;

	async fn close(&self) -> Result<()>;
}

/// Destination for captured images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
	/// Stores `bytes` under `key`, overwriting any existing object.
	async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

/// The host's durable single-deadline timer facility.
///
/// At most one deadline is pending at a time; arming while one is pending
/// replaces it.
#[async_trait]
pub trait DeadlineStore: Send + Sync {
	/// Returns the pending wake-up instant, if one is armed.
	async fn pending(&self) -> Result<Option<SystemTime>>;

	/// Arms (or moves) the wake-up deadline.
	async fn schedule(&self, at: SystemTime) -> Result<()>;
}
