//! Session handle over one live DevTools connection.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shutter_protocol::target::{
	AttachToTargetParams, AttachToTargetReply, CreateTargetParams, CreateTargetReply,
};
use shutter_runtime::Connection;
use tracing::debug;

use super::execute;
use super::page::CdpPage;
use crate::capability::{BrowserSession, PageHandle};
use crate::error::Result;

pub struct CdpSession {
	connection: Arc<Connection>,
}

impl CdpSession {
	pub(crate) fn new(connection: Arc<Connection>) -> Self {
		Self { connection }
	}
}

#[async_trait]
impl BrowserSession for CdpSession {
	fn is_connected(&self) -> bool {
		self.connection.is_connected()
	}

	async fn new_page(&self) -> Result<Box<dyn PageHandle>> {
		let created: CreateTargetReply = execute(
			&self.connection,
			None,
			"Target.createTarget",
			&CreateTargetParams {
				url: "about:blank".to_string(),
			},
		)
		.await?;

		let attached: AttachToTargetReply = execute(
			&self.connection,
			None,
			"Target.attachToTarget",
			&AttachToTargetParams {
				target_id: created.target_id.clone(),
				flatten: true,
			},
		)
		.await?;
		debug!(target = "shutter.cdp", target_id = %created.target_id, "page attached");

		let page = CdpPage::new(
			Arc::clone(&self.connection),
			attached.session_id,
			created.target_id,
		);
		page.enable_events().await?;
		Ok(Box::new(page))
	}

	async fn close(&self) -> Result<()> {
		self.connection.execute(None, "Browser.close", json!({})).await?;
		Ok(())
	}
}
