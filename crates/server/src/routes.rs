//! HTTP surface: forwards capture requests to the controller.
//!
//! The router carries no business logic; it serializes access to the
//! single controller instance and maps its result to a plain response.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};
use shutter::controller::CaptureController;
use tokio::sync::Mutex;
use tracing::error;

/// Shared handler state: the single controller instance.
#[derive(Clone)]
pub struct AppState {
	pub controller: Arc<Mutex<CaptureController>>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/capture", post(capture))
		.route("/healthz", get(healthz))
		.with_state(state)
}

async fn capture(State(state): State<AppState>) -> (StatusCode, &'static str) {
	match state.controller.lock().await.handle_capture().await {
		Ok(_) => (StatusCode::OK, "success"),
		Err(err) => {
			error!(target = "shutter.http", error = %err, "capture failed");
			(StatusCode::INTERNAL_SERVER_ERROR, "capture failed")
		}
	}
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
	let controller = state.controller.lock().await;
	Json(json!({
		"session_open": controller.has_session(),
		"idle_seconds": controller.idle_seconds(),
	}))
}
