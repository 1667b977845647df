use std::sync::Arc;

use clap::Parser;
use shutter::capability::{BrowserEngine, DeadlineStore};
use shutter::cdp::CdpEngine;
use shutter::controller::CaptureController;
use shutter_server::alarm::AlarmStore;
use shutter_server::cli::Cli;
use shutter_server::routes::{self, AppState};
use shutter_server::{logging, scheduler, store};
use tokio::sync::Mutex;
use tracing::{error, info};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = run(cli).await {
		error!(target = "shutterd", error = %err, "service failed");
		std::process::exit(1);
	}
}

async fn run(cli: Cli) -> anyhow::Result<()> {
	let engine: Arc<dyn BrowserEngine> = Arc::new(CdpEngine::new(cli.browser));
	let object_store = store::from_target(&cli.store, cli.store_token)?;
	let alarm = Arc::new(AlarmStore::new(&cli.state_dir)?);

	let controller = Arc::new(Mutex::new(CaptureController::new(
		engine,
		object_store,
		Arc::clone(&alarm) as Arc<dyn DeadlineStore>,
	)));

	// Re-arms any deadline that survived a restart and keeps ticking.
	tokio::spawn(scheduler::run(Arc::clone(&alarm), Arc::clone(&controller)));

	let listener = tokio::net::TcpListener::bind(cli.bind).await?;
	info!(target = "shutterd", addr = %cli.bind, "listening");

	let state = AppState {
		controller: Arc::clone(&controller),
	};
	axum::serve(listener, routes::router(state))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!(target = "shutterd", "shutting down");
	controller.lock().await.shutdown().await;
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		error!(target = "shutterd", error = %err, "failed to listen for shutdown signal");
	}
}
