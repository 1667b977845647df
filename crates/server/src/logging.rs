//! Tracing subscriber setup for the service binary.

use tracing_subscriber::EnvFilter;

/// Initializes logging; `-v` raises the default level, `RUST_LOG` wins.
pub fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.init();
}
