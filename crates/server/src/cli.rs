//! Command-line configuration for the capture service.
//!
//! Only wiring is configurable here; the capture behavior itself (target
//! page, viewport batch, idle window) is fixed in `shutter-rs`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "shutterd")]
#[command(about = "Keeps a browser session warm and serves screenshot capture requests")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Address the HTTP router listens on
	#[arg(long, default_value = "127.0.0.1:8090")]
	pub bind: SocketAddr,

	/// Browser endpoint: a ws(s):// debugger URL or an http(s):// DevTools base
	#[arg(long, default_value = "http://127.0.0.1:9222", value_name = "URL")]
	pub browser: String,

	/// Where captured images go: an http(s) base URL or a local directory
	#[arg(long, default_value = "captures", value_name = "TARGET")]
	pub store: String,

	/// Bearer token sent with HTTP store uploads
	#[arg(long, value_name = "TOKEN")]
	pub store_token: Option<String>,

	/// Directory holding durable timer state
	#[arg(long, default_value = ".shutter", value_name = "DIR")]
	pub state_dir: PathBuf,
}
