//! `Emulation` domain payloads.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDeviceMetricsParams {
	pub width: u32,
	pub height: u32,
	pub device_scale_factor: f64,
	pub mobile: bool,
}
