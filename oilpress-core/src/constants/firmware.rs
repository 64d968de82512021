//! Firmware-Level Constants

/// Exponential smoothing coefficient for the pressure channel.
///
/// 0.2 gives a time constant of about five samples, which at the client's
/// 1 Hz polling rate hides needle jitter without lagging a cold start.
pub const FILTER_ALPHA: f32 = 0.2;

/// Temperatures below this are the probe's "no device" pattern (°C).
///
/// DS18B20 drivers report -127 °C when the bus has no device.
pub const TEMP_DISCONNECTED_BELOW_C: f32 = -100.0;

/// Software version reported in every snapshot.
pub const SOFTWARE_VERSION: &str = "1.0";

/// Hardware revision reported in every snapshot.
pub const HARDWARE_VERSION: &str = "0.1";
