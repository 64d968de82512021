//! Core signal conditioning engine for Oilpress
//!
//! Turns a raw ADC sample from a resistive oil pressure sender into a
//! calibrated pressure in bar, and estimates the divider pull-up resistance
//! at boot from a known reference resistance.
//!
//! Key constraints:
//! - Runs on a single-core MCU (ESP32 class) without an allocator
//! - No heap allocation in the measurement path
//! - Invalid readings are data (`None`), never panics
//!
//! ```no_run
//! use oilpress_core::{Meter, MeterConfig};
//! use oilpress_core::traits::{AdcSource, TemperatureSource};
//!
//! struct Adc;
//! impl AdcSource for Adc {
//!     fn read_raw(&mut self) -> u16 { 2048 }
//! }
//!
//! struct Probe;
//! impl TemperatureSource for Probe {
//!     fn read_celsius(&mut self) -> f32 { 92.5 }
//! }
//!
//! let mut meter = Meter::new(MeterConfig::default(), Adc, Probe).unwrap();
//! let snapshot = meter.measure();
//!
//! if let Some(bar) = snapshot.filtered_bar {
//!     // Hand off to the display / transport layer
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Optional logging: compiles away entirely without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod calibration;
pub mod conditioning;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod lookup;
pub mod snapshot;
pub mod time;
pub mod traits;

// Public API
pub use calibration::{CalibrationRoutine, CalibrationState, PullupOrigin, PullupResistance};
pub use config::{CalibrationSettings, CircuitConstants, MeterConfig};
pub use errors::{MeterError, MeterResult};
pub use filter::FilterState;
pub use lookup::{CalibrationPoint, PressureCurve};
pub use snapshot::{MeasurementSnapshot, Meter};

#[cfg(feature = "std")]
pub use snapshot::SharedMeter;

/// Crate version, reported alongside the firmware identifiers
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
