//! Error Types for Configuration and Lifecycle Violations
//!
//! ## Design Philosophy
//!
//! The measurement path never fails. A reading that cannot be trusted (voltage
//! at a rail, disconnected temperature probe) travels through the pipeline as
//! `None` and reaches the client as an explicit "no value" marker. Errors are
//! reserved for things that are wrong before the first reading is taken:
//!
//! 1. **Malformed sender curve**: fewer than two points, or resistances that
//!    do not strictly increase.
//! 2. **Nonsensical circuit constants**: non-finite or non-positive supply,
//!    zero ADC gain, a filter coefficient outside `(0, 1]`.
//! 3. **Lifecycle misuse**: trying to calibrate the pull-up after it was
//!    already fixed.
//!
//! Like the rest of the crate, errors are `Copy` and carry only
//! `&'static str` payloads, so they can be returned from `no_std` code
//! without an allocator.
//!
//! ```rust
//! use oilpress_core::{CalibrationPoint, MeterError, PressureCurve};
//!
//! static BROKEN: [CalibrationPoint; 2] = [
//!     CalibrationPoint::new(43.0, 1.0),
//!     CalibrationPoint::new(10.0, 0.0),
//! ];
//!
//! match PressureCurve::new(&BROKEN, 5.0) {
//!     Err(MeterError::CurveNotMonotonic { index }) => assert_eq!(index, 1),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration and lifecycle operations
pub type MeterResult<T> = Result<T, MeterError>;

/// Errors raised while building or starting a meter
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MeterError {
    /// Sender curve needs at least two points to interpolate
    #[error("Pressure curve has {len} point(s), need at least 2")]
    CurveTooShort {
        /// Number of points supplied
        len: usize,
    },

    /// Resistance must strictly increase and pressure must not decrease
    #[error("Pressure curve is not monotonic at point {index}")]
    CurveNotMonotonic {
        /// Index of the first offending point
        index: usize,
    },

    /// A circuit or filter constant is outside its usable domain
    #[error("Invalid constant {name}: {value}")]
    InvalidConstant {
        /// Name of the offending constant
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    /// Pull-up was already calibrated or put into service
    #[error("Pull-up resistance is already fixed")]
    PullupAlreadyFixed,

    /// Configuration document could not be used
    #[error("Configuration error: {reason}")]
    Config {
        /// Short description of the problem
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for MeterError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::CurveTooShort { len } =>
                defmt::write!(fmt, "Curve has {} points, need 2", len),
            Self::CurveNotMonotonic { index } =>
                defmt::write!(fmt, "Curve not monotonic at {}", index),
            Self::InvalidConstant { name, value } =>
                defmt::write!(fmt, "Invalid constant {}: {}", name, value),
            Self::PullupAlreadyFixed =>
                defmt::write!(fmt, "Pull-up already fixed"),
            Self::Config { reason } =>
                defmt::write!(fmt, "Config: {}", reason),
        }
    }
}
