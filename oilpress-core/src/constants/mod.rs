//! Constants for Oilpress Core
//!
//! Every number the pipeline depends on lives here, with its unit in the
//! name and a note on where it came from. Most of them were measured on the
//! reference board (ESP32, VDO 5 bar sender on a 220 Ω pull-up).
//!
//! ## Organization
//!
//! - **Circuit**: supply rail, ADC transfer function, rail guard
//! - **Sender**: the VDO resistance/pressure curve and its ceiling
//! - **Calibration**: timing and plausibility windows for the pull-up estimate
//! - **Firmware**: filter coefficient, sentinels, version identifiers

/// Divider supply and ADC transfer function of the reference board.
pub mod circuit;

/// Resistive pressure sender characteristics.
pub mod sender;

/// Boot-time pull-up calibration parameters.
pub mod calibration;

/// Filter, sentinel and identification constants.
pub mod firmware;

// Re-export commonly used constants for convenience
pub use circuit::{
    SUPPLY_VOLTAGE_V, ADC_GAIN_V_PER_COUNT, ADC_OFFSET_V, RAIL_MARGIN_V, ADC_MAX_COUNT,
};

pub use sender::{VDO_5BAR_CURVE, VDO_MAX_PRESSURE_BAR};

pub use calibration::{
    CAL_SETTLE_MS, CAL_SAMPLE_INTERVAL_MS, CAL_SAMPLE_COUNT,
    CAL_REFERENCE_OHMS, CAL_INITIAL_PULLUP_OHMS, FALLBACK_PULLUP_OHMS,
};

pub use firmware::{
    FILTER_ALPHA, TEMP_DISCONNECTED_BELOW_C, SOFTWARE_VERSION, HARDWARE_VERSION,
};
