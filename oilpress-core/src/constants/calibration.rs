//! Pull-up Calibration Parameters
//!
//! The fitted pull-up is only as good as its tolerance band. At 0 bar the
//! sender reads about 10 Ω, so a few ohms of pull-up error shift the whole
//! curve. Estimating it against a known sender resistance at boot removes
//! most of that error.

/// Pause before the first calibration sample (ms).
///
/// Lets the ADC input filter and the sender settle after power-up.
pub const CAL_SETTLE_MS: u32 = 300;

/// Spacing between calibration samples (ms).
pub const CAL_SAMPLE_INTERVAL_MS: u32 = 5;

/// Number of calibration samples taken.
pub const CAL_SAMPLE_COUNT: u8 = 16;

/// Sender resistance at 0 bar, engine off (Ω).
///
/// Measured on the installed sender.
pub const CAL_REFERENCE_OHMS: f32 = 9.7;

/// Lowest divider voltage accepted during calibration (V).
pub const CAL_MIN_VOLTAGE_V: f32 = 0.05;

/// Highest divider voltage accepted during calibration (V).
///
/// With a ~10 Ω reference the node should sit well below this; anything
/// higher means the reference is not connected.
pub const CAL_MAX_VOLTAGE_V: f32 = 1.6;

/// Smallest plausible pull-up estimate (Ω, exclusive).
pub const CAL_MIN_PULLUP_OHMS: f32 = 50.0;

/// Largest plausible pull-up estimate (Ω, exclusive).
pub const CAL_MAX_PULLUP_OHMS: f32 = 500.0;

/// Pull-up assumed before calibration runs (Ω).
///
/// Kept if calibration runs but accepts no sample.
pub const CAL_INITIAL_PULLUP_OHMS: f32 = 223.0;

/// Pull-up used when calibration is disabled (Ω).
///
/// Nominal value of the fitted resistor.
pub const FALLBACK_PULLUP_OHMS: f32 = 220.0;
