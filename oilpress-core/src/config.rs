//! Meter Configuration
//!
//! All configuration is fixed for the life of the process: it is built once
//! at boot (from code, or from a JSON document baked into flash) and handed
//! to [`Meter::new`](crate::Meter::new). Nothing here can be changed over the
//! network.
//!
//! ```rust
//! use oilpress_core::{CalibrationSettings, MeterConfig};
//!
//! let config = MeterConfig::default()
//!     .with_fallback_pullup(223.0)
//!     .with_calibration(CalibrationSettings::enabled_with_reference(9.7));
//!
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    calibration::{
        CAL_INITIAL_PULLUP_OHMS, CAL_MAX_PULLUP_OHMS, CAL_MAX_VOLTAGE_V, CAL_MIN_PULLUP_OHMS,
        CAL_MIN_VOLTAGE_V, CAL_REFERENCE_OHMS, CAL_SAMPLE_COUNT, CAL_SAMPLE_INTERVAL_MS, CAL_SETTLE_MS,
        FALLBACK_PULLUP_OHMS,
    },
    circuit::{ADC_GAIN_V_PER_COUNT, ADC_OFFSET_V, SUPPLY_VOLTAGE_V},
    firmware::{FILTER_ALPHA, HARDWARE_VERSION, SOFTWARE_VERSION},
    sender::VDO_MAX_PRESSURE_BAR,
};
use crate::errors::{MeterError, MeterResult};
use crate::traits::Validatable;

/// Measured properties of the divider and ADC
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CircuitConstants {
    /// Voltage at the top of the divider (V)
    pub supply_voltage: f32,
    /// ADC slope (V per count)
    pub adc_gain: f32,
    /// ADC intercept (V)
    pub adc_offset: f32,
    /// Pressure reported at and above the top of the sender curve (bar)
    pub max_pressure_bar: f32,
}

impl Default for CircuitConstants {
    fn default() -> Self {
        Self {
            supply_voltage: SUPPLY_VOLTAGE_V,
            adc_gain: ADC_GAIN_V_PER_COUNT,
            adc_offset: ADC_OFFSET_V,
            max_pressure_bar: VDO_MAX_PRESSURE_BAR,
        }
    }
}

impl CircuitConstants {
    /// Reject constants the pipeline cannot work with
    pub fn validate(&self) -> MeterResult<()> {
        if !self.supply_voltage.is_valid() || self.supply_voltage <= 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "supply_voltage",
                value: self.supply_voltage,
            });
        }
        if !self.adc_gain.is_valid() || self.adc_gain == 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "adc_gain",
                value: self.adc_gain,
            });
        }
        if !self.adc_offset.is_valid() {
            return Err(MeterError::InvalidConstant {
                name: "adc_offset",
                value: self.adc_offset,
            });
        }
        if !self.max_pressure_bar.is_valid() {
            return Err(MeterError::InvalidConstant {
                name: "max_pressure_bar",
                value: self.max_pressure_bar,
            });
        }
        Ok(())
    }
}

/// Parameters of the boot-time pull-up calibration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationSettings {
    /// Run the calibration at startup
    pub enabled: bool,
    /// Known sender resistance during calibration (Ω)
    pub reference_ohms: f32,
    /// Pull-up kept when calibration runs but accepts no sample (Ω)
    pub initial_pullup_ohms: f32,
    /// Wait before the first sample (ms)
    pub settle_ms: u32,
    /// Spacing between samples (ms)
    pub sample_interval_ms: u32,
    /// Number of samples taken
    pub sample_count: u8,
    /// Lowest accepted divider voltage (V, inclusive)
    pub min_voltage: f32,
    /// Highest accepted divider voltage (V, inclusive)
    pub max_voltage: f32,
    /// Lower bound for a plausible pull-up estimate (Ω, exclusive)
    pub min_pullup_ohms: f32,
    /// Upper bound for a plausible pull-up estimate (Ω, exclusive)
    pub max_pullup_ohms: f32,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            reference_ohms: CAL_REFERENCE_OHMS,
            initial_pullup_ohms: CAL_INITIAL_PULLUP_OHMS,
            settle_ms: CAL_SETTLE_MS,
            sample_interval_ms: CAL_SAMPLE_INTERVAL_MS,
            sample_count: CAL_SAMPLE_COUNT,
            min_voltage: CAL_MIN_VOLTAGE_V,
            max_voltage: CAL_MAX_VOLTAGE_V,
            min_pullup_ohms: CAL_MIN_PULLUP_OHMS,
            max_pullup_ohms: CAL_MAX_PULLUP_OHMS,
        }
    }
}

impl CalibrationSettings {
    /// Default timing and windows, calibration switched on
    pub fn enabled_with_reference(reference_ohms: f32) -> Self {
        Self {
            enabled: true,
            reference_ohms,
            ..Self::default()
        }
    }

    /// Total time the routine blocks its caller (ms)
    pub fn duration_ms(&self) -> u64 {
        self.settle_ms as u64 + self.sample_interval_ms as u64 * self.sample_count as u64
    }

    /// Reject settings that can never produce an estimate
    pub fn validate(&self) -> MeterResult<()> {
        if !self.reference_ohms.is_valid() || self.reference_ohms <= 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "reference_ohms",
                value: self.reference_ohms,
            });
        }
        if !self.initial_pullup_ohms.is_valid() || self.initial_pullup_ohms <= 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "initial_pullup_ohms",
                value: self.initial_pullup_ohms,
            });
        }
        if self.sample_count == 0 {
            return Err(MeterError::Config { reason: "sample_count must be at least 1" });
        }
        if !(self.min_voltage > 0.0 && self.min_voltage <= self.max_voltage) {
            return Err(MeterError::Config { reason: "empty calibration voltage window" });
        }
        if !(self.min_pullup_ohms < self.max_pullup_ohms) {
            return Err(MeterError::Config { reason: "empty calibration pull-up window" });
        }
        Ok(())
    }
}

/// Everything a [`Meter`](crate::Meter) needs besides its sources
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeterConfig {
    /// Divider and ADC constants
    pub circuit: CircuitConstants,
    /// Boot calibration parameters
    pub calibration: CalibrationSettings,
    /// Pull-up used when calibration is disabled (Ω)
    pub fallback_pullup_ohms: f32,
    /// Smoothing coefficient of the pressure filter, in `(0, 1]`
    pub filter_alpha: f32,
    /// Software identifier included in every snapshot
    #[cfg_attr(feature = "serde", serde(skip, default = "default_software_version"))]
    pub software_version: &'static str,
    /// Hardware identifier included in every snapshot
    #[cfg_attr(feature = "serde", serde(skip, default = "default_hardware_version"))]
    pub hardware_version: &'static str,
}

#[cfg(feature = "serde")]
fn default_software_version() -> &'static str {
    SOFTWARE_VERSION
}

#[cfg(feature = "serde")]
fn default_hardware_version() -> &'static str {
    HARDWARE_VERSION
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            circuit: CircuitConstants::default(),
            calibration: CalibrationSettings::default(),
            fallback_pullup_ohms: FALLBACK_PULLUP_OHMS,
            filter_alpha: FILTER_ALPHA,
            software_version: SOFTWARE_VERSION,
            hardware_version: HARDWARE_VERSION,
        }
    }
}

impl MeterConfig {
    /// Replace the circuit constants
    pub fn with_circuit(mut self, circuit: CircuitConstants) -> Self {
        self.circuit = circuit;
        self
    }

    /// Replace the calibration settings
    pub fn with_calibration(mut self, calibration: CalibrationSettings) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the pull-up used when calibration is off
    pub fn with_fallback_pullup(mut self, ohms: f32) -> Self {
        self.fallback_pullup_ohms = ohms;
        self
    }

    /// Set the smoothing coefficient
    pub fn with_filter_alpha(mut self, alpha: f32) -> Self {
        self.filter_alpha = alpha;
        self
    }

    /// Set the identifiers reported in snapshots
    pub fn with_versions(mut self, software: &'static str, hardware: &'static str) -> Self {
        self.software_version = software;
        self.hardware_version = hardware;
        self
    }

    /// Check every section
    pub fn validate(&self) -> MeterResult<()> {
        self.circuit.validate()?;
        self.calibration.validate()?;

        if !self.fallback_pullup_ohms.is_valid() || self.fallback_pullup_ohms <= 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "fallback_pullup_ohms",
                value: self.fallback_pullup_ohms,
            });
        }
        if !(self.filter_alpha > 0.0 && self.filter_alpha <= 1.0) {
            return Err(MeterError::InvalidConstant {
                name: "filter_alpha",
                value: self.filter_alpha,
            });
        }
        Ok(())
    }

    /// Load a configuration document and validate it
    ///
    /// Missing fields take their defaults, so a document only needs to list
    /// what differs from the reference board.
    #[cfg(feature = "std")]
    pub fn from_json(json: &str) -> MeterResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|_e| {
            log_warn!("Rejected meter configuration: {}", _e);
            MeterError::Config { reason: "malformed configuration document" }
        })?;
        config.validate()?;
        Ok(config)
    }
}
