//! Measurement Snapshots and the Meter
//!
//! ## Overview
//!
//! A [`Meter`] owns everything with state: the ADC and probe ports, the
//! pull-up value and the pressure filter. Each call to [`Meter::measure`]
//! runs one reading through the whole chain and returns an immutable
//! [`MeasurementSnapshot`]:
//!
//! ```text
//! ADC ─> count ─> volts ─> Ω ─> bar (raw) ─> bar (filtered) ─┐
//! probe ─> °C (None if disconnected) ───────────────────────┼─> snapshot
//! die sensor ─> °C ─────────────────────────────────────────┤
//! supply, pull-up, versions ────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Meter::new ──> start()  ──> measure() ──> measure() ──> ...
//!                  │
//!                  └── runs the pull-up calibration if enabled,
//!                      then the pull-up is fixed for good
//! ```
//!
//! Calling `measure()` without `start()` fixes the fallback pull-up on the
//! first reading. Any later attempt to calibrate returns
//! [`MeterError::PullupAlreadyFixed`].
//!
//! ## Rendering
//!
//! [`MeasurementSnapshot::write_json`] produces the flat document the
//! dashboard polls. Missing values are written as `null`, never as `0` or
//! `-1`, and each field has a fixed number of decimals:
//!
//! | key        | value                  | decimals |
//! |------------|------------------------|----------|
//! | `adc`      | raw count              | integer  |
//! | `vadc`     | node voltage           | 3        |
//! | `rs`       | sender resistance      | 1        |
//! | `bar_raw`  | unfiltered pressure    | 2        |
//! | `oil_bar`  | filtered pressure      | 2        |
//! | `oil_temp` | oil temperature        | 1        |
//! | `esp_temp` | die temperature        | 1        |
//! | `v_supply` | divider supply         | 3        |
//! | `rpu`      | pull-up in use         | 1        |
//! | `sw`, `hw` | version strings        | verbatim |
//!
//! ## Sharing between request handlers
//!
//! `Meter` is `!Sync` by construction (it needs `&mut self`). Servers that
//! handle requests on several threads wrap it in [`SharedMeter`], which
//! serialises whole measurements behind one mutex so two requests can never
//! interleave their filter updates.

use core::fmt::{self, Write};

use crate::calibration::{CalibrationRoutine, PullupResistance};
use crate::conditioning::{adc_to_voltage, resistance_from_voltage};
use crate::config::MeterConfig;
use crate::constants::firmware::TEMP_DISCONNECTED_BELOW_C;
use crate::constants::sender::VDO_5BAR_CURVE;
use crate::errors::{MeterError, MeterResult};
use crate::filter::FilterState;
use crate::lookup::PressureCurve;
use crate::traits::{
    AdcSource, ChipTemperatureSource, NoChipTemperature, TemperatureSource, TimeSource,
    Validatable,
};

/// Buffer size that fits a snapshot rendered with the stock configuration
pub const SNAPSHOT_JSON_CAPACITY: usize = 256;

/// One complete, self-consistent reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSnapshot {
    /// Raw ADC count
    pub adc: u16,
    /// Node voltage (V)
    pub voltage: f32,
    /// Sender resistance (Ω), `None` near either rail
    pub resistance_ohms: Option<f32>,
    /// Pressure straight from the curve (bar)
    pub raw_bar: Option<f32>,
    /// Smoothed pressure (bar)
    pub filtered_bar: Option<f32>,
    /// Oil temperature (°C), `None` if the probe is disconnected
    pub oil_temp_c: Option<f32>,
    /// MCU die temperature (°C), diagnostic only
    pub chip_temp_c: Option<f32>,
    /// Divider supply voltage (V)
    pub supply_voltage: f32,
    /// Pull-up resistance in use (Ω)
    pub pullup_ohms: f32,
    /// Software identifier
    pub software_version: &'static str,
    /// Hardware identifier
    pub hardware_version: &'static str,
}

impl MeasurementSnapshot {
    /// Write the snapshot as a flat JSON object
    pub fn write_json<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{{\"adc\":{}", self.adc)?;
        write!(out, ",\"vadc\":{:.3}", self.voltage)?;
        write_optional(out, "rs", self.resistance_ohms, 1)?;
        write_optional(out, "bar_raw", self.raw_bar, 2)?;
        write_optional(out, "oil_bar", self.filtered_bar, 2)?;
        write_optional(out, "oil_temp", self.oil_temp_c, 1)?;
        write_optional(out, "esp_temp", self.chip_temp_c, 1)?;
        write!(out, ",\"v_supply\":{:.3}", self.supply_voltage)?;
        write!(out, ",\"rpu\":{:.1}", self.pullup_ohms)?;
        write!(out, ",\"sw\":")?;
        write_string(out, self.software_version)?;
        write!(out, ",\"hw\":")?;
        write_string(out, self.hardware_version)?;
        out.write_char('}')
    }

    /// Render into a fixed-capacity string, no allocation
    pub fn to_json(&self) -> Result<heapless::String<SNAPSHOT_JSON_CAPACITY>, fmt::Error> {
        let mut out = heapless::String::new();
        self.write_json(&mut out)?;
        Ok(out)
    }
}

fn write_optional<W: Write + ?Sized>(
    out: &mut W,
    key: &str,
    value: Option<f32>,
    decimals: usize,
) -> fmt::Result {
    match value.and_then(Validatable::valid) {
        Some(v) => write!(out, ",\"{}\":{:.*}", key, decimals, v),
        None => write!(out, ",\"{}\":null", key),
    }
}

fn write_string<W: Write + ?Sized>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// Map the probe's raw output to a temperature, or `None` if disconnected
pub fn probe_temperature(raw_c: f32) -> Option<f32> {
    raw_c.valid().filter(|t| *t >= TEMP_DISCONNECTED_BELOW_C)
}

/// The measurement pipeline and its state
#[derive(Debug)]
pub struct Meter<A, T, C = NoChipTemperature> {
    config: MeterConfig,
    curve: PressureCurve,
    adc: A,
    probe: T,
    chip: C,
    pullup: PullupResistance,
    pullup_fixed: bool,
    filter: FilterState,
}

impl<A, T> Meter<A, T, NoChipTemperature>
where
    A: AdcSource,
    T: TemperatureSource,
{
    /// Build a meter on the VDO 5 bar curve with the fallback pull-up
    ///
    /// The curve saturates at `circuit.max_pressure_bar`.
    pub fn new(config: MeterConfig, adc: A, probe: T) -> MeterResult<Self> {
        config.validate()?;
        let curve = PressureCurve::new(&VDO_5BAR_CURVE, config.circuit.max_pressure_bar)?;

        Ok(Self {
            pullup: PullupResistance::fallback(config.fallback_pullup_ohms),
            filter: FilterState::new(config.filter_alpha),
            curve,
            pullup_fixed: false,
            chip: NoChipTemperature,
            config,
            adc,
            probe,
        })
    }
}

impl<A, T, C> Meter<A, T, C>
where
    A: AdcSource,
    T: TemperatureSource,
    C: ChipTemperatureSource,
{
    /// Attach a die temperature sensor
    pub fn with_chip_sensor<C2: ChipTemperatureSource>(self, chip: C2) -> Meter<A, T, C2> {
        Meter {
            config: self.config,
            curve: self.curve,
            adc: self.adc,
            probe: self.probe,
            chip,
            pullup: self.pullup,
            pullup_fixed: self.pullup_fixed,
            filter: self.filter,
        }
    }

    /// Use a different sender curve
    ///
    /// The curve's own ceiling is used; `circuit.max_pressure_bar` only
    /// applies to the built-in curve.
    pub fn with_curve(mut self, curve: PressureCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Prepare for serving: calibrate if configured, then fix the pull-up
    ///
    /// Blocks for the calibration time when calibration is enabled.
    pub fn start<Clk: TimeSource + ?Sized>(&mut self, clock: &Clk) -> MeterResult<PullupResistance> {
        if self.config.calibration.enabled {
            let reference = self.config.calibration.reference_ohms;
            return self.calibrate_pullup(reference, clock);
        }

        if self.pullup_fixed {
            return Err(MeterError::PullupAlreadyFixed);
        }
        self.pullup_fixed = true;
        log_info!("Using fallback pull-up of {} Ω", self.pullup.ohms());
        Ok(self.pullup)
    }

    /// Estimate the pull-up against a known sender resistance
    ///
    /// Runs once, before the first measurement. If no sample is usable the
    /// configured `initial_pullup_ohms` is used instead. Either way the
    /// pull-up is fixed afterwards.
    pub fn calibrate_pullup<Clk: TimeSource + ?Sized>(
        &mut self,
        reference_ohms: f32,
        clock: &Clk,
    ) -> MeterResult<PullupResistance> {
        if self.pullup_fixed {
            return Err(MeterError::PullupAlreadyFixed);
        }
        if !reference_ohms.is_valid() || reference_ohms <= 0.0 {
            return Err(MeterError::InvalidConstant {
                name: "reference_ohms",
                value: reference_ohms,
            });
        }

        let mut settings = self.config.calibration;
        settings.reference_ohms = reference_ohms;

        let initial = PullupResistance::fallback(settings.initial_pullup_ohms);
        let routine = CalibrationRoutine::new(settings, self.config.circuit, initial);
        self.pullup = routine.run_blocking(&mut self.adc, clock);
        self.pullup_fixed = true;
        Ok(self.pullup)
    }

    /// Take one reading through the whole chain
    pub fn measure(&mut self) -> MeasurementSnapshot {
        self.pullup_fixed = true;

        let circuit = &self.config.circuit;
        let adc = self.adc.read_raw();
        let voltage = adc_to_voltage(adc, circuit);
        let resistance_ohms = resistance_from_voltage(voltage, self.pullup.ohms(), circuit);
        let raw_bar = self.curve.pressure_at(resistance_ohms);
        let filtered_bar = self.filter.update(raw_bar);

        let probe_raw = self.probe.read_celsius();
        let oil_temp_c = probe_temperature(probe_raw);
        if oil_temp_c.is_none() {
            log_debug!("Oil temperature probe reports {} °C, treating as disconnected", probe_raw);
        }

        let snapshot = MeasurementSnapshot {
            adc,
            voltage,
            resistance_ohms,
            raw_bar,
            filtered_bar,
            oil_temp_c,
            chip_temp_c: self.chip.read_chip_celsius().and_then(Validatable::valid),
            supply_voltage: circuit.supply_voltage,
            pullup_ohms: self.pullup.ohms(),
            software_version: self.config.software_version,
            hardware_version: self.config.hardware_version,
        };

        log_debug!(
            "adc={} V={} R={:?} bar={:?}/{:?}",
            snapshot.adc,
            snapshot.voltage,
            snapshot.resistance_ohms,
            snapshot.raw_bar,
            snapshot.filtered_bar
        );

        snapshot
    }

    /// Pull-up currently in use
    pub fn pullup(&self) -> PullupResistance {
        self.pullup
    }

    /// True once the pull-up can no longer be calibrated
    pub fn is_pullup_fixed(&self) -> bool {
        self.pullup_fixed
    }

    /// Pressure filter state
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Active configuration
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Sender curve in use
    pub fn curve(&self) -> &PressureCurve {
        &self.curve
    }
}

/// A [`Meter`] behind a mutex, for multi-threaded request handlers
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct SharedMeter<A, T, C = NoChipTemperature> {
    inner: std::sync::Mutex<Meter<A, T, C>>,
}

#[cfg(feature = "std")]
impl<A, T, C> SharedMeter<A, T, C>
where
    A: AdcSource,
    T: TemperatureSource,
    C: ChipTemperatureSource,
{
    /// Wrap a started meter
    pub fn new(meter: Meter<A, T, C>) -> Self {
        Self { inner: std::sync::Mutex::new(meter) }
    }

    /// Take one reading; concurrent callers are served one at a time
    pub fn measure(&self) -> MeasurementSnapshot {
        self.lock().measure()
    }

    /// Pull-up currently in use
    pub fn pullup(&self) -> PullupResistance {
        self.lock().pullup()
    }

    /// Give the meter back
    pub fn into_inner(self) -> Meter<A, T, C> {
        self.inner.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Meter<A, T, C>> {
        // A panic mid-measurement leaves no partial state worth rejecting
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
