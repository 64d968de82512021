//! Boot-Time Pull-up Calibration
//!
//! ## Why calibrate?
//!
//! Every resistance the meter reports is proportional to the pull-up value
//! (see [`conditioning`](crate::conditioning)). A pull-up that is off by 3%
//! moves every reading by 3%, and near 0 bar that is the difference between
//! "healthy idle" and "warning". The sender's resistance at rest is known, so
//! at boot the divider can be solved the other way round:
//!
//! ```text
//! R_pu = R_known × (V_supply / V_node - 1)
//! ```
//!
//! ## Procedure
//!
//! ```text
//!  Idle ──poll──> Settling ──300 ms──> Sampling(0) ──5 ms──> Sampling(1) ··· Sampling(16) ──5 ms──> Done
//! ```
//!
//! 1. Wait for the input to settle.
//! 2. Take a fixed number of samples at a fixed cadence.
//! 3. Drop samples whose node voltage is outside `[0.05, 1.6] V`: the
//!    reference is not connected, or the ADC is saturated.
//! 4. Solve each remaining sample for the pull-up and drop estimates outside
//!    `(50, 500) Ω`.
//! 5. Average what is left. If nothing is left, keep the previous value.
//!
//! ## Driving the routine
//!
//! [`CalibrationRoutine::poll`] never waits. It returns
//! `Err(nb::Error::WouldBlock)` until its next deadline has passed, which
//! makes it usable from a cooperative main loop, from `nb::block!`, or from a
//! test with a scripted clock:
//!
//! ```rust
//! use oilpress_core::calibration::{CalibrationRoutine, PullupResistance};
//! use oilpress_core::time::MockTimeSource;
//! use oilpress_core::traits::{AdcSource, TimeSource};
//! use oilpress_core::{CalibrationSettings, CircuitConstants};
//!
//! // Node voltage for a 9.7 Ω reference under a 100 Ω pull-up
//! struct Fixture;
//! impl AdcSource for Fixture {
//!     fn read_raw(&mut self) -> u16 { 478 }
//! }
//!
//! let clock = MockTimeSource::new(0).with_auto_step(1);
//! let routine = CalibrationRoutine::new(
//!     CalibrationSettings::enabled_with_reference(9.7),
//!     CircuitConstants::default(),
//!     PullupResistance::fallback(220.0),
//! );
//!
//! let pullup = routine.run_blocking(&mut Fixture, &clock);
//! assert!(pullup.is_calibrated());
//! assert!((pullup.ohms() - 100.0).abs() < 1.0);
//! ```

use core::convert::Infallible;

use crate::config::{CalibrationSettings, CircuitConstants};
use crate::conditioning::{adc_to_voltage, pullup_from_voltage};
use crate::time::Timestamp;
use crate::traits::{AdcSource, TimeSource, Validatable};

/// Where the pull-up value in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullupOrigin {
    /// Configured default, calibration off or inconclusive
    Fallback,
    /// Average of `accepted` calibration samples
    Calibrated {
        /// Number of samples that passed both plausibility windows
        accepted: u8,
    },
}

/// Pull-up resistance used by the divider solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullupResistance {
    ohms: f32,
    origin: PullupOrigin,
}

impl PullupResistance {
    /// Configured default value
    pub const fn fallback(ohms: f32) -> Self {
        Self { ohms, origin: PullupOrigin::Fallback }
    }

    /// Value estimated from `accepted` samples
    pub const fn calibrated(ohms: f32, accepted: u8) -> Self {
        Self { ohms, origin: PullupOrigin::Calibrated { accepted } }
    }

    /// Resistance (Ω)
    pub fn ohms(&self) -> f32 {
        self.ohms
    }

    /// Provenance of the value
    pub fn origin(&self) -> PullupOrigin {
        self.origin
    }

    /// True if the value came from a successful calibration
    pub fn is_calibrated(&self) -> bool {
        matches!(self.origin, PullupOrigin::Calibrated { .. })
    }
}

/// Progress of the calibration state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationState {
    /// Not started; the first poll starts the settle timer
    Idle,
    /// Waiting for the input to settle
    Settling {
        /// Time at which sampling may begin
        until: Timestamp,
    },
    /// Taking samples
    Sampling {
        /// Samples taken so far
        taken: u8,
        /// Earliest time for the next step
        next_at: Timestamp,
    },
    /// Finished; the result is final
    Done(PullupResistance),
}

/// Clock-driven pull-up estimator
#[derive(Debug, Clone)]
pub struct CalibrationRoutine {
    settings: CalibrationSettings,
    circuit: CircuitConstants,
    previous: PullupResistance,
    state: CalibrationState,
    sum_ohms: f32,
    accepted: u8,
}

impl CalibrationRoutine {
    /// Prepare a run; `previous` is returned if no sample is usable
    pub fn new(
        settings: CalibrationSettings,
        circuit: CircuitConstants,
        previous: PullupResistance,
    ) -> Self {
        Self {
            settings,
            circuit,
            previous,
            state: CalibrationState::Idle,
            sum_ohms: 0.0,
            accepted: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Samples that passed both windows so far
    pub fn accepted(&self) -> u8 {
        self.accepted
    }

    /// Advance the state machine to `now`
    ///
    /// Takes at most one ADC sample per call. Returns the final pull-up once
    /// the last sample interval has elapsed, and keeps returning it on
    /// further polls.
    pub fn poll<A: AdcSource + ?Sized>(
        &mut self,
        now: Timestamp,
        adc: &mut A,
    ) -> nb::Result<PullupResistance, Infallible> {
        loop {
            match self.state {
                CalibrationState::Idle => {
                    log_debug!("Pull-up calibration: settling for {} ms", self.settings.settle_ms);
                    self.state = CalibrationState::Settling {
                        until: now.saturating_add(self.settings.settle_ms as u64),
                    };
                }
                CalibrationState::Settling { until } => {
                    if now < until {
                        return Err(nb::Error::WouldBlock);
                    }
                    self.state = CalibrationState::Sampling { taken: 0, next_at: now };
                }
                CalibrationState::Sampling { taken, next_at } => {
                    if now < next_at {
                        return Err(nb::Error::WouldBlock);
                    }
                    if taken >= self.settings.sample_count {
                        let result = self.finish();
                        self.state = CalibrationState::Done(result);
                        continue;
                    }

                    self.take_sample(adc.read_raw());
                    self.state = CalibrationState::Sampling {
                        taken: taken + 1,
                        next_at: now.saturating_add(self.settings.sample_interval_ms as u64),
                    };
                    return Err(nb::Error::WouldBlock);
                }
                CalibrationState::Done(result) => return Ok(result),
            }
        }
    }

    /// Run to completion, busy-polling `clock`
    ///
    /// Blocks for [`CalibrationSettings::duration_ms`] of clock time.
    pub fn run_blocking<A, C>(mut self, adc: &mut A, clock: &C) -> PullupResistance
    where
        A: AdcSource + ?Sized,
        C: TimeSource + ?Sized,
    {
        match nb::block!(self.poll(clock.now(), &mut *adc)) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    fn take_sample(&mut self, raw: u16) {
        let voltage = adc_to_voltage(raw, &self.circuit);
        if voltage < self.settings.min_voltage || voltage > self.settings.max_voltage {
            log_debug!("Calibration sample {} rejected: {} V outside window", raw, voltage);
            return;
        }

        let estimate = pullup_from_voltage(voltage, self.settings.reference_ohms, &self.circuit);
        if estimate.is_valid()
            && estimate > self.settings.min_pullup_ohms
            && estimate < self.settings.max_pullup_ohms
        {
            self.sum_ohms += estimate;
            self.accepted += 1;
        } else {
            log_debug!("Calibration estimate {} Ω rejected", estimate);
        }
    }

    fn finish(&self) -> PullupResistance {
        if self.accepted == 0 {
            log_warn!(
                "Pull-up calibration found no usable samples, keeping {} Ω",
                self.previous.ohms()
            );
            return self.previous;
        }

        let ohms = self.sum_ohms / self.accepted as f32;
        log_info!(
            "Pull-up calibrated to {} Ω from {}/{} samples",
            ohms,
            self.accepted,
            self.settings.sample_count
        );
        PullupResistance::calibrated(ohms, self.accepted)
    }
}
