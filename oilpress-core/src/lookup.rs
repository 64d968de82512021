//! Sender Curve Lookup
//!
//! ## Motivation
//!
//! Resistive pressure senders are not linear. The manufacturer publishes a
//! handful of resistance/pressure pairs, and between them a straight line is
//! well inside the sender's own tolerance. A table of six points costs 48
//! bytes of flash and a linear scan, no floating point transcendental maths.
//!
//! ## Table Rules
//!
//! A [`PressureCurve`] only accepts tables where
//! 1. there are at least two points,
//! 2. resistance strictly increases,
//! 3. pressure never decreases.
//!
//! These are checked once, at construction; lookups assume them.
//!
//! ## Lookup Semantics
//!
//! ```text
//!  bar
//!  ceiling ┤                          ●━━━━━━━━  (≥ last point: ceiling)
//!          │                    ●────/
//!          │              ●────/
//!          │        ●────/
//!    floor ┤━━━━━━━●/                            (≤ first point: floor)
//!          └───────┬────────────────────┬──────> Ω
//!               R[0]                  R[n-1]
//! ```
//!
//! - At or below the first resistance: the first point's pressure.
//! - At or above the last resistance: the configured ceiling. This is the
//!   gauge's full-scale value and may differ from the last table entry.
//! - Otherwise: linear interpolation between the first bracketing pair,
//!   scanning from the low end. Exact table resistances return that point's
//!   pressure exactly.
//!
//! ```rust
//! use oilpress_core::PressureCurve;
//!
//! let curve = PressureCurve::vdo_5bar();
//! assert_eq!(curve.pressure_at(Some(43.0)), Some(1.0));
//! assert_eq!(curve.pressure_at(Some(500.0)), Some(5.0));
//! assert_eq!(curve.pressure_at(None), None);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::sender::{VDO_5BAR_CURVE, VDO_MAX_PRESSURE_BAR};
use crate::errors::{MeterError, MeterResult};
use crate::traits::Validatable;

/// One point of a sender curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationPoint {
    /// Sender resistance (Ω)
    pub ohms: f32,
    /// Pressure at that resistance (bar)
    pub bar: f32,
}

impl CalibrationPoint {
    /// Pair a resistance with its pressure
    pub const fn new(ohms: f32, bar: f32) -> Self {
        Self { ohms, bar }
    }
}

/// Validated, immutable resistance → pressure curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureCurve {
    points: &'static [CalibrationPoint],
    ceiling_bar: f32,
}

impl PressureCurve {
    /// Check a table and wrap it
    ///
    /// `ceiling_bar` is reported for every resistance at or above the last
    /// point.
    pub fn new(points: &'static [CalibrationPoint], ceiling_bar: f32) -> MeterResult<Self> {
        if points.len() < 2 {
            return Err(MeterError::CurveTooShort { len: points.len() });
        }

        for (index, point) in points.iter().enumerate() {
            if !point.ohms.is_valid() || !point.bar.is_valid() {
                return Err(MeterError::CurveNotMonotonic { index });
            }
            if index > 0 {
                let prev = &points[index - 1];
                if point.ohms <= prev.ohms || point.bar < prev.bar {
                    return Err(MeterError::CurveNotMonotonic { index });
                }
            }
        }

        if !ceiling_bar.is_valid() {
            return Err(MeterError::InvalidConstant {
                name: "ceiling_bar",
                value: ceiling_bar,
            });
        }

        Ok(Self { points, ceiling_bar })
    }

    /// Curve of the VDO 5 bar sender fitted to the reference board
    pub fn vdo_5bar() -> Self {
        Self {
            points: &VDO_5BAR_CURVE,
            ceiling_bar: VDO_MAX_PRESSURE_BAR,
        }
    }

    /// The table points, lowest resistance first
    pub fn points(&self) -> &'static [CalibrationPoint] {
        self.points
    }

    /// Pressure reported at the low end
    pub fn floor_bar(&self) -> f32 {
        self.points[0].bar
    }

    /// Pressure reported at and above the high end
    pub fn ceiling_bar(&self) -> f32 {
        self.ceiling_bar
    }

    /// Map a sender resistance to pressure
    ///
    /// `None` in gives `None` out. A non-finite resistance is treated the
    /// same way.
    pub fn pressure_at(&self, ohms: Option<f32>) -> Option<f32> {
        let r = ohms.and_then(Validatable::valid)?;

        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if r <= first.ohms {
            return Some(first.bar);
        }
        if r >= last.ohms {
            return Some(self.ceiling_bar);
        }

        for pair in self.points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if r >= lo.ohms && r <= hi.ohms {
                if r == hi.ohms {
                    return Some(hi.bar);
                }
                return Some(lo.bar + (r - lo.ohms) * (hi.bar - lo.bar) / (hi.ohms - lo.ohms));
            }
        }

        // Only reachable with a table that bypassed `new`
        log_warn!("Sender curve has no bracket for {} Ω", r);
        None
    }
}

impl Default for PressureCurve {
    fn default() -> Self {
        Self::vdo_5bar()
    }
}
