//! Sender Curve
//!
//! VDO 5 bar oil pressure sender (resistance rises with pressure).
//!
//! Source: sender resistance table, rounded to the nearest ohm.

use crate::lookup::CalibrationPoint;

/// Resistance/pressure pairs for the VDO 5 bar sender.
///
/// | Ω    | bar |
/// |------|-----|
/// | 10   | 0   |
/// | 43   | 1   |
/// | 79   | 2   |
/// | 111  | 3   |
/// | 136  | 4   |
/// | 184  | 5   |
pub static VDO_5BAR_CURVE: [CalibrationPoint; 6] = [
    CalibrationPoint::new(10.0, 0.0),
    CalibrationPoint::new(43.0, 1.0),
    CalibrationPoint::new(79.0, 2.0),
    CalibrationPoint::new(111.0, 3.0),
    CalibrationPoint::new(136.0, 4.0),
    CalibrationPoint::new(184.0, 5.0),
];

/// Reported pressure at and above the top of the curve (bar).
///
/// This is the gauge's full-scale value, kept separate from the last table
/// entry so a different sender curve can saturate at the gauge range.
pub const VDO_MAX_PRESSURE_BAR: f32 = 5.0;
