//! Divider Circuit and ADC Constants
//!
//! The sender sits at the bottom of a voltage divider:
//!
//! ```text
//!  V_SUPPLY ──[ R_pullup ]──┬── ADC pin
//!                           │
//!                      [ R_sensor ]
//!                           │
//!                          GND
//! ```
//!
//! All values were taken with a bench multimeter on the reference board.

/// Voltage at the top of the divider (V).
///
/// Nominally 5 V from USB; measured under load.
pub const SUPPLY_VOLTAGE_V: f32 = 4.983;

/// ADC transfer slope (V per count).
///
/// Fitted from measured reference voltages at 12-bit
/// resolution with 11 dB attenuation: `V = gain * count + offset`.
pub const ADC_GAIN_V_PER_COUNT: f32 = 0.000860761;

/// ADC transfer offset (V).
///
/// Intercept of the same fit.
pub const ADC_OFFSET_V: f32 = 0.0288261;

/// Distance from either rail inside which the divider is not solved (V).
///
/// Near 0 V the sender looks like a short, near the supply it looks like an
/// open circuit; both blow up the division.
pub const RAIL_MARGIN_V: f32 = 0.05;

/// Largest count the 12-bit ADC can report.
pub const ADC_MAX_COUNT: u16 = 4095;
