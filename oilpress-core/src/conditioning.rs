//! ADC Counts to Sender Resistance
//!
//! ## Signal Chain
//!
//! ```text
//! count ──[ linear map ]──> V_node ──[ divider solve ]──> R_sensor
//! ```
//!
//! ### Linear map
//!
//! The ESP32 ADC is far from ideal, but over the range the divider uses it is
//! close enough to a straight line that two fitted constants do the job:
//!
//! ```text
//! V = gain × count + offset,   clamped to [0, V_supply]
//! ```
//!
//! ### Divider solve
//!
//! With the pull-up between the supply and the node and the sender between
//! the node and ground:
//!
//! ```text
//! V_node = V_supply × R_s / (R_pu + R_s)
//! R_s    = R_pu × V_node / (V_supply - V_node)
//! ```
//!
//! The solution blows up as `V_node` approaches the supply (open sender) and
//! collapses to zero at ground (shorted sender). Inside a 50 mV margin of
//! either rail no resistance is reported at all; the caller gets `None`
//! rather than a huge or zero number that would read as a real pressure.
//!
//! ### Inverse: solving for the pull-up
//!
//! During calibration the sender resistance is known and the pull-up is the
//! unknown:
//!
//! ```text
//! R_pu = R_s × (V_supply / V_node - 1)
//! ```

use crate::config::CircuitConstants;
use crate::constants::circuit::{ADC_MAX_COUNT, RAIL_MARGIN_V};

/// Convert a raw ADC count to the node voltage
///
/// Counts above [`ADC_MAX_COUNT`] are treated as full scale. Always returns
/// a voltage inside `[0, supply_voltage]`.
pub fn adc_to_voltage(sample: u16, circuit: &CircuitConstants) -> f32 {
    let sample = sample.min(ADC_MAX_COUNT);
    let voltage = circuit.adc_gain * sample as f32 + circuit.adc_offset;
    if voltage < 0.0 {
        0.0
    } else if voltage > circuit.supply_voltage {
        circuit.supply_voltage
    } else {
        voltage
    }
}

/// Solve the divider for the sender resistance at a given node voltage
///
/// Returns `None` inside [`RAIL_MARGIN_V`] of either rail.
pub fn resistance_from_voltage(voltage: f32, pullup_ohms: f32, circuit: &CircuitConstants) -> Option<f32> {
    if voltage < RAIL_MARGIN_V || voltage > circuit.supply_voltage - RAIL_MARGIN_V {
        return None;
    }

    Some(pullup_ohms * voltage / (circuit.supply_voltage - voltage))
}

/// Convert a raw ADC count straight to sender resistance
pub fn sensor_resistance(sample: u16, pullup_ohms: f32, circuit: &CircuitConstants) -> Option<f32> {
    resistance_from_voltage(adc_to_voltage(sample, circuit), pullup_ohms, circuit)
}

/// Solve the divider for the pull-up, given a known sender resistance
///
/// Only meaningful for voltages strictly inside the rails; the calibration
/// routine filters voltages before calling this.
pub fn pullup_from_voltage(voltage: f32, known_ohms: f32, circuit: &CircuitConstants) -> f32 {
    known_ohms * (circuit.supply_voltage / voltage - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit() -> CircuitConstants {
        CircuitConstants::default()
    }

    fn close(a: f32, b: f32, tol: f32) -> bool {
        libm::fabsf(a - b) <= tol
    }

    #[test]
    fn linear_map_matches_fit() {
        let c = circuit();
        assert!(close(adc_to_voltage(0, &c), 0.0288261, 1e-6));
        assert!(close(adc_to_voltage(2048, &c), 1.791665, 1e-4));
    }

    #[test]
    fn linear_map_clamps_to_rails() {
        let c = CircuitConstants { adc_offset: -0.5, ..circuit() };
        assert_eq!(adc_to_voltage(0, &c), 0.0);

        // 4095 counts maps past 3.5 V; a steeper gain pushes it over the supply
        let c = CircuitConstants { adc_gain: 0.002, ..circuit() };
        assert_eq!(adc_to_voltage(4095, &c), c.supply_voltage);
    }

    #[test]
    fn counts_past_full_scale_read_as_full_scale() {
        let c = circuit();
        assert_eq!(adc_to_voltage(u16::MAX, &c), adc_to_voltage(ADC_MAX_COUNT, &c));
        assert_eq!(adc_to_voltage(ADC_MAX_COUNT + 1, &c), adc_to_voltage(ADC_MAX_COUNT, &c));
    }

    #[test]
    fn divider_at_midpoint_equals_pullup() {
        let c = circuit();
        let r = resistance_from_voltage(c.supply_voltage / 2.0, 220.0, &c).unwrap();
        assert!(close(r, 220.0, 1e-3));
    }

    #[test]
    fn divider_rejects_rails() {
        let c = circuit();
        assert_eq!(resistance_from_voltage(0.0, 220.0, &c), None);
        assert_eq!(resistance_from_voltage(0.049, 220.0, &c), None);
        assert_eq!(resistance_from_voltage(c.supply_voltage, 220.0, &c), None);
        assert_eq!(resistance_from_voltage(c.supply_voltage - 0.04, 220.0, &c), None);
        assert!(resistance_from_voltage(0.06, 220.0, &c).is_some());
    }

    #[test]
    fn rail_margin_itself_is_accepted() {
        let c = circuit();
        assert!(resistance_from_voltage(RAIL_MARGIN_V, 220.0, &c).is_some());
        assert!(resistance_from_voltage(c.supply_voltage - RAIL_MARGIN_V, 220.0, &c).is_some());
    }

    #[test]
    fn reference_sample_resolves_to_sender_resistance() {
        // 2048 counts, 220 Ω pull-up, 4.983 V supply
        let r = sensor_resistance(2048, 220.0, &circuit()).unwrap();
        assert!(close(r, 123.51, 0.05), "got {}", r);
    }

    #[test]
    fn pullup_inverse_round_trips() {
        let c = circuit();
        let r = resistance_from_voltage(0.45, 100.0, &c).unwrap();
        assert!(close(pullup_from_voltage(0.45, r, &c), 100.0, 1e-3));
    }
}
