//! Shared fixtures for the integration tests
//!
//! Provides:
//! - Scripted ADC and temperature sources that replay a fixed sequence
//! - Helpers to compute the ADC count for a given node voltage
//! - Tolerance assertions for `f32` results

#![allow(dead_code)]

use oilpress_core::traits::{AdcSource, ChipTemperatureSource, TemperatureSource};
use oilpress_core::constants::circuit::ADC_MAX_COUNT;
use oilpress_core::CircuitConstants;

/// ADC that replays a script and then repeats its last value
#[derive(Debug, Clone)]
pub struct ScriptedAdc {
    samples: Vec<u16>,
    cursor: usize,
    pub reads: usize,
}

impl ScriptedAdc {
    pub fn new(samples: Vec<u16>) -> Self {
        assert!(!samples.is_empty(), "script needs at least one sample");
        Self { samples, cursor: 0, reads: 0 }
    }

    pub fn constant(raw: u16) -> Self {
        Self::new(vec![raw])
    }
}

impl AdcSource for ScriptedAdc {
    fn read_raw(&mut self) -> u16 {
        self.reads += 1;
        let raw = self.samples[self.cursor];
        if self.cursor + 1 < self.samples.len() {
            self.cursor += 1;
        }
        raw
    }
}

/// Probe that replays a script of raw readings, sentinel included
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    readings: Vec<f32>,
    cursor: usize,
}

impl ScriptedProbe {
    pub fn new(readings: Vec<f32>) -> Self {
        assert!(!readings.is_empty(), "script needs at least one reading");
        Self { readings, cursor: 0 }
    }

    pub fn constant(celsius: f32) -> Self {
        Self::new(vec![celsius])
    }

    /// What the one-wire driver returns with no device on the bus
    pub fn disconnected() -> Self {
        Self::constant(-127.0)
    }
}

impl TemperatureSource for ScriptedProbe {
    fn read_celsius(&mut self) -> f32 {
        let celsius = self.readings[self.cursor];
        if self.cursor + 1 < self.readings.len() {
            self.cursor += 1;
        }
        celsius
    }
}

/// Die sensor with a fixed reading
#[derive(Debug, Clone, Copy)]
pub struct FixedDie(pub f32);

impl ChipTemperatureSource for FixedDie {
    fn read_chip_celsius(&mut self) -> Option<f32> {
        Some(self.0)
    }
}

/// Nearest ADC count for a node voltage under `circuit`
pub fn count_for_voltage(voltage: f32, circuit: &CircuitConstants) -> u16 {
    let count = ((voltage - circuit.adc_offset) / circuit.adc_gain).round();
    count.clamp(0.0, ADC_MAX_COUNT as f32) as u16
}

/// Node voltage of the divider for a given sender and pull-up
pub fn divider_voltage(sender_ohms: f32, pullup_ohms: f32, circuit: &CircuitConstants) -> f32 {
    circuit.supply_voltage * sender_ohms / (pullup_ohms + sender_ohms)
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}
