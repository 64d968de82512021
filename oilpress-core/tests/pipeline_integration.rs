//! End-to-end tests: sources in, rendered document out

#![cfg(feature = "std")]

mod common;

use common::{assert_close, FixedDie, ScriptedAdc, ScriptedProbe};
use oilpress_core::{
    snapshot::SNAPSHOT_JSON_CAPACITY,
    time::{MockTimeSource, MonotonicClock},
    CalibrationSettings, CircuitConstants, Meter, MeterConfig, MeterError, PressureCurve, PullupOrigin,
    SharedMeter,
};
use serde_json::Value;

fn render(meter: &mut Meter<ScriptedAdc, ScriptedProbe, FixedDie>) -> Value {
    let json = meter.measure().to_json().expect("snapshot fits the buffer");
    serde_json::from_str(json.as_str()).expect("rendered snapshot is valid JSON")
}

fn render_plain(meter: &mut Meter<ScriptedAdc, ScriptedProbe>) -> Value {
    let json = meter.measure().to_json().expect("snapshot fits the buffer");
    serde_json::from_str(json.as_str()).expect("rendered snapshot is valid JSON")
}

fn meter(adc: ScriptedAdc, probe: ScriptedProbe) -> Meter<ScriptedAdc, ScriptedProbe, FixedDie> {
    Meter::new(MeterConfig::default(), adc, probe)
        .unwrap()
        .with_chip_sensor(FixedDie(44.25))
}

#[test]
fn test_reference_reading_document() {
    let mut meter = meter(ScriptedAdc::constant(2048), ScriptedProbe::constant(95.06));
    let doc = render(&mut meter);

    assert_eq!(doc["adc"], 2048);
    assert_close(doc["vadc"].as_f64().unwrap() as f32, 1.792, 1e-6);
    assert_close(doc["rs"].as_f64().unwrap() as f32, 123.5, 1e-6);
    assert_close(doc["bar_raw"].as_f64().unwrap() as f32, 3.50, 1e-6);
    assert_eq!(doc["oil_bar"], doc["bar_raw"]);
    assert_close(doc["oil_temp"].as_f64().unwrap() as f32, 95.1, 1e-6);
    assert_close(doc["esp_temp"].as_f64().unwrap() as f32, 44.2, 0.11);
    assert_close(doc["v_supply"].as_f64().unwrap() as f32, 4.983, 1e-6);
    assert_close(doc["rpu"].as_f64().unwrap() as f32, 220.0, 1e-6);
    assert_eq!(doc["sw"], "1.0");
    assert_eq!(doc["hw"], "0.1");
    assert_eq!(doc.as_object().unwrap().len(), 11);
}

#[test]
fn test_missing_values_render_as_null() {
    let mut meter = meter(ScriptedAdc::constant(0), ScriptedProbe::disconnected());
    let doc = render(&mut meter);

    assert!(doc["rs"].is_null());
    assert!(doc["bar_raw"].is_null());
    assert!(doc["oil_bar"].is_null());
    assert!(doc["oil_temp"].is_null());

    // The raw channel is still reported
    assert_eq!(doc["adc"], 0);
    assert!(doc["vadc"].as_f64().unwrap() < 0.05);
}

#[test]
fn test_open_sender_reads_as_missing_not_full_scale() {
    // A front end whose full-scale count lands past the supply rail
    let circuit = CircuitConstants { adc_gain: 0.00125, ..Default::default() };
    let config = MeterConfig::default().with_circuit(circuit);
    let mut meter = Meter::new(config, ScriptedAdc::constant(4095), ScriptedProbe::constant(80.0)).unwrap();

    let snapshot = meter.measure();
    assert_eq!(snapshot.voltage, circuit.supply_voltage);
    assert_eq!(snapshot.resistance_ohms, None);
    assert_eq!(snapshot.filtered_bar, None);
}

#[test]
fn test_step_response_through_meter() {
    let mut meter = meter(
        ScriptedAdc::new(vec![1000, 1500, 1500, 1500, 1500, 1500]),
        ScriptedProbe::constant(90.0),
    );
    let curve = PressureCurve::vdo_5bar();

    let low = meter.measure();
    assert_eq!(low.filtered_bar, low.raw_bar);

    let target = curve.pressure_at(meter.measure().resistance_ohms).unwrap();
    let mut error = (target - low.raw_bar.unwrap()).abs() * 0.8;
    for _ in 0..4 {
        let smoothed = meter.measure().filtered_bar.unwrap();
        let next = (target - smoothed).abs();
        assert_close(next, error * 0.8, 1e-4);
        error = next;
    }
}

#[test]
fn test_dropout_reseeds_filter() {
    let mut meter = meter(
        ScriptedAdc::new(vec![2048, 2048, 0, 1000]),
        ScriptedProbe::constant(90.0),
    );

    meter.measure();
    meter.measure();
    assert_eq!(meter.measure().filtered_bar, None);

    let recovered = meter.measure();
    assert_eq!(recovered.filtered_bar, recovered.raw_bar);
}

#[test]
fn test_probe_hot_unplug() {
    let mut meter = meter(
        ScriptedAdc::constant(2048),
        ScriptedProbe::new(vec![88.0, -127.0, 88.5]),
    );

    assert_eq!(meter.measure().oil_temp_c, Some(88.0));
    assert_eq!(meter.measure().oil_temp_c, None);
    assert_eq!(meter.measure().oil_temp_c, Some(88.5));
}

#[test]
fn test_boot_with_calibration_from_config_document() {
    let config = MeterConfig::from_json(
        r#"{ "calibration": { "enabled": true, "reference_ohms": 9.7 } }"#,
    )
    .unwrap();

    // 16 calibration samples of the reference, then live readings
    let mut script = vec![478u16; 16];
    script.push(2048);
    let clock = MockTimeSource::new(0).with_auto_step(1);

    let mut meter = Meter::new(config, ScriptedAdc::new(script), ScriptedProbe::constant(90.0)).unwrap();
    let pullup = meter.start(&clock).unwrap();

    assert_eq!(pullup.origin(), PullupOrigin::Calibrated { accepted: 16 });
    assert_close(pullup.ohms(), 100.085, 0.05);

    let snapshot = meter.measure();
    assert_eq!(snapshot.adc, 2048);
    assert_close(snapshot.resistance_ohms.unwrap(), 56.19, 0.05);
    assert_close(snapshot.raw_bar.unwrap(), 1.366, 0.005);
    assert_eq!(snapshot.pullup_ohms, pullup.ohms());
}

#[test]
fn test_calibration_ignores_glitched_samples() {
    // Saturated and grounded samples mixed into the reference readings
    let mut script = vec![478u16; 16];
    script[3] = 4095;
    script[7] = 0;
    script[11] = 1709;

    let mut adc = ScriptedAdc::new(script);
    let clock = MockTimeSource::new(0).with_auto_step(1);
    let mut meter = Meter::new(MeterConfig::default(), &mut adc, ScriptedProbe::constant(90.0)).unwrap();

    let pullup = meter.calibrate_pullup(9.7, &clock).unwrap();
    assert_eq!(pullup.origin(), PullupOrigin::Calibrated { accepted: 13 });
    assert_close(pullup.ohms(), 100.085, 0.05);

    assert_eq!(meter.calibrate_pullup(9.7, &clock), Err(MeterError::PullupAlreadyFixed));
    drop(meter);
    assert_eq!(adc.reads, 16);
}

#[test]
fn test_disconnected_reference_keeps_initial_pullup() {
    let config = MeterConfig::default()
        .with_calibration(CalibrationSettings::enabled_with_reference(9.7));
    let clock = MockTimeSource::new(0).with_auto_step(1);
    let mut meter = Meter::new(config, ScriptedAdc::constant(4095), ScriptedProbe::constant(90.0)).unwrap();

    let pullup = meter.start(&clock).unwrap();
    assert_eq!(pullup.origin(), PullupOrigin::Fallback);
    assert_eq!(pullup.ohms(), 223.0);

    let doc = render_plain(&mut meter);
    assert_close(doc["rpu"].as_f64().unwrap() as f32, 223.0, 1e-6);
}

#[test]
fn test_calibration_disabled_uses_fallback_pullup() {
    let clock = MockTimeSource::new(0);
    let mut meter = Meter::new(
        MeterConfig::default(),
        ScriptedAdc::constant(478),
        ScriptedProbe::constant(90.0),
    )
    .unwrap();

    let pullup = meter.start(&clock).unwrap();
    assert_eq!(pullup.ohms(), 220.0);
    assert_eq!(render_plain(&mut meter)["rpu"], serde_json::json!(220.0));
}

#[test]
fn test_calibration_on_host_clock() {
    let settings = CalibrationSettings {
        settle_ms: 2,
        sample_interval_ms: 1,
        sample_count: 4,
        ..CalibrationSettings::enabled_with_reference(9.7)
    };
    let config = MeterConfig::default().with_calibration(settings);
    let mut meter = Meter::new(config, ScriptedAdc::constant(478), ScriptedProbe::constant(90.0)).unwrap();

    let started = std::time::Instant::now();
    let pullup = meter.start(&MonotonicClock::new()).unwrap();

    assert!(started.elapsed().as_millis() >= settings.duration_ms() as u128);
    assert_eq!(pullup.origin(), PullupOrigin::Calibrated { accepted: 4 });
}

#[test]
fn test_concurrent_requests_are_serialised() {
    use std::sync::Arc;

    let shared = Arc::new(SharedMeter::new(meter(
        ScriptedAdc::constant(2048),
        ScriptedProbe::constant(90.0),
    )));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let snapshot = shared.measure();
                let json = snapshot.to_json().unwrap();
                assert!(json.len() <= SNAPSHOT_JSON_CAPACITY);
                snapshot.filtered_bar.unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_close(handle.join().unwrap(), 3.50, 0.01);
    }
    assert_eq!(shared.pullup().ohms(), 220.0);
}
