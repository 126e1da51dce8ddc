#![cfg(feature = "hardware")]

use std::time::Duration;

use feeder_hardware::hardware::HardwareScale;
use feeder_traits::WeightSensor;

// Needs a Pi with an HX711 on BCM 5/6. Without wiring DT floats high and the
// read must time out quickly instead of spinning.

#[test]
#[ignore = "requires GPIO hardware"]
fn unwired_scale_times_out() {
    let mut sc = HardwareScale::try_new(5, 6, 420.0, 1, Duration::from_millis(5))
        .expect("make scale");
    let err = sc.read_weight(false, false).expect_err("expect timeout");
    assert!(err.to_string().to_lowercase().contains("timeout"));
}

#[test]
fn zero_calibration_factor_is_rejected() {
    let err = HardwareScale::try_new(5, 6, 0.0, 1, Duration::from_millis(5))
        .err()
        .expect("reject");
    assert!(err.to_string().contains("calibration"));
}
