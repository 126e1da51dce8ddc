//! Raspberry Pi drivers: HX711 bowl scale, servo gate and the button panel.

use std::time::Duration;

use feeder_traits::{Gate, WeightSensor};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::error::{HwError, Result};
use crate::hx711::Hx711;
use crate::util::{median_i32, servo_pulse};

const SERVO_PERIOD: Duration = Duration::from_millis(20);

pub struct HardwareScale {
    hx711: Hx711,
    calibration_factor: f32,
    offset: i32,
    samples: usize,
    read_timeout: Duration,
}

impl HardwareScale {
    /// `calibration_factor` is raw counts per gram.
    pub fn try_new(
        dt_pin: u8,
        sck_pin: u8,
        calibration_factor: f32,
        samples: u8,
        read_timeout: Duration,
    ) -> Result<Self> {
        if !(calibration_factor.is_finite() && calibration_factor != 0.0) {
            return Err(HwError::Calibration("calibration factor must be non-zero"));
        }
        let gpio = Gpio::new()?;
        let dt = gpio.get(dt_pin)?.into_input();
        let sck = gpio.get(sck_pin)?.into_output();
        Ok(Self {
            hx711: Hx711::new(dt, sck, 25)?,
            calibration_factor,
            offset: 0,
            samples: usize::from(samples.max(1)),
            read_timeout,
        })
    }

    fn read_median(&mut self) -> Result<i32> {
        let mut buf = Vec::with_capacity(self.samples);
        let mut attempts = 0;
        while buf.len() < self.samples {
            match self.hx711.read_raw(self.read_timeout) {
                Ok(raw) => buf.push(raw),
                Err(HwError::DataReadyTimeout) if attempts < 3 => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "scale timeout, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        median_i32(&mut buf).ok_or(HwError::Timeout)
    }

    /// Take the current reading as zero.
    pub fn tare(&mut self) -> Result<()> {
        self.offset = self.read_median()?;
        tracing::info!(offset = self.offset, "scale tared");
        Ok(())
    }
}

impl WeightSensor for HardwareScale {
    fn read_weight(
        &mut self,
        _feeding_active: bool,
        _gate_open: bool,
    ) -> std::result::Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.read_median()?;
        let grams = raw.saturating_sub(self.offset) as f32 / self.calibration_factor;
        tracing::debug!(raw, grams, "hx711 sample");
        Ok(grams)
    }
}

/// Hobby servo on a software-PWM pin; two fixed angles.
pub struct ServoGate {
    pin: OutputPin,
    open_angle: u8,
    closed_angle: u8,
}

impl ServoGate {
    pub fn try_new(pin: u8, open_angle: u8, closed_angle: u8) -> Result<Self> {
        let pin = Gpio::new()?.get(pin)?.into_output();
        let mut gate = Self {
            pin,
            open_angle,
            closed_angle,
        };
        gate.move_to(closed_angle)?;
        Ok(gate)
    }

    fn move_to(&mut self, angle: u8) -> Result<()> {
        self.pin.set_pwm(SERVO_PERIOD, servo_pulse(angle))?;
        tracing::debug!(angle, "servo moved");
        Ok(())
    }
}

impl Gate for ServoGate {
    fn open(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.move_to(self.open_angle)?)
    }

    fn close(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.move_to(self.closed_angle)?)
    }
}

/// Four momentary buttons wired to ground with internal pull-ups.
pub struct ButtonPanel {
    pins: [InputPin; 4],
}

impl ButtonPanel {
    /// Pins in order: display, setting, increase, decrease.
    pub fn try_new(pins: [u8; 4]) -> Result<Self> {
        let gpio = Gpio::new()?;
        let [a, b, c, d] = pins;
        Ok(Self {
            pins: [
                gpio.get(a)?.into_input_pullup(),
                gpio.get(b)?.into_input_pullup(),
                gpio.get(c)?.into_input_pullup(),
                gpio.get(d)?.into_input_pullup(),
            ],
        })
    }

    /// Pressed levels in constructor order (active-low).
    pub fn sample(&self) -> [bool; 4] {
        [
            self.pins[0].is_low(),
            self.pins[1].is_low(),
            self.pins[2].is_low(),
            self.pins[3].is_low(),
        ]
    }
}
