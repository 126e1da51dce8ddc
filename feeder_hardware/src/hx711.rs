use std::time::Duration;
use tracing::trace;

use crate::error::Result;
use crate::util::wait_until_low_with_timeout;

/// Bit-banged HX711 24-bit load-cell ADC.
pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    gain_pulses: u8, // 25 = channel A, gain 128
}

impl Hx711 {
    pub fn new(
        dt_pin: rppal::gpio::InputPin,
        mut sck_pin: rppal::gpio::OutputPin,
        gain_pulses: u8,
    ) -> Result<Self> {
        sck_pin.set_low(); // clock idle low; held high >60 µs powers the chip down
        Ok(Self {
            dt: dt_pin,
            sck: sck_pin,
            gain_pulses: gain_pulses.clamp(25, 27),
        })
    }

    pub fn read_raw(&mut self, timeout: Duration) -> Result<i32> {
        let dt = &self.dt;
        wait_until_low_with_timeout(|| dt.is_high(), timeout, Duration::from_micros(200))?;

        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay();
        }
        // Extra pulses select gain/channel for the next conversion
        for _ in 24..self.gain_pulses {
            self.sck.set_high();
            spin_delay();
            self.sck.set_low();
            spin_delay();
        }

        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay() {
    std::hint::spin_loop();
}
