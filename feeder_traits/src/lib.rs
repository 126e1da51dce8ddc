pub mod clock;

pub use clock::{Clock, DateTime, MonotonicClock, SyntheticWallClock, WallClock};

/// Load cell (or simulation) returning a filtered weight in grams.
///
/// The flags describe what the controller is doing so simulated sensors can
/// model the bowl filling while the gate is open. The sign of the reading is
/// not guaranteed meaningful; callers take the absolute value.
pub trait WeightSensor {
    fn read_weight(
        &mut self,
        feeding_active: bool,
        gate_open: bool,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Dispensing gate. Both commands are idempotent and give no feedback.
pub trait Gate {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: WeightSensor + ?Sized> WeightSensor for Box<T> {
    fn read_weight(
        &mut self,
        feeding_active: bool,
        gate_open: bool,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_weight(feeding_active, gate_open)
    }
}

impl<T: Gate + ?Sized> Gate for Box<T> {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).open()
    }
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).close()
    }
}
