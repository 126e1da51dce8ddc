//! Test and helper mocks for feeder_core.
//!
//! Handles are shared `Rc<Cell<_>>` so a test can move the mock into the app
//! and keep poking at it from outside.

use std::cell::Cell;
use std::rc::Rc;

/// Weight sensor whose reading is set by the test.
#[derive(Debug, Clone)]
pub struct ManualScale {
    weight: Rc<Cell<f32>>,
    fail: Rc<Cell<bool>>,
}

impl ManualScale {
    pub fn new(grams: f32) -> Self {
        Self {
            weight: Rc::new(Cell::new(grams)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    /// Handle to change the reading after the scale was moved.
    pub fn handle(&self) -> Rc<Cell<f32>> {
        self.weight.clone()
    }

    /// While set, reads fail with an I/O error.
    pub fn fail_handle(&self) -> Rc<Cell<bool>> {
        self.fail.clone()
    }
}

impl feeder_traits::WeightSensor for ManualScale {
    fn read_weight(
        &mut self,
        _feeding_active: bool,
        _gate_open: bool,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail.get() {
            return Err(Box::new(std::io::Error::other("manual scale offline")));
        }
        Ok(self.weight.get())
    }
}

/// Gate that records commands.
#[derive(Debug, Clone, Default)]
pub struct SpyGate {
    open: Rc<Cell<bool>>,
    opens: Rc<Cell<u32>>,
    closes: Rc<Cell<u32>>,
    fail_open: Rc<Cell<bool>>,
}

impl SpyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn opens(&self) -> u32 {
        self.opens.get()
    }

    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    /// The next `open()` call fails once.
    pub fn fail_next_open(&self) {
        self.fail_open.set(true);
    }
}

impl feeder_traits::Gate for SpyGate {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_open.replace(false) {
            return Err(Box::new(std::io::Error::other("servo not responding")));
        }
        self.opens.set(self.opens.get() + 1);
        self.open.set(true);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.closes.set(self.closes.get() + 1);
        self.open.set(false);
        Ok(())
    }
}
