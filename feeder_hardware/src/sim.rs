//! Simulated weight sensor and gate for host runs and tests.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use feeder_traits::{Clock, Gate, WeightSensor};

/// Bowl scale that fills at a fixed rate while the gate is reported open.
///
/// Flow is integrated between consecutive reads using the injected clock,
/// so the amount added does not depend on how often the host polls. With a
/// hopper limit set, flow stops once that many grams have been dispensed.
pub struct SimulatedScale {
    weight: Rc<Cell<f32>>,
    flow_g_per_s: f32,
    hopper_left_g: Option<f32>,
    clock: Arc<dyn Clock + Send + Sync>,
    last_read: Instant,
}

impl core::fmt::Debug for SimulatedScale {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedScale")
            .field("weight_g", &self.weight.get())
            .field("flow_g_per_s", &self.flow_g_per_s)
            .field("hopper_left_g", &self.hopper_left_g)
            .finish()
    }
}

impl SimulatedScale {
    pub fn new(
        initial_g: f32,
        flow_g_per_s: f32,
        hopper_g: Option<f32>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let last_read = clock.now();
        Self {
            weight: Rc::new(Cell::new(initial_g)),
            flow_g_per_s: flow_g_per_s.max(0.0),
            hopper_left_g: hopper_g.map(|h| h.max(0.0)),
            clock,
            last_read,
        }
    }

    /// Shared handle on the bowl weight (e.g. to simulate the pet eating).
    pub fn weight_handle(&self) -> Rc<Cell<f32>> {
        self.weight.clone()
    }

    pub fn hopper_left(&self) -> Option<f32> {
        self.hopper_left_g
    }
}

impl WeightSensor for SimulatedScale {
    fn read_weight(
        &mut self,
        _feeding_active: bool,
        gate_open: bool,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let now = self.clock.now();
        let dt_s = now.saturating_duration_since(self.last_read).as_secs_f32();
        self.last_read = now;
        if gate_open {
            let mut added = self.flow_g_per_s * dt_s;
            if let Some(left) = self.hopper_left_g.as_mut() {
                added = added.min(*left);
                *left -= added;
            }
            self.weight.set(self.weight.get() + added);
        }
        let w = self.weight.get();
        tracing::trace!(w, gate_open, "simulated scale read");
        Ok(w)
    }
}

#[derive(Debug, Default)]
struct GateState {
    open: Cell<bool>,
    commands: Cell<u32>,
}

/// Gate that only tracks its position. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGate {
    state: Rc<GateState>,
}

impl SimulatedGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.state.open.get()
    }

    /// Total open/close commands received.
    pub fn commands(&self) -> u32 {
        self.state.commands.get()
    }

    fn set(&self, open: bool) {
        self.state.commands.set(self.state.commands.get() + 1);
        if self.state.open.replace(open) != open {
            tracing::debug!(open, "simulated gate moved");
        }
    }
}

impl Gate for SimulatedGate {
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.set(true);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.set(false);
        Ok(())
    }
}
