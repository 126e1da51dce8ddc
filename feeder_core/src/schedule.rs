//! Schedule store: three independently configurable time-of-day slots.

use crate::error::{FeederError, Result};

/// Number of schedule slots.
pub const SLOT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleSlot {
    pub enabled: bool,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// Grams added on top of the bowl's current contents.
    pub add_g: f32,
}

impl ScheduleSlot {
    pub const fn disabled(hour: u8, minute: u8) -> Self {
        Self {
            enabled: false,
            hour,
            minute,
            add_g: 0.0,
        }
    }

    /// Effective enabled policy: a zero-weight slot never fires.
    pub fn is_active(&self) -> bool {
        self.enabled && self.add_g > 0.0
    }
}

/// Factory slots used when no configuration supplies them.
pub const DEFAULT_SLOTS: [ScheduleSlot; SLOT_COUNT] = [
    ScheduleSlot::disabled(8, 0),
    ScheduleSlot::disabled(12, 0),
    ScheduleSlot::disabled(18, 0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStore {
    slots: [ScheduleSlot; SLOT_COUNT],
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS)
    }
}

impl ScheduleStore {
    pub fn new(slots: [ScheduleSlot; SLOT_COUNT]) -> Self {
        Self { slots }
    }

    pub fn slot(&self, index: usize) -> Option<&ScheduleSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[ScheduleSlot; SLOT_COUNT] {
        &self.slots
    }

    /// Overwrite one slot with edited values. Enabled follows `add_g > 0`.
    pub fn commit(&mut self, index: usize, hour: u8, minute: u8, add_g: f32) -> Result<()> {
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(eyre::Report::new(FeederError::State(format!(
                "slot index {index} out of range"
            ))));
        };
        if hour > 23 || minute > 59 {
            return Err(eyre::Report::new(FeederError::State(format!(
                "invalid slot time {hour:02}:{minute:02}"
            ))));
        }
        let add_g = if add_g.is_finite() { add_g.max(0.0) } else { 0.0 };
        *slot = ScheduleSlot {
            enabled: add_g > 0.0,
            hour,
            minute,
            add_g,
        };
        tracing::info!(slot = index, hour, minute, add_g, "schedule slot saved");
        Ok(())
    }

    pub fn replace_all(&mut self, slots: [ScheduleSlot; SLOT_COUNT]) {
        self.slots = slots;
    }
}
