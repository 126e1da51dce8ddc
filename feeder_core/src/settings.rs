//! Slot editor: Hour → Minute → Weight → Saved, one confirm per step.
//!
//! Values are staged in an [`EditBuffer`] seeded from the stored slot and
//! written back only when the weight step is confirmed. There is no cancel;
//! every confirm moves forward.

use crate::config::SettingsCfg;
use crate::error::Result;
use crate::input::Adjust;
use crate::schedule::ScheduleStore;
use crate::util::{clamp_step, wrap_step};

/// Staged copy of the slot being edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditBuffer {
    pub hour: u8,
    pub minute: u8,
    pub weight_g: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SettingsState {
    #[default]
    NotEditing,
    EditingHour(EditBuffer),
    EditingMinute(EditBuffer),
    EditingWeight(EditBuffer),
    /// Confirmation shown after commit.
    Saved,
}

impl SettingsState {
    pub fn buffer(&self) -> Option<&EditBuffer> {
        match self {
            SettingsState::EditingHour(b)
            | SettingsState::EditingMinute(b)
            | SettingsState::EditingWeight(b) => Some(b),
            SettingsState::NotEditing | SettingsState::Saved => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsMachine {
    cfg: SettingsCfg,
    state: SettingsState,
    slot: usize,
}

impl SettingsMachine {
    pub fn new(cfg: SettingsCfg) -> Self {
        Self {
            cfg,
            state: SettingsState::NotEditing,
            slot: 0,
        }
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    /// Slot the editor is bound to (meaningful while engaged).
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_engaged(&self) -> bool {
        self.state != SettingsState::NotEditing
    }

    /// Enter `EditingHour` for `slot`, seeded from the stored values.
    /// Ignored unless currently not editing or the slot does not exist.
    pub fn begin(&mut self, slot: usize, store: &ScheduleStore) -> bool {
        if self.is_engaged() {
            return false;
        }
        let Some(s) = store.slot(slot) else {
            return false;
        };
        self.slot = slot;
        self.state = SettingsState::EditingHour(EditBuffer {
            hour: s.hour,
            minute: s.minute,
            weight_g: s.add_g,
        });
        tracing::debug!(slot, "slot editor opened");
        true
    }

    /// Advance one step. The weight step commits into `store`.
    pub fn confirm(&mut self, store: &mut ScheduleStore) -> Result<bool> {
        self.state = match self.state {
            SettingsState::NotEditing => return Ok(false),
            SettingsState::EditingHour(b) => SettingsState::EditingMinute(b),
            SettingsState::EditingMinute(b) => SettingsState::EditingWeight(b),
            SettingsState::EditingWeight(b) => {
                store.commit(self.slot, b.hour, b.minute, b.weight_g)?;
                SettingsState::Saved
            }
            SettingsState::Saved => SettingsState::NotEditing,
        };
        tracing::debug!(slot = self.slot, state = ?self.state, "slot editor advanced");
        Ok(true)
    }

    /// Change the field bound to the current step.
    pub fn adjust(&mut self, dir: Adjust) -> bool {
        let up = dir.is_up();
        match &mut self.state {
            SettingsState::EditingHour(b) => b.hour = wrap_step(b.hour, 24, up),
            SettingsState::EditingMinute(b) => b.minute = wrap_step(b.minute, 60, up),
            SettingsState::EditingWeight(b) => {
                b.weight_g = clamp_step(
                    b.weight_g,
                    self.cfg.weight_step_g,
                    self.cfg.weight_max_g,
                    up,
                )
            }
            SettingsState::NotEditing | SettingsState::Saved => return false,
        }
        true
    }

    /// Discard any staged edit.
    pub fn reset(&mut self) {
        self.state = SettingsState::NotEditing;
        self.slot = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleSlot;

    fn store() -> ScheduleStore {
        ScheduleStore::new([
            ScheduleSlot {
                enabled: true,
                hour: 7,
                minute: 45,
                add_g: 200.0,
            },
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ])
    }

    #[test]
    fn buffer_is_seeded_from_stored_slot() {
        let store = store();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        assert!(m.begin(0, &store));
        assert_eq!(
            m.state(),
            &SettingsState::EditingHour(EditBuffer {
                hour: 7,
                minute: 45,
                weight_g: 200.0
            })
        );
    }

    #[test]
    fn full_walk_commits_only_at_weight_confirm() {
        let mut store = store();
        let before = store.clone();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        m.begin(1, &store);

        m.adjust(Adjust::Down); // 11
        m.confirm(&mut store).expect("hour");
        m.adjust(Adjust::Up); // 01
        m.confirm(&mut store).expect("minute");
        m.adjust(Adjust::Up);
        m.adjust(Adjust::Up); // 200 g
        assert_eq!(store, before, "nothing committed before weight confirm");

        m.confirm(&mut store).expect("weight");
        assert_eq!(m.state(), &SettingsState::Saved);
        let s = store.slot(1).copied().expect("slot");
        assert_eq!((s.hour, s.minute, s.add_g, s.enabled), (11, 1, 200.0, true));

        m.confirm(&mut store).expect("dismiss");
        assert!(!m.is_engaged());
    }

    #[test]
    fn hour_and_minute_wrap_weight_clamps() {
        let store = store();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        m.begin(2, &store); // 18:00, 0 g
        for _ in 0..6 {
            m.adjust(Adjust::Up);
        }
        assert_eq!(m.state().buffer().map(|b| b.hour), Some(0));

        let mut scratch = store.clone();
        m.confirm(&mut scratch).expect("hour");
        m.adjust(Adjust::Down);
        assert_eq!(m.state().buffer().map(|b| b.minute), Some(59));

        m.confirm(&mut scratch).expect("minute");
        m.adjust(Adjust::Down);
        assert_eq!(m.state().buffer().map(|b| b.weight_g), Some(0.0));
        for _ in 0..200 {
            m.adjust(Adjust::Up);
        }
        assert_eq!(m.state().buffer().map(|b| b.weight_g), Some(9999.0));
    }

    #[test]
    fn zero_weight_commit_disables_slot() {
        let mut store = store();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        m.begin(0, &store);
        m.confirm(&mut store).expect("hour");
        m.confirm(&mut store).expect("minute");
        m.adjust(Adjust::Down);
        m.adjust(Adjust::Down);
        m.confirm(&mut store).expect("weight");
        let s = store.slot(0).copied().expect("slot");
        assert_eq!(s.add_g, 0.0);
        assert!(!s.enabled);
        assert!(!s.is_active());
    }

    #[test]
    fn events_outside_editing_are_ignored() {
        let mut store = store();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        assert!(!m.adjust(Adjust::Up));
        assert!(!m.confirm(&mut store).expect("confirm"));
        assert!(!m.begin(7, &store));
        assert!(m.begin(0, &store));
        assert!(!m.begin(1, &store), "cannot re-enter while editing");
    }

    #[test]
    fn reset_discards_staged_edit() {
        let mut store = store();
        let before = store.clone();
        let mut m = SettingsMachine::new(SettingsCfg::default());
        m.begin(0, &store);
        m.confirm(&mut store).expect("hour");
        m.confirm(&mut store).expect("minute");
        m.adjust(Adjust::Up);
        m.reset();
        assert!(!m.is_engaged());
        assert_eq!(store, before);
    }
}
