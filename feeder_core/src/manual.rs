//! Manual feed amount selection.

use crate::config::ManualCfg;
use crate::input::Adjust;
use crate::util::clamp_step;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ManualState {
    #[default]
    Idle,
    Selecting {
        amount_g: f32,
    },
}

#[derive(Debug, Clone)]
pub struct ManualSetup {
    cfg: ManualCfg,
    state: ManualState,
    last_amount_g: Option<f32>,
}

impl ManualSetup {
    pub fn new(cfg: ManualCfg) -> Self {
        Self {
            cfg,
            state: ManualState::Idle,
            last_amount_g: None,
        }
    }

    pub fn state(&self) -> &ManualState {
        &self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state != ManualState::Idle
    }

    pub fn pending(&self) -> Option<f32> {
        match self.state {
            ManualState::Selecting { amount_g } => Some(amount_g),
            ManualState::Idle => None,
        }
    }

    pub fn last_amount(&self) -> Option<f32> {
        self.last_amount_g
    }

    /// Enter selection seeded with the last used amount or the default.
    pub fn begin(&mut self) -> bool {
        if self.is_engaged() {
            return false;
        }
        let amount_g = self
            .last_amount_g
            .unwrap_or(self.cfg.default_g)
            .clamp(0.0, self.cfg.max_g);
        self.state = ManualState::Selecting { amount_g };
        tracing::debug!(amount_g, "manual amount selection");
        true
    }

    pub fn adjust(&mut self, dir: Adjust) -> bool {
        let ManualState::Selecting { amount_g } = &mut self.state else {
            return false;
        };
        *amount_g = clamp_step(*amount_g, self.cfg.step_g, self.cfg.max_g, dir.is_up());
        true
    }

    /// Leave selection and hand back the amount to feed.
    pub fn confirm(&mut self) -> Option<f32> {
        let ManualState::Selecting { amount_g } = self.state else {
            return None;
        };
        self.state = ManualState::Idle;
        self.last_amount_g = Some(amount_g);
        Some(amount_g)
    }

    pub fn reset(&mut self) {
        self.state = ManualState::Idle;
        self.last_amount_g = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_decrements_from_default() {
        let mut m = ManualSetup::new(ManualCfg::default());
        assert!(m.begin());
        for _ in 0..3 {
            m.adjust(Adjust::Down);
        }
        assert_eq!(m.pending(), Some(70.0));
    }

    #[test]
    fn amount_is_clamped() {
        let mut m = ManualSetup::new(ManualCfg {
            default_g: 10.0,
            step_g: 10.0,
            max_g: 30.0,
        });
        m.begin();
        m.adjust(Adjust::Down);
        m.adjust(Adjust::Down);
        assert_eq!(m.pending(), Some(0.0));
        for _ in 0..5 {
            m.adjust(Adjust::Up);
        }
        assert_eq!(m.pending(), Some(30.0));
    }

    #[test]
    fn next_selection_starts_from_last_amount() {
        let mut m = ManualSetup::new(ManualCfg::default());
        m.begin();
        m.adjust(Adjust::Up);
        assert_eq!(m.confirm(), Some(110.0));
        assert!(!m.is_engaged());
        m.begin();
        assert_eq!(m.pending(), Some(110.0));
    }

    #[test]
    fn idle_ignores_adjust_and_confirm() {
        let mut m = ManualSetup::new(ManualCfg::default());
        assert!(!m.adjust(Adjust::Up));
        assert_eq!(m.confirm(), None);
    }
}
