//! Button sampling and the shared debounce gate.

/// The four front-panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Cycle between the main view and the slot views.
    Display,
    /// Enter an editor / confirm the current field.
    Setting,
    Increase,
    Decrease,
}

/// Direction of an adjust action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    Up,
    Down,
}

impl Adjust {
    pub fn is_up(self) -> bool {
        matches!(self, Adjust::Up)
    }
}

/// Level-sampled button states for one tick (true = pressed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pub display: bool,
    pub setting: bool,
    pub increase: bool,
    pub decrease: bool,
}

impl ButtonLevels {
    pub fn pressed(button: Button) -> Self {
        let mut levels = Self::default();
        match button {
            Button::Display => levels.display = true,
            Button::Setting => levels.setting = true,
            Button::Increase => levels.increase = true,
            Button::Decrease => levels.decrease = true,
        }
        levels
    }

    /// Only one action is processed per tick; earlier buttons win.
    pub fn first_pressed(&self) -> Option<Button> {
        if self.display {
            Some(Button::Display)
        } else if self.setting {
            Some(Button::Setting)
        } else if self.increase {
            Some(Button::Increase)
        } else if self.decrease {
            Some(Button::Decrease)
        } else {
            None
        }
    }
}

/// Global debounce: any press within `debounce_ms` of the previously
/// accepted press is ignored, whichever button it was.
#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce_ms: u64,
    last_accept_ms: Option<u64>,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            last_accept_ms: None,
        }
    }

    pub fn accept(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_accept_ms
            && now_ms.saturating_sub(last) < self.debounce_ms
        {
            return false;
        }
        self.last_accept_ms = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_accept_ms = None;
    }
}
