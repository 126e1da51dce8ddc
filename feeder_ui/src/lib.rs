#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Two-line, 16-column display renderer.
//!
//! `render` is a pure function of a [`Snapshot`]; the host decides when to
//! call it (after state-changing ticks and once per render interval).

use feeder_core::{
    FeedLogEntry, FinishReason, ManualState, Origin, ScheduleSlot, SettingsState, Snapshot, View,
};

pub const COLS: usize = 16;

/// Rendered screen, one string per LCD row, each exactly `COLS` wide.
pub type Screen = [String; 2];

pub fn render(s: &Snapshot) -> Screen {
    if let Some(done) = &s.banner {
        return banner(done);
    }
    if let Some(session) = &s.session {
        return [
            fit(&format!("Feeding {}", origin_label(session.origin))),
            fit(&format!("{:.0}/{:.0}g", s.weight_g, session.target_g)),
        ];
    }
    let slot_no = s.editing_slot + 1;
    match s.settings {
        SettingsState::EditingHour(b) => {
            return [
                fit(&format!("Slot {slot_no} hour")),
                fit(&format!(">{:02}<:{:02} {:.0}g", b.hour, b.minute, b.weight_g)),
            ];
        }
        SettingsState::EditingMinute(b) => {
            return [
                fit(&format!("Slot {slot_no} minute")),
                fit(&format!("{:02}:>{:02}< {:.0}g", b.hour, b.minute, b.weight_g)),
            ];
        }
        SettingsState::EditingWeight(b) => {
            return [
                fit(&format!("Slot {slot_no} amount")),
                fit(&format!("{:02}:{:02} >{:.0}g<", b.hour, b.minute, b.weight_g)),
            ];
        }
        SettingsState::Saved => {
            let line2 = s
                .slots
                .get(s.editing_slot)
                .map(slot_line)
                .unwrap_or_default();
            return [fit(&format!("Slot {slot_no} saved")), fit(&line2)];
        }
        SettingsState::NotEditing => {}
    }
    if let ManualState::Selecting { amount_g } = s.manual {
        return [fit("Manual feed"), fit(&format!("Add: {amount_g:.0}g"))];
    }
    match s.view {
        View::Main => [
            fit(&format!(
                "{:02}-{:02} {:02}:{:02}:{:02}",
                s.now.month, s.now.day, s.now.hour, s.now.minute, s.now.second
            )),
            fit(&format!("Bowl: {:.0}g", s.weight_g)),
        ],
        View::Slot(i) => [
            fit(&format!("Slot {}", i + 1)),
            fit(&s.slots.get(i).map(slot_line).unwrap_or_default()),
        ],
    }
}

fn banner(e: &FeedLogEntry) -> Screen {
    let head = match e.reason {
        FinishReason::TargetReached => "Feed done",
        FinishReason::Stuck => "Feed stuck!",
        FinishReason::Timeout => "Feed timeout!",
    };
    [
        fit(head),
        fit(&format!("+{:.0}g -> {:.0}g", e.dispensed_g(), e.final_g)),
    ]
}

fn slot_line(slot: &ScheduleSlot) -> String {
    let state = if slot.is_active() { "ON" } else { "OFF" };
    format!(
        "{:02}:{:02} {:.0}g {state}",
        slot.hour, slot.minute, slot.add_g
    )
}

fn origin_label(o: Origin) -> String {
    match o {
        Origin::Manual => "manual".to_string(),
        Origin::Scheduled(i) => format!("slot {}", i + 1),
    }
}

/// Truncate or pad to exactly `COLS` characters.
fn fit(text: &str) -> String {
    let mut out: String = text.chars().take(COLS).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', COLS - len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use feeder_core::{DEFAULT_SLOTS, EditBuffer, SessionView};
    use feeder_traits::DateTime;
    use rstest::rstest;

    fn base() -> Snapshot {
        Snapshot {
            now: DateTime::new(2025, 4, 2, 7, 5, 9),
            view: View::Main,
            weight_g: 42.4,
            session: None,
            settings: SettingsState::NotEditing,
            editing_slot: 0,
            manual: ManualState::Idle,
            slots: DEFAULT_SLOTS,
            banner: None,
            last_feed: None,
        }
    }

    fn entry(reason: FinishReason) -> FeedLogEntry {
        FeedLogEntry {
            manual: true,
            slot_index: -1,
            hour: 7,
            minute: 6,
            target_g: 142.0,
            final_g: 140.0,
            start_g: 40.0,
            reason,
        }
    }

    #[test]
    fn every_line_is_sixteen_columns() {
        let mut s = base();
        s.weight_g = 123_456_789.0;
        for line in render(&s) {
            assert_eq!(line.chars().count(), COLS);
        }
    }

    #[test]
    fn main_view_shows_clock_and_bowl() {
        let [l1, l2] = render(&base());
        assert_eq!(l1.trim_end(), "04-02 07:05:09");
        assert_eq!(l2.trim_end(), "Bowl: 42g");
    }

    #[test]
    fn slot_view_shows_policy() {
        let mut s = base();
        s.view = View::Slot(1);
        s.slots[1] = ScheduleSlot {
            enabled: true,
            hour: 12,
            minute: 30,
            add_g: 200.0,
        };
        let [l1, l2] = render(&s);
        assert_eq!(l1.trim_end(), "Slot 2");
        assert_eq!(l2.trim_end(), "12:30 200g ON");
    }

    #[test]
    fn session_takes_precedence_over_view() {
        let mut s = base();
        s.view = View::Slot(0);
        s.session = Some(SessionView {
            origin: Origin::Scheduled(2),
            target_g: 142.4,
            start_g: 42.4,
            elapsed_ms: 1_000,
        });
        let [l1, l2] = render(&s);
        assert_eq!(l1.trim_end(), "Feeding slot 3");
        assert_eq!(l2.trim_end(), "42/142g");
    }

    #[rstest]
    #[case(FinishReason::TargetReached, "Feed done")]
    #[case(FinishReason::Stuck, "Feed stuck!")]
    #[case(FinishReason::Timeout, "Feed timeout!")]
    fn banner_names_the_outcome(#[case] reason: FinishReason, #[case] head: &str) {
        let mut s = base();
        s.banner = Some(entry(reason));
        let [l1, l2] = render(&s);
        assert_eq!(l1.trim_end(), head);
        assert_eq!(l2.trim_end(), "+100g -> 140g");
    }

    #[test]
    fn editor_marks_the_active_field() {
        let mut s = base();
        s.editing_slot = 2;
        s.settings = SettingsState::EditingMinute(EditBuffer {
            hour: 18,
            minute: 5,
            weight_g: 300.0,
        });
        let [l1, l2] = render(&s);
        assert_eq!(l1.trim_end(), "Slot 3 minute");
        assert_eq!(l2.trim_end(), "18:>05< 300g");
    }

    #[test]
    fn manual_selection_shows_pending_amount() {
        let mut s = base();
        s.manual = ManualState::Selecting { amount_g: 70.0 };
        assert_eq!(render(&s)[1].trim_end(), "Add: 70g");
    }
}
