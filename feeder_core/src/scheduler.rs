//! Scheduled-trigger detection.
//!
//! `Scheduler::poll` is called once per tick while the app is idle. It scans
//! the slots in index order and reports at most one slot to fire. Trigger
//! memory holds the calendar minute of the last firing so a slow or coarse
//! clock cannot fire twice inside the same minute.

use feeder_traits::DateTime;

use crate::config::SchedulerCfg;
use crate::schedule::ScheduleStore;

/// Calendar minute, the granularity of trigger memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteStamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl From<&DateTime> for MinuteStamp {
    fn from(t: &DateTime) -> Self {
        Self {
            year: t.year,
            month: t.month,
            day: t.day,
            hour: t.hour,
            minute: t.minute,
        }
    }
}

/// Last minute at which any scheduled feed fired; `None` means never.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerMemory {
    last: Option<MinuteStamp>,
}

impl TriggerMemory {
    pub fn last(&self) -> Option<MinuteStamp> {
        self.last
    }

    pub fn fired_in(&self, now: &DateTime) -> bool {
        self.last == Some(MinuteStamp::from(now))
    }

    pub fn record(&mut self, now: &DateTime) {
        self.last = Some(MinuteStamp::from(now));
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    cfg: SchedulerCfg,
    memory: TriggerMemory,
}

impl Scheduler {
    pub fn new(cfg: SchedulerCfg) -> Self {
        Self {
            cfg,
            memory: TriggerMemory::default(),
        }
    }

    pub fn memory(&self) -> &TriggerMemory {
        &self.memory
    }

    /// Return the first slot due at `now`. Trigger memory is left alone
    /// until the caller reports a started session via [`Scheduler::mark_fired`].
    ///
    /// The caller must only poll while no session is active and neither
    /// editor is engaged.
    pub fn poll(&self, now: &DateTime, store: &ScheduleStore) -> Option<usize> {
        if now.second >= self.cfg.trigger_window_s || self.memory.fired_in(now) {
            return None;
        }
        let index = store
            .slots()
            .iter()
            .position(|s| s.is_active() && s.hour == now.hour && s.minute == now.minute)?;
        tracing::debug!(slot = index, at = %now, "schedule slot due");
        Some(index)
    }

    /// Record that a scheduled session started in `now`'s minute.
    pub fn mark_fired(&mut self, now: &DateTime) {
        self.memory.record(now);
    }

    pub fn reset(&mut self) {
        self.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleSlot;

    fn slot(hour: u8, minute: u8, add_g: f32) -> ScheduleSlot {
        ScheduleSlot {
            enabled: true,
            hour,
            minute,
            add_g,
        }
    }

    fn at(hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime::new(2025, 5, 1, hour, minute, second)
    }

    #[test]
    fn fires_once_per_minute() {
        let store = ScheduleStore::new([
            slot(8, 0, 100.0),
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ]);
        let mut s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 0), &store), Some(0));
        s.mark_fired(&at(8, 0, 0));
        assert_eq!(s.poll(&at(8, 0, 0), &store), None);
        assert_eq!(s.poll(&at(8, 0, 1), &store), None);
    }

    #[test]
    fn outside_window_never_fires() {
        let store = ScheduleStore::new([
            slot(8, 0, 100.0),
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ]);
        let s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 2), &store), None);
        assert_eq!(s.poll(&at(7, 59, 0), &store), None);
        assert!(s.memory().last().is_none());
    }

    #[test]
    fn shared_minute_fires_first_slot_only() {
        let store = ScheduleStore::new([
            ScheduleSlot::disabled(8, 0),
            slot(8, 0, 50.0),
            slot(8, 0, 70.0),
        ]);
        let mut s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 0), &store), Some(1));
        s.mark_fired(&at(8, 0, 0));
        assert_eq!(s.poll(&at(8, 0, 1), &store), None);
    }

    #[test]
    fn same_time_next_day_fires_again() {
        let store = ScheduleStore::new([
            slot(8, 0, 100.0),
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ]);
        let mut s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 0), &store), Some(0));
        s.mark_fired(&at(8, 0, 0));
        let tomorrow = DateTime::new(2025, 5, 2, 8, 0, 0);
        assert_eq!(s.poll(&tomorrow, &store), Some(0));
    }

    #[test]
    fn unmarked_poll_stays_due() {
        let store = ScheduleStore::new([
            slot(8, 0, 100.0),
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ]);
        let s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 0), &store), Some(0));
        assert_eq!(s.poll(&at(8, 0, 1), &store), Some(0));
        assert!(s.memory().last().is_none());
    }

    #[test]
    fn reset_forgets_last_firing() {
        let store = ScheduleStore::new([
            slot(8, 0, 100.0),
            ScheduleSlot::disabled(12, 0),
            ScheduleSlot::disabled(18, 0),
        ]);
        let mut s = Scheduler::new(SchedulerCfg::default());
        assert_eq!(s.poll(&at(8, 0, 0), &store), Some(0));
        s.mark_fired(&at(8, 0, 0));
        s.reset();
        assert_eq!(s.poll(&at(8, 0, 1), &store), Some(0));
    }
}
