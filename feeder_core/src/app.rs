//! The owned application aggregate and its per-tick transition function.
//!
//! `FeederApp` holds every piece of mutable state (schedule store, feed log,
//! trigger memory, the active session and both editors) and changes it only
//! from [`FeederApp::tick`], the button handler and [`FeederApp::reset`].
//! Nothing here blocks: every wait is a timestamp comparison.

use std::sync::Arc;

use feeder_traits::{Clock, DateTime, Gate, WeightSensor};

use crate::config::CoreCfg;
use crate::error::Result;
use crate::feeding::Feeder;
use crate::history::{FeedLog, FeedLogEntry};
use crate::input::{Adjust, Button, ButtonLevels, Debouncer};
use crate::manual::{ManualSetup, ManualState};
use crate::schedule::{SLOT_COUNT, ScheduleSlot, ScheduleStore};
use crate::scheduler::Scheduler;
use crate::settings::{SettingsMachine, SettingsState};
use crate::status::{FeedStatus, Origin};

/// What the display is showing when no editor is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    /// Schedule overview of one slot; also selects it for editing.
    Slot(usize),
}

impl View {
    /// Main → Slot 0 → Slot 1 → Slot 2 → Main.
    pub fn next(self) -> Self {
        match self {
            View::Main => View::Slot(0),
            View::Slot(i) if i + 1 < SLOT_COUNT => View::Slot(i + 1),
            View::Slot(_) => View::Main,
        }
    }
}

/// Outcome of one tick, used by the host to decide when to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub started: Option<Origin>,
    pub finished: Option<FeedLogEntry>,
    /// Visible state changed.
    pub redraw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Banner {
    entry: FeedLogEntry,
    until_ms: u64,
}

/// Live session figures for the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView {
    pub origin: Origin,
    pub target_g: f32,
    pub start_g: f32,
    pub elapsed_ms: u64,
}

/// Read-only projection of the app for renderers and remote mirrors.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub now: DateTime,
    pub view: View,
    pub weight_g: f32,
    pub session: Option<SessionView>,
    pub settings: SettingsState,
    pub editing_slot: usize,
    pub manual: ManualState,
    pub slots: [ScheduleSlot; SLOT_COUNT],
    /// Set while the completion message is up.
    pub banner: Option<FeedLogEntry>,
    pub last_feed: Option<FeedLogEntry>,
}

pub struct FeederApp<S: WeightSensor, G: Gate> {
    feeder: Feeder<S, G>,
    store: ScheduleStore,
    defaults: [ScheduleSlot; SLOT_COUNT],
    log: FeedLog,
    scheduler: Scheduler,
    settings: SettingsMachine,
    manual: ManualSetup,
    debouncer: Debouncer,
    view: View,
    banner: Option<Banner>,
    done_message_ms: u64,
}

impl<S: WeightSensor, G: Gate> core::fmt::Debug for FeederApp<S, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeederApp")
            .field("feeder", &self.feeder)
            .field("store", &self.store)
            .field("log_len", &self.log.len())
            .field("settings", self.settings.state())
            .field("manual", self.manual.state())
            .field("view", &self.view)
            .finish()
    }
}

impl<S: WeightSensor, G: Gate> FeederApp<S, G> {
    /// `defaults` seed the schedule store now and again on every reset.
    pub fn new(
        sensor: S,
        gate: G,
        cfg: CoreCfg,
        defaults: [ScheduleSlot; SLOT_COUNT],
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            feeder: Feeder::new(sensor, gate, cfg.feeding.clone(), clock),
            store: ScheduleStore::new(defaults),
            defaults,
            log: FeedLog::new(cfg.history_capacity),
            scheduler: Scheduler::new(cfg.scheduler),
            settings: SettingsMachine::new(cfg.settings),
            manual: ManualSetup::new(cfg.manual),
            debouncer: Debouncer::new(cfg.input.debounce_ms),
            view: View::Main,
            banner: None,
            done_message_ms: cfg.feeding.done_message_ms,
        }
    }

    pub fn builder() -> crate::builder::FeederBuilder<S, G> {
        crate::builder::FeederBuilder::new()
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn log(&self) -> &FeedLog {
        &self.log
    }

    pub fn feeder(&self) -> &Feeder<S, G> {
        &self.feeder
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> &SettingsMachine {
        &self.settings
    }

    pub fn manual(&self) -> &ManualSetup {
        &self.manual
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_feeding(&self) -> bool {
        self.feeder.is_active()
    }

    /// Monotonic milliseconds since construction.
    pub fn now_ms(&self) -> u64 {
        self.feeder.now_ms()
    }

    /// The scheduler only runs with no session and both editors idle.
    pub fn scheduler_may_fire(&self) -> bool {
        !self.feeder.is_active() && !self.settings.is_engaged() && !self.manual.is_engaged()
    }

    /// One control iteration: buttons, then monitoring or scheduling, then
    /// banner expiry.
    pub fn tick(&mut self, now: &DateTime, buttons: ButtonLevels) -> Result<TickReport> {
        let mut report = TickReport::default();
        let now_ms = self.feeder.now_ms();

        if let Some(button) = buttons.first_pressed()
            && self.debouncer.accept(now_ms)
        {
            self.handle_button(button, &mut report)?;
        }

        if self.feeder.is_active() {
            if let FeedStatus::Finished(entry) = self.feeder.step(now)? {
                self.record(entry, now_ms);
                report.finished = Some(entry);
                report.redraw = true;
            }
        } else if self.scheduler_may_fire()
            && let Some(index) = self.scheduler.poll(now, &self.store)
        {
            let add_g = self.store.slot(index).map_or(0.0, |s| s.add_g);
            if self.feeder.start(Origin::Scheduled(index), add_g)? {
                self.scheduler.mark_fired(now);
                report.started = Some(Origin::Scheduled(index));
                report.redraw = true;
            }
        }

        if let Some(banner) = self.banner
            && now_ms >= banner.until_ms
        {
            self.banner = None;
            report.redraw = true;
        }
        Ok(report)
    }

    /// Apply one debounced button action.
    pub fn handle_button(&mut self, button: Button, report: &mut TickReport) -> Result<()> {
        let changed = match button {
            Button::Display => {
                if self.settings.is_engaged() || self.manual.is_engaged() {
                    false
                } else {
                    self.view = self.view.next();
                    true
                }
            }
            Button::Setting => self.on_setting(report)?,
            Button::Increase => self.on_adjust(Adjust::Up),
            Button::Decrease => self.on_adjust(Adjust::Down),
        };
        if !changed {
            tracing::trace!(?button, "button ignored in current state");
        }
        report.redraw |= changed;
        Ok(())
    }

    fn on_setting(&mut self, report: &mut TickReport) -> Result<bool> {
        if self.settings.is_engaged() {
            return self.settings.confirm(&mut self.store);
        }
        if self.manual.is_engaged() {
            let Some(amount_g) = self.manual.confirm() else {
                return Ok(false);
            };
            if self.feeder.start(Origin::Manual, amount_g)? {
                report.started = Some(Origin::Manual);
            }
            return Ok(true);
        }
        if self.feeder.is_active() {
            return Ok(false);
        }
        Ok(match self.view {
            View::Main => self.manual.begin(),
            View::Slot(i) => self.settings.begin(i, &self.store),
        })
    }

    fn on_adjust(&mut self, dir: Adjust) -> bool {
        if self.settings.is_engaged() {
            self.settings.adjust(dir)
        } else {
            self.manual.adjust(dir)
        }
    }

    /// Start a manual feed directly, bypassing amount selection.
    ///
    /// Returns `Ok(false)` when a session or an editor is active.
    pub fn start_manual_feed(&mut self, amount_g: f32) -> Result<bool> {
        if !self.scheduler_may_fire() {
            return Ok(false);
        }
        self.feeder.start(Origin::Manual, amount_g)
    }

    /// Read the bowl weight outside of a tick (idle display refresh).
    pub fn refresh_weight(&mut self) -> Result<f32> {
        self.feeder.refresh_weight()
    }

    fn record(&mut self, entry: FeedLogEntry, now_ms: u64) {
        self.log.push(entry);
        self.banner = Some(Banner {
            entry,
            until_ms: now_ms.saturating_add(self.done_message_ms),
        });
    }

    /// Return every piece of state to power-on defaults in one step.
    ///
    /// Safe from any state: an active session is dropped with the gate closed
    /// and no log entry is written.
    pub fn reset(&mut self) {
        let aborted = self.feeder.abort();
        self.store.replace_all(self.defaults);
        self.log.clear();
        self.scheduler.reset();
        self.settings.reset();
        self.manual.reset();
        self.debouncer.reset();
        self.view = View::Main;
        self.banner = None;
        tracing::info!(aborted_session = aborted.is_some(), "system reset");
    }

    /// Leave the hardware safe: drop any session and close the gate.
    pub fn shutdown(&mut self) {
        if self.feeder.abort().is_none()
            && let Err(e) = self.feeder.gate_close()
        {
            tracing::warn!(error = %e, "gate close failed during shutdown");
        }
        tracing::info!(log_len = self.log.len(), "feeder shut down");
    }

    pub fn snapshot(&self, now: &DateTime) -> Snapshot {
        let session = self.feeder.session().map(|s| SessionView {
            origin: s.origin,
            target_g: s.target_g,
            start_g: s.start_g,
            elapsed_ms: self.feeder.elapsed_ms().unwrap_or(0),
        });
        Snapshot {
            now: *now,
            view: self.view,
            weight_g: self.feeder.last_weight(),
            session,
            settings: *self.settings.state(),
            editing_slot: self.settings.slot(),
            manual: *self.manual.state(),
            slots: *self.store.slots(),
            banner: self.banner.map(|b| b.entry),
            last_feed: self.log.latest().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ManualScale, SpyGate};
    use feeder_traits::clock::test_clock::TestClock;
    use std::time::Duration;

    fn app(tc: &TestClock, scale: ManualScale, gate: SpyGate) -> FeederApp<ManualScale, SpyGate> {
        let mut slots = crate::schedule::DEFAULT_SLOTS;
        slots[0] = ScheduleSlot {
            enabled: true,
            hour: 8,
            minute: 0,
            add_g: 100.0,
        };
        FeederApp::new(scale, gate, CoreCfg::default(), slots, Arc::new(tc.clone()))
    }

    fn press(app: &mut FeederApp<ManualScale, SpyGate>, tc: &TestClock, b: Button) -> TickReport {
        tc.advance(Duration::from_millis(300));
        app.tick(&DateTime::new(2025, 1, 1, 10, 0, 30), ButtonLevels::pressed(b))
            .expect("tick")
    }

    #[test]
    fn view_cycles_and_wraps() {
        assert_eq!(View::Main.next(), View::Slot(0));
        assert_eq!(View::Slot(2).next(), View::Main);
    }

    #[test]
    fn display_ignored_while_editor_engaged() {
        let tc = TestClock::new();
        let mut a = app(&tc, ManualScale::new(0.0), SpyGate::new());
        press(&mut a, &tc, Button::Setting);
        assert!(a.manual().is_engaged());
        let r = press(&mut a, &tc, Button::Display);
        assert!(!r.redraw);
        assert_eq!(a.view(), View::Main);
    }

    #[test]
    fn settings_entry_requires_slot_view_and_no_session() {
        let tc = TestClock::new();
        let mut a = app(&tc, ManualScale::new(0.0), SpyGate::new());
        a.start_manual_feed(50.0).expect("start");
        press(&mut a, &tc, Button::Display);
        press(&mut a, &tc, Button::Setting);
        assert!(!a.settings().is_engaged(), "no editor while feeding");
    }

    #[test]
    fn banner_expires_after_done_message() {
        let tc = TestClock::new();
        let scale = ManualScale::new(10.0);
        let w = scale.handle();
        let mut a = app(&tc, scale, SpyGate::new());
        let now = DateTime::new(2025, 1, 1, 10, 0, 30);
        a.start_manual_feed(5.0).expect("start");
        w.set(15.0);
        let r = a.tick(&now, ButtonLevels::default()).expect("tick");
        assert!(r.finished.is_some());
        assert!(a.snapshot(&now).banner.is_some());
        tc.advance(Duration::from_millis(3_000));
        let r = a.tick(&now, ButtonLevels::default()).expect("tick");
        assert!(r.redraw);
        assert!(a.snapshot(&now).banner.is_none());
    }

    #[test]
    fn shutdown_closes_gate() {
        let tc = TestClock::new();
        let gate = SpyGate::new();
        let mut a = app(&tc, ManualScale::new(0.0), gate.clone());
        a.start_manual_feed(50.0).expect("start");
        assert!(gate.is_open());
        a.shutdown();
        assert!(!gate.is_open());
        assert!(!a.is_feeding());
        assert!(a.log().is_empty());
    }
}
