//! End-to-end feeding scenarios driven through `FeederApp::tick`.

use std::sync::Arc;
use std::time::Duration;

use feeder_core::mocks::{ManualScale, SpyGate};
use feeder_core::{
    Button, ButtonLevels, CoreCfg, DEFAULT_SLOTS, FeedLogEntry, FeederApp, FinishReason, Origin,
    ScheduleSlot,
};
use feeder_traits::DateTime;
use feeder_traits::clock::test_clock::TestClock;
use rstest::rstest;

type App = FeederApp<ManualScale, SpyGate>;

fn at(h: u8, m: u8, s: u8) -> DateTime {
    DateTime::new(2025, 3, 14, h, m, s)
}

fn idle() -> ButtonLevels {
    ButtonLevels::default()
}

fn build(tc: &TestClock, scale: ManualScale, gate: SpyGate, slot0: ScheduleSlot) -> App {
    let mut slots = DEFAULT_SLOTS;
    slots[0] = slot0;
    FeederApp::builder()
        .with_sensor(scale)
        .with_gate(gate)
        .with_slots(slots)
        .with_clock(Arc::new(tc.clone()))
        .build()
        .expect("build app")
}

fn breakfast() -> ScheduleSlot {
    ScheduleSlot {
        enabled: true,
        hour: 8,
        minute: 0,
        add_g: 100.0,
    }
}

#[test]
fn scheduled_slot_starts_additive_session_at_minute_start() {
    let tc = TestClock::new();
    let gate = SpyGate::new();
    let mut app = build(&tc, ManualScale::new(35.0), gate.clone(), breakfast());

    let r = app.tick(&at(7, 59, 59), idle()).expect("tick");
    assert_eq!(r.started, None);

    let r = app.tick(&at(8, 0, 0), idle()).expect("tick");
    assert_eq!(r.started, Some(Origin::Scheduled(0)));
    let session = app.feeder().session().expect("session");
    assert_eq!(session.target_g, 135.0);
    assert!(gate.is_open());
}

#[test]
fn rising_weight_finishes_on_target() {
    let tc = TestClock::new();
    let scale = ManualScale::new(50.0);
    let w = scale.handle();
    let gate = SpyGate::new();
    let mut app = build(&tc, scale, gate.clone(), breakfast());
    app.tick(&at(8, 0, 0), idle()).expect("start");

    let mut finished: Option<FeedLogEntry> = None;
    for g in (60..=150).step_by(10) {
        tc.advance(Duration::from_millis(500));
        w.set(g as f32);
        let r = app.tick(&at(8, 0, 5), idle()).expect("tick");
        if r.finished.is_some() {
            finished = r.finished;
            break;
        }
    }
    let e = finished.expect("finished");
    assert_eq!(e.reason, FinishReason::TargetReached);
    assert!((e.final_g - 150.0).abs() < 0.01);
    assert_eq!((e.manual, e.slot_index), (false, 0));
    assert!(!gate.is_open());
    assert_eq!(app.log().get(0), Some(&e));
}

#[test]
fn flat_weight_finishes_stuck_below_target() {
    let tc = TestClock::new();
    let gate = SpyGate::new();
    let mut app = build(&tc, ManualScale::new(50.0), gate.clone(), breakfast());
    app.tick(&at(8, 0, 0), idle()).expect("start");

    tc.advance(Duration::from_millis(20_000));
    let r = app.tick(&at(8, 0, 20), idle()).expect("tick");
    assert!(r.finished.is_none(), "window is exclusive");

    tc.advance(Duration::from_millis(1));
    let r = app.tick(&at(8, 0, 20), idle()).expect("tick");
    let e = r.finished.expect("stuck");
    assert_eq!(e.reason, FinishReason::Stuck);
    assert!((e.final_g - 50.0).abs() < 0.01);
    assert!(e.final_g < e.target_g);
    assert!(!gate.is_open());
}

#[test]
fn slow_progress_ends_by_timeout() {
    let tc = TestClock::new();
    let scale = ManualScale::new(0.0);
    let w = scale.handle();
    let mut app = build(&tc, scale, SpyGate::new(), breakfast());
    app.tick(&at(8, 0, 0), idle()).expect("start");

    // +4 g every 10 s keeps stuck detection quiet but never reaches 100 g
    let mut reason = None;
    for i in 1..=7 {
        tc.advance(Duration::from_secs(10));
        w.set(4.0 * i as f32);
        if let Some(e) = app.tick(&at(8, 1, 0), idle()).expect("tick").finished {
            reason = Some(e.reason);
            break;
        }
    }
    assert_eq!(reason, Some(FinishReason::Timeout));
}

#[test]
fn three_decrements_give_seventy_grams() {
    let tc = TestClock::new();
    let mut app = build(&tc, ManualScale::new(0.0), SpyGate::new(), breakfast());
    let now = at(10, 0, 30);
    for b in [
        Button::Setting,
        Button::Decrease,
        Button::Decrease,
        Button::Decrease,
    ] {
        tc.advance(Duration::from_millis(300));
        app.tick(&now, ButtonLevels::pressed(b)).expect("tick");
    }
    assert_eq!(app.manual().pending(), Some(70.0));

    tc.advance(Duration::from_millis(300));
    let r = app
        .tick(&now, ButtonLevels::pressed(Button::Setting))
        .expect("confirm");
    assert_eq!(r.started, Some(Origin::Manual));
    assert_eq!(app.feeder().session().map(|s| s.target_g), Some(70.0));
}

#[test]
fn full_log_drops_oldest_entry() {
    let tc = TestClock::new();
    let scale = ManualScale::new(0.0);
    let w = scale.handle();
    let mut app = build(&tc, scale, SpyGate::new(), breakfast());
    let cap = CoreCfg::default().history_capacity;

    for i in 0..=cap {
        let start = w.get();
        assert!(app.start_manual_feed(1.0 + i as f32).expect("start"));
        w.set(start + 1.0 + i as f32);
        let e = app
            .tick(&at(12, 0, 30), idle())
            .expect("tick")
            .finished
            .expect("finished");
        assert_eq!(app.log().get(0), Some(&e));
    }
    assert_eq!(app.log().len(), cap);
    // First feed (1 g) is gone; oldest left is the second (2 g)
    let oldest = app.log().get(cap - 1).expect("oldest");
    assert!((oldest.dispensed_g() - 2.0).abs() < 0.01);
}

#[test]
fn failed_sensor_read_at_slot_start_retries_within_window() {
    let tc = TestClock::new();
    let scale = ManualScale::new(20.0);
    let fail = scale.fail_handle();
    let gate = SpyGate::new();
    let mut app = build(&tc, scale, gate.clone(), breakfast());

    fail.set(true);
    assert!(app.tick(&at(8, 0, 0), idle()).is_err());
    assert!(!app.is_feeding());
    assert_eq!(app.scheduler().memory().last(), None);

    fail.set(false);
    tc.advance(Duration::from_millis(500));
    let r = app.tick(&at(8, 0, 1), idle()).expect("tick");
    assert_eq!(r.started, Some(Origin::Scheduled(0)));
    assert_eq!(app.feeder().session().map(|s| s.target_g), Some(120.0));
    assert!(gate.is_open());
}

#[test]
fn failed_gate_open_at_slot_start_retries_within_window() {
    let tc = TestClock::new();
    let gate = SpyGate::new();
    let mut app = build(&tc, ManualScale::new(0.0), gate.clone(), breakfast());

    gate.fail_next_open();
    assert!(app.tick(&at(8, 0, 0), idle()).is_err());
    assert!(!app.is_feeding());

    let r = app.tick(&at(8, 0, 1), idle()).expect("tick");
    assert_eq!(r.started, Some(Origin::Scheduled(0)));
    assert!(app.scheduler().memory().fired_in(&at(8, 0, 1)));
}

#[rstest]
#[case::second_zero(0, true)]
#[case::second_one(1, true)]
#[case::second_two(2, false)]
#[case::late(45, false)]
fn trigger_window(#[case] second: u8, #[case] fires: bool) {
    let tc = TestClock::new();
    let mut app = build(&tc, ManualScale::new(0.0), SpyGate::new(), breakfast());
    let r = app.tick(&at(8, 0, second), idle()).expect("tick");
    assert_eq!(r.started.is_some(), fires);
}

#[test]
fn disabled_or_empty_slot_never_fires() {
    let tc = TestClock::new();
    let mut app = build(
        &tc,
        ManualScale::new(0.0),
        SpyGate::new(),
        ScheduleSlot {
            enabled: true,
            hour: 8,
            minute: 0,
            add_g: 0.0,
        },
    );
    assert_eq!(app.tick(&at(8, 0, 0), idle()).expect("tick").started, None);
}
