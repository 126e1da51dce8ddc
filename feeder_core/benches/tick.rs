use std::sync::Arc;
use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use feeder_core::mocks::{ManualScale, SpyGate};
use feeder_core::{ButtonLevels, DEFAULT_SLOTS, FeederApp, ScheduleSlot};
use feeder_traits::DateTime;
use feeder_traits::clock::test_clock::TestClock;

fn app(tc: &TestClock) -> FeederApp<ManualScale, SpyGate> {
    let mut slots = DEFAULT_SLOTS;
    slots[0] = ScheduleSlot {
        enabled: true,
        hour: 8,
        minute: 0,
        add_g: 100.0,
    };
    FeederApp::builder()
        .with_sensor(ManualScale::new(0.0))
        .with_gate(SpyGate::new())
        .with_slots(slots)
        .with_clock(Arc::new(tc.clone()))
        .build()
        .expect("build")
}

fn bench_idle_tick(c: &mut Criterion) {
    let tc = TestClock::new();
    let mut a = app(&tc);
    let now = DateTime::new(2025, 1, 1, 7, 59, 30);
    c.bench_function("tick_idle", |b| {
        b.iter(|| {
            tc.advance(Duration::from_millis(50));
            black_box(a.tick(black_box(&now), ButtonLevels::default()).expect("tick"))
        })
    });
}

fn bench_monitor_tick(c: &mut Criterion) {
    let now = DateTime::new(2025, 1, 1, 8, 0, 0);
    c.bench_function("tick_monitoring", |b| {
        b.iter_batched(
            || {
                let tc = TestClock::new();
                let mut a = app(&tc);
                a.tick(&now, ButtonLevels::default()).expect("start");
                (tc, a)
            },
            |(tc, mut a)| {
                for _ in 0..100 {
                    tc.advance(Duration::from_millis(50));
                    black_box(a.tick(&now, ButtonLevels::default()).expect("tick"));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_idle_tick, bench_monitor_tick);
criterion_main!(benches);
