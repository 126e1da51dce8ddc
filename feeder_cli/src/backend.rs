//! Hardware/simulator assembly and the clocks that drive them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use eyre::WrapErr;
use feeder_core::{ButtonLevels, CoreCfg, FallbackClock, FeederApp, Result, default_slots};
use feeder_hardware::{SimulatedGate, SimulatedScale, SystemWallClock};
use feeder_traits::clock::{Clock, MonotonicClock};
use feeder_traits::{Gate, SyntheticWallClock, WallClock, WeightSensor};

pub type App = FeederApp<Box<dyn WeightSensor>, Box<dyn Gate>>;

/// Monotonic clock whose `sleep` advances time instantly.
#[derive(Debug, Clone)]
pub struct StepClock {
    base: Instant,
    offset_ms: Arc<AtomicU64>,
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::Relaxed))
    }

    fn sleep(&self, d: Duration) {
        let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::Relaxed);
    }
}

/// How time flows for a command.
pub enum ClockMode {
    /// Real sleeps; host wall clock first when configured.
    RealTime(SystemWallClock),
    /// Instant sleeps from a fixed wall-clock start; always simulated hardware.
    Stepped { epoch: time::PrimitiveDateTime },
}

/// Everything a command needs to drive the feeder.
pub struct Rig {
    pub app: App,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub wall: FallbackClock,
    pub buttons: Box<dyn FnMut() -> ButtonLevels>,
    pub backend: &'static str,
}

impl Rig {
    pub fn tick_len(cfg: &feeder_config::Config) -> Duration {
        Duration::from_millis(cfg.runner.tick_ms)
    }
}

pub fn build_rig(cfg: &feeder_config::Config, mode: ClockMode) -> Result<Rig> {
    let (clock, wall, realtime): (Arc<dyn Clock + Send + Sync>, _, _) = match mode {
        ClockMode::RealTime(host) => {
            let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
            let synthetic = SyntheticWallClock::new(cfg.clock.fallback_epoch()?, clock.clone());
            let primary: Option<Box<dyn WallClock + Send + Sync>> = if cfg.clock.prefer_system {
                Some(Box::new(host))
            } else {
                None
            };
            (clock.clone(), FallbackClock::new(primary, synthetic), true)
        }
        ClockMode::Stepped { epoch } => {
            let clock: Arc<dyn Clock + Send + Sync> = Arc::new(StepClock::new());
            let synthetic = SyntheticWallClock::new(epoch, clock.clone());
            (clock, FallbackClock::synthetic(synthetic), false)
        }
    };

    let (sensor, gate, buttons, backend) = if realtime {
        hardware_or_sim(cfg, &clock)?
    } else {
        sim(cfg, &clock)
    };

    let app = FeederApp::builder()
        .with_sensor(sensor)
        .with_gate(gate)
        .with_cfg(CoreCfg::from(cfg))
        .with_slots(default_slots(&cfg.slots))
        .with_clock(clock.clone())
        .build()
        .wrap_err("assemble feeder")?;
    tracing::info!(backend, "feeder assembled");

    Ok(Rig {
        app,
        clock,
        wall,
        buttons,
        backend,
    })
}

type Parts = (
    Box<dyn WeightSensor>,
    Box<dyn Gate>,
    Box<dyn FnMut() -> ButtonLevels>,
    &'static str,
);

fn sim(cfg: &feeder_config::Config, clock: &Arc<dyn Clock + Send + Sync>) -> Parts {
    let scale = SimulatedScale::new(
        cfg.sim.initial_g,
        cfg.sim.flow_g_per_s,
        cfg.sim.hopper_g,
        clock.clone(),
    );
    let sensor: Box<dyn WeightSensor> = Box::new(scale);
    let actuator: Box<dyn Gate> = Box::new(SimulatedGate::new());
    let buttons: Box<dyn FnMut() -> ButtonLevels> = Box::new(ButtonLevels::default);
    (sensor, actuator, buttons, "sim")
}

#[cfg(not(feature = "hardware"))]
fn hardware_or_sim(
    cfg: &feeder_config::Config,
    clock: &Arc<dyn Clock + Send + Sync>,
) -> Result<Parts> {
    Ok(sim(cfg, clock))
}

#[cfg(feature = "hardware")]
fn hardware_or_sim(
    cfg: &feeder_config::Config,
    _clock: &Arc<dyn Clock + Send + Sync>,
) -> Result<Parts> {
    use feeder_hardware::hardware::{ButtonPanel, HardwareScale, ServoGate};

    let p = &cfg.pins;
    let mut scale = HardwareScale::try_new(
        p.hx711_dt,
        p.hx711_sck,
        cfg.scale.calibration_factor,
        cfg.scale.samples,
        Duration::from_millis(cfg.scale.read_timeout_ms),
    )
    .wrap_err("open hx711")?;
    if cfg.scale.tare_on_start {
        scale.tare().wrap_err("tare hx711")?;
    }
    let gate = ServoGate::try_new(p.servo, cfg.gate.open_angle, cfg.gate.closed_angle)
        .wrap_err("open servo pin")?;
    let panel = ButtonPanel::try_new([p.btn_display, p.btn_setting, p.btn_increase, p.btn_decrease])
        .wrap_err("open button pins")?;
    let buttons: Box<dyn FnMut() -> ButtonLevels> = Box::new(move || {
        let [display, setting, increase, decrease] = panel.sample();
        ButtonLevels {
            display,
            setting,
            increase,
            decrease,
        }
    });
    let sensor: Box<dyn WeightSensor> = Box::new(scale);
    let actuator: Box<dyn Gate> = Box::new(gate);
    Ok((sensor, actuator, buttons, "hardware"))
}
