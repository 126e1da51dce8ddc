//! The feeding state machine (`Feeder`).
//!
//! A session opens the gate, is monitored once per tick and resolves on the
//! first of: target reached, stuck (no weight progress within the stuck
//! window) or timeout (absolute runtime ceiling). Targets are always additive:
//! the bowl's weight at start plus the requested amount.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use feeder_traits::{Clock, DateTime, Gate, WeightSensor};

use crate::config::FeedingCfg;
use crate::error::Result;
use crate::history::FeedLogEntry;
use crate::hw_error::map_hw_error;
use crate::status::{FeedStatus, FinishReason, Origin};

/// The single live feeding session.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedingSession {
    pub origin: Origin,
    /// Fixed at creation.
    pub target_g: f32,
    pub start_g: f32,
    pub start_ms: u64,
    pub gate_open: bool,
    pub last_progress_g: f32,
    pub last_progress_at_ms: u64,
    last_report_ms: u64,
}

pub struct Feeder<S: WeightSensor, G: Gate> {
    sensor: S,
    gate: G,
    cfg: FeedingCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    session: Option<FeedingSession>,
    last_weight_g: f32,
}

impl<S: WeightSensor, G: Gate> core::fmt::Debug for Feeder<S, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Feeder")
            .field("session", &self.session)
            .field("last_weight_g", &self.last_weight_g)
            .finish()
    }
}

impl<S: WeightSensor, G: Gate> Feeder<S, G> {
    pub fn new(sensor: S, gate: G, cfg: FeedingCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let epoch = clock.now();
        Self {
            sensor,
            gate,
            cfg,
            clock,
            epoch,
            session: None,
            last_weight_g: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&FeedingSession> {
        self.session.as_ref()
    }

    /// Last absolute weight seen, in grams.
    pub fn last_weight(&self) -> f32 {
        self.last_weight_g
    }

    pub fn cfg(&self) -> &FeedingCfg {
        &self.cfg
    }

    /// Milliseconds since this feeder was created.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Elapsed runtime of the active session.
    pub fn elapsed_ms(&self) -> Option<u64> {
        let now = self.now_ms();
        self.session
            .as_ref()
            .map(|s| now.saturating_sub(s.start_ms))
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    /// Read the sensor outside of a session and remember the value.
    pub fn refresh_weight(&mut self) -> Result<f32> {
        let gate_open = self.session.as_ref().is_some_and(|s| s.gate_open);
        let w = read_abs(&mut self.sensor, self.session.is_some(), gate_open)
            .wrap_err("reading weight")?;
        self.last_weight_g = w;
        Ok(w)
    }

    /// Begin a session adding `add_g` on top of the current bowl weight.
    ///
    /// Returns `Ok(false)` without side effects when a session is already
    /// active. A gate failure leaves no session behind.
    pub fn start(&mut self, origin: Origin, add_g: f32) -> Result<bool> {
        if let Some(active) = &self.session {
            tracing::debug!(
                ?origin,
                active = ?active.origin,
                "feed start ignored; session already active"
            );
            return Ok(false);
        }
        let w = read_abs(&mut self.sensor, false, false).wrap_err("reading weight at feed start")?;
        self.last_weight_g = w;
        let add_g = if add_g.is_finite() { add_g.max(0.0) } else { 0.0 };
        let target_g = w + add_g;
        let now = self.now_ms();

        self.gate
            .open()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("gate open")?;

        self.session = Some(FeedingSession {
            origin,
            target_g,
            start_g: w,
            start_ms: now,
            gate_open: true,
            last_progress_g: w,
            last_progress_at_ms: now,
            last_report_ms: now,
        });
        tracing::info!(?origin, start_g = w, add_g, target_g, "feeding started");
        Ok(true)
    }

    /// One monitoring iteration. `now` stamps the log entry if the session ends.
    pub fn step(&mut self, now: &DateTime) -> Result<FeedStatus> {
        let Some(gate_open) = self.session.as_ref().map(|s| s.gate_open) else {
            return Ok(FeedStatus::Idle);
        };
        let w = match read_abs(&mut self.sensor, true, gate_open) {
            Ok(w) => {
                self.last_weight_g = w;
                w
            }
            Err(e) => {
                tracing::warn!(error = %e, last_g = self.last_weight_g, "weight read failed; using last value");
                self.last_weight_g
            }
        };
        let now_ms = self.now_ms();
        let cfg = &self.cfg;
        let Some(s) = self.session.as_mut() else {
            return Ok(FeedStatus::Idle);
        };

        if s.gate_open && s.target_g > 0.0 && w >= s.target_g {
            return Ok(self.finish(w, FinishReason::TargetReached, now));
        }

        if s.gate_open {
            if w > s.last_progress_g + cfg.min_increase_g {
                s.last_progress_g = w;
                s.last_progress_at_ms = now_ms;
            } else if now_ms.saturating_sub(s.last_progress_at_ms) > cfg.stuck_ms {
                tracing::warn!(
                    w,
                    target_g = s.target_g,
                    stalled_ms = now_ms.saturating_sub(s.last_progress_at_ms),
                    "no weight progress; jam or empty hopper"
                );
                return Ok(self.finish(w, FinishReason::Stuck, now));
            }
        }

        if now_ms.saturating_sub(s.start_ms) > cfg.max_run_ms {
            tracing::warn!(w, target_g = s.target_g, "feeding exceeded max runtime");
            return Ok(self.finish(w, FinishReason::Timeout, now));
        }

        if cfg.progress_ms > 0 && now_ms.saturating_sub(s.last_report_ms) >= cfg.progress_ms {
            s.last_report_ms = now_ms;
            tracing::debug!(w, target_g = s.target_g, "feeding progress");
        }
        Ok(FeedStatus::Running)
    }

    /// Drop the session without logging (reset / shutdown). Closes the gate.
    pub fn abort(&mut self) -> Option<FeedingSession> {
        let session = self.session.take()?;
        self.close_gate_best_effort("abort");
        tracing::info!(origin = ?session.origin, "feeding session aborted");
        Some(session)
    }

    /// Close the gate (best-effort).
    pub fn gate_close(&mut self) -> Result<()> {
        self.gate
            .close()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("gate close")
    }

    fn close_gate_best_effort(&mut self, why: &'static str) {
        if let Err(e) = self.gate_close() {
            tracing::warn!(error = %e, why, "gate close failed");
        }
    }

    fn finish(&mut self, final_g: f32, reason: FinishReason, now: &DateTime) -> FeedStatus {
        let Some(session) = self.session.take() else {
            return FeedStatus::Idle;
        };
        if session.gate_open {
            self.close_gate_best_effort(reason.as_str());
        }
        let entry = FeedLogEntry {
            manual: session.origin.is_manual(),
            slot_index: session.origin.slot_index(),
            hour: now.hour,
            minute: now.minute,
            target_g: session.target_g,
            final_g,
            start_g: session.start_g,
            reason,
        };
        tracing::info!(
            origin = ?session.origin,
            reason = reason.as_str(),
            target_g = entry.target_g,
            final_g,
            "feeding finished"
        );
        FeedStatus::Finished(entry)
    }
}

fn read_abs<S: WeightSensor>(sensor: &mut S, feeding: bool, gate_open: bool) -> Result<f32> {
    let w = sensor
        .read_weight(feeding, gate_open)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
    if !w.is_finite() {
        return Err(eyre::Report::new(crate::error::FeederError::Hardware(
            "non-finite weight reading".to_string(),
        )));
    }
    Ok(w.abs())
}
