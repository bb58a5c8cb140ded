//! Frame-step mode: advance by externally supplied time deltas.
//! Keeps a bounded sample series for live display.

use super::{Phase, Sample, Simulation};
use crate::config::FRAME_SAMPLE_CAP;
use crate::model::{ConfigError, WeaponConfig};
use serde::Serialize;

/// State after one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub phase: Phase,
    pub ammo: u32,
    pub max_ammo: u32,
    pub total_shots: u64,
    pub sample: Sample,
    /// Ammo refunded during this frame (0 when no refund fired).
    pub refunded: u32,
    /// Wind-up or reload completion in [0, 1].
    pub progress: Option<f64>,
}

impl FrameReport {
    pub fn refund_occurred(&self) -> bool {
        self.refunded > 0
    }
}

#[derive(Debug, Clone)]
pub struct FrameStepper {
    sim: Simulation,
    speed: f64,
    samples: Vec<Sample>,
}

impl FrameStepper {
    pub fn new(cfg: &WeaponConfig, speed: f64) -> Result<Self, ConfigError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed(speed));
        }
        let sim = Simulation::new(cfg)?;
        let samples = vec![sim.sample()];
        Ok(Self {
            sim,
            speed,
            samples,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Advance by `elapsed` wall-clock seconds scaled by the speed multiplier.
    pub fn step(&mut self, elapsed: f64) -> Result<FrameReport, ConfigError> {
        if !elapsed.is_finite() {
            return Err(ConfigError::NonFiniteInput("elapsed"));
        }
        if elapsed < 0.0 {
            return Err(ConfigError::NegativeDelta(elapsed));
        }
        let dt = elapsed * self.speed;
        if !dt.is_finite() || !(self.sim.state().time + dt).is_finite() {
            return Err(ConfigError::NonFiniteInput("elapsed"));
        }
        let volley = self.sim.advance(dt);
        let sample = self.sim.sample();
        self.push_sample(sample);
        let state = self.sim.state();
        Ok(FrameReport {
            phase: state.phase,
            ammo: state.ammo,
            max_ammo: self.sim.params().max_ammo,
            total_shots: state.total_shots,
            sample,
            refunded: volley.refunded,
            progress: self.sim.progress(),
        })
    }

    fn push_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
        if self.samples.len() > FRAME_SAMPLE_CAP + 1 {
            decimate(&mut self.samples, FRAME_SAMPLE_CAP);
        }
    }
}

/// Uniformly thin `samples` to at most `cap` entries plus the latest one.
/// The first and the latest sample always survive.
fn decimate(samples: &mut Vec<Sample>, cap: usize) {
    let Some(latest) = samples.pop() else {
        return;
    };
    if samples.len() > cap {
        let step = samples.len().div_ceil(cap);
        let kept: Vec<Sample> = samples.iter().step_by(step).copied().collect();
        *samples = kept;
    }
    samples.push(latest);
}
