//! Ammo trajectory simulator: fire / wind-up / reload state machine.
//!
//! `Simulation` holds the physics shared by both operating modes. `horizon`
//! drives it one shot at a time up to a fixed time; `frame` drives it with
//! arbitrary time deltas and keeps a bounded sample series for live display.

pub mod driver;
pub mod frame;
pub mod horizon;

use crate::config::{WIND_UP_SECS, WIND_UP_SHOTS};
use crate::model::{resolve, ConfigError, RefundRule, ResolvedParameters, WeaponConfig};
use serde::{Deserialize, Serialize};

/// Tolerance when deciding that wind-up progress has reached its shot count.
const WIND_UP_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    WindingUp,
    Firing,
    Reloading,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::WindingUp => "WINDING UP",
            Phase::Firing => "FIRING",
            Phase::Reloading => "RELOADING",
        }
    }
}

/// One point of the ammo curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub ammo: u32,
}

/// Mutable state of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub ammo: u32,
    /// Cumulative shots since start; refund parity is taken from this.
    pub total_shots: u64,
    pub shots_in_mag: u64,
    /// Fractional shot carried between steps at the normal fire rate.
    pub fire_remainder: f64,
    /// Fractional shot carried between steps during wind-up.
    pub wind_up_remainder: f64,
    /// Virtual shots of wind-up completed in the current magazine.
    pub wind_up_progress: f64,
    pub phase: Phase,
    /// Set only while reloading.
    pub reload_start: Option<f64>,
}

/// Result of firing a batch of shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Volley {
    pub fired: u64,
    pub refunded: u32,
}

/// Physics of a single weapon: owns its state exclusively.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: ResolvedParameters,
    fire_rate: f64,
    wind_up: bool,
    refund: Option<RefundRule>,
    state: SimulationState,
}

impl Simulation {
    pub fn new(cfg: &WeaponConfig) -> Result<Self, ConfigError> {
        let params = resolve(cfg)?;
        let phase = if cfg.wind_up {
            Phase::WindingUp
        } else {
            Phase::Firing
        };
        Ok(Self {
            params,
            fire_rate: cfg.fire_rate,
            wind_up: cfg.wind_up,
            refund: cfg.refund.then(RefundRule::default),
            state: SimulationState {
                time: 0.0,
                ammo: params.max_ammo,
                total_shots: 0,
                shots_in_mag: 0,
                fire_remainder: 0.0,
                wind_up_remainder: 0.0,
                wind_up_progress: 0.0,
                phase,
                reload_start: None,
            },
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn params(&self) -> &ResolvedParameters {
        &self.params
    }

    pub fn refund_rule(&self) -> Option<RefundRule> {
        self.refund
    }

    pub fn sample(&self) -> Sample {
        Sample {
            time: self.state.time,
            ammo: self.state.ammo,
        }
    }

    /// Phase a fresh magazine starts in.
    fn fresh_phase(&self) -> Phase {
        if self.wind_up {
            Phase::WindingUp
        } else {
            Phase::Firing
        }
    }

    /// Fire up to `shots` one at a time, applying the refund after each shot.
    /// Stops early when the magazine runs dry.
    pub(crate) fn fire(&mut self, shots: u64) -> Volley {
        let mut volley = Volley::default();
        let max = self.params.max_ammo;
        for _ in 0..shots {
            if self.state.ammo == 0 {
                break;
            }
            self.state.ammo -= 1;
            self.state.total_shots += 1;
            self.state.shots_in_mag += 1;
            volley.fired += 1;
            if let Some(rule) = self.refund {
                let refund = rule.refund_for_shot(self.state.total_shots);
                if refund > 0 {
                    let before = self.state.ammo;
                    self.state.ammo = before.saturating_add(refund).min(max);
                    volley.refunded += self.state.ammo - before;
                    tracing::debug!(
                        shot = self.state.total_shots,
                        ammo = self.state.ammo,
                        "refund applied"
                    );
                }
            }
        }
        volley
    }

    pub(crate) fn begin_reload(&mut self, at: f64) {
        tracing::debug!(
            time = at,
            shots_in_mag = self.state.shots_in_mag,
            "magazine empty, reloading"
        );
        self.state.phase = Phase::Reloading;
        self.state.reload_start = Some(at);
        self.state.fire_remainder = 0.0;
        self.state.wind_up_remainder = 0.0;
    }

    pub(crate) fn finish_reload(&mut self) {
        self.state.ammo = self.params.max_ammo;
        self.state.shots_in_mag = 0;
        self.state.wind_up_progress = 0.0;
        self.state.wind_up_remainder = 0.0;
        self.state.reload_start = None;
        self.state.phase = self.fresh_phase();
        tracing::debug!(time = self.state.time, "reload complete");
    }

    fn finish_wind_up(&mut self) {
        self.state.wind_up_progress = WIND_UP_SHOTS as f64;
        self.state.phase = Phase::Firing;
        tracing::debug!(time = self.state.time, "wind-up complete");
    }

    /// Time the next shot takes in the current phase.
    pub(crate) fn shot_interval(&self) -> f64 {
        match self.state.phase {
            Phase::WindingUp => WIND_UP_SECS / WIND_UP_SHOTS as f64,
            _ => 1.0 / self.fire_rate,
        }
    }

    /// Advance the clock by one shot interval and fire that shot.
    pub(crate) fn step_shot(&mut self, dt: f64) -> Volley {
        self.state.time += dt;
        let volley = self.fire(1);
        if self.state.phase == Phase::WindingUp {
            self.state.wind_up_progress += volley.fired as f64;
            if self.state.wind_up_progress >= WIND_UP_SHOTS as f64 {
                self.finish_wind_up();
            }
        }
        if self.state.ammo == 0 {
            self.begin_reload(self.state.time);
        }
        volley
    }

    /// Advance the clock by `dt` seconds of simulated time, converting elapsed
    /// time into whole shots and carrying the fractional remainder.
    pub(crate) fn advance(&mut self, dt: f64) -> Volley {
        self.state.time += dt;
        let mut left = dt;
        let mut total = Volley::default();
        loop {
            match self.state.phase {
                Phase::Reloading => {
                    let start = self.state.reload_start.unwrap_or(self.state.time);
                    let elapsed = self.state.time - start;
                    let needed = self.params.reload_with_cover();
                    if elapsed < needed {
                        return total;
                    }
                    left = (elapsed - needed).min(left);
                    self.finish_reload();
                }
                Phase::WindingUp => {
                    let rate = WIND_UP_SHOTS as f64 / WIND_UP_SECS;
                    let needed = (WIND_UP_SHOTS as f64 - self.state.wind_up_progress).max(0.0);
                    let available = rate * left;
                    let completes = available >= needed - WIND_UP_EPS;
                    let (virtual_shots, spent) = if completes {
                        (needed, (needed / rate).min(left))
                    } else {
                        (available, left)
                    };
                    self.state.wind_up_progress += virtual_shots;
                    self.state.wind_up_remainder += virtual_shots;
                    let whole = self.state.wind_up_remainder.floor();
                    self.state.wind_up_remainder -= whole;
                    let volley = self.fire(whole as u64);
                    total.fired += volley.fired;
                    total.refunded += volley.refunded;
                    if self.state.ammo == 0 {
                        self.begin_reload(self.state.time);
                        return total;
                    }
                    if !completes {
                        return total;
                    }
                    // Leftover fraction of the last wind-up shot carries into normal fire.
                    self.state.fire_remainder += self.state.wind_up_remainder;
                    self.state.wind_up_remainder = 0.0;
                    self.finish_wind_up();
                    left -= spent;
                }
                Phase::Firing => {
                    self.state.fire_remainder += self.fire_rate * left;
                    let whole = self.state.fire_remainder.floor();
                    self.state.fire_remainder -= whole;
                    let volley = self.fire(whole as u64);
                    total.fired += volley.fired;
                    total.refunded += volley.refunded;
                    if self.state.ammo == 0 {
                        self.begin_reload(self.state.time);
                    }
                    return total;
                }
            }
        }
    }

    /// Fraction of the current wind-up or reload completed, if in either phase.
    pub fn progress(&self) -> Option<f64> {
        match self.state.phase {
            Phase::WindingUp => {
                Some((self.state.wind_up_progress / WIND_UP_SHOTS as f64).min(1.0))
            }
            Phase::Reloading => {
                let start = self.state.reload_start?;
                Some(((self.state.time - start) / self.params.reload_with_cover()).min(1.0))
            }
            Phase::Firing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{shots_to_exhaust, Equipment};

    #[test]
    fn starts_full() {
        let sim = Simulation::new(&WeaponConfig::new(300, 60.0, 2.3)).unwrap();
        assert_eq!(sim.state().ammo, 300);
        assert_eq!(sim.state().phase, Phase::Firing);
        let sim = Simulation::new(&WeaponConfig::new(300, 60.0, 2.3).with_wind_up(true)).unwrap();
        assert_eq!(sim.state().phase, Phase::WindingUp);
    }

    #[test]
    fn fire_applies_refund_and_caps() {
        let cfg = WeaponConfig::new(12, 10.0, 1.0).with_equipment(Equipment::BastionCube);
        let mut sim = Simulation::new(&cfg).unwrap();
        let v = sim.fire(10);
        assert_eq!(v.fired, 10);
        assert_eq!(v.refunded, 4);
        assert_eq!(sim.state().ammo, 6);
        // Later magazines: refund on a full magazine is capped.
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.fire(9);
        sim.state.ammo = 12;
        let v = sim.fire(1);
        assert_eq!(v.refunded, 1);
        assert_eq!(sim.state().ammo, 12);
    }

    #[test]
    fn refund_near_u32_max_saturates() {
        let cfg = WeaponConfig::new(u32::MAX, 10.0, 1.0).with_equipment(Equipment::BastionCube);
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.fire(9);
        sim.state.ammo = u32::MAX;
        let v = sim.fire(1);
        assert_eq!(v.fired, 1);
        assert_eq!(v.refunded, 1);
        assert_eq!(sim.state().ammo, u32::MAX);
    }

    #[test]
    fn fire_stops_when_empty() {
        let mut sim = Simulation::new(&WeaponConfig::new(5, 10.0, 1.0)).unwrap();
        let v = sim.fire(8);
        assert_eq!(v.fired, 5);
        assert_eq!(sim.state().ammo, 0);
    }

    fn shots_until_first_reload(cfg: &WeaponConfig, dt: f64) -> u64 {
        let mut sim = Simulation::new(cfg).unwrap();
        for _ in 0..1_000_000 {
            sim.advance(dt);
            if sim.state().phase == Phase::Reloading {
                return sim.state().total_shots;
            }
        }
        panic!("never reloaded");
    }

    #[test]
    fn exhaustion_matches_counter_at_any_step() {
        for cap in [1u32, 9, 10, 11, 37, 100, 300] {
            for refund in [false, true] {
                let mut cfg = WeaponConfig::new(cap, 60.0, 2.3);
                cfg.refund = refund;
                let expected = shots_to_exhaust(cap, refund);
                for dt in [0.001, 1.0 / 60.0, 0.05, 0.37, 2.0, 50.0] {
                    assert_eq!(
                        shots_until_first_reload(&cfg, dt),
                        expected,
                        "cap={} refund={} dt={}",
                        cap,
                        refund,
                        dt
                    );
                }
            }
        }
    }

    #[test]
    fn exhaustion_matches_counter_with_wind_up() {
        for cap in [20u32, 47, 48, 300] {
            let cfg = WeaponConfig::new(cap, 30.0, 1.0)
                .with_wind_up(true)
                .with_equipment(Equipment::BastionCube);
            let expected = shots_to_exhaust(cap, true);
            for dt in [0.01, 0.1, 0.9, 4.0] {
                assert_eq!(shots_until_first_reload(&cfg, dt), expected);
            }
        }
    }

    #[test]
    fn reload_overflow_keeps_firing() {
        let cfg = WeaponConfig::new(10, 10.0, 0.5);
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.advance(1.0);
        assert_eq!(sim.state().phase, Phase::Reloading);
        assert_eq!(sim.state().ammo, 0);
        // Reload + cover is 0.73333 s; the rest of this step fires at 10/s.
        sim.advance(1.0);
        assert_eq!(sim.state().phase, Phase::Firing);
        assert_eq!(sim.state().ammo, 8);
        assert_eq!(sim.state().shots_in_mag, 2);
    }

    #[test]
    fn wind_up_recurs_each_magazine() {
        let cfg = WeaponConfig::new(60, 60.0, 0.5).with_wind_up(true);
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.advance(2.55);
        assert_eq!(sim.state().phase, Phase::Firing);
        assert_eq!(sim.state().ammo, 13);
        sim.advance(1.0);
        assert_eq!(sim.state().phase, Phase::Reloading);
        sim.advance(0.8);
        assert_eq!(sim.state().phase, Phase::WindingUp);
        assert!(sim.state().shots_in_mag <= 2);
        assert!(sim.state().ammo >= 58);
        assert!(sim.progress().unwrap() < 0.1);
    }

    #[test]
    fn wind_up_exhausted_goes_to_reload() {
        let cfg = WeaponConfig::new(20, 60.0, 1.0).with_wind_up(true);
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.advance(2.0);
        assert_eq!(sim.state().phase, Phase::Reloading);
        assert_eq!(sim.state().total_shots, 20);
        assert_eq!(sim.state().wind_up_remainder, 0.0);
    }
}
