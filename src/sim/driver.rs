//! Cooperative frame loop around `FrameStepper`.

use super::frame::{FrameReport, FrameStepper};
use crate::model::ConfigError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation flag owned by a driver; clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// Stop flag was set; the last frame stands.
    Stopped { frames: u64 },
    /// Input ran out (deltas exhausted or wall-clock budget spent).
    Elapsed { frames: u64 },
    /// The engine rejected a frame; no further frames were driven.
    Failed { frames: u64, error: ConfigError },
}

pub struct FrameDriver {
    stepper: FrameStepper,
    stop: StopHandle,
    frames: u64,
}

impl FrameDriver {
    pub fn new(stepper: FrameStepper) -> Self {
        Self {
            stepper,
            stop: StopHandle::default(),
            frames: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stepper(&self) -> &FrameStepper {
        &self.stepper
    }

    pub fn into_stepper(self) -> FrameStepper {
        self.stepper
    }

    fn frame(
        &mut self,
        elapsed: f64,
        on_frame: &mut impl FnMut(&FrameReport),
    ) -> Result<(), ConfigError> {
        let report = self.stepper.step(elapsed)?;
        self.frames += 1;
        on_frame(&report);
        Ok(())
    }

    /// Drive one frame per supplied wall-clock delta.
    pub fn drive_deltas<I>(
        &mut self,
        deltas: I,
        mut on_frame: impl FnMut(&FrameReport),
    ) -> DriveOutcome
    where
        I: IntoIterator<Item = f64>,
    {
        for elapsed in deltas {
            if self.stop.is_stopped() {
                return DriveOutcome::Stopped {
                    frames: self.frames,
                };
            }
            if let Err(error) = self.frame(elapsed, &mut on_frame) {
                tracing::warn!("frame rejected: {}", error);
                return DriveOutcome::Failed {
                    frames: self.frames,
                    error,
                };
            }
        }
        if self.stop.is_stopped() {
            return DriveOutcome::Stopped {
                frames: self.frames,
            };
        }
        DriveOutcome::Elapsed {
            frames: self.frames,
        }
    }

    /// Drive frames from the real clock for `budget`, pausing `interval` between frames.
    pub fn run_for(
        &mut self,
        budget: Duration,
        interval: Duration,
        mut on_frame: impl FnMut(&FrameReport),
    ) -> DriveOutcome {
        let start = Instant::now();
        let mut last = start;
        loop {
            if self.stop.is_stopped() {
                return DriveOutcome::Stopped {
                    frames: self.frames,
                };
            }
            if start.elapsed() >= budget {
                return DriveOutcome::Elapsed {
                    frames: self.frames,
                };
            }
            std::thread::sleep(interval);
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64();
            last = now;
            if let Err(error) = self.frame(elapsed, &mut on_frame) {
                tracing::warn!("frame rejected: {}", error);
                return DriveOutcome::Failed {
                    frames: self.frames,
                    error,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeaponConfig;

    fn driver() -> FrameDriver {
        FrameDriver::new(FrameStepper::new(&WeaponConfig::new(300, 60.0, 2.3), 1.0).unwrap())
    }

    #[test]
    fn runs_all_deltas() {
        let mut d = driver();
        let mut seen = 0;
        let out = d.drive_deltas(vec![0.1; 10], |_| seen += 1);
        assert_eq!(out, DriveOutcome::Elapsed { frames: 10 });
        assert_eq!(seen, 10);
        assert_eq!(d.stepper().simulation().state().total_shots, 60);
    }

    #[test]
    fn stop_takes_effect_before_next_frame() {
        let mut d = driver();
        let stop = d.stop_handle();
        let out = d.drive_deltas(vec![0.1; 10], |r| {
            if r.total_shots >= 30 {
                stop.stop();
            }
        });
        assert_eq!(out, DriveOutcome::Stopped { frames: 5 });
        let stepper = d.into_stepper();
        let last = *stepper.samples().last().unwrap();
        assert_eq!(last.ammo, 270);
        assert!((last.time - 0.5).abs() < 1e-9);
    }

    #[test]
    fn error_stops_driving() {
        let mut d = driver();
        let out = d.drive_deltas(vec![0.1, 0.1, -1.0, 0.1], |_| {});
        assert_eq!(
            out,
            DriveOutcome::Failed {
                frames: 2,
                error: ConfigError::NegativeDelta(-1.0)
            }
        );
        assert_eq!(d.stepper().samples().len(), 3);
    }

    #[test]
    fn run_for_respects_budget() {
        let mut d = driver();
        let out = d.run_for(Duration::from_millis(30), Duration::from_millis(5), |_| {});
        match out {
            DriveOutcome::Elapsed { frames } => assert!(frames >= 1),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(d.stepper().simulation().state().time > 0.0);
    }

    #[test]
    fn stopped_before_start() {
        let mut d = driver();
        d.stop_handle().stop();
        let out = d.run_for(Duration::from_secs(5), Duration::from_millis(1), |_| {});
        assert_eq!(out, DriveOutcome::Stopped { frames: 0 });
        assert_eq!(d.stepper().samples().len(), 1);
    }
}
