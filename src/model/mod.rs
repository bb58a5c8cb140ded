//! Weapon model: raw stats, equipment modifiers, resolved parameters.

mod refund;

pub use refund::{shots_to_exhaust, RefundRule};
use serde::{Deserialize, Serialize};

use crate::config::{COVER_TIME_SECS, RESILIENCE_REDUCTION_PCT};

/// Single-slot equipment choice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Equipment {
    #[default]
    None,
    /// Refunds ammo on every 10th cumulative shot.
    BastionCube,
    /// Cuts reload time by a fixed percentage.
    Resilience,
}

impl Equipment {
    pub fn label(self) -> &'static str {
        match self {
            Equipment::None => "No Equipment",
            Equipment::BastionCube => "Bastion Cube",
            Equipment::Resilience => "Resilience",
        }
    }
}

/// Raw weapon stats plus modifier selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Base magazine capacity.
    pub base_ammo: u32,
    /// Shots per second once fully spun up.
    pub fire_rate: f64,
    /// Base reload time in seconds (cover time not included).
    pub reload_time: f64,
    /// Wind-up weapon: first 47 shots of each magazine take a fixed 2.55 s.
    pub wind_up: bool,
    pub ammo_bonus_pct: f64,
    /// Ignored while `refund` is set.
    pub reload_reduction_pct: f64,
    pub refund: bool,
}

impl WeaponConfig {
    pub fn new(base_ammo: u32, fire_rate: f64, reload_time: f64) -> Self {
        Self {
            base_ammo,
            fire_rate,
            reload_time,
            wind_up: false,
            ammo_bonus_pct: 0.0,
            reload_reduction_pct: 0.0,
            refund: false,
        }
    }

    pub fn with_wind_up(mut self, wind_up: bool) -> Self {
        self.wind_up = wind_up;
        self
    }

    pub fn with_ammo_bonus(mut self, pct: f64) -> Self {
        self.ammo_bonus_pct = pct;
        self
    }

    /// Replace the modifier flags with those of one equipment piece.
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        match equipment {
            Equipment::None => {
                self.refund = false;
                self.reload_reduction_pct = 0.0;
            }
            Equipment::BastionCube => {
                self.refund = true;
                self.reload_reduction_pct = 0.0;
            }
            Equipment::Resilience => {
                self.refund = false;
                self.reload_reduction_pct = RESILIENCE_REDUCTION_PCT;
            }
        }
        self
    }

    /// True when both modifiers are set; the reload reduction is then ignored.
    pub fn reduction_suppressed(&self) -> bool {
        self.refund && self.reload_reduction_pct > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_ammo == 0 {
            return Err(ConfigError::NonPositiveCapacity);
        }
        if !self.fire_rate.is_finite() {
            return Err(ConfigError::NonFiniteInput("fire_rate"));
        }
        if self.fire_rate <= 0.0 {
            return Err(ConfigError::NonPositiveFireRate(self.fire_rate));
        }
        if !self.reload_time.is_finite() {
            return Err(ConfigError::NonFiniteInput("reload_time"));
        }
        if self.reload_time <= 0.0 {
            return Err(ConfigError::NonPositiveReloadTime(self.reload_time));
        }
        if !self.reload_reduction_pct.is_finite() {
            return Err(ConfigError::NonFiniteInput("reload_reduction_pct"));
        }
        if !(0.0..100.0).contains(&self.reload_reduction_pct) {
            return Err(ConfigError::ReductionOutOfRange(self.reload_reduction_pct));
        }
        if !self.ammo_bonus_pct.is_finite() {
            return Err(ConfigError::NonFiniteInput("ammo_bonus_pct"));
        }
        if self.ammo_bonus_pct < 0.0 {
            return Err(ConfigError::NegativeAmmoBonus(self.ammo_bonus_pct));
        }
        Ok(())
    }
}

/// Effective parameters after applying modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParameters {
    pub max_ammo: u32,
    /// Reload time after reduction; cover time is added separately.
    pub reload_time: f64,
}

impl ResolvedParameters {
    /// Full downtime of one reload event, cover included.
    pub fn reload_with_cover(&self) -> f64 {
        self.reload_time + COVER_TIME_SECS
    }
}

/// Resolve effective magazine size and reload time. Validates the config first.
pub fn resolve(cfg: &WeaponConfig) -> Result<ResolvedParameters, ConfigError> {
    cfg.validate()?;
    let max_ammo = if cfg.ammo_bonus_pct > 0.0 {
        (cfg.base_ammo as f64 * (1.0 + cfg.ammo_bonus_pct / 100.0)).floor() as u32
    } else {
        cfg.base_ammo
    };
    let reload_time = if cfg.reload_reduction_pct > 0.0 && !cfg.refund {
        cfg.reload_time * (1.0 - cfg.reload_reduction_pct / 100.0)
    } else {
        cfg.reload_time
    };
    Ok(ResolvedParameters {
        max_ammo,
        reload_time,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveCapacity,
    NonPositiveFireRate(f64),
    NonPositiveReloadTime(f64),
    ReductionOutOfRange(f64),
    NegativeAmmoBonus(f64),
    NonFiniteInput(&'static str),
    NegativeDelta(f64),
    NonPositiveSpeed(f64),
    HorizonOutOfRange(f64),
    /// Estimated shots over the horizon exceed the sample budget.
    TooManyShots(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveCapacity => write!(f, "magazine capacity must be at least 1"),
            ConfigError::NonPositiveFireRate(r) => {
                write!(f, "fire rate must be positive, got {}", r)
            }
            ConfigError::NonPositiveReloadTime(t) => {
                write!(f, "reload time must be positive, got {}", t)
            }
            ConfigError::ReductionOutOfRange(p) => {
                write!(f, "reload reduction must be in [0, 100), got {}", p)
            }
            ConfigError::NegativeAmmoBonus(p) => {
                write!(f, "ammo bonus must not be negative, got {}", p)
            }
            ConfigError::NonFiniteInput(field) => write!(f, "{} must be a finite number", field),
            ConfigError::NegativeDelta(d) => {
                write!(f, "frame delta must not be negative, got {}", d)
            }
            ConfigError::NonPositiveSpeed(s) => {
                write!(f, "speed multiplier must be positive, got {}", s)
            }
            ConfigError::HorizonOutOfRange(h) => {
                write!(f, "simulation horizon out of range: {}", h)
            }
            ConfigError::TooManyShots(n) => write!(
                f,
                "horizon would fire about {:.0} shots, limit is {:.0}; shorten the horizon",
                n,
                crate::config::MAX_HORIZON_SHOTS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
