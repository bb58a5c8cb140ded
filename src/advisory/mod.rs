//! Advisories: model-level notes about a weapon configuration.

use crate::config::{REFUND_INTERVAL, WIND_UP_SHOTS};
use crate::model::{resolve, shots_to_exhaust, ConfigError, WeaponConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisorySeverity {
    Info,
    Warn,
}

impl AdvisorySeverity {
    pub fn label(&self) -> &'static str {
        match self {
            AdvisorySeverity::Info => "INFO",
            AdvisorySeverity::Warn => "WARN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub code: String,
    pub severity: AdvisorySeverity,
    /// Short explanation for players.
    pub summary: String,
    /// Technical note.
    pub technical: String,
}

impl Advisory {
    pub fn reduction_suppressed(reduction_pct: f64) -> Self {
        Self {
            code: "REDUCTION_SUPPRESSED".to_string(),
            severity: AdvisorySeverity::Warn,
            summary: format!(
                "Reload reduction of {}% is ignored while the ammo refund is active.",
                reduction_pct
            ),
            technical: "Equipment is single-slot; refund takes precedence and reload time stays at base."
                .to_string(),
        }
    }

    pub fn refund_inert(max_ammo: u32) -> Self {
        Self {
            code: "REFUND_INERT".to_string(),
            severity: AdvisorySeverity::Info,
            summary: format!(
                "Magazine of {} empties before the {}th shot; the refund never triggers in the first magazine.",
                max_ammo, REFUND_INTERVAL
            ),
            technical: format!(
                "shots_to_exhaust({}, refund) == {} (no gain)",
                max_ammo, max_ammo
            ),
        }
    }

    pub fn wind_up_bound(effective_shots: u64) -> Self {
        Self {
            code: "WIND_UP_BOUND".to_string(),
            severity: AdvisorySeverity::Info,
            summary: format!(
                "All {} shots of a magazine fire inside the wind-up window; fire rate has no effect.",
                effective_shots
            ),
            technical: format!(
                "effective shots {} <= wind-up shots {}",
                effective_shots, WIND_UP_SHOTS
            ),
        }
    }
}

/// Collect advisories for `cfg`. Fails on an invalid config.
pub fn review(cfg: &WeaponConfig) -> Result<Vec<Advisory>, ConfigError> {
    let params = resolve(cfg)?;
    let mut out = Vec::new();
    if cfg.reduction_suppressed() {
        out.push(Advisory::reduction_suppressed(cfg.reload_reduction_pct));
    }
    let shots = shots_to_exhaust(params.max_ammo, cfg.refund);
    if cfg.refund && shots == params.max_ammo as u64 {
        out.push(Advisory::refund_inert(params.max_ammo));
    }
    if cfg.wind_up && shots <= WIND_UP_SHOTS as u64 {
        out.push(Advisory::wind_up_bound(shots));
    }
    Ok(out)
}
