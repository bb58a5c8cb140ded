//! Steady-state uptime: one magazine's fire, reload and cover cycle.

use crate::config::{COVER_TIME_SECS, WIND_UP_SECS, WIND_UP_SHOTS};
use crate::model::{resolve, shots_to_exhaust, ConfigError, WeaponConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UptimeResult {
    /// Percentage of the cycle spent shooting, in (0, 100].
    pub uptime: f64,
    pub shooting_time: f64,
    /// Reload + shooting + cover.
    pub total_time: f64,
    /// Effective reload time (after reduction, without cover).
    pub reload_time: f64,
    pub cover_time: f64,
    /// Trigger-pulls per magazine (refund included).
    pub effective_shots: u64,
    /// Magazine size after the ammo bonus.
    pub max_ammo: u32,
    pub base_ammo: u32,
}

/// Time to fire `shots` from a fresh magazine.
pub fn shooting_time(shots: u64, fire_rate: f64, wind_up: bool) -> f64 {
    if !wind_up {
        return shots as f64 / fire_rate;
    }
    let wind_up_shots = WIND_UP_SHOTS as u64;
    if shots <= wind_up_shots {
        (shots as f64 / wind_up_shots as f64) * WIND_UP_SECS
    } else {
        WIND_UP_SECS + (shots - wind_up_shots) as f64 / fire_rate
    }
}

pub fn calculate_uptime(cfg: &WeaponConfig) -> Result<UptimeResult, ConfigError> {
    let params = resolve(cfg)?;
    let effective_shots = shots_to_exhaust(params.max_ammo, cfg.refund);
    let shooting = shooting_time(effective_shots, cfg.fire_rate, cfg.wind_up);
    let total = params.reload_time + shooting + COVER_TIME_SECS;
    Ok(UptimeResult {
        uptime: 100.0 * shooting / total,
        shooting_time: shooting,
        total_time: total,
        reload_time: params.reload_time,
        cover_time: COVER_TIME_SECS,
        effective_shots,
        max_ammo: params.max_ammo,
        base_ammo: cfg.base_ammo,
    })
}

impl UptimeResult {
    /// Human-readable derivation of the result, one step per line.
    pub fn breakdown(&self, cfg: &WeaponConfig) -> Vec<String> {
        let mut lines = Vec::new();
        if cfg.ammo_bonus_pct > 0.0 {
            lines.push(format!(
                "Base ammo: {} + {}% bonus = {} ammo",
                self.base_ammo, cfg.ammo_bonus_pct, self.max_ammo
            ));
        } else {
            lines.push(format!("Base ammo: {}", self.base_ammo));
        }
        if cfg.refund {
            lines.push("Bastion Cube: active (refunds 4 ammo every 10th shot)".to_string());
            lines.push(format!("Effective shots: {}", self.effective_shots));
        }
        if cfg.reload_reduction_pct > 0.0 && !cfg.refund {
            lines.push(format!(
                "Reload time: {}s - {}% = {:.2}s",
                cfg.reload_time, cfg.reload_reduction_pct, self.reload_time
            ));
        } else {
            lines.push(format!("Reload time: {}s", cfg.reload_time));
        }
        if cfg.wind_up {
            lines.push(format!(
                "Wind-up: {}s for the first {} ammo",
                WIND_UP_SECS, WIND_UP_SHOTS
            ));
            if self.effective_shots <= WIND_UP_SHOTS as u64 {
                lines.push(format!(
                    "Shooting time: ({}/{}) * {} = {:.2}s",
                    self.effective_shots, WIND_UP_SHOTS, WIND_UP_SECS, self.shooting_time
                ));
            } else {
                lines.push(format!(
                    "Shooting time: {}s + ({}/{}) = {:.2}s",
                    WIND_UP_SECS,
                    self.effective_shots - WIND_UP_SHOTS as u64,
                    cfg.fire_rate,
                    self.shooting_time
                ));
            }
        } else {
            lines.push(format!(
                "Shooting time: {}/{} = {:.2}s",
                self.effective_shots, cfg.fire_rate, self.shooting_time
            ));
        }
        lines.push(format!(
            "Magazine cycle: {:.2}s + {:.2}s (reload) + {:.2}s (cover) = {:.2}s",
            self.shooting_time, self.reload_time, self.cover_time, self.total_time
        ));
        lines.push(format!(
            "Uptime: {:.2}s / {:.2}s = {:.2}%",
            self.shooting_time, self.total_time, self.uptime
        ));
        lines
    }
}
