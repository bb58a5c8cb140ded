//! Model constants and weapon profile loading.

use crate::model::{Equipment, WeaponConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Downtime added to every reload while the unit is in cover (seconds).
pub const COVER_TIME_SECS: f64 = 0.23333;

/// Wind-up window of a wind-up weapon at the start of every magazine (seconds).
pub const WIND_UP_SECS: f64 = 2.55;

/// Shots consumed by the wind-up window.
pub const WIND_UP_SHOTS: u32 = 47;

/// Every Nth cumulative trigger-pull refunds ammo.
pub const REFUND_INTERVAL: u64 = 10;

/// Ammo returned by one refund.
pub const REFUND_AMOUNT: u32 = 4;

/// Reload-time reduction granted by the Resilience equipment (percent).
pub const RESILIENCE_REDUCTION_PCT: f64 = 29.69;

/// Samples kept by frame-step mode before the series is decimated.
pub const FRAME_SAMPLE_CAP: usize = 200;

/// Weapon used when neither a profile nor flags give one.
pub const DEFAULT_BASE_AMMO: u32 = 300;
pub const DEFAULT_FIRE_RATE: f64 = 60.0;
pub const DEFAULT_RELOAD_SECS: f64 = 2.3;

/// Default simulation horizon in seconds for fixed-horizon runs.
pub const DEFAULT_SIMULATION_SECONDS: f64 = 30.0;

/// Largest horizon accepted by fixed-horizon runs.
pub const MAX_SIMULATION_SECONDS: f64 = 3600.0;

/// Upper bound on shots a fixed-horizon run may fire; each shot keeps one sample.
pub const MAX_HORIZON_SHOTS: f64 = 2_000_000.0;

/// Default multiplier applied to wall-clock deltas in live runs.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Default pause between live frames in milliseconds.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Maximum size in bytes for a profile file.
pub const MAX_PROFILE_FILE_BYTES: u64 = 64 * 1024;

/// Weapon profile as stored in a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct WeaponProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub ammo: u32,
    pub fire_rate: f64,
    pub reload_time: f64,
    #[serde(default)]
    pub wind_up: bool,
    #[serde(default)]
    pub ammo_bonus_pct: f64,
    /// Single-slot equipment choice; applied before the raw overrides below.
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub reload_reduction_pct: Option<f64>,
    #[serde(default)]
    pub refund: Option<bool>,
}

impl WeaponProfile {
    /// Build the weapon config this profile describes.
    pub fn to_config(&self) -> WeaponConfig {
        let mut cfg = WeaponConfig::new(self.ammo, self.fire_rate, self.reload_time)
            .with_wind_up(self.wind_up)
            .with_ammo_bonus(self.ammo_bonus_pct);
        if let Some(eq) = self.equipment {
            cfg = cfg.with_equipment(eq);
        }
        if let Some(pct) = self.reload_reduction_pct {
            cfg.reload_reduction_pct = pct;
        }
        if let Some(refund) = self.refund {
            cfg.refund = refund;
        }
        cfg
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// Parse a profile from TOML text.
pub fn parse_profile(content: &str) -> Result<WeaponProfile, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

/// Load a profile from a TOML file on disk.
pub fn load_profile(path: &Path) -> Result<WeaponProfile, String> {
    let meta = fs::metadata(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if meta.len() > MAX_PROFILE_FILE_BYTES {
        return Err(format!(
            "profile too large: {} bytes (max {})",
            meta.len(),
            MAX_PROFILE_FILE_BYTES
        ));
    }
    let s = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    parse_profile(&s).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults() {
        let p = parse_profile("ammo = 300\nfire_rate = 60.0\nreload_time = 2.3\n").unwrap();
        assert_eq!(p.display_name(), "unnamed");
        let cfg = p.to_config();
        assert_eq!(cfg.base_ammo, 300);
        assert!(!cfg.wind_up);
        assert!(!cfg.refund);
        assert_eq!(cfg.reload_reduction_pct, 0.0);
        assert_eq!(cfg.ammo_bonus_pct, 0.0);
    }

    #[test]
    fn profile_equipment_then_overrides() {
        let p = parse_profile(
            r#"
name = "test"
ammo = 60
fire_rate = 12.0
reload_time = 1.5
wind_up = true
equipment = "resilience"
refund = true
"#,
        )
        .unwrap();
        let cfg = p.to_config();
        assert!(cfg.wind_up);
        assert!(cfg.refund);
        assert!((cfg.reload_reduction_pct - RESILIENCE_REDUCTION_PCT).abs() < 1e-9);
    }

    #[test]
    fn profile_rejects_missing_ammo() {
        assert!(parse_profile("fire_rate = 1.0\nreload_time = 1.0\n").is_err());
    }
}
