//! Equipment comparison: baseline vs. refund vs. reduced reload on the same weapon.

use crate::advisory::{review, Advisory};
use crate::model::{ConfigError, Equipment, WeaponConfig};
use crate::sim::horizon::{simulate_horizon, validate_horizon, Trajectory};
use crate::uptime::{calculate_uptime, UptimeResult};
use serde::{Deserialize, Serialize};

/// Which equipment lines to run next to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompareSet {
    #[default]
    Both,
    Bastion,
    Resilience,
}

impl CompareSet {
    pub fn equipment(self) -> Vec<Equipment> {
        match self {
            CompareSet::Both => vec![
                Equipment::None,
                Equipment::BastionCube,
                Equipment::Resilience,
            ],
            CompareSet::Bastion => vec![Equipment::None, Equipment::BastionCube],
            CompareSet::Resilience => vec![Equipment::None, Equipment::Resilience],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub equipment: Equipment,
    pub label: String,
    pub config: WeaponConfig,
    pub uptime: UptimeResult,
    pub trajectory: Trajectory,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub name: String,
    pub horizon: f64,
    pub variants: Vec<Variant>,
}

impl Comparison {
    pub fn variant(&self, equipment: Equipment) -> Option<&Variant> {
        self.variants.iter().find(|v| v.equipment == equipment)
    }

    /// Variant with the most shots fired over the horizon.
    pub fn best_by_shots(&self) -> Option<&Variant> {
        self.variants
            .iter()
            .max_by_key(|v| v.trajectory.total_shots)
    }
}

/// Run every variant of `set` for the base weapon in `cfg`. The equipment
/// flags already on `cfg` are replaced per variant.
pub fn compare_equipment(
    name: &str,
    cfg: &WeaponConfig,
    horizon: f64,
    set: CompareSet,
) -> Result<Comparison, ConfigError> {
    cfg.validate()?;
    validate_horizon(horizon)?;
    let mut variants = Vec::new();
    for equipment in set.equipment() {
        let config = cfg.clone().with_equipment(equipment);
        let uptime = calculate_uptime(&config)?;
        let trajectory = simulate_horizon(&config, horizon)?;
        let advisories = review(&config)?;
        tracing::debug!(
            variant = equipment.label(),
            uptime = uptime.uptime,
            shots = trajectory.total_shots,
            "variant done"
        );
        variants.push(Variant {
            equipment,
            label: equipment.label().to_string(),
            config,
            uptime,
            trajectory,
            advisories,
        });
    }
    Ok(Comparison {
        name: name.to_string(),
        horizon,
        variants,
    })
}
