// src/simulation/config.rs

use crate::error::GameError;
use crate::io::demand::DemandScenario;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of a game. Every field has a default, so a TOML file only needs
/// to name what it changes. A `shock_then_volatile` demand table works the
/// same way; the other scenarios need all of their fields:
///
/// ```toml
/// max_cycles = 20
/// seed = 7
///
/// [demand]
/// kind = "normal"
/// mean = 12.0
/// std_dev = 3.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_cycles: u32,

    pub vendor_inventory: u32,
    pub manufacturer_inventory: u32,
    pub distributor_inventory: u32,
    pub end_user_inventory: u32,

    /// Added to the Vendor every cycle; the raw-material source never runs dry.
    pub vendor_replenishment: u32,

    // Order-up-to heuristic
    pub target_inventory: u32,
    pub panic_threshold: u32,
    pub panic_increment: u32,

    // Used by the reporting side only
    pub holding_cost: f64,
    pub backlog_cost: f64,

    pub seed: u64,
    pub demand: DemandScenario,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_cycles: 10,
            vendor_inventory: 1000,
            manufacturer_inventory: 20,
            distributor_inventory: 15,
            end_user_inventory: 0,
            vendor_replenishment: 1000,
            target_inventory: 20,
            panic_threshold: 5,
            panic_increment: 5,
            holding_cost: 0.5,
            backlog_cost: 1.0,
            seed: 0,
            demand: DemandScenario::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GameError> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_cycles == 0 {
            return Err(GameError::InvalidConfig(
                "max_cycles must be at least 1".into(),
            ));
        }
        if !(self.holding_cost >= 0.0 && self.backlog_cost >= 0.0) {
            return Err(GameError::InvalidConfig(
                "holding_cost and backlog_cost must be non-negative".into(),
            ));
        }
        self.demand.validate().map_err(GameError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demand::ShockSchedule;

    #[test]
    fn test_defaults_match_the_classroom_game() {
        let config = SimulationConfig::default();
        assert_eq!(config.max_cycles, 10);
        assert_eq!(config.vendor_inventory, 1000);
        assert_eq!(config.manufacturer_inventory, 20);
        assert_eq!(config.distributor_inventory, 15);
        assert_eq!(config.end_user_inventory, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str("max_cycles = 20\nseed = 9\n").unwrap();
        assert_eq!(config.max_cycles, 20);
        assert_eq!(config.seed, 9);
        assert_eq!(config.target_inventory, 20);
        assert_eq!(config.demand, DemandScenario::default());
    }

    #[test]
    fn test_toml_demand_scenario() {
        let text = r#"
            [demand]
            kind = "constant"
            value = 8
        "#;
        let config = SimulationConfig::from_toml_str(text).unwrap();
        assert_eq!(config.demand, DemandScenario::Constant { value: 8 });
    }

    #[test]
    fn test_shock_table_fills_missing_fields() {
        let text = r#"
            [demand]
            kind = "shock_then_volatile"
            shock_demand = 45
        "#;
        let config = SimulationConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config.demand,
            DemandScenario::ShockThenVolatile(ShockSchedule {
                shock_demand: 45,
                ..ShockSchedule::default()
            })
        );

        let bare = SimulationConfig::from_toml_str("[demand]\nkind = \"shock_then_volatile\"\n").unwrap();
        assert_eq!(bare.demand, DemandScenario::default());
    }

    #[test]
    fn test_zero_cycles_rejected() {
        let err = SimulationConfig::from_toml_str("max_cycles = 0").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = SimulationConfig::from_toml_str("max_cycles = \"ten\"").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }
}
