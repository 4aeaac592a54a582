// src/strategy/implementations.rs

use crate::simulation::config::SimulationConfig;
use crate::strategy::traits::OrderPolicy;

// =========================================================================
// Order-Up-To Policy with a panic factor
// =========================================================================

/// The policy driving the tier the human does not play.
///
/// Formula: Order = Demand + (TargetInventory - (Inventory - Backlog))
/// When the backlog grows past `panic_threshold` the agent over-orders by
/// `panic_increment`, which is what turns a demand blip into a whip.
///
/// If we are overstocked the order is clamped to 0.
#[derive(Debug, Clone)]
pub struct OrderUpToPolicy {
    target_inventory: i64,
    panic_threshold: u32,
    panic_increment: i64,
}

impl OrderUpToPolicy {
    pub fn new(target_inventory: u32, panic_threshold: u32, panic_increment: u32) -> Self {
        Self {
            target_inventory: target_inventory as i64,
            panic_threshold,
            panic_increment: panic_increment as i64,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.target_inventory,
            config.panic_threshold,
            config.panic_increment,
        )
    }
}

impl Default for OrderUpToPolicy {
    fn default() -> Self {
        Self::new(20, 5, 5)
    }
}

impl OrderPolicy for OrderUpToPolicy {
    fn calculate_order(&self, observed_demand: u32, inventory: u32, backlog: u32) -> u32 {
        // Widen so the gap can go negative when overstocked
        let position = inventory as i64 - backlog as i64;
        let gap = self.target_inventory - position;

        let mut order = observed_demand as i64 + gap;
        if backlog > self.panic_threshold {
            order += self.panic_increment;
        }

        order.clamp(0, u32::MAX as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tops_up_to_target() {
        let policy = OrderUpToPolicy::default();
        assert_eq!(policy.calculate_order(10, 15, 0), 15);
    }

    #[test]
    fn test_backlog_triggers_panic_increment() {
        let policy = OrderUpToPolicy::default();
        // position = 3, base = 10 + 17 = 27, backlog 7 > 5 adds 5
        assert_eq!(policy.calculate_order(10, 10, 7), 32);
    }

    #[test]
    fn test_backlog_at_threshold_does_not_panic() {
        let policy = OrderUpToPolicy::default();
        // position = -5, base = 10 + 25 = 35
        assert_eq!(policy.calculate_order(10, 0, 5), 35);
    }

    #[test]
    fn test_overstock_clamps_to_zero() {
        let policy = OrderUpToPolicy::default();
        assert_eq!(policy.calculate_order(2, 100, 0), 0);
    }

    #[test]
    fn test_from_config_uses_configured_target() {
        let config = SimulationConfig {
            target_inventory: 30,
            ..SimulationConfig::default()
        };
        let policy = OrderUpToPolicy::from_config(&config);
        assert_eq!(policy.calculate_order(10, 15, 0), 25);
    }
}
