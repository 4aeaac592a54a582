// src/strategy/traits.rs

use std::fmt::Debug;

/// Decision logic for a tier that is not under human control.
///
/// Policies are stateless: the step engine is a pure function of the game
/// state, so everything a policy may look at is passed in.
pub trait OrderPolicy: Debug + Send + Sync {
    /// Calculates how much to order from the upstream supplier.
    ///
    /// # Arguments
    /// * `observed_demand` - The demand signal seen this cycle.
    /// * `inventory` - Current on-hand stock, after this cycle's arrivals.
    /// * `backlog` - Current unfilled orders.
    fn calculate_order(&self, observed_demand: u32, inventory: u32, backlog: u32) -> u32;
}
