// src/simulation/engine.rs

use crate::model::agent::Role;
use crate::model::state::{AnalysisStatus, GameState, Nodes};
use crate::simulation::config::SimulationConfig;
use crate::strategy::implementations::OrderUpToPolicy;
use crate::strategy::traits::OrderPolicy;
use tracing::debug;

/// Clamps raw human input to a valid order quantity. Negative means zero.
pub fn clamp_order(raw: i64) -> u32 {
    raw.clamp(0, u32::MAX as i64) as u32
}

/// The per-cycle step engine.
///
/// Holds the rules of the game (config and the policy for the algorithmic
/// tier) but no game state: `advance` maps one `GameState` to the next.
#[derive(Debug)]
pub struct ChainSimulation {
    config: SimulationConfig,
    policy: Box<dyn OrderPolicy>,
}

impl ChainSimulation {
    pub fn new(config: SimulationConfig, policy: Box<dyn OrderPolicy>) -> Self {
        Self { config, policy }
    }

    /// Uses the order-up-to heuristic parameterised by `config`.
    pub fn with_config(config: SimulationConfig) -> Self {
        let policy = Box::new(OrderUpToPolicy::from_config(&config));
        Self::new(config, policy)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// A fresh game: starting inventories, cycle 0, empty history, no role yet.
    pub fn initial_state(&self) -> GameState {
        let nodes = Nodes::new(
            self.config.vendor_inventory,
            self.config.manufacturer_inventory,
            self.config.distributor_inventory,
            self.config.end_user_inventory,
        );
        GameState::new(nodes, self.config.max_cycles, self.config.seed)
    }

    /// Advances the chain by one cycle.
    ///
    /// `human_role` decides which of the Distributor and Manufacturer orders
    /// come from `human_order`; the other is computed by the policy.
    ///
    /// Callers must pass a playable role and must not advance a state whose
    /// `game_over` is set; the session guards both. Debug builds assert the
    /// role. Release builds hand both tiers to the policy instead.
    pub fn advance(&self, state: &GameState, human_order: i64, human_role: Role) -> GameState {
        debug_assert!(human_role.is_playable(), "{human_role} cannot be played");
        let cycle = state.current_cycle + 1;
        let demand = self.config.demand.demand_for_cycle(state.seed, cycle);
        let human_order = clamp_order(human_order);

        // Nodes are Copy: these are new values, the old state is left untouched.
        let mut vendor = state.nodes.vendor;
        let mut manufacturer = state.nodes.manufacturer;
        let mut distributor = state.nodes.distributor;
        let mut end_user = state.nodes.end_user;

        // =================================================================
        // PHASE 1: Arrivals (shipped last cycle)
        // =================================================================
        distributor.receive_shipment();
        manufacturer.receive_shipment();
        vendor.inventory = vendor
            .inventory
            .saturating_add(self.config.vendor_replenishment);

        // =================================================================
        // PHASE 2: Distributor serves the End User
        // =================================================================
        end_user.incoming_order = demand;
        distributor.fulfil(demand);

        // =================================================================
        // PHASE 3: Order decisions
        // The Manufacturer sees the Distributor's order within the same cycle.
        // =================================================================
        let (distributor_order, manufacturer_order) = match human_role {
            Role::Distributor => {
                let mfg = self.policy.calculate_order(
                    human_order,
                    manufacturer.inventory,
                    manufacturer.backlog,
                );
                (human_order, mfg)
            }
            Role::Manufacturer => {
                let dist = self.policy.calculate_order(
                    demand,
                    distributor.inventory,
                    distributor.backlog,
                );
                (dist, human_order)
            }
            Role::Vendor | Role::EndUser => {
                let dist = self.policy.calculate_order(
                    demand,
                    distributor.inventory,
                    distributor.backlog,
                );
                let mfg =
                    self.policy
                        .calculate_order(dist, manufacturer.inventory, manufacturer.backlog);
                (dist, mfg)
            }
        };
        distributor.outgoing_order = distributor_order;

        // =================================================================
        // PHASE 4: Upstream fulfilment
        // =================================================================
        let manufacturer_shipped = manufacturer.fulfil(distributor_order);
        manufacturer.outgoing_order = manufacturer_order;
        let vendor_shipped = vendor.ship_unconstrained(manufacturer_order);

        // =================================================================
        // PHASE 5: Shipments in transit (one cycle lead time)
        // =================================================================
        distributor.incoming_shipment = manufacturer_shipped;
        manufacturer.incoming_shipment = vendor_shipped;

        debug!(
            cycle,
            demand,
            distributor_order,
            manufacturer_order,
            distributor_backlog = distributor.backlog,
            manufacturer_backlog = manufacturer.backlog,
            "advanced cycle"
        );

        // =================================================================
        // PHASE 6: Record & advance
        // =================================================================
        let mut history = Vec::with_capacity(state.history.len() + 1);
        history.extend(state.history.iter().cloned());
        history.push(state.snapshot());

        GameState {
            current_cycle: cycle,
            max_cycles: state.max_cycles,
            nodes: Nodes {
                vendor,
                manufacturer,
                distributor,
                end_user,
            },
            history,
            player_role: state.player_role,
            game_over: cycle >= state.max_cycles,
            seed: state.seed,
            analysis: AnalysisStatus::Pending,
        }
    }

    /// Plays a whole game from the initial state, asking `order_for` for the
    /// human order each cycle.
    pub fn run<F>(&self, human_role: Role, mut order_for: F) -> GameState
    where
        F: FnMut(&GameState) -> i64,
    {
        let mut state = self.initial_state();
        state.player_role = Some(human_role);
        while !state.game_over {
            let order = order_for(&state);
            state = self.advance(&state, order, human_role);
        }
        state
    }
}
