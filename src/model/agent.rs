use serde::{Deserialize, Serialize};
use std::fmt;

/// The four tiers of the chain, listed upstream to downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Vendor,
    Manufacturer,
    Distributor,
    #[serde(rename = "End User")]
    EndUser,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Vendor,
        Role::Manufacturer,
        Role::Distributor,
        Role::EndUser,
    ];

    /// Only the two middle tiers can be handed to a human.
    pub fn is_playable(self) -> bool {
        matches!(self, Role::Manufacturer | Role::Distributor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Vendor => "Vendor",
            Role::Manufacturer => "Manufacturer",
            Role::Distributor => "Distributor",
            Role::EndUser => "End User",
        };
        f.write_str(name)
    }
}

/// The state of a single tier at a cycle boundary.
///
/// All counters are unsigned, so the non-negativity invariants hold by type.
/// Sums saturate at `u32::MAX` rather than wrapping.
/// The struct is `Copy`: the engine always works on a fresh value and never
/// touches a node that already sits in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub role: Role,

    pub inventory: u32,
    pub backlog: u32,

    pub incoming_order: u32, // Demand from downstream this cycle
    pub outgoing_order: u32, // Placed with upstream this cycle
    pub incoming_shipment: u32, // Arrives at the start of the next cycle
    pub outgoing_shipment: u32, // Sent downstream this cycle
}

impl NodeState {
    pub fn new(role: Role, initial_inventory: u32) -> Self {
        Self {
            role,
            inventory: initial_inventory,
            backlog: 0,
            incoming_order: 0,
            outgoing_order: 0,
            incoming_shipment: 0,
            outgoing_shipment: 0,
        }
    }

    /// Moves the in-transit shipment into inventory.
    ///
    /// Returns the quantity that arrived.
    pub fn receive_shipment(&mut self) -> u32 {
        let arrived = self.incoming_shipment;
        self.inventory = self.inventory.saturating_add(arrived);
        arrived
    }

    /// Serves a downstream order out of inventory, backlogging what is short.
    ///
    /// Returns the quantity shipped downstream.
    pub fn fulfil(&mut self, incoming_order: u32) -> u32 {
        self.incoming_order = incoming_order;

        // Total obligation = new order + old backlog
        let total_demand = incoming_order.saturating_add(self.backlog);
        let shipped = self.inventory.min(total_demand);

        self.inventory -= shipped;
        self.backlog = total_demand - shipped;
        self.outgoing_shipment = shipped;
        shipped
    }

    /// Serves an order from a source with unlimited supply.
    ///
    /// The whole order always ships and no backlog is ever created.
    /// Inventory is only a display figure here, so it saturates at zero.
    pub fn ship_unconstrained(&mut self, incoming_order: u32) -> u32 {
        self.incoming_order = incoming_order;
        self.inventory = self.inventory.saturating_sub(incoming_order);
        self.backlog = 0;
        self.outgoing_shipment = incoming_order;
        incoming_order
    }

    /// Holding plus backlog cost of this node for a single cycle.
    pub fn cycle_cost(&self, holding_cost: f64, backlog_cost: f64) -> f64 {
        (self.inventory as f64 * holding_cost) + (self.backlog as f64 * backlog_cost)
    }
}
