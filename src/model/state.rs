use crate::model::agent::{NodeState, Role};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One `NodeState` per tier. The slots are fixed, so every role is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nodes {
    pub vendor: NodeState,
    pub manufacturer: NodeState,
    pub distributor: NodeState,
    pub end_user: NodeState,
}

impl Nodes {
    pub fn new(vendor: u32, manufacturer: u32, distributor: u32, end_user: u32) -> Self {
        Self {
            vendor: NodeState::new(Role::Vendor, vendor),
            manufacturer: NodeState::new(Role::Manufacturer, manufacturer),
            distributor: NodeState::new(Role::Distributor, distributor),
            end_user: NodeState::new(Role::EndUser, end_user),
        }
    }

    /// Nodes in upstream-to-downstream order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeState> {
        [
            &self.vendor,
            &self.manufacturer,
            &self.distributor,
            &self.end_user,
        ]
        .into_iter()
    }
}

impl Index<Role> for Nodes {
    type Output = NodeState;

    fn index(&self, role: Role) -> &NodeState {
        match role {
            Role::Vendor => &self.vendor,
            Role::Manufacturer => &self.manufacturer,
            Role::Distributor => &self.distributor,
            Role::EndUser => &self.end_user,
        }
    }
}

impl IndexMut<Role> for Nodes {
    fn index_mut(&mut self, role: Role) -> &mut NodeState {
        match role {
            Role::Vendor => &mut self.vendor,
            Role::Manufacturer => &mut self.manufacturer,
            Role::Distributor => &mut self.distributor,
            Role::EndUser => &mut self.end_user,
        }
    }
}

/// Commentary attached to a single state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Pending,
    Completed(String),
    Failed(String),
}

impl AnalysisStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, AnalysisStatus::Pending)
    }
}

/// A finished cycle as kept in history. It holds everything of a `GameState`
/// except the nested history itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub cycle: u32,
    pub nodes: Nodes,
    pub analysis: AnalysisStatus,
}

/// The full simulation snapshot at a cycle boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_cycle: u32,
    pub max_cycles: u32,
    pub nodes: Nodes,
    pub history: Vec<CycleSnapshot>,
    pub player_role: Option<Role>,
    pub game_over: bool,
    /// Demand for a cycle is derived from this seed and the cycle number.
    pub seed: u64,
    pub analysis: AnalysisStatus,
}

impl GameState {
    pub fn new(nodes: Nodes, max_cycles: u32, seed: u64) -> Self {
        Self {
            current_cycle: 0,
            max_cycles,
            nodes,
            history: Vec::new(),
            player_role: None,
            game_over: false,
            seed,
            analysis: AnalysisStatus::Idle,
        }
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            cycle: self.current_cycle,
            nodes: self.nodes,
            analysis: self.analysis.clone(),
        }
    }

    /// Merges a collaborator's analysis into this state.
    ///
    /// The result is applied only if it was requested for the current cycle and
    /// the state is still waiting for it; anything else is stale and dropped.
    /// Returns whether the result was applied.
    pub fn apply_analysis(&mut self, requested_for: u32, outcome: Result<String, String>) -> bool {
        if requested_for != self.current_cycle || !self.analysis.is_pending() {
            return false;
        }
        self.analysis = match outcome {
            Ok(text) => AnalysisStatus::Completed(text),
            Err(reason) => AnalysisStatus::Failed(reason),
        };
        true
    }
}
