//! Bullwhip metrics derived from game history.
//!
//! Nothing here is stored in the game state: cost and variance are always
//! recomputed from the snapshots, so they can't drift from what was played.

use crate::model::agent::Role;
use crate::model::state::CycleSnapshot;
use serde::Serialize;

/// Ratios above this are flagged as amplification in reports.
pub const AMPLIFICATION_THRESHOLD: f64 = 1.5;

/// One point of the order-volatility chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub cycle: u32,
    pub customer_demand: u32,
    pub distributor_order: u32,
    pub manufacturer_order: u32,
}

/// Summary numbers for the end-of-game report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub player_role: Role,
    pub cycles_completed: usize,
    pub total_cost: f64,
    pub demand_variance: f64,
    pub order_variance: f64,
    /// `None` when demand never varied.
    pub bullwhip_ratio: Option<f64>,
}

impl ReportMetrics {
    pub fn compute(
        history: &[CycleSnapshot],
        player_role: Role,
        holding_cost: f64,
        backlog_cost: f64,
    ) -> Self {
        let demand_variance = variance(&customer_demand(history));
        let order_variance = variance(&orders_placed(history, player_role));
        Self {
            player_role,
            cycles_completed: history.len(),
            total_cost: total_cost(history, player_role, holding_cost, backlog_cost),
            demand_variance,
            order_variance,
            bullwhip_ratio: ratio(order_variance, demand_variance),
        }
    }

    pub fn is_amplified(&self) -> bool {
        self.bullwhip_ratio
            .map_or(false, |r| r > AMPLIFICATION_THRESHOLD)
    }
}

/// Population variance. Empty input has zero variance.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

fn ratio(order_variance: f64, demand_variance: f64) -> Option<f64> {
    if demand_variance > 0.0 {
        Some(order_variance / demand_variance)
    } else {
        None
    }
}

pub fn customer_demand(history: &[CycleSnapshot]) -> Vec<f64> {
    history
        .iter()
        .map(|s| s.nodes.end_user.incoming_order as f64)
        .collect()
}

pub fn orders_placed(history: &[CycleSnapshot], role: Role) -> Vec<f64> {
    history
        .iter()
        .map(|s| s.nodes[role].outgoing_order as f64)
        .collect()
}

/// Variance of `role`'s orders over the variance of End User demand.
pub fn bullwhip_ratio(history: &[CycleSnapshot], role: Role) -> Option<f64> {
    ratio(
        variance(&orders_placed(history, role)),
        variance(&customer_demand(history)),
    )
}

/// Holding plus backlog cost of `role`, summed over history.
pub fn total_cost(
    history: &[CycleSnapshot],
    role: Role,
    holding_cost: f64,
    backlog_cost: f64,
) -> f64 {
    history
        .iter()
        .map(|s| s.nodes[role].cycle_cost(holding_cost, backlog_cost))
        .sum()
}

/// Cost per playable tier. The Vendor and End User carry no meaningful cost.
pub fn cost_breakdown(
    history: &[CycleSnapshot],
    holding_cost: f64,
    backlog_cost: f64,
) -> Vec<(Role, f64)> {
    [Role::Manufacturer, Role::Distributor]
        .into_iter()
        .map(|role| (role, total_cost(history, role, holding_cost, backlog_cost)))
        .collect()
}

pub fn chart_series(history: &[CycleSnapshot]) -> Vec<ChartPoint> {
    history
        .iter()
        .map(|s| ChartPoint {
            cycle: s.cycle,
            customer_demand: s.nodes.end_user.incoming_order,
            distributor_order: s.nodes.distributor.outgoing_order,
            manufacturer_order: s.nodes.manufacturer.outgoing_order,
        })
        .collect()
}
