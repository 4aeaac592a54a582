//! The commentary collaborator.
//!
//! The game asks an `Advisor` for a short hint after every cycle and for a
//! post-mortem once the game ends. A failing advisor never blocks play: the
//! session records the failure and shows the fallback text instead.

use crate::analysis::metrics::{chart_series, ChartPoint, ReportMetrics};
use crate::model::state::{CycleSnapshot, GameState};
use std::fmt::{Debug, Write};
use thiserror::Error;

pub const FALLBACK_HINT: &str = "Keep orders steady to avoid the bullwhip effect.";
pub const FALLBACK_REPORT: &str = "# Error Generating Report\nCould not connect to AI analyst.";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("no player role to advise")]
    NoPlayer,
    #[error("no cycles have been played yet")]
    NoHistory,
}

pub trait Advisor: Debug + Send + Sync {
    /// Tactical advice for the player's next cycle.
    fn analyze_cycle(&self, state: &GameState) -> Result<String, AdvisorError>;

    /// A markdown post-mortem of a finished game.
    fn final_report(
        &self,
        history: &[CycleSnapshot],
        metrics: &ReportMetrics,
    ) -> Result<String, AdvisorError>;
}

/// Offline advisor that reads the numbers directly.
#[derive(Debug, Clone)]
pub struct RuleBasedAdvisor {
    target_inventory: u32,
}

impl RuleBasedAdvisor {
    pub fn new(target_inventory: u32) -> Self {
        Self { target_inventory }
    }
}

impl Default for RuleBasedAdvisor {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Advisor for RuleBasedAdvisor {
    fn analyze_cycle(&self, state: &GameState) -> Result<String, AdvisorError> {
        let role = state.player_role.ok_or(AdvisorError::NoPlayer)?;
        let node = state.nodes[role];
        let demand = node.incoming_order;
        let in_transit = node.incoming_shipment;

        let hint = if node.backlog > 0 {
            format!(
                "You owe {} units downstream, but {} units are already on their way to you. \
                 Raise your order only modestly above the demand of {} so the backlog clears without overshooting.",
                node.backlog, in_transit, demand
            )
        } else if node.inventory > self.target_inventory.saturating_mul(2) {
            format!(
                "You are holding {} units, well above a comfortable {}. \
                 Order below the current demand of {} for a cycle or two and let stock run down.",
                node.inventory, self.target_inventory, demand
            )
        } else if u64::from(node.outgoing_order.abs_diff(demand)) * 2 > u64::from(demand.max(1)) {
            format!(
                "Your last order of {} is far from the demand of {} you are seeing. \
                 Move toward demand gradually instead of reacting to a single cycle.",
                node.outgoing_order, demand
            )
        } else {
            format!(
                "Demand is running around {demand} units and your stock is healthy. \
                 Matching demand keeps the whole chain calm."
            )
        };
        Ok(hint)
    }

    fn final_report(
        &self,
        history: &[CycleSnapshot],
        metrics: &ReportMetrics,
    ) -> Result<String, AdvisorError> {
        if history.is_empty() {
            return Err(AdvisorError::NoHistory);
        }
        let role = metrics.player_role;
        let series = chart_series(history);

        // Writing into a String cannot fail
        let mut doc = String::new();
        let _ = writeln!(doc, "# Supply Chain Performance Report\n");

        let _ = writeln!(doc, "## Executive Summary\n");
        match metrics.bullwhip_ratio {
            Some(ratio) if metrics.is_amplified() => {
                let _ = writeln!(
                    doc,
                    "Over {} cycles the {} amplified demand: order variance was {:.2}x the variance of End User demand. The bullwhip effect occurred.\n",
                    metrics.cycles_completed, role, ratio
                );
            }
            Some(ratio) => {
                let _ = writeln!(
                    doc,
                    "Over {} cycles the {} kept order variance at {:.2}x the variance of End User demand. The chain stayed largely stable.\n",
                    metrics.cycles_completed, role, ratio
                );
            }
            None => {
                let _ = writeln!(
                    doc,
                    "Over {} cycles End User demand never varied, so no bullwhip ratio can be given.\n",
                    metrics.cycles_completed
                );
            }
        }

        let _ = writeln!(doc, "## Player Performance ({role})\n");
        let peak_backlog = history
            .iter()
            .map(|s| (s.cycle, s.nodes[role].backlog))
            .max_by_key(|&(_, b)| b)
            .unwrap_or((0, 0));
        let _ = writeln!(
            doc,
            "Total holding and backlog cost came to ${:.2}. The largest backlog was {} units in cycle {}.\n",
            metrics.total_cost, peak_backlog.1, peak_backlog.0
        );

        let _ = writeln!(doc, "## Key Observations\n");
        if let Some(peak_demand) = series.iter().max_by_key(|p| p.customer_demand) {
            let _ = writeln!(
                doc,
                "- Cycle {}: End User demand peaked at {} units.",
                peak_demand.cycle, peak_demand.customer_demand
            );
        }
        let orders: [(&str, fn(&ChartPoint) -> u32); 2] = [
            ("Distributor", |p| p.distributor_order),
            ("Manufacturer", |p| p.manufacturer_order),
        ];
        for (label, pick) in orders {
            if let Some(peak) = series.iter().max_by_key(|p| pick(p)) {
                let _ = writeln!(
                    doc,
                    "- Cycle {}: the {} placed its largest order, {} units.",
                    peak.cycle,
                    label,
                    pick(peak)
                );
            }
        }

        let _ = writeln!(doc, "\n## Recommendations\n");
        let _ = writeln!(
            doc,
            "- Account for goods already in transit before reacting to a backlog."
        );
        let _ = writeln!(
            doc,
            "- Share real demand data upstream so each tier is not guessing from the orders it receives."
        );

        Ok(doc)
    }
}

/// An advisor that always fails, standing in for a service that can't be reached.
#[derive(Debug, Clone)]
pub struct UnavailableAdvisor {
    reason: String,
}

impl UnavailableAdvisor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Advisor for UnavailableAdvisor {
    fn analyze_cycle(&self, _state: &GameState) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable(self.reason.clone()))
    }

    fn final_report(
        &self,
        _history: &[CycleSnapshot],
        _metrics: &ReportMetrics,
    ) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::Role;
    use crate::model::state::Nodes;

    fn state_for(role: Role, inventory: u32, backlog: u32, demand: u32, order: u32) -> GameState {
        let mut state = GameState::new(Nodes::new(1000, 20, 15, 0), 10, 0);
        state.player_role = Some(role);
        let node = &mut state.nodes[role];
        node.inventory = inventory;
        node.backlog = backlog;
        node.incoming_order = demand;
        node.outgoing_order = order;
        state
    }

    #[test]
    fn test_backlog_hint() {
        let state = state_for(Role::Distributor, 0, 8, 30, 10);
        let hint = RuleBasedAdvisor::default().analyze_cycle(&state).unwrap();
        assert!(hint.contains("owe 8 units"), "{hint}");
    }

    #[test]
    fn test_overstock_hint() {
        let state = state_for(Role::Manufacturer, 60, 0, 10, 10);
        let hint = RuleBasedAdvisor::default().analyze_cycle(&state).unwrap();
        assert!(hint.contains("holding 60 units"), "{hint}");
    }

    #[test]
    fn test_steady_hint() {
        let state = state_for(Role::Distributor, 15, 0, 10, 11);
        let hint = RuleBasedAdvisor::default().analyze_cycle(&state).unwrap();
        assert!(hint.contains("Matching demand"), "{hint}");
    }

    #[test]
    fn test_huge_quantities_still_get_a_hint() {
        let state = state_for(Role::Manufacturer, 0, 0, 1, u32::MAX);
        let hint = RuleBasedAdvisor::new(u32::MAX).analyze_cycle(&state).unwrap();
        assert!(hint.contains(&format!("last order of {}", u32::MAX)), "{hint}");
    }

    #[test]
    fn test_no_player_is_an_error() {
        let state = GameState::new(Nodes::new(1000, 20, 15, 0), 10, 0);
        assert!(matches!(
            RuleBasedAdvisor::default().analyze_cycle(&state),
            Err(AdvisorError::NoPlayer)
        ));
    }

    #[test]
    fn test_report_has_all_sections() {
        let state = state_for(Role::Distributor, 15, 0, 10, 10);
        let history = vec![state.snapshot()];
        let metrics = ReportMetrics::compute(&history, Role::Distributor, 0.5, 1.0);
        let report = RuleBasedAdvisor::default()
            .final_report(&history, &metrics)
            .unwrap();
        for heading in [
            "# Supply Chain Performance Report",
            "## Executive Summary",
            "## Player Performance (Distributor)",
            "## Key Observations",
            "## Recommendations",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn test_report_needs_history() {
        let metrics = ReportMetrics::compute(&[], Role::Distributor, 0.5, 1.0);
        assert!(RuleBasedAdvisor::default().final_report(&[], &metrics).is_err());
    }

    #[test]
    fn test_unavailable_advisor_fails() {
        let advisor = UnavailableAdvisor::new("missing credentials");
        let state = state_for(Role::Distributor, 15, 0, 10, 10);
        let err = advisor.analyze_cycle(&state).unwrap_err();
        assert_eq!(err.to_string(), "advisor unavailable: missing credentials");
    }
}
