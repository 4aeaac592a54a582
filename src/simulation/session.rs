// src/simulation/session.rs

use crate::analysis::advisor::{Advisor, FALLBACK_HINT, FALLBACK_REPORT};
use crate::analysis::metrics::ReportMetrics;
use crate::error::GameError;
use crate::io::reporting::FinalReport;
use crate::model::agent::Role;
use crate::model::state::{AnalysisStatus, GameState};
use crate::simulation::engine::{clamp_order, ChainSimulation};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    Intro,
    Setup,
    Playing,
    Report,
}

/// Turns raw text from the order box into a quantity.
/// Negative or non-numeric input counts as zero.
pub fn parse_order_input(raw: &str) -> u32 {
    raw.trim().parse::<i64>().map(clamp_order).unwrap_or(0)
}

/// One play-through: the phase machine around the step engine.
///
/// The session owns the current `GameState`, enforces the preconditions the
/// engine leaves to its caller, and folds the advisor's output back in.
#[derive(Debug)]
pub struct GameSession {
    simulation: ChainSimulation,
    advisor: Box<dyn Advisor>,
    phase: GamePhase,
    state: GameState,
    final_report: Option<FinalReport>,
}

impl GameSession {
    pub fn new(simulation: ChainSimulation, advisor: Box<dyn Advisor>) -> Self {
        let state = simulation.initial_state();
        Self {
            simulation,
            advisor,
            phase: GamePhase::Intro,
            state,
            final_report: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn final_report(&self) -> Option<&FinalReport> {
        self.final_report.as_ref()
    }

    /// Intro -> Setup.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.expect_phase(GamePhase::Intro)?;
        self.phase = GamePhase::Setup;
        info!("entering role selection");
        Ok(())
    }

    /// Setup -> Playing, fixing the human's role for the rest of the game.
    pub fn select_role(&mut self, role: Role) -> Result<(), GameError> {
        if self.state.player_role.is_some() {
            return Err(GameError::RoleAlreadySelected);
        }
        self.expect_phase(GamePhase::Setup)?;
        if !role.is_playable() {
            return Err(GameError::UnplayableRole(role));
        }
        self.state.player_role = Some(role);
        self.phase = GamePhase::Playing;
        info!(%role, "player role selected");
        Ok(())
    }

    /// Plays one cycle with the human's order.
    ///
    /// Returns `Ok(false)` and leaves everything untouched once the game is
    /// over. Reaching the last cycle moves the session to the report phase.
    pub fn next_cycle(&mut self, order: i64) -> Result<bool, GameError> {
        if self.state.game_over {
            return Ok(false);
        }
        let role = self.state.player_role.ok_or(GameError::NoRoleSelected)?;
        self.expect_phase(GamePhase::Playing)?;

        self.state = self.simulation.advance(&self.state, order, role);

        let requested_for = self.state.current_cycle;
        let outcome = self
            .advisor
            .analyze_cycle(&self.state)
            .map_err(|e| e.to_string());
        self.merge_analysis(requested_for, outcome);

        if self.state.game_over {
            self.finish(role);
        }
        Ok(true)
    }

    /// Folds an analysis result into the current state.
    ///
    /// Results for an earlier cycle are dropped; the simulation state always
    /// wins over its commentary. Returns whether the result was applied.
    pub fn merge_analysis(&mut self, requested_for: u32, outcome: Result<String, String>) -> bool {
        if let Err(reason) = &outcome {
            warn!(cycle = requested_for, %reason, "analysis failed, using fallback hint");
        }
        let applied = self.state.apply_analysis(requested_for, outcome);
        if !applied {
            warn!(
                cycle = requested_for,
                current = self.state.current_cycle,
                "discarding stale analysis"
            );
        }
        applied
    }

    /// The hint to show for the current cycle, if any.
    pub fn analysis_text(&self) -> Option<&str> {
        match &self.state.analysis {
            AnalysisStatus::Completed(text) => Some(text),
            AnalysisStatus::Failed(_) => Some(FALLBACK_HINT),
            AnalysisStatus::Idle | AnalysisStatus::Pending => None,
        }
    }

    /// Back to a fresh game with the same rules and advisor.
    pub fn reset(&mut self) {
        self.state = self.simulation.initial_state();
        self.phase = GamePhase::Intro;
        self.final_report = None;
        info!("game reset");
    }

    fn finish(&mut self, role: Role) {
        self.phase = GamePhase::Report;
        let config = self.simulation.config();
        let metrics = ReportMetrics::compute(
            &self.state.history,
            role,
            config.holding_cost,
            config.backlog_cost,
        );
        let narrative = match self.advisor.final_report(&self.state.history, &metrics) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "final report failed, using fallback");
                FALLBACK_REPORT.to_string()
            }
        };
        info!(
            cycles = metrics.cycles_completed,
            total_cost = metrics.total_cost,
            "game over"
        );
        self.final_report = Some(FinalReport::new(&self.state.history, metrics, narrative));
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                found: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::advisor::{RuleBasedAdvisor, UnavailableAdvisor};
    use crate::simulation::config::SimulationConfig;

    fn session() -> GameSession {
        GameSession::new(
            ChainSimulation::with_config(SimulationConfig::default()),
            Box::new(RuleBasedAdvisor::default()),
        )
    }

    fn playing_as(role: Role) -> GameSession {
        let mut s = session();
        s.start().unwrap();
        s.select_role(role).unwrap();
        s
    }

    #[test]
    fn test_parse_order_input() {
        assert_eq!(parse_order_input("12"), 12);
        assert_eq!(parse_order_input("  7 "), 7);
        assert_eq!(parse_order_input("-4"), 0);
        assert_eq!(parse_order_input("lots"), 0);
        assert_eq!(parse_order_input(""), 0);
        assert_eq!(parse_order_input("99999999999"), u32::MAX);
    }

    #[test]
    fn test_phase_flow() {
        let mut s = session();
        assert_eq!(s.phase(), GamePhase::Intro);
        s.start().unwrap();
        assert_eq!(s.phase(), GamePhase::Setup);
        s.select_role(Role::Manufacturer).unwrap();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.state().player_role, Some(Role::Manufacturer));
    }

    #[test]
    fn test_cannot_play_without_role() {
        let mut s = session();
        assert!(matches!(s.next_cycle(10), Err(GameError::NoRoleSelected)));
        assert_eq!(s.state().current_cycle, 0);
    }

    #[test]
    fn test_role_rules() {
        let mut s = session();
        assert!(matches!(
            s.select_role(Role::Distributor),
            Err(GameError::WrongPhase { .. })
        ));
        s.start().unwrap();
        assert!(matches!(
            s.select_role(Role::Vendor),
            Err(GameError::UnplayableRole(Role::Vendor))
        ));
        s.select_role(Role::Distributor).unwrap();
        assert!(matches!(
            s.select_role(Role::Manufacturer),
            Err(GameError::RoleAlreadySelected)
        ));
    }

    #[test]
    fn test_full_game_reaches_report() {
        let mut s = playing_as(Role::Distributor);
        for _ in 0..10 {
            assert!(s.next_cycle(10).unwrap());
        }
        assert!(s.state().game_over);
        assert_eq!(s.phase(), GamePhase::Report);

        let report = s.final_report().expect("report generated at game over");
        assert_eq!(report.metrics.cycles_completed, 10);
        assert!(report.narrative.contains("## Executive Summary"));

        // Advancing after the end is a no-op
        let before = s.state().clone();
        assert!(!s.next_cycle(10).unwrap());
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_maximal_orders_play_through_to_report() {
        for role in [Role::Distributor, Role::Manufacturer] {
            let mut s = playing_as(role);
            while s.next_cycle(i64::MAX).unwrap() {}
            assert_eq!(s.phase(), GamePhase::Report, "{role}");
            assert!(matches!(s.state().analysis, AnalysisStatus::Completed(_)));
            let report = s.final_report().expect("report generated at game over");
            assert!(report.metrics.total_cost.is_finite());
            assert!(report.to_json().is_ok());
        }
    }

    #[test]
    fn test_analysis_completes_each_cycle() {
        let mut s = playing_as(Role::Manufacturer);
        s.next_cycle(10).unwrap();
        assert!(matches!(s.state().analysis, AnalysisStatus::Completed(_)));
        assert!(s.analysis_text().is_some());
    }

    #[test]
    fn test_failed_advisor_falls_back() {
        let mut s = GameSession::new(
            ChainSimulation::with_config(SimulationConfig::default()),
            Box::new(UnavailableAdvisor::new("no api key")),
        );
        s.start().unwrap();
        s.select_role(Role::Distributor).unwrap();
        for _ in 0..10 {
            s.next_cycle(10).unwrap();
        }
        assert_eq!(s.analysis_text(), Some(FALLBACK_HINT));
        assert_eq!(s.final_report().unwrap().narrative, FALLBACK_REPORT);
        assert_eq!(s.state().current_cycle, 10, "failures never roll back play");
    }

    #[test]
    fn test_stale_merge_is_discarded() {
        let mut s = playing_as(Role::Distributor);
        s.next_cycle(10).unwrap();
        s.next_cycle(10).unwrap();
        let current = s.state().analysis.clone();
        assert!(!s.merge_analysis(1, Ok("late advice".into())));
        assert_eq!(s.state().analysis, current);
    }

    #[test]
    fn test_reset() {
        let mut s = playing_as(Role::Distributor);
        s.next_cycle(10).unwrap();
        s.reset();
        assert_eq!(s.phase(), GamePhase::Intro);
        assert_eq!(s.state().current_cycle, 0);
        assert_eq!(s.state().player_role, None);
        assert!(s.final_report().is_none());
    }
}
