// src/error.rs

use crate::model::agent::Role;
use crate::simulation::session::GamePhase;
use thiserror::Error;

/// Errors surfaced by the game session and the I/O helpers.
///
/// The step engine itself never fails; everything here is a caller-side
/// precondition or an export problem.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no player role selected")]
    NoRoleSelected,
    #[error("{0} cannot be played by a human")]
    UnplayableRole(Role),
    #[error("a player role has already been selected")]
    RoleAlreadySelected,
    #[error("expected phase {expected:?}, but the game is in {found:?}")]
    WrongPhase {
        expected: GamePhase,
        found: GamePhase,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
