//! Error taxonomy for the game core

use thiserror::Error;

use crate::consts::LEVEL_COUNT;

/// Errors surfaced by the core.
///
/// Asset failures never appear here: missing sprites or sounds are the
/// host's problem and never block the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Level index outside `1..=LEVEL_COUNT`
    #[error("level {0} does not exist (valid levels are 1..={max})", max = LEVEL_COUNT)]
    InvalidLevel(u32),

    /// Backing store could not be read or written
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Tuning data failed to parse or validate
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// A tick produced state that cannot be simulated further
    #[error("corrupt simulation state: {0}")]
    CorruptState(String),
}

impl GameError {
    /// Check a level index, returning it unchanged when valid
    pub fn check_level(level: u32) -> Result<u32, GameError> {
        if (1..=LEVEL_COUNT).contains(&level) {
            Ok(level)
        } else {
            Err(GameError::InvalidLevel(level))
        }
    }
}
