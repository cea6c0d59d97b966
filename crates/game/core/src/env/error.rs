//! Oracle access errors.

use crate::error::{ErrorSeverity, GameError};

/// Errors that occur when a required collaborator is missing.
///
/// The rules core cannot resolve a cast without a spell registry or dice, so
/// these are fatal to the operation that asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// SpellOracle is not available in the environment.
    #[error("SpellOracle not available")]
    SpellsNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::SpellsNotAvailable => "ORACLE_SPELLS_NOT_AVAILABLE",
            OracleError::RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
        }
    }
}
