//! Common error infrastructure for mud-core.
//!
//! Domain-specific errors (`CastError`, `EquipError`, `RecomputeError`) are
//! defined next to the operations they validate and implement [`GameError`]
//! so callers can classify them uniformly.
//!
//! # Design Principles
//!
//! - **Explicit results**: validation rejections are returned, never panicked
//! - **Stable codes**: every variant maps to a fixed `error_code()` string
//! - **Severity Classification**: errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the command may succeed later (cooldown, position)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can retry with the same or an alternative command.
    ///
    /// Examples: already casting, spell on cooldown, resting
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown spell, invalid target
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    ///
    /// Examples: affect referencing an unknown slot, missing oracle
    Internal,

    /// State corrupted, cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all mud-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Error codes are stable strings usable in metrics and tests
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
