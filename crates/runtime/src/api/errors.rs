//! Unified error types surfaced by the runtime API.
//!
//! Wraps rule rejections from the core alongside failures of worker
//! coordination so clients can bubble them up with consistent context.
use mud_core::{ActorId, CastError, EquipError, ErrorSeverity, GameError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("actor {0} is not loaded")]
    UnknownActor(ActorId),

    #[error("actor {0} is already loaded")]
    DuplicateActor(ActorId),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Equip(#[from] EquipError),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to load content")]
    Content(#[source] anyhow::Error),
}

impl RuntimeError {
    /// True for rejections a player caused; false for infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        match self {
            RuntimeError::Cast(err) => err.severity() != ErrorSeverity::Fatal,
            RuntimeError::Equip(_)
            | RuntimeError::UnknownActor(_)
            | RuntimeError::DuplicateActor(_) => true,
            _ => false,
        }
    }

    /// Player-facing line for a cast rejection.
    pub fn player_message(&self) -> Option<&'static str> {
        match self {
            RuntimeError::Cast(err) => Some(err.message()),
            _ => None,
        }
    }
}
