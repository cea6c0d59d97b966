//! Casting errors.
//!
//! Every variant except [`CastError::Oracle`] is a validation rejection: the
//! command is refused and no state changes.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActorId, Position, SpellId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    /// Not in the registry.
    #[error("spell {0} does not exist")]
    UnknownSpell(SpellId),

    /// In the registry, but not for this caster's class or level.
    #[error("spell {spell} is not known")]
    SpellNotKnown { spell: SpellId },

    #[error("caster cannot speak")]
    Silenced,

    /// The cooldown ledger reports no uses left.
    #[error("no uses of spell {spell} remain")]
    NoUsesRemaining { spell: SpellId },

    #[error("position {position} is too low to cast")]
    PositionTooLow { position: Position },

    #[error("target is invalid for this spell")]
    InvalidTarget,

    #[error("charmed caster will not harm its master")]
    CharmBound,

    #[error("spell can only target the caster")]
    SelfOnly,

    #[error("spell cannot target the caster")]
    NotSelf,

    #[error("spell requires a group")]
    RequiresGroup,

    #[error("caster is nauseated")]
    Nauseated,

    #[error("caster is already casting")]
    AlreadyCasting,

    #[error("caster is not casting")]
    NotCasting,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl CastError {
    /// One-line text shown to the caster.
    pub fn message(&self) -> &'static str {
        use CastError::*;
        match self {
            UnknownActor(_) | Oracle(_) => "Your magic fails you.",
            UnknownSpell(_) | SpellNotKnown { .. } => "You do not know that spell!",
            Silenced => "You are unable to make a sound!",
            NoUsesRemaining { .. } => "You are not yet able to cast that again.",
            PositionTooLow { position } => position.too_low_message(),
            InvalidTarget => "Cannot find the target of your spell!",
            CharmBound => "You are afraid you might hurt your master!",
            SelfOnly => "You can only cast this spell upon yourself!",
            NotSelf => "You cannot cast this spell upon yourself!",
            RequiresGroup => "You can't cast this spell if you're not in a group!",
            Nauseated => "You are too nauseated to focus on spellcasting!",
            AlreadyCasting => "You are already attempting to cast!",
            NotCasting => "You are not casting a spell.",
        }
    }
}

impl GameError for CastError {
    fn severity(&self) -> ErrorSeverity {
        use CastError::*;
        match self {
            Silenced
            | NoUsesRemaining { .. }
            | PositionTooLow { .. }
            | Nauseated
            | AlreadyCasting
            | NotCasting => ErrorSeverity::Recoverable,
            UnknownActor(_)
            | UnknownSpell(_)
            | SpellNotKnown { .. }
            | InvalidTarget
            | CharmBound
            | SelfOnly
            | NotSelf
            | RequiresGroup => ErrorSeverity::Validation,
            Oracle(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        use CastError::*;
        match self {
            UnknownActor(_) => "CAST_UNKNOWN_ACTOR",
            UnknownSpell(_) => "CAST_UNKNOWN_SPELL",
            SpellNotKnown { .. } => "CAST_SPELL_NOT_KNOWN",
            Silenced => "CAST_SILENCED",
            NoUsesRemaining { .. } => "CAST_NO_USES_REMAINING",
            PositionTooLow { .. } => "CAST_POSITION_TOO_LOW",
            InvalidTarget => "CAST_INVALID_TARGET",
            CharmBound => "CAST_CHARM_BOUND",
            SelfOnly => "CAST_SELF_ONLY",
            NotSelf => "CAST_NOT_SELF",
            RequiresGroup => "CAST_REQUIRES_GROUP",
            Nauseated => "CAST_NAUSEATED",
            AlreadyCasting => "CAST_ALREADY_CASTING",
            NotCasting => "CAST_NOT_CASTING",
            Oracle(_) => "CAST_ORACLE_UNAVAILABLE",
        }
    }
}
