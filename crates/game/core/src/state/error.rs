//! Actor state errors.
//!
//! Errors raised while binding equipment or regenerating derived attributes.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActorId, ItemId, WearSlot};

/// Rejections from `equip`/`unequip`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EquipError {
    /// The slot already holds an item.
    #[error("slot {slot} is already occupied")]
    SlotOccupied { slot: WearSlot },

    /// Nothing is worn in the slot.
    #[error("nothing is worn in slot {slot}")]
    SlotEmpty { slot: WearSlot },

    /// The item is already worn in another slot.
    #[error("{item} is already worn")]
    AlreadyWorn { item: ItemId },

    /// The item's alignment or class restrictions exclude the wearer.
    #[error("{item} refuses to be worn by {actor}: {reason}")]
    Restricted {
        item: ItemId,
        actor: ActorId,
        reason: &'static str,
    },
}

impl GameError for EquipError {
    fn severity(&self) -> ErrorSeverity {
        use EquipError::*;
        match self {
            SlotOccupied { .. } | SlotEmpty { .. } => ErrorSeverity::Recoverable,
            AlreadyWorn { .. } | Restricted { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use EquipError::*;
        match self {
            SlotOccupied { .. } => "EQUIP_SLOT_OCCUPIED",
            SlotEmpty { .. } => "EQUIP_SLOT_EMPTY",
            AlreadyWorn { .. } => "EQUIP_ALREADY_WORN",
            Restricted { .. } => "EQUIP_RESTRICTED",
        }
    }
}

/// Invariant violations detected by attribute recomputation.
///
/// These indicate a bug or corrupt save data. The pass that detects one is
/// skipped and logged; the error never propagates as a crash.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecomputeError {
    /// A canonical attribute is outside the range any valid actor can have.
    #[error("{actor} has corrupt base attribute {field} = {value}")]
    CorruptBase {
        actor: ActorId,
        field: &'static str,
        value: i32,
    },
}

impl GameError for RecomputeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            RecomputeError::CorruptBase { .. } => "RECOMPUTE_CORRUPT_BASE",
        }
    }
}
