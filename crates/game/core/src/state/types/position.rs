//! Physical posture of an actor.

use strum::{Display, EnumIter};

/// Ordered posture, lowest first. Casting compares against a spell's minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    Dead,
    MortallyWounded,
    Incapacitated,
    Stunned,
    Sleeping,
    Resting,
    Sitting,
    Fighting,
    #[default]
    Standing,
}

impl Position {
    /// Message shown when the posture is too low to begin a cast.
    pub fn too_low_message(self) -> &'static str {
        match self {
            Position::Sleeping => "You dream about great magical powers.",
            Position::Resting => "You cannot concentrate while resting.",
            Position::Sitting => "You can't do this sitting!",
            Position::Fighting => "Impossible!  You can't concentrate enough!",
            _ => "You can't do much of anything like this!",
        }
    }

    pub fn is_awake(self) -> bool {
        self > Position::Sleeping
    }
}

/// Moral alignment used by item restrictions and protection affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    Good,
    #[default]
    Neutral,
    Evil,
}

impl Alignment {
    /// Classifies a numeric alignment score (-1000..=1000).
    pub fn from_score(score: i32) -> Self {
        if score >= 350 {
            Alignment::Good
        } else if score <= -350 {
            Alignment::Evil
        } else {
            Alignment::Neutral
        }
    }
}
