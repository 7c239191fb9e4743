//! Enumeration types for the Battleground simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One of the two opposing sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Side {
    /// The side listed first in the battle request.
    Left,
    /// The side listed second in the battle request.
    Right,
}

impl Side {
    /// Both sides, in roster order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// The opposing side.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stat components
// ---------------------------------------------------------------------------

/// A derived stat component of a combatant.
///
/// The engine computes each component from the combatant's baseline plus
/// the effects of its active buffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Raw damage dealt by an attack before defense.
    Damage,
    /// Flat reduction applied to incoming damage.
    Defense,
    /// Percent chance that an attack is critical.
    CriticalOdds,
    /// Percent multiplier applied to a critical attack's loss.
    CriticalLoss,
    /// Turn order within a round (higher acts first).
    Speed,
}

// ---------------------------------------------------------------------------
// Lifecycle affairs
// ---------------------------------------------------------------------------

/// A reason a reactor's lifecycle changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Affair {
    /// The reactor fired and consumed part of its lifecycle.
    Trigger,
    /// The reactor was applied past its capacity and was refreshed instead.
    Overflow,
}

/// Set of [`Affair`] flags attached to a lifecycle signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Affairs(u8);

impl Affairs {
    /// No affairs.
    pub const NONE: Self = Self(0);
    /// Only [`Affair::Trigger`].
    pub const TRIGGER: Self = Self(1);
    /// Only [`Affair::Overflow`].
    pub const OVERFLOW: Self = Self(1 << 1);

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both flag sets.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// The set flags, `Trigger` before `Overflow`.
    pub fn iter(self) -> impl Iterator<Item = Affair> {
        [(Self::TRIGGER, Affair::Trigger), (Self::OVERFLOW, Affair::Overflow)]
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, affair)| affair)
    }
}

impl From<Affair> for Affairs {
    fn from(affair: Affair) -> Self {
        match affair {
            Affair::Trigger => Self::TRIGGER,
            Affair::Overflow => Self::OVERFLOW,
        }
    }
}
