//! Counters attached to combatants and reactors.
//!
//! A [`Ratio`] is a current/maximum pair (health, cooling). A [`Lifecycle`]
//! bundles the counter dimensions a reactor may track; each dimension is
//! present only if the reactor tracks it, and absent dimensions are left
//! out of the serialized form entirely.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A current value out of a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Ratio {
    /// Current value.
    pub current: u32,
    /// Upper bound of `current`.
    pub maximum: u32,
}

impl Ratio {
    /// A ratio at its maximum.
    pub const fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Whether the current value has reached zero.
    pub const fn is_depleted(self) -> bool {
        self.current == 0
    }

    /// Lower the current value by up to `amount`, returning how much was removed.
    pub const fn lower(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before.saturating_sub(self.current)
    }

    /// Raise the current value by up to `amount` without passing the
    /// maximum, returning how much was added.
    pub fn raise(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current.saturating_sub(before)
    }
}

/// Lifecycle counters of a reactor instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Lifecycle {
    /// Rounds to wait before the reactor may first fire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub leading: Option<u32>,
    /// Remaining duration or cooldown out of its configured maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub cooling: Option<Ratio>,
    /// Remaining uses or stacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub capacity: Option<u32>,
}

impl Lifecycle {
    /// A lifecycle that tracks only a cooling counter, starting full.
    pub const fn cooling(maximum: u32) -> Self {
        Self {
            leading: None,
            cooling: Some(Ratio::full(maximum)),
            capacity: None,
        }
    }

    /// Whether the cooling counter, if tracked, has run out.
    pub fn is_cooled(&self) -> bool {
        self.cooling.is_none_or(Ratio::is_depleted)
    }
}
