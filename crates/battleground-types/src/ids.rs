//! Type-safe identifier wrappers.
//!
//! Signals, actions, and reactors are numbered by the engine in the order it
//! creates them. Numbering is deterministic: two runs with the same seed and
//! roster issue the same identifiers, which keeps replay documents
//! byte-identical across runs.
//!
//! Combatants are not numbered; a [`WarriorRef`] names one by its side and
//! position on that side.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Side;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw engine-issued number.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a signal emitted during a battle.
    SignalId
}

define_id! {
    /// Unique identifier for a completed action.
    ActionId
}

define_id! {
    /// Unique identifier for a reactor (skill, buff instance, or buff template).
    ReactorId
}

/// Reference to a combatant by side and position.
///
/// Serializes as `{ "side": "Left", "position": 0 }`, which is also the
/// warrior view in replay documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WarriorRef {
    /// Which side the combatant fights for.
    pub side: Side,
    /// Slot on that side, as assigned by the battle request.
    pub position: u32,
}

impl WarriorRef {
    /// Create a reference to the combatant at `position` on `side`.
    pub const fn new(side: Side, position: u32) -> Self {
        Self { side, position }
    }
}

impl core::fmt::Display for WarriorRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.side, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_matches_raw() {
        let id = SignalId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.0, 42);
    }

    #[test]
    fn warrior_ref_serializes_as_view() {
        let warrior = WarriorRef::new(Side::Right, 3);
        let json = serde_json::to_value(warrior).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "side": "Right", "position": 3 }))
        );
    }

    #[test]
    fn warrior_refs_order_by_side_then_position() {
        let mut refs = vec![
            WarriorRef::new(Side::Right, 0),
            WarriorRef::new(Side::Left, 2),
            WarriorRef::new(Side::Left, 1),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![
                WarriorRef::new(Side::Left, 1),
                WarriorRef::new(Side::Left, 2),
                WarriorRef::new(Side::Right, 0),
            ]
        );
    }
}
