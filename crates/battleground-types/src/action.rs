//! Completed actions and their verb payloads.
//!
//! An [`Action`] is what a reactor did: who authored it, whom it targeted,
//! and a [`Verb`] describing the effect on each target. Per-target payloads
//! are ordered vectors so that replays are deterministic.

use crate::enums::Side;
use crate::ids::{ActionId, ReactorId, WarriorRef};
use crate::signal::{Signal, Source};

/// The signal that triggered an action and the source that authored it.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// The signal the authoring reactor was reacting to.
    pub signal: Box<Signal>,
    /// The scripter and reactor that authored the action.
    pub source: Source,
}

/// Damage dealt to each target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attack {
    /// Whether the attack rolled a critical.
    pub critical: bool,
    /// Health removed from each target, in target order.
    pub losses: Vec<(WarriorRef, u32)>,
}

/// Health restored to each target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heal {
    /// Health added to each target, in target order.
    pub rises: Vec<(WarriorRef, u32)>,
}

/// A buff granted to each target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buff {
    /// The buff template being granted.
    pub reactor: ReactorId,
    /// Fresh buff instances attached to targets.
    pub provisions: Vec<(WarriorRef, ReactorId)>,
    /// Existing instances refreshed because the target was at capacity.
    pub overflows: Vec<(WarriorRef, ReactorId)>,
}

/// Reactors removed from each target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purge {
    /// Removed reactors per target, in target order.
    pub recycles: Vec<(WarriorRef, Vec<ReactorId>)>,
}

/// The effect of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Damage.
    Attack(Attack),
    /// Restoration.
    Heal(Heal),
    /// Buff grant.
    Buff(Buff),
    /// Buff removal.
    Purge(Purge),
}

/// A resolved action.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Engine-issued identity.
    pub id: ActionId,
    /// Trigger and author.
    pub script: Script,
    /// Targets the verb applied to.
    pub targets: Vec<WarriorRef>,
    /// Targets selected but no longer eligible when the action resolved.
    pub false_targets: Vec<WarriorRef>,
    /// Targets that shrugged the verb off.
    pub immune_targets: Vec<WarriorRef>,
    /// The effect.
    pub verb: Verb,
}

impl Action {
    /// The side credited with this action, if a combatant authored it.
    pub const fn credited_side(&self) -> Option<Side> {
        match self.script.source.scripter.warrior() {
            Some(warrior) => Some(warrior.side),
            None => None,
        }
    }
}
