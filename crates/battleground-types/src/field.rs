//! The seams between an engine and the listeners attached to it.
//!
//! - [`Battlefield`] -- read-only query surface over the live battle.
//! - [`Listener`] -- a component registered at one or more priority slots
//!   that receives every dispatched signal.
//!
//! Dispatch contract: the engine delivers each signal to every registered
//! (listener, slot) pair in descending priority order and finishes with one
//! signal before dispatching the next. Any signal emitted while handling
//! another is dispatched, in full, before the outer dispatch continues.

use crate::enums::Component;
use crate::ids::{ReactorId, WarriorRef};
use crate::lifecycle::{Lifecycle, Ratio};
use crate::signal::Signal;

/// Dispatch priority. Higher values are delivered first.
pub type Priority = i32;

/// Error a listener returns to abort the run.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only view of the live battle.
///
/// Lookups return `None` for references the engine does not know.
pub trait Battlefield {
    /// Every combatant, dead or alive, in roster order.
    fn warriors(&self) -> Vec<WarriorRef>;

    /// Current health of a combatant.
    fn health(&self, warrior: WarriorRef) -> Option<Ratio>;

    /// Derived value of one stat component of a combatant.
    fn component(&self, warrior: WarriorRef, component: Component) -> Option<u32>;

    /// Active buff instances on a combatant, oldest first.
    fn buffs(&self, warrior: WarriorRef) -> Vec<ReactorId>;

    /// Display label a reactor is tagged with, if any.
    fn label(&self, reactor: ReactorId) -> Option<&str>;

    /// Current lifecycle of a reactor, if it tracks one.
    fn lifecycle(&self, reactor: ReactorId) -> Option<Lifecycle>;
}

/// A component that observes dispatched signals.
pub trait Listener {
    /// Priorities this listener occupies. Slot `i` of [`Listener::react`]
    /// refers to entry `i` of this list.
    fn slots(&self) -> &[Priority];

    /// Whether the listener currently wants signals.
    fn active(&self) -> bool {
        true
    }

    /// Handle one signal delivered at slot `slot`.
    fn react(
        &mut self,
        slot: usize,
        signal: &Signal,
        field: &dyn Battlefield,
    ) -> Result<(), ListenerError>;
}
