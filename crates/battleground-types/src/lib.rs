//! Shared type definitions for the Battleground simulation.
//!
//! This crate is the vocabulary spoken between a battle engine and the
//! listeners attached to it. Wire-facing types derive `ts-rs` bindings for
//! the replay client.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier newtypes and the [`WarriorRef`] combatant reference
//! - [`enums`] -- Sides, stat components, and lifecycle affairs
//! - [`lifecycle`] -- Health ratios and reactor lifecycle counters
//! - [`signal`] -- Signals emitted during a battle
//! - [`action`] -- Completed actions and their verbs
//! - [`field`] -- The [`Battlefield`] query surface and [`Listener`] seam

pub mod action;
pub mod enums;
pub mod field;
pub mod ids;
pub mod lifecycle;
pub mod signal;

// Re-export all public types at crate root for convenience.
pub use action::{Action, Attack, Buff, Heal, Purge, Script, Verb};
pub use enums::{Affair, Affairs, Component, Side};
pub use field::{Battlefield, Listener, ListenerError, Priority};
pub use ids::{ActionId, ReactorId, SignalId, WarriorRef};
pub use lifecycle::{Lifecycle, Ratio};
pub use signal::{LifecycleChange, Scripter, Signal, SignalKind, Source};
