//! Deterministic reference engine for the Battleground simulation.
//!
//! The arena fights a battle described by a YAML battle file and emits the
//! full signal stream to the listeners attached to it. It exists so that
//! listeners such as the replay recorder can be driven end to end without
//! the production engine.
//!
//! # Modules
//!
//! - [`config`] -- Battle files: rosters, skill catalog, round cap
//! - [`field`] -- Live battle state and the [`Battlefield`](battleground_types::Battlefield) query surface
//! - [`engine`] -- The [`Arena`] battle loop and priority dispatch
//! - [`error`] -- [`ArenaError`]

pub mod config;
pub mod engine;
pub mod error;
pub mod field;

pub use config::{
    BattleConfig, BuffEffect, CharacterSpec, ConfigError, SkillSpec, Target, Trigger, VerbSpec,
};
pub use engine::{Arena, ENGINE_PRIORITY, Outcome};
pub use error::ArenaError;
pub use field::{Field, Stats, Warrior};
