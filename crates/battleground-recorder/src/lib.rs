//! Replay recorder for the Battleground simulation.
//!
//! The recorder is a passive listener attached to a battle engine's signal
//! stream. From signals alone it rebuilds a hierarchical replay -- rounds,
//! stages, sentences -- plus per-combatant stat snapshots, and serializes it
//! into a stable JSON document for the replay client.
//!
//! # Modules
//!
//! - [`recorder`] -- The two-slot [`Recorder`] listener and winner resolution
//! - [`round`] -- Rounds, stages, and sentences
//! - [`profile`] -- Per-combatant stat snapshots
//! - [`view`] -- Signal, action, and verb views
//! - [`replay`] -- The output [`Replay`] document
//! - [`error`] -- [`RecordError`]

pub mod error;
pub mod profile;
pub mod recorder;
pub mod replay;
pub mod round;
pub mod view;

#[cfg(test)]
mod testutil;

pub use error::RecordError;
pub use profile::{Profile, capture_profiles};
pub use recorder::{CLOSING_PRIORITY, OPENING_PRIORITY, Recorder};
pub use replay::Replay;
pub use round::{Round, Sentence, Stage};
pub use view::{
    ActionIndex, ActionView, Evolution, Provision, ReactorLifecycle, ReactorView, Recycle,
    SignalView, SourceView, UNKNOWN_REACTOR, VerbView,
};
