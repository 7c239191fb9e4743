//! Error types for the `battleground-recorder` crate.
//!
//! Every variant except [`RecordError::Serialize`] means the engine broke
//! its ordering or lookup contract. None of them are recoverable: the run
//! is aborted and no partial replay is produced.

use battleground_types::{ReactorId, WarriorRef};

use crate::round::Stage;

/// Errors that can occur while recording or emitting a replay.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A signal that belongs inside a round arrived before any round opened.
    #[error("{signal} signal arrived with no open round")]
    NoOpenRound {
        /// Name of the offending signal.
        signal: &'static str,
    },

    /// The run finished without a `BattleStart` signal.
    #[error("battle finished without a BattleStart signal")]
    NoBattleStart,

    /// A round was asked to move back to an earlier stage.
    #[error("stage cannot move from {from} back to {to}")]
    StageRegression {
        /// The round's current stage.
        from: Stage,
        /// The requested stage.
        to: Stage,
    },

    /// A referenced combatant is unknown to the battlefield.
    #[error("warrior {0} is unknown to the battlefield")]
    UnknownWarrior(WarriorRef),

    /// A referenced reactor has no lifecycle to snapshot.
    #[error("reactor {0} has no lifecycle")]
    MissingLifecycle(ReactorId),

    /// The engine delivered a signal at a slot the recorder never claimed.
    #[error("recorder has no slot {0}")]
    UnknownSlot(usize),

    /// The replay document could not be serialized.
    #[error("failed to serialize replay: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
