//! Error types for the arena.

use battleground_types::ListenerError;

use crate::config::ConfigError;

/// Errors that stop a battle from being set up or run.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The battle request is unusable.
    #[error("battle configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A listener aborted the run.
    #[error("listener failed on {signal}: {source}")]
    Listener {
        /// Name of the signal being dispatched.
        signal: &'static str,
        /// The listener's error.
        source: ListenerError,
    },
}
