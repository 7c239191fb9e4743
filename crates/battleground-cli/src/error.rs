//! Error types for the `battleground` binary.
//!
//! [`CliError`] wraps every failure mode between reading the command line
//! and writing the replay, so `run` can propagate with `?`.

use battleground_arena::{ArenaError, ConfigError};
use battleground_recorder::RecordError;

/// Top-level error for the `battleground` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A flag the binary does not know.
    #[error("unknown flag {flag}")]
    UnknownFlag {
        /// The flag as given.
        flag: String,
    },

    /// More than one battle file was given.
    #[error("unexpected argument {argument}")]
    UnexpectedArgument {
        /// The extra argument.
        argument: String,
    },

    /// The battle file could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The battle could not be set up or was aborted.
    #[error("arena error: {source}")]
    Arena {
        /// The underlying arena error.
        #[from]
        source: ArenaError,
    },

    /// The replay could not be assembled or serialized.
    #[error("record error: {source}")]
    Record {
        /// The underlying recorder error.
        #[from]
        source: RecordError,
    },

    /// Writing the replay to stdout failed.
    #[error("output error: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
