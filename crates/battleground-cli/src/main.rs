//! Command-line runner for the Battleground simulation.
//!
//! Plays one battle file through the reference arena with a replay
//! recorder attached, then prints the replay document on stdout.
//!
//! ```text
//! battleground [BATTLE_FILE] [--pretty]
//! ```
//!
//! `BATTLE_FILE` defaults to `battle.yaml` in the working directory. Logs
//! go to stderr and honor `RUST_LOG` (default `info`). Any failure prints
//! one generic message and exits non-zero; the cause is in the log.
//!
//! # Run Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Parse arguments
//! 3. Load and validate the battle file
//! 4. Fight the battle with the recorder attached
//! 5. Assemble the replay and print it

mod error;

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use battleground_arena::{Arena, BattleConfig};
use battleground_recorder::Recorder;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const DEFAULT_BATTLE_FILE: &str = "battle.yaml";

/// Message printed for every failure, whatever the cause.
const FAILURE_MESSAGE: &str = "battle simulation failed";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    path: PathBuf,
    pretty: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut path = None;
        let mut pretty = false;
        for arg in args {
            match arg.as_str() {
                "--pretty" => pretty = true,
                flag if flag.starts_with('-') => {
                    return Err(CliError::UnknownFlag {
                        flag: flag.to_owned(),
                    });
                }
                file => {
                    if path.replace(PathBuf::from(file)).is_some() {
                        return Err(CliError::UnexpectedArgument {
                            argument: file.to_owned(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_BATTLE_FILE)),
            pretty,
        })
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "battleground failed");
            eprintln!("{FAILURE_MESSAGE}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse(std::env::args().skip(1))?;
    info!(path = %args.path.display(), pretty = args.pretty, "battleground starting");

    let config = BattleConfig::from_file(&args.path)?;
    info!(
        seed = config.seed,
        max_rounds = config.max_rounds,
        left = config.left.len(),
        right = config.right.len(),
        ground_skills = config.ground.len(),
        "Battle file loaded"
    );

    let mut arena = Arena::new(&config)?;
    let mut recorder = Recorder::new();
    let outcome = arena.run(&mut [&mut recorder])?;
    let replay = recorder.finish(arena.field())?;

    let json = if args.pretty {
        replay.to_json_pretty()?
    } else {
        replay.to_json()?
    };
    writeln!(std::io::stdout().lock(), "{json}")?;

    info!(
        rounds = outcome.rounds,
        winner = ?replay.winner,
        bytes = json.len(),
        "battleground finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, CliError> {
        Args::parse(args.iter().map(|a| (*a).to_owned()))
    }

    #[test]
    fn defaults_to_compact_demo_file() {
        assert_eq!(
            parse(&[]).ok(),
            Some(Args {
                path: PathBuf::from(DEFAULT_BATTLE_FILE),
                pretty: false,
            })
        );
    }

    #[test]
    fn accepts_file_and_pretty_in_any_order() {
        let expected = Some(Args {
            path: PathBuf::from("duel.yaml"),
            pretty: true,
        });
        assert_eq!(parse(&["--pretty", "duel.yaml"]).ok(), expected);
        assert_eq!(parse(&["duel.yaml", "--pretty"]).ok(), expected);
    }

    #[test]
    fn rejects_unknown_flags_and_extra_files() {
        assert!(matches!(
            parse(&["--fast"]),
            Err(CliError::UnknownFlag { flag }) if flag == "--fast"
        ));
        assert!(matches!(
            parse(&["a.yaml", "b.yaml"]),
            Err(CliError::UnexpectedArgument { argument }) if argument == "b.yaml"
        ));
    }
}
