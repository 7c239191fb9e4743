//! The replay document produced for one battle.

use battleground_types::Side;
use serde::Serialize;
use ts_rs::TS;

use crate::error::RecordError;
use crate::profile::Profile;
use crate::round::{Round, Sentence};

/// Structured, replayable narrative of one battle.
///
/// `profiles` and `start` come from the synthetic battle-start round, which
/// is never listed in `rounds`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Replay {
    /// The only side left standing, absent on a draw or timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub winner: Option<Side>,
    /// Living combatants before the battle.
    pub profiles: Vec<Profile>,
    /// Sentences recorded before the first round.
    pub start: Vec<Sentence>,
    /// One entry per round, in order.
    pub rounds: Vec<Round>,
}

impl Replay {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
