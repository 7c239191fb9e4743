//! Rounds, stages, and sentences.
//!
//! A [`Round`] holds the profiles captured when it opened and three
//! append-only sentence buckets, one per [`Stage`]. Sentences go into the
//! bucket of the round's current stage, and the current stage only ever
//! moves forward: start, then main, then end.

use serde::Serialize;
use ts_rs::TS;

use crate::error::RecordError;
use crate::profile::Profile;
use crate::view::{ActionView, SignalView};

/// Phase of a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Reactions to the round opening (turn-start buff ticks and the like).
    #[default]
    Start,
    /// Turns, from the first launch onward.
    Main,
    /// Reactions to the round closing.
    End,
}

impl Stage {
    /// Key of this stage's bucket in the replay document.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Main => "main",
            Self::End => "end",
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// One recorded unit of replay content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum Sentence {
    /// A resolved action.
    Action(Box<ActionView>),
    /// A lifecycle signal.
    Signal(Box<SignalView>),
}

/// Sentences of one round, split by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Round {
    /// Living combatants as the round opened.
    pub profiles: Vec<Profile>,
    /// Sentences recorded before the first turn.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[ts(optional, as = "Option<Vec<Sentence>>")]
    pub start: Vec<Sentence>,
    /// Sentences recorded during turns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[ts(optional, as = "Option<Vec<Sentence>>")]
    pub main: Vec<Sentence>,
    /// Sentences recorded after the round closed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[ts(optional, as = "Option<Vec<Sentence>>")]
    pub end: Vec<Sentence>,
    #[serde(skip)]
    current: Stage,
}

impl Round {
    /// Open a round in the start stage.
    pub const fn open(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            start: Vec::new(),
            main: Vec::new(),
            end: Vec::new(),
            current: Stage::Start,
        }
    }

    /// The stage new sentences are appended to.
    pub const fn current(&self) -> Stage {
        self.current
    }

    /// Move to `stage`. Moving to the current stage is a no-op; moving
    /// backward is a contract violation.
    pub fn advance(&mut self, stage: Stage) -> Result<(), RecordError> {
        if stage < self.current {
            return Err(RecordError::StageRegression {
                from: self.current,
                to: stage,
            });
        }
        self.current = stage;
        Ok(())
    }

    /// Append a sentence to the current stage's bucket.
    pub fn append(&mut self, sentence: Sentence) {
        self.bucket_mut(self.current).push(sentence);
    }

    /// Sentences recorded in `stage`.
    pub fn stage(&self, stage: Stage) -> &[Sentence] {
        match stage {
            Stage::Start => &self.start,
            Stage::Main => &self.main,
            Stage::End => &self.end,
        }
    }

    /// Number of sentences across all stages.
    pub fn sentence_count(&self) -> usize {
        self.start
            .len()
            .saturating_add(self.main.len())
            .saturating_add(self.end.len())
    }

    const fn bucket_mut(&mut self, stage: Stage) -> &mut Vec<Sentence> {
        match stage {
            Stage::Start => &mut self.start,
            Stage::Main => &mut self.main,
            Stage::End => &mut self.end,
        }
    }
}
