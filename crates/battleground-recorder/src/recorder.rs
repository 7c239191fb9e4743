//! The replay recorder.
//!
//! A [`Recorder`] is one listener registered at two priority slots over a
//! single round stack:
//!
//! - **Opening slot** (highest priority, [`OPENING_PRIORITY`]) sees every
//!   signal before any other reactor. It opens rounds on `BattleStart` and
//!   `RoundStart`, moves the current round to its end stage on `RoundEnd`,
//!   and appends a sentence for every `Lifecycle` and `PostAction` signal.
//! - **Closing slot** (lowest priority, [`CLOSING_PRIORITY`]) sees every
//!   signal after all other reactors. On `RoundStart` it moves the current
//!   round to its main stage.
//!
//! Because the closing slot runs only once every reactor has finished
//! reacting to `RoundStart`, anything emitted while the round opens lands
//! in the start stage and everything from the first turn onward lands in
//! the main stage. The signal stream itself carries no stage marker.

use battleground_types::{
    Battlefield, Listener, ListenerError, Priority, Side, Signal, SignalKind,
};
use tracing::{debug, info, warn};

use crate::error::RecordError;
use crate::profile::capture_profiles;
use crate::replay::Replay;
use crate::round::{Round, Sentence, Stage};
use crate::view::{ActionView, SignalView};

/// Priority of the slot that opens rounds and records sentences.
pub const OPENING_PRIORITY: Priority = 1_000_000;

/// Priority of the slot that flips a freshly opened round to its main stage.
pub const CLOSING_PRIORITY: Priority = -1_000_000;

const SLOTS: [Priority; 2] = [OPENING_PRIORITY, CLOSING_PRIORITY];
const OPENING_SLOT: usize = 0;
const CLOSING_SLOT: usize = 1;

/// Listener that reconstructs a replay from the signal stream.
///
/// The first round on the stack is the synthetic battle-start round; every
/// later round corresponds to one `RoundStart` signal.
#[derive(Debug, Default)]
pub struct Recorder {
    rounds: Vec<Round>,
    credited: Option<Side>,
}

impl Recorder {
    /// Create a recorder with an empty round stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds recorded so far, battle-start round first.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Side of the last combatant that completed an action.
    pub const fn credited(&self) -> Option<Side> {
        self.credited
    }

    /// Handle a signal at the opening slot.
    pub fn observe(&mut self, signal: &Signal, field: &dyn Battlefield) -> Result<(), RecordError> {
        match &signal.kind {
            SignalKind::BattleStart | SignalKind::RoundStart => {
                let profiles = capture_profiles(field)?;
                debug!(
                    round = self.rounds.len(),
                    profiles = profiles.len(),
                    signal = signal.name(),
                    "Round opened"
                );
                self.rounds.push(Round::open(profiles));
            }
            SignalKind::RoundEnd => {
                self.advance(signal, Stage::End)?;
            }
            SignalKind::Lifecycle(_) => {
                let view = SignalView::capture(signal, field);
                self.top_mut(signal)?
                    .append(Sentence::Signal(Box::new(view)));
            }
            SignalKind::PostAction(action) => {
                let view = ActionView::capture(action, field)?;
                self.top_mut(signal)?
                    .append(Sentence::Action(Box::new(view)));
                if let Some(side) = action.credited_side() {
                    self.credited = Some(side);
                }
            }
            SignalKind::Launch(_) | SignalKind::PreAction(_) => {}
        }
        Ok(())
    }

    /// Handle a signal at the closing slot.
    pub fn complete(&mut self, signal: &Signal) -> Result<(), RecordError> {
        if matches!(signal.kind, SignalKind::RoundStart) {
            self.advance(signal, Stage::Main)?;
        }
        Ok(())
    }

    /// Consume the recorder and assemble the replay document.
    ///
    /// The winner is the only side with a living combatant on `field`. The
    /// credited side is kept only when it agrees with the roster.
    pub fn finish(self, field: &dyn Battlefield) -> Result<Replay, RecordError> {
        let mut rounds = self.rounds.into_iter();
        let opening = rounds.next().ok_or(RecordError::NoBattleStart)?;
        let rounds: Vec<Round> = rounds.collect();

        let survivor = surviving_side(field)?;
        match (self.credited, survivor) {
            (Some(credited), Some(survivor)) if credited != survivor => warn!(
                %credited,
                %survivor,
                "Credited side disagrees with the roster, discarding it"
            ),
            (Some(credited), None) => debug!(%credited, "No side eliminated, ignoring credit"),
            _ => {}
        }

        info!(
            rounds = rounds.len(),
            winner = ?survivor,
            "Replay recorded"
        );

        Ok(Replay {
            winner: survivor,
            profiles: opening.profiles,
            start: opening.start,
            rounds,
        })
    }

    fn top_mut(&mut self, signal: &Signal) -> Result<&mut Round, RecordError> {
        self.rounds.last_mut().ok_or(RecordError::NoOpenRound {
            signal: signal.name(),
        })
    }

    fn advance(&mut self, signal: &Signal, stage: Stage) -> Result<(), RecordError> {
        let round = self.top_mut(signal)?;
        debug!(from = %round.current(), to = %stage, "Stage advanced");
        round.advance(stage)
    }
}

/// The only side with a living combatant, if exactly one has any.
fn surviving_side(field: &dyn Battlefield) -> Result<Option<Side>, RecordError> {
    let (mut left, mut right) = (false, false);
    for warrior in field.warriors() {
        let health = field
            .health(warrior)
            .ok_or(RecordError::UnknownWarrior(warrior))?;
        if !health.is_depleted() {
            match warrior.side {
                Side::Left => left = true,
                Side::Right => right = true,
            }
        }
    }
    Ok(match (left, right) {
        (true, false) => Some(Side::Left),
        (false, true) => Some(Side::Right),
        _ => None,
    })
}

impl Listener for Recorder {
    fn slots(&self) -> &[Priority] {
        &SLOTS
    }

    fn react(
        &mut self,
        slot: usize,
        signal: &Signal,
        field: &dyn Battlefield,
    ) -> Result<(), ListenerError> {
        match slot {
            OPENING_SLOT => self.observe(signal, field)?,
            CLOSING_SLOT => self.complete(signal)?,
            other => return Err(RecordError::UnknownSlot(other).into()),
        }
        Ok(())
    }
}
