//! Signals emitted by the engine during a battle.
//!
//! Every signal carries an identity, an optional parent (the signal whose
//! handling caused it), and a typed payload. Signals are immutable once
//! dispatched.

use crate::action::Action;
use crate::enums::Affairs;
use crate::ids::{ActionId, ReactorId, SignalId, WarriorRef};
use crate::lifecycle::Lifecycle;

/// Who scripted a reactor's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scripter {
    /// A combatant carrying the reactor as a skill or buff.
    Warrior(WarriorRef),
    /// The battlefield itself (ground skills).
    Ground,
}

impl Scripter {
    /// The combatant behind this scripter, if it is one.
    pub const fn warrior(self) -> Option<WarriorRef> {
        match self {
            Self::Warrior(warrior) => Some(warrior),
            Self::Ground => None,
        }
    }
}

/// The scripter and reactor behind a signal or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    /// Who scripted the reactor.
    pub scripter: Scripter,
    /// The reactor that produced the signal or action.
    pub reactor: ReactorId,
}

/// Payload of a [`SignalKind::Lifecycle`] signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleChange {
    /// The reactor whose lifecycle changed.
    pub source: Source,
    /// The lifecycle after the change, if the reactor tracks one.
    pub lifecycle: Option<Lifecycle>,
    /// Why the lifecycle changed.
    pub affairs: Affairs,
}

/// Typed payload of a [`Signal`].
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    /// The battle begins; emitted exactly once, before any round.
    BattleStart,
    /// A round begins.
    RoundStart,
    /// A round ends.
    RoundEnd,
    /// A combatant takes its turn.
    Launch(WarriorRef),
    /// A reactor's lifecycle changed.
    Lifecycle(LifecycleChange),
    /// An action is about to be resolved.
    PreAction(ActionId),
    /// An action has been resolved.
    PostAction(Box<Action>),
}

/// An immutable event emitted during a battle.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Engine-issued identity.
    pub id: SignalId,
    /// The signal whose handling caused this one.
    pub parent: Option<Box<Signal>>,
    /// Typed payload.
    pub kind: SignalKind,
}

impl Signal {
    /// Create a signal without a parent.
    pub const fn new(id: SignalId, kind: SignalKind) -> Self {
        Self {
            id,
            parent: None,
            kind,
        }
    }

    /// Attach the signal that caused this one.
    #[must_use]
    pub fn caused_by(mut self, parent: Self) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Display name of the signal kind.
    pub const fn name(&self) -> &'static str {
        match &self.kind {
            SignalKind::BattleStart => "BattleStart",
            SignalKind::RoundStart => "RoundStart",
            SignalKind::RoundEnd => "RoundEnd",
            SignalKind::Launch(_) => "Launch",
            SignalKind::Lifecycle(_) => "Lifecycle",
            SignalKind::PreAction(_) => "PreAction",
            SignalKind::PostAction(_) => "PostAction",
        }
    }

    /// The action this signal carries, for action-bearing kinds.
    pub fn action_id(&self) -> Option<ActionId> {
        match &self.kind {
            SignalKind::PreAction(id) => Some(*id),
            SignalKind::PostAction(action) => Some(action.id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Side;

    #[test]
    fn names_follow_kind() {
        let start = Signal::new(SignalId::new(1), SignalKind::RoundStart);
        assert_eq!(start.name(), "RoundStart");
        let launch = Signal::new(
            SignalId::new(2),
            SignalKind::Launch(WarriorRef::new(Side::Left, 0)),
        );
        assert_eq!(launch.name(), "Launch");
    }

    #[test]
    fn only_action_kinds_bear_actions() {
        let pre = Signal::new(SignalId::new(3), SignalKind::PreAction(ActionId::new(9)));
        assert_eq!(pre.action_id(), Some(ActionId::new(9)));
        let end = Signal::new(SignalId::new(4), SignalKind::RoundEnd);
        assert_eq!(end.action_id(), None);
    }

    #[test]
    fn caused_by_links_parent() {
        let parent = Signal::new(SignalId::new(1), SignalKind::RoundEnd);
        let child = Signal::new(SignalId::new(2), SignalKind::RoundStart).caused_by(parent.clone());
        assert_eq!(child.parent.as_deref(), Some(&parent));
    }
}
