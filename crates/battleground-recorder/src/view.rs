//! Client-facing views of signals, actions, reactors, and combatants.
//!
//! Views are captured the moment a sentence is recorded: every label,
//! health ratio, and lifecycle is copied out of the battlefield so the
//! replay holds no reference to engine state. Optional parts are sparse --
//! an absent key means empty, never null.
//!
//! Verb shaping goes through one precomputed [`ActionIndex`] per action so
//! per-target health and lifecycle lookups are map hits instead of repeated
//! queries against the battlefield.

use std::collections::BTreeMap;

use battleground_types::{
    Action, ActionId, Affair, Attack, Battlefield, Buff, Heal, Lifecycle, Purge, Ratio, ReactorId,
    Signal, SignalId, SignalKind, Source, Verb, WarriorRef,
};
use serde::Serialize;
use ts_rs::TS;

use crate::error::RecordError;

/// Label used for reactors that carry no display label.
pub const UNKNOWN_REACTOR: &str = "Unknown";

// ---------------------------------------------------------------------------
// Reactors
// ---------------------------------------------------------------------------

/// A reactor's display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReactorView(pub String);

impl ReactorView {
    /// The reactor's label, or [`UNKNOWN_REACTOR`] if it has none.
    pub fn capture(reactor: ReactorId, field: &dyn Battlefield) -> Self {
        Self(field.label(reactor).unwrap_or(UNKNOWN_REACTOR).to_owned())
    }
}

/// A reactor paired with its lifecycle at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReactorLifecycle {
    /// The reactor.
    pub reactor: ReactorView,
    /// Its lifecycle.
    pub lifecycle: Lifecycle,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// View of a signal.
///
/// Lifecycle signals fill in parent, reactor, warrior, lifecycle, and
/// affairs. Action-bearing signals fill in only `action`. Every other
/// signal is reduced to its id and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SignalView {
    /// Signal identity.
    pub id: SignalId,
    /// Signal kind name.
    pub name: String,
    /// View of the signal that caused this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub parent: Option<Box<SignalView>>,
    /// Reactor whose lifecycle changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reactor: Option<ReactorView>,
    /// Combatant carrying that reactor.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub warrior: Option<WarriorRef>,
    /// Lifecycle after the change.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lifecycle: Option<Lifecycle>,
    /// Why the lifecycle changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub affairs: Option<Vec<Affair>>,
    /// Action carried by an action-bearing signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub action: Option<ActionId>,
}

impl SignalView {
    /// Capture a view of `signal`.
    pub fn capture(signal: &Signal, field: &dyn Battlefield) -> Self {
        let mut view = Self {
            id: signal.id,
            name: signal.name().to_owned(),
            parent: None,
            reactor: None,
            warrior: None,
            lifecycle: None,
            affairs: None,
            action: None,
        };

        if let SignalKind::Lifecycle(change) = &signal.kind {
            view.parent = signal
                .parent
                .as_deref()
                .map(|parent| Box::new(Self::capture(parent, field)));
            view.reactor = Some(ReactorView::capture(change.source.reactor, field));
            view.warrior = change.source.scripter.warrior();
            view.lifecycle = change.lifecycle;
            if !change.affairs.is_empty() {
                view.affairs = Some(change.affairs.iter().collect());
            }
        } else {
            view.action = signal.action_id();
        }

        view
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Who authored an action and in reaction to what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SourceView {
    /// The signal the author reacted to.
    pub signal: SignalView,
    /// The authoring reactor.
    pub reactor: ReactorView,
    /// The authoring combatant, unless the ground authored it.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub warrior: Option<WarriorRef>,
}

impl SourceView {
    fn capture(signal: &Signal, source: Source, field: &dyn Battlefield) -> Self {
        Self {
            signal: SignalView::capture(signal, field),
            reactor: ReactorView::capture(source.reactor, field),
            warrior: source.scripter.warrior(),
        }
    }
}

/// Health change of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Evolution {
    /// The target.
    pub warrior: WarriorRef,
    /// Health after the action.
    pub health: Ratio,
    /// Amount lost or gained.
    pub value: u32,
}

/// Buff instance attached to (or refreshed on) one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Provision {
    /// The target.
    pub warrior: WarriorRef,
    /// Lifecycle of the instance after the action.
    pub lifecycle: Lifecycle,
}

/// Reactors removed from one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recycle {
    /// The target.
    pub warrior: WarriorRef,
    /// Each removed reactor with its final lifecycle.
    pub reactors: Vec<ReactorLifecycle>,
}

/// Verb-specific part of an action view, tagged by `_verb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "_verb", rename_all = "lowercase")]
pub enum VerbView {
    /// Damage dealt.
    Attack {
        /// Whether the attack was critical.
        critical: bool,
        /// Per-target losses.
        losses: Vec<Evolution>,
    },
    /// Health restored.
    Heal {
        /// Per-target rises.
        rises: Vec<Evolution>,
    },
    /// Buff granted.
    Buff {
        /// The granted buff.
        reactor: ReactorView,
        /// Fresh instances.
        provisions: Vec<Provision>,
        /// Refreshed instances.
        overflows: Vec<Provision>,
    },
    /// Buffs removed.
    Purge {
        /// Per-target removals.
        recycles: Vec<Recycle>,
    },
}

/// Per-target health and per-reactor lifecycle after an action, built once
/// per action before its verb is shaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionIndex {
    health: BTreeMap<WarriorRef, Ratio>,
    lifecycle: BTreeMap<ReactorId, Lifecycle>,
}

impl ActionIndex {
    /// Index everything `action`'s verb refers to.
    pub fn build(action: &Action, field: &dyn Battlefield) -> Result<Self, RecordError> {
        let mut index = Self::default();
        match &action.verb {
            Verb::Attack(Attack { losses: pairs, .. }) | Verb::Heal(Heal { rises: pairs }) => {
                for (warrior, _) in pairs {
                    index.index_health(*warrior, field)?;
                }
            }
            Verb::Buff(buff) => {
                for (_, reactor) in buff.provisions.iter().chain(&buff.overflows) {
                    index.index_lifecycle(*reactor, field)?;
                }
            }
            Verb::Purge(purge) => {
                for reactor in purge.recycles.iter().flat_map(|(_, reactors)| reactors) {
                    index.index_lifecycle(*reactor, field)?;
                }
            }
        }
        Ok(index)
    }

    fn index_health(
        &mut self,
        warrior: WarriorRef,
        field: &dyn Battlefield,
    ) -> Result<(), RecordError> {
        let health = field
            .health(warrior)
            .ok_or(RecordError::UnknownWarrior(warrior))?;
        self.health.insert(warrior, health);
        Ok(())
    }

    fn index_lifecycle(
        &mut self,
        reactor: ReactorId,
        field: &dyn Battlefield,
    ) -> Result<(), RecordError> {
        let lifecycle = field
            .lifecycle(reactor)
            .ok_or(RecordError::MissingLifecycle(reactor))?;
        self.lifecycle.insert(reactor, lifecycle);
        Ok(())
    }

    /// Health of `warrior` after the action.
    pub fn health(&self, warrior: WarriorRef) -> Result<Ratio, RecordError> {
        self.health
            .get(&warrior)
            .copied()
            .ok_or(RecordError::UnknownWarrior(warrior))
    }

    /// Lifecycle of `reactor` after the action.
    pub fn lifecycle(&self, reactor: ReactorId) -> Result<Lifecycle, RecordError> {
        self.lifecycle
            .get(&reactor)
            .copied()
            .ok_or(RecordError::MissingLifecycle(reactor))
    }
}

impl VerbView {
    /// Shape `verb` using the action's precomputed index.
    pub fn shape(
        verb: &Verb,
        index: &ActionIndex,
        field: &dyn Battlefield,
    ) -> Result<Self, RecordError> {
        match verb {
            Verb::Attack(attack) => Ok(Self::Attack {
                critical: attack.critical,
                losses: evolutions(&attack.losses, index)?,
            }),
            Verb::Heal(heal) => Ok(Self::Heal {
                rises: evolutions(&heal.rises, index)?,
            }),
            Verb::Buff(buff) => shape_buff(buff, index, field),
            Verb::Purge(purge) => shape_purge(purge, index, field),
        }
    }
}

fn evolutions(
    changes: &[(WarriorRef, u32)],
    index: &ActionIndex,
) -> Result<Vec<Evolution>, RecordError> {
    changes
        .iter()
        .map(|&(warrior, value)| {
            Ok(Evolution {
                warrior,
                health: index.health(warrior)?,
                value,
            })
        })
        .collect()
}

fn provisions(
    grants: &[(WarriorRef, ReactorId)],
    index: &ActionIndex,
) -> Result<Vec<Provision>, RecordError> {
    grants
        .iter()
        .map(|&(warrior, reactor)| {
            Ok(Provision {
                warrior,
                lifecycle: index.lifecycle(reactor)?,
            })
        })
        .collect()
}

fn shape_buff(
    buff: &Buff,
    index: &ActionIndex,
    field: &dyn Battlefield,
) -> Result<VerbView, RecordError> {
    Ok(VerbView::Buff {
        reactor: ReactorView::capture(buff.reactor, field),
        provisions: provisions(&buff.provisions, index)?,
        overflows: provisions(&buff.overflows, index)?,
    })
}

fn shape_purge(
    purge: &Purge,
    index: &ActionIndex,
    field: &dyn Battlefield,
) -> Result<VerbView, RecordError> {
    let recycles = purge
        .recycles
        .iter()
        .map(|(warrior, reactors)| {
            let reactors = reactors
                .iter()
                .map(|&reactor| {
                    Ok(ReactorLifecycle {
                        reactor: ReactorView::capture(reactor, field),
                        lifecycle: index.lifecycle(reactor)?,
                    })
                })
                .collect::<Result<Vec<_>, RecordError>>()?;
            Ok(Recycle {
                warrior: *warrior,
                reactors,
            })
        })
        .collect::<Result<Vec<_>, RecordError>>()?;
    Ok(VerbView::Purge { recycles })
}

/// View of a resolved action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionView {
    /// Action identity.
    pub id: ActionId,
    /// Author and trigger.
    pub source: SourceView,
    /// Targets the verb applied to.
    pub targets: Vec<WarriorRef>,
    /// Targets no longer eligible when the action resolved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[ts(optional, as = "Option<Vec<WarriorRef>>")]
    pub false_targets: Vec<WarriorRef>,
    /// Targets that were immune.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[ts(optional, as = "Option<Vec<WarriorRef>>")]
    pub immune_targets: Vec<WarriorRef>,
    /// Verb-specific payload.
    pub verb: VerbView,
}

impl ActionView {
    /// Capture a view of `action` as the battlefield stands right after it.
    pub fn capture(action: &Action, field: &dyn Battlefield) -> Result<Self, RecordError> {
        let index = ActionIndex::build(action, field)?;
        Ok(Self {
            id: action.id,
            source: SourceView::capture(&action.script.signal, action.script.source, field),
            targets: action.targets.clone(),
            false_targets: action.false_targets.clone(),
            immune_targets: action.immune_targets.clone(),
            verb: VerbView::shape(&action.verb, &index, field)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use battleground_types::{Affairs, LifecycleChange, Script, Scripter, Side};
    use serde_json::json;

    use super::*;
    use crate::testutil::FakeField;

    const LEFT: WarriorRef = WarriorRef::new(Side::Left, 0);
    const RIGHT: WarriorRef = WarriorRef::new(Side::Right, 0);

    fn launch(id: u64) -> Signal {
        Signal::new(SignalId::new(id), SignalKind::Launch(LEFT))
    }

    fn action(verb: Verb, targets: Vec<WarriorRef>) -> Action {
        Action {
            id: ActionId::new(5),
            script: Script {
                signal: Box::new(launch(4)),
                source: Source {
                    scripter: Scripter::Warrior(LEFT),
                    reactor: ReactorId::new(1),
                },
            },
            targets,
            false_targets: Vec::new(),
            immune_targets: Vec::new(),
            verb,
        }
    }

    fn field() -> FakeField {
        let mut field = FakeField::default();
        field.add_warrior(LEFT, 100, 100);
        field.add_warrior(RIGHT, 0, 90);
        field.add_reactor(ReactorId::new(1), Some("Normal Attack"), None);
        field
    }

    #[test]
    fn unlabeled_reactor_reads_unknown() {
        let field = FakeField::default();
        assert_eq!(
            ReactorView::capture(ReactorId::new(99), &field),
            ReactorView(UNKNOWN_REACTOR.to_owned())
        );
    }

    #[test]
    fn plain_signal_reduces_to_id_and_name() {
        let view = SignalView::capture(&launch(7), &field());
        assert_eq!(
            serde_json::to_value(view).ok(),
            Some(json!({ "id": 7, "name": "Launch" }))
        );
    }

    #[test]
    fn action_signal_carries_action_id() {
        let signal = Signal::new(SignalId::new(8), SignalKind::PreAction(ActionId::new(3)));
        let view = SignalView::capture(&signal, &field());
        assert_eq!(
            serde_json::to_value(view).ok(),
            Some(json!({ "id": 8, "name": "PreAction", "action": 3 }))
        );
    }

    #[test]
    fn lifecycle_signal_expands_fully() {
        let mut field = field();
        field.add_reactor(ReactorId::new(2), Some("Fortify"), None);
        let parent = Signal::new(
            SignalId::new(10),
            SignalKind::PostAction(Box::new(action(
                Verb::Heal(Heal { rises: Vec::new() }),
                Vec::new(),
            ))),
        );
        let signal = Signal::new(
            SignalId::new(11),
            SignalKind::Lifecycle(LifecycleChange {
                source: Source {
                    scripter: Scripter::Warrior(LEFT),
                    reactor: ReactorId::new(2),
                },
                lifecycle: Some(Lifecycle::cooling(3)),
                affairs: Affairs::TRIGGER.with(Affairs::OVERFLOW),
            }),
        )
        .caused_by(parent);

        let view = SignalView::capture(&signal, &field);
        assert_eq!(
            serde_json::to_value(view).ok(),
            Some(json!({
                "id": 11,
                "name": "Lifecycle",
                "parent": { "id": 10, "name": "PostAction", "action": 5 },
                "reactor": "Fortify",
                "warrior": { "side": "Left", "position": 0 },
                "lifecycle": { "cooling": { "current": 3, "maximum": 3 } },
                "affairs": ["Trigger", "Overflow"],
            }))
        );
    }

    #[test]
    fn ground_lifecycle_signal_has_no_warrior_or_affairs() {
        let signal = Signal::new(
            SignalId::new(12),
            SignalKind::Lifecycle(LifecycleChange {
                source: Source {
                    scripter: Scripter::Ground,
                    reactor: ReactorId::new(1),
                },
                lifecycle: None,
                affairs: Affairs::NONE,
            }),
        );
        let view = SignalView::capture(&signal, &field());
        assert_eq!(view.warrior, None);
        assert_eq!(view.affairs, None);
        assert_eq!(view.parent, None);
        assert_eq!(view.reactor, Some(ReactorView("Normal Attack".to_owned())));
    }

    #[test]
    fn attack_view_reports_health_after() {
        let attack = action(
            Verb::Attack(Attack {
                critical: true,
                losses: vec![(RIGHT, 90)],
            }),
            vec![RIGHT],
        );
        let view = ActionView::capture(&attack, &field());
        assert_eq!(
            view.ok().and_then(|v| serde_json::to_value(v).ok()),
            Some(json!({
                "id": 5,
                "source": {
                    "signal": { "id": 4, "name": "Launch" },
                    "reactor": "Normal Attack",
                    "warrior": { "side": "Left", "position": 0 },
                },
                "targets": [{ "side": "Right", "position": 0 }],
                "verb": {
                    "_verb": "attack",
                    "critical": true,
                    "losses": [{
                        "warrior": { "side": "Right", "position": 0 },
                        "health": { "current": 0, "maximum": 90 },
                        "value": 90,
                    }],
                },
            }))
        );
    }

    #[test]
    fn sparse_target_lists_appear_only_when_present() {
        let mut heal = action(Verb::Heal(Heal { rises: vec![(LEFT, 0)] }), vec![LEFT]);
        heal.immune_targets = vec![RIGHT];
        let json = ActionView::capture(&heal, &field())
            .map(|v| serde_json::to_value(v).unwrap())
            .unwrap();
        assert_eq!(json["immune_targets"], json!([{ "side": "Right", "position": 0 }]));
        assert!(json.get("false_targets").is_none());
        assert_eq!(json["verb"]["_verb"], "heal");
        assert_eq!(json["verb"]["rises"][0]["health"]["current"], 100);
    }

    #[test]
    fn buff_view_lists_provisions_and_overflows() {
        let mut field = field();
        field.add_reactor(ReactorId::new(20), Some("Fortify"), None);
        field.add_reactor(ReactorId::new(21), Some("Fortify"), Some(Lifecycle::cooling(2)));
        field.add_reactor(
            ReactorId::new(22),
            Some("Fortify"),
            Some(Lifecycle {
                leading: None,
                cooling: Some(Ratio::full(2)),
                capacity: Some(1),
            }),
        );
        let buff = action(
            Verb::Buff(Buff {
                reactor: ReactorId::new(20),
                provisions: vec![(LEFT, ReactorId::new(21))],
                overflows: vec![(RIGHT, ReactorId::new(22))],
            }),
            vec![LEFT, RIGHT],
        );
        let json = ActionView::capture(&buff, &field)
            .map(|v| serde_json::to_value(v).unwrap())
            .unwrap();
        assert_eq!(
            json["verb"],
            json!({
                "_verb": "buff",
                "reactor": "Fortify",
                "provisions": [{
                    "warrior": { "side": "Left", "position": 0 },
                    "lifecycle": { "cooling": { "current": 2, "maximum": 2 } },
                }],
                "overflows": [{
                    "warrior": { "side": "Right", "position": 0 },
                    "lifecycle": { "cooling": { "current": 2, "maximum": 2 }, "capacity": 1 },
                }],
            })
        );
    }

    #[test]
    fn purge_view_lists_removed_reactors() {
        let mut field = field();
        let mut expired = Lifecycle::cooling(2);
        expired.cooling = Some(Ratio {
            current: 0,
            maximum: 2,
        });
        field.add_reactor(ReactorId::new(30), Some("Fortify"), Some(expired));
        let purge = action(
            Verb::Purge(Purge {
                recycles: vec![(LEFT, vec![ReactorId::new(30)])],
            }),
            vec![LEFT],
        );
        let json = ActionView::capture(&purge, &field)
            .map(|v| serde_json::to_value(v).unwrap())
            .unwrap();
        assert_eq!(
            json["verb"],
            json!({
                "_verb": "purge",
                "recycles": [{
                    "warrior": { "side": "Left", "position": 0 },
                    "reactors": [{
                        "reactor": "Fortify",
                        "lifecycle": { "cooling": { "current": 0, "maximum": 2 } },
                    }],
                }],
            })
        );
    }

    #[test]
    fn buff_of_reactor_without_lifecycle_fails() {
        let buff = action(
            Verb::Buff(Buff {
                reactor: ReactorId::new(1),
                provisions: vec![(LEFT, ReactorId::new(1))],
                overflows: Vec::new(),
            }),
            vec![LEFT],
        );
        assert!(matches!(
            ActionView::capture(&buff, &field()),
            Err(RecordError::MissingLifecycle(_))
        ));
    }

    #[test]
    fn index_is_built_once_per_target() {
        let attack = action(
            Verb::Attack(Attack {
                critical: false,
                losses: vec![(RIGHT, 4), (LEFT, 2)],
            }),
            vec![RIGHT, LEFT],
        );
        let index = ActionIndex::build(&attack, &field()).unwrap();
        assert_eq!(index.health(LEFT).ok(), Some(Ratio::full(100)));
        assert!(index.lifecycle(ReactorId::new(1)).is_err());
    }

    #[test]
    fn bindings_match_sparse_wire_format() {
        let signal = SignalView::decl();
        for field in [
            "parent?: SignalView",
            "reactor?: ReactorView",
            "warrior?: WarriorRef",
            "lifecycle?: Lifecycle",
            "affairs?: Array<Affair>",
            "action?: ActionId",
        ] {
            assert!(signal.contains(field), "{field} missing from {signal}");
        }
        assert!(!signal.contains("null"));

        assert!(SourceView::decl().contains("warrior?: WarriorRef"));

        let action = ActionView::decl();
        assert!(action.contains("targets: Array<WarriorRef>"));
        assert!(action.contains("false_targets?: Array<WarriorRef>"));
        assert!(action.contains("immune_targets?: Array<WarriorRef>"));
    }
}
