//! Live battle state.
//!
//! [`Field`] owns every combatant and every reactor (skills, buff
//! templates, buff instances) and answers the [`Battlefield`] queries
//! listeners make while a signal is dispatched. Reactors are never removed
//! from the registry: a purged buff keeps its label and final lifecycle so
//! that late lookups still resolve.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use battleground_types::{
    Battlefield, Component, Lifecycle, Ratio, ReactorId, Scripter, Side, WarriorRef,
};

use crate::config::{BattleConfig, BuffEffect, ConfigError, SkillSpec, Target, Trigger, VerbSpec};

/// Baseline stat components of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Raw damage.
    pub damage: u32,
    /// Flat damage reduction.
    pub defense: u32,
    /// Critical chance (percent).
    pub critical_odds: u32,
    /// Critical multiplier (percent).
    pub critical_loss: u32,
    /// Turn order.
    pub speed: u32,
}

impl Stats {
    /// Value of one component.
    pub const fn get(self, component: Component) -> u32 {
        match component {
            Component::Damage => self.damage,
            Component::Defense => self.defense,
            Component::CriticalOdds => self.critical_odds,
            Component::CriticalLoss => self.critical_loss,
            Component::Speed => self.speed,
        }
    }
}

/// A combatant on the field.
#[derive(Debug, Clone)]
pub struct Warrior {
    /// Position on the roster.
    pub id: WarriorRef,
    /// Display name.
    pub name: String,
    /// Stats before buffs.
    pub baseline: Stats,
    /// Current health.
    pub health: Ratio,
    /// Skill reactors, in the order they are tried.
    pub skills: Vec<ReactorId>,
    /// Active buff instances, oldest first.
    pub buffs: Vec<ReactorId>,
}

impl Warrior {
    /// Whether the combatant still stands.
    pub const fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

/// What a skill does, with buff templates resolved to reactors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Attack { multiplier: u32 },
    Heal { percent: u32 },
    Buff {
        template: ReactorId,
        duration: u32,
        capacity: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Skill {
    pub owner: Scripter,
    pub trigger: Trigger,
    pub target: Target,
    pub cooldown: u32,
    pub effect: Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReactorKind {
    Skill(Skill),
    Template(BuffEffect),
    Buff {
        template: ReactorId,
        effect: BuffEffect,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Reactor {
    pub label: String,
    pub lifecycle: Option<Lifecycle>,
    pub kind: ReactorKind,
}

/// The live battlefield.
#[derive(Debug, Clone, Default)]
pub struct Field {
    warriors: Vec<Warrior>,
    reactors: BTreeMap<ReactorId, Reactor>,
    ground: Vec<ReactorId>,
    next_reactor: u64,
}

impl Field {
    /// Field the rosters of a battle request.
    ///
    /// Combatants are laid out left side first, each side by ascending
    /// position, and start at full health.
    pub fn build(config: &BattleConfig) -> Result<Self, ConfigError> {
        let mut field = Self::default();
        for side in Side::ALL {
            for (&position, &character) in config.roster(side) {
                let spec = config.character(character)?;
                let id = WarriorRef::new(side, position);
                let mut skills = Vec::with_capacity(spec.skills.len());
                for &skill in &spec.skills {
                    let skill = config.skill(skill)?;
                    skills.push(field.register_skill(skill, Scripter::Warrior(id)));
                }
                field.warriors.push(Warrior {
                    id,
                    name: spec.name.clone(),
                    baseline: Stats {
                        damage: spec.damage,
                        defense: spec.defense,
                        critical_odds: spec.critical_odds,
                        critical_loss: spec.critical_loss,
                        speed: spec.speed,
                    },
                    health: Ratio::full(spec.health),
                    skills,
                    buffs: Vec::new(),
                });
            }
        }
        for &skill in &config.ground {
            let skill = config.skill(skill)?;
            let reactor = field.register_skill(skill, Scripter::Ground);
            field.ground.push(reactor);
        }
        Ok(field)
    }

    /// Look up a combatant.
    pub fn warrior(&self, warrior: WarriorRef) -> Option<&Warrior> {
        self.warriors.iter().find(|w| w.id == warrior)
    }

    /// Whether a combatant is on the field and still standing.
    pub fn is_alive(&self, warrior: WarriorRef) -> bool {
        self.warrior(warrior).is_some_and(Warrior::is_alive)
    }

    /// Whether both sides still field a living combatant.
    pub fn contested(&self) -> bool {
        Side::ALL.iter().all(|&side| self.side_standing(side))
    }

    /// The only side still standing, if exactly one is.
    pub fn survivor(&self) -> Option<Side> {
        match (self.side_standing(Side::Left), self.side_standing(Side::Right)) {
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            _ => None,
        }
    }

    fn side_standing(&self, side: Side) -> bool {
        self.warriors
            .iter()
            .any(|w| w.id.side == side && w.is_alive())
    }

    /// Living combatants in turn order: speed descending, then side, then
    /// position.
    pub fn turn_order(&self) -> Vec<WarriorRef> {
        let mut order: Vec<(Reverse<u32>, WarriorRef)> = self
            .warriors
            .iter()
            .filter(|w| w.is_alive())
            .map(|w| {
                let speed = self.component(w.id, Component::Speed).unwrap_or_default();
                (Reverse(speed), w.id)
            })
            .collect();
        order.sort();
        order.into_iter().map(|(_, warrior)| warrior).collect()
    }

    /// Whether an active buff makes a combatant ignore attacks.
    pub fn is_immune(&self, warrior: WarriorRef) -> bool {
        self.active_effects(warrior)
            .any(|effect| matches!(effect, BuffEffect::Immune))
    }

    // -----------------------------------------------------------------------
    // Reactors
    // -----------------------------------------------------------------------

    pub(crate) fn reactor(&self, id: ReactorId) -> Option<&Reactor> {
        self.reactors.get(&id)
    }

    pub(crate) fn skill(&self, id: ReactorId) -> Option<Skill> {
        match self.reactor(id)?.kind {
            ReactorKind::Skill(skill) => Some(skill),
            ReactorKind::Template(_) | ReactorKind::Buff { .. } => None,
        }
    }

    /// Whether a skill is off cooldown.
    pub(crate) fn is_ready(&self, id: ReactorId) -> bool {
        self.reactor(id)
            .is_some_and(|r| r.lifecycle.is_none_or(|l| l.is_cooled()))
    }

    /// Ready skills reacting to `trigger`: ground skills first, then each
    /// living combatant's in roster order.
    pub(crate) fn triggered(&self, trigger: Trigger) -> Vec<ReactorId> {
        let carried = self
            .warriors
            .iter()
            .filter(|w| w.is_alive())
            .flat_map(|w| w.skills.iter().copied());
        self.ground
            .iter()
            .copied()
            .chain(carried)
            .filter(|&id| self.skill(id).is_some_and(|s| s.trigger == trigger))
            .filter(|&id| self.is_ready(id))
            .collect()
    }

    /// Ready turn skills of a combatant, in the order they are tried.
    pub(crate) fn launch_skills(&self, warrior: WarriorRef) -> Vec<ReactorId> {
        self.warrior(warrior)
            .map(|w| {
                w.skills
                    .iter()
                    .copied()
                    .filter(|&id| self.skill(id).is_some_and(|s| s.trigger == Trigger::Launch))
                    .filter(|&id| self.is_ready(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Living buff holders and their instances, roster order, oldest first.
    pub(crate) fn held_buffs(&self) -> Vec<(WarriorRef, ReactorId)> {
        self.warriors
            .iter()
            .filter(|w| w.is_alive())
            .flat_map(|w| w.buffs.iter().map(move |&buff| (w.id, buff)))
            .collect()
    }

    /// Held buffs whose duration has run out.
    pub(crate) fn expired_buffs(&self) -> Vec<(WarriorRef, ReactorId)> {
        self.held_buffs()
            .into_iter()
            .filter(|&(_, buff)| self.is_ready(buff))
            .collect()
    }

    /// Skills of living owners (or the ground) still cooling down.
    pub(crate) fn cooling_skills(&self) -> Vec<(Scripter, ReactorId)> {
        let carried = self
            .warriors
            .iter()
            .filter(|w| w.is_alive())
            .flat_map(|w| w.skills.iter().copied());
        self.ground
            .iter()
            .copied()
            .chain(carried)
            .filter_map(|id| self.skill(id).map(|skill| (skill.owner, id)))
            .filter(|&(_, id)| !self.is_ready(id))
            .collect()
    }

    /// Count a reactor's cooling down by one and return its lifecycle.
    pub(crate) fn tick(&mut self, id: ReactorId) -> Option<Lifecycle> {
        let lifecycle = self.reactors.get_mut(&id)?.lifecycle.as_mut()?;
        if let Some(cooling) = lifecycle.cooling.as_mut() {
            cooling.lower(1);
        }
        Some(*lifecycle)
    }

    /// Put a reactor's cooling back at its maximum.
    pub(crate) fn rewind(&mut self, id: ReactorId) -> Option<Lifecycle> {
        let lifecycle = self.reactors.get_mut(&id)?.lifecycle.as_mut()?;
        if let Some(cooling) = lifecycle.cooling.as_mut() {
            cooling.current = cooling.maximum;
        }
        Some(*lifecycle)
    }

    /// Instances of `template` held by a combatant, oldest first.
    pub(crate) fn instances_of(&self, holder: WarriorRef, template: ReactorId) -> Vec<ReactorId> {
        self.warrior(holder)
            .map(|w| {
                w.buffs
                    .iter()
                    .copied()
                    .filter(|&buff| {
                        self.reactor(buff).is_some_and(|r| {
                            matches!(r.kind, ReactorKind::Buff { template: t, .. } if t == template)
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach a fresh instance of `template` to a combatant.
    pub(crate) fn attach(
        &mut self,
        holder: WarriorRef,
        template: ReactorId,
        duration: u32,
    ) -> Option<ReactorId> {
        let template_reactor = self.reactor(template)?;
        let ReactorKind::Template(effect) = template_reactor.kind else {
            return None;
        };
        let label = template_reactor.label.clone();
        let index = self.warriors.iter().position(|w| w.id == holder)?;
        let id = self.register(Reactor {
            label,
            lifecycle: Some(Lifecycle::cooling(duration)),
            kind: ReactorKind::Buff { template, effect },
        });
        if let Some(warrior) = self.warriors.get_mut(index) {
            warrior.buffs.push(id);
        }
        Some(id)
    }

    /// Take a buff instance off its holder. The reactor stays registered.
    pub(crate) fn detach(&mut self, holder: WarriorRef, buff: ReactorId) -> bool {
        let Some(warrior) = self.warriors.iter_mut().find(|w| w.id == holder) else {
            return false;
        };
        let before = warrior.buffs.len();
        warrior.buffs.retain(|&b| b != buff);
        warrior.buffs.len() != before
    }

    pub(crate) fn health_mut(&mut self, warrior: WarriorRef) -> Option<&mut Ratio> {
        self.warriors
            .iter_mut()
            .find(|w| w.id == warrior)
            .map(|w| &mut w.health)
    }

    /// Targets a skill owner would pick right now.
    pub(crate) fn select(&self, owner: Scripter, target: Target) -> Vec<WarriorRef> {
        let living = |side: Option<Side>| {
            self.warriors
                .iter()
                .filter(move |w| w.is_alive() && side.is_none_or(|s| w.id.side == s))
                .map(|w| w.id)
        };
        let own = owner.warrior().map(|w| w.side);
        let opposing = own.map(Side::opponent);
        match target {
            Target::Enemy => living(opposing).take(1).collect(),
            Target::Enemies => living(opposing).collect(),
            Target::Itself => owner
                .warrior()
                .filter(|&w| self.is_alive(w))
                .into_iter()
                .collect(),
            Target::Allies => living(own).collect(),
            Target::WeakestAlly => living(own)
                .filter_map(|w| self.warrior(w))
                .min_by(|a, b| {
                    let left = u64::from(a.health.current).saturating_mul(u64::from(b.health.maximum));
                    let right = u64::from(b.health.current).saturating_mul(u64::from(a.health.maximum));
                    left.cmp(&right)
                })
                .map(|w| w.id)
                .into_iter()
                .collect(),
        }
    }

    fn active_effects(&self, warrior: WarriorRef) -> impl Iterator<Item = BuffEffect> + '_ {
        self.warrior(warrior)
            .into_iter()
            .flat_map(|w| w.buffs.iter())
            .filter_map(|&buff| match self.reactor(buff)?.kind {
                ReactorKind::Buff { effect, .. } => Some(effect),
                ReactorKind::Skill(_) | ReactorKind::Template(_) => None,
            })
    }

    fn register_skill(&mut self, spec: &SkillSpec, owner: Scripter) -> ReactorId {
        let effect = match &spec.verb {
            VerbSpec::Attack { multiplier } => Effect::Attack {
                multiplier: *multiplier,
            },
            VerbSpec::Heal { percent } => Effect::Heal { percent: *percent },
            VerbSpec::Buff {
                label,
                effect,
                duration,
                capacity,
            } => {
                let template = self.register(Reactor {
                    label: label.clone(),
                    lifecycle: None,
                    kind: ReactorKind::Template(*effect),
                });
                Effect::Buff {
                    template,
                    duration: *duration,
                    capacity: *capacity,
                }
            }
        };
        let lifecycle = (spec.cooldown > 0).then(|| Lifecycle {
            cooling: Some(Ratio {
                current: 0,
                maximum: spec.cooldown,
            }),
            ..Lifecycle::default()
        });
        self.register(Reactor {
            label: spec.name.clone(),
            lifecycle,
            kind: ReactorKind::Skill(Skill {
                owner,
                trigger: spec.trigger,
                target: spec.target,
                cooldown: spec.cooldown,
                effect,
            }),
        })
    }

    fn register(&mut self, reactor: Reactor) -> ReactorId {
        self.next_reactor = self.next_reactor.saturating_add(1);
        let id = ReactorId::new(self.next_reactor);
        self.reactors.insert(id, reactor);
        id
    }
}

impl Battlefield for Field {
    fn warriors(&self) -> Vec<WarriorRef> {
        self.warriors.iter().map(|w| w.id).collect()
    }

    fn health(&self, warrior: WarriorRef) -> Option<Ratio> {
        self.warrior(warrior).map(|w| w.health)
    }

    fn component(&self, warrior: WarriorRef, component: Component) -> Option<u32> {
        let base = i64::from(self.warrior(warrior)?.baseline.get(component));
        let shifted = self
            .active_effects(warrior)
            .filter_map(|effect| match effect {
                BuffEffect::Modify {
                    component: c,
                    delta,
                } if c == component => Some(i64::from(delta)),
                BuffEffect::Modify { .. } | BuffEffect::Immune => None,
            })
            .fold(base, i64::saturating_add);
        Some(u32::try_from(shifted.max(0)).unwrap_or(u32::MAX))
    }

    fn buffs(&self, warrior: WarriorRef) -> Vec<ReactorId> {
        self.warrior(warrior)
            .map(|w| w.buffs.clone())
            .unwrap_or_default()
    }

    fn label(&self, reactor: ReactorId) -> Option<&str> {
        self.reactor(reactor).map(|r| r.label.as_str())
    }

    fn lifecycle(&self, reactor: ReactorId) -> Option<Lifecycle> {
        self.reactor(reactor)?.lifecycle
    }
}
