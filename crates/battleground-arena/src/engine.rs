//! The battle loop and signal dispatch.
//!
//! [`Arena::run`] drives one battle: `BattleStart`, then for every round a
//! `RoundStart`, one `Launch` per living combatant in turn order, and a
//! `RoundEnd`. The battle stops once a round closes with only one side
//! standing, or when the round cap is reached.
//!
//! Every signal is delivered to all (listener, slot) pairs in descending
//! priority. The engine reacts to signals from its own slot at
//! [`ENGINE_PRIORITY`]; whatever it emits while reacting is dispatched in
//! full before the outer dispatch moves on to lower slots.

use std::cmp::Reverse;
use std::rc::Rc;

use battleground_types::{
    Action, ActionId, Affairs, Attack, Battlefield, Buff, Component, Heal, Lifecycle,
    LifecycleChange, Listener, Priority, Purge, ReactorId, Script, Scripter, Side, Signal,
    SignalId, SignalKind, Source, Verb, WarriorRef,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::{BattleConfig, Trigger};
use crate::error::ArenaError;
use crate::field::{Effect, Field};

/// Priority of the engine's own reactions. Listeners sharing it hear a
/// signal after the engine has reacted to it.
pub const ENGINE_PRIORITY: Priority = 0;

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Rounds played.
    pub rounds: u32,
    /// The only side still standing, if exactly one is.
    pub survivor: Option<Side>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Engine,
    Listener { index: usize, slot: usize },
}

struct Bus<'a, 'b> {
    schedule: Rc<[Slot]>,
    listeners: &'a mut [&'b mut dyn Listener],
}

/// A seeded battle over one [`Field`].
#[derive(Debug)]
pub struct Arena {
    field: Field,
    rng: StdRng,
    seed: u64,
    max_rounds: u32,
    signals: u64,
    actions: u64,
}

impl Arena {
    /// Set up a battle from a request.
    pub fn new(config: &BattleConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            field: Field::build(config)?,
            rng: StdRng::seed_from_u64(config.seed),
            seed: config.seed,
            max_rounds: config.max_rounds,
            signals: 0,
            actions: 0,
        })
    }

    /// The live battlefield.
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Fight the battle to its end, dispatching every signal to `listeners`.
    ///
    /// A listener error aborts the run immediately.
    pub fn run(&mut self, listeners: &mut [&mut dyn Listener]) -> Result<Outcome, ArenaError> {
        let mut bus = Bus {
            schedule: schedule(listeners),
            listeners,
        };
        info!(
            seed = self.seed,
            combatants = self.field.warriors().len(),
            max_rounds = self.max_rounds,
            "Battle started"
        );

        let start = self.emit(SignalKind::BattleStart, None);
        self.dispatch(&start, &mut bus)?;

        let mut rounds: u32 = 0;
        while rounds < self.max_rounds && self.field.contested() {
            rounds = rounds.saturating_add(1);
            debug!(round = rounds, "Round started");

            let open = self.emit(SignalKind::RoundStart, None);
            self.dispatch(&open, &mut bus)?;

            for warrior in self.field.turn_order() {
                if !self.field.contested() {
                    break;
                }
                if !self.field.is_alive(warrior) {
                    continue;
                }
                let launch = self.emit(SignalKind::Launch(warrior), None);
                self.dispatch(&launch, &mut bus)?;
            }

            let close = self.emit(SignalKind::RoundEnd, None);
            self.dispatch(&close, &mut bus)?;
        }

        let outcome = Outcome {
            rounds,
            survivor: self.field.survivor(),
        };
        info!(rounds, survivor = ?outcome.survivor, "Battle finished");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    fn dispatch(&mut self, signal: &Signal, bus: &mut Bus<'_, '_>) -> Result<(), ArenaError> {
        trace!(id = %signal.id, signal = signal.name(), "Dispatching");
        let schedule = Rc::clone(&bus.schedule);
        for &slot in &*schedule {
            match slot {
                Slot::Engine => self.react(signal, bus)?,
                Slot::Listener { index, slot } => {
                    let Some(listener) = bus.listeners.get_mut(index) else {
                        continue;
                    };
                    if listener.active() {
                        listener.react(slot, signal, &self.field).map_err(|source| {
                            ArenaError::Listener {
                                signal: signal.name(),
                                source,
                            }
                        })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn react(&mut self, signal: &Signal, bus: &mut Bus<'_, '_>) -> Result<(), ArenaError> {
        match &signal.kind {
            SignalKind::BattleStart => self.fire(Trigger::BattleStart, signal, bus),
            SignalKind::RoundStart => {
                self.expire_buffs(signal, bus)?;
                self.fire(Trigger::RoundStart, signal, bus)
            }
            SignalKind::Launch(warrior) => self.launch(*warrior, signal, bus),
            SignalKind::RoundEnd => self.cool_down(signal, bus),
            SignalKind::Lifecycle(_) | SignalKind::PreAction(_) | SignalKind::PostAction(_) => {
                Ok(())
            }
        }
    }

    fn emit(&mut self, kind: SignalKind, parent: Option<&Signal>) -> Signal {
        self.signals = self.signals.saturating_add(1);
        let signal = Signal::new(SignalId::new(self.signals), kind);
        match parent {
            Some(parent) => signal.caused_by(parent.clone()),
            None => signal,
        }
    }

    fn announce(
        &mut self,
        source: Source,
        lifecycle: Option<Lifecycle>,
        affairs: Affairs,
        parent: &Signal,
        bus: &mut Bus<'_, '_>,
    ) -> Result<(), ArenaError> {
        let change = LifecycleChange {
            source,
            lifecycle,
            affairs,
        };
        let signal = self.emit(SignalKind::Lifecycle(change), Some(parent));
        self.dispatch(&signal, bus)
    }

    // -----------------------------------------------------------------------
    // Reactions
    // -----------------------------------------------------------------------

    fn fire(
        &mut self,
        trigger: Trigger,
        signal: &Signal,
        bus: &mut Bus<'_, '_>,
    ) -> Result<(), ArenaError> {
        for skill in self.field.triggered(trigger) {
            if self.field.is_ready(skill) {
                self.perform(skill, signal, bus)?;
            }
        }
        Ok(())
    }

    fn launch(
        &mut self,
        warrior: WarriorRef,
        signal: &Signal,
        bus: &mut Bus<'_, '_>,
    ) -> Result<(), ArenaError> {
        for skill in self.field.launch_skills(warrior) {
            if self.perform(skill, signal, bus)? {
                break;
            }
        }
        Ok(())
    }

    /// Tick every held buff, then purge the ones that ran out.
    fn expire_buffs(&mut self, signal: &Signal, bus: &mut Bus<'_, '_>) -> Result<(), ArenaError> {
        for (holder, buff) in self.field.held_buffs() {
            let lifecycle = self.field.tick(buff);
            let source = Source {
                scripter: Scripter::Warrior(holder),
                reactor: buff,
            };
            self.announce(source, lifecycle, Affairs::NONE, signal, bus)?;
        }
        for (holder, buff) in self.field.expired_buffs() {
            self.purge(holder, buff, signal, bus)?;
        }
        Ok(())
    }

    fn cool_down(&mut self, signal: &Signal, bus: &mut Bus<'_, '_>) -> Result<(), ArenaError> {
        for (owner, skill) in self.field.cooling_skills() {
            let lifecycle = self.field.tick(skill);
            let source = Source {
                scripter: owner,
                reactor: skill,
            };
            self.announce(source, lifecycle, Affairs::NONE, signal, bus)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn next_action(&mut self) -> ActionId {
        self.actions = self.actions.saturating_add(1);
        ActionId::new(self.actions)
    }

    /// Fire a skill in reaction to `trigger`. Returns whether it acted.
    fn perform(
        &mut self,
        reactor: ReactorId,
        trigger: &Signal,
        bus: &mut Bus<'_, '_>,
    ) -> Result<bool, ArenaError> {
        let Some(skill) = self.field.skill(reactor) else {
            return Ok(false);
        };
        if skill
            .owner
            .warrior()
            .is_some_and(|owner| !self.field.is_alive(owner))
        {
            return Ok(false);
        }
        let mut selected = self.field.select(skill.owner, skill.target);
        if matches!(skill.effect, Effect::Heal { .. }) {
            selected.retain(|&w| {
                self.field
                    .health(w)
                    .is_some_and(|h| h.current < h.maximum)
            });
        }
        if selected.is_empty() {
            return Ok(false);
        }

        let id = self.next_action();
        let pre = self.emit(SignalKind::PreAction(id), Some(trigger));
        self.dispatch(&pre, bus)?;

        let (targets, false_targets): (Vec<_>, Vec<_>) = selected
            .into_iter()
            .partition(|&w| self.field.is_alive(w));
        let (immune_targets, targets): (Vec<_>, Vec<_>) = match skill.effect {
            Effect::Attack { .. } => targets
                .into_iter()
                .partition(|&w| self.field.is_immune(w)),
            Effect::Heal { .. } | Effect::Buff { .. } => (Vec::new(), targets),
        };

        let verb = match skill.effect {
            Effect::Attack { multiplier } => {
                Verb::Attack(self.attack(skill.owner, multiplier, &targets))
            }
            Effect::Heal { percent } => Verb::Heal(self.heal(percent, &targets)),
            Effect::Buff {
                template,
                duration,
                capacity,
            } => Verb::Buff(self.buff(template, duration, capacity, &targets)),
        };
        let overflows = match &verb {
            Verb::Buff(buff) => buff.overflows.clone(),
            Verb::Attack(_) | Verb::Heal(_) | Verb::Purge(_) => Vec::new(),
        };

        let source = Source {
            scripter: skill.owner,
            reactor,
        };
        trace!(
            action = %id,
            skill = self.field.label(reactor).unwrap_or_default(),
            targets = targets.len(),
            "Action resolved"
        );
        let action = Action {
            id,
            script: Script {
                signal: Box::new(trigger.clone()),
                source,
            },
            targets,
            false_targets,
            immune_targets,
            verb,
        };
        let post = self.emit(SignalKind::PostAction(Box::new(action)), Some(trigger));
        self.dispatch(&post, bus)?;

        if skill.cooldown > 0 {
            let lifecycle = self.field.rewind(reactor);
            self.announce(source, lifecycle, Affairs::TRIGGER, &post, bus)?;
        }
        for (holder, buff) in overflows {
            let lifecycle = self.field.lifecycle(buff);
            let source = Source {
                scripter: Scripter::Warrior(holder),
                reactor: buff,
            };
            self.announce(source, lifecycle, Affairs::OVERFLOW, &post, bus)?;
        }
        Ok(true)
    }

    /// Damage each target by `max(damage * multiplier / 100 - defense, 1)`,
    /// scaled by the critical multiplier on a critical roll. Ground attacks
    /// deal `multiplier` raw damage and never roll a critical.
    fn attack(&mut self, owner: Scripter, multiplier: u32, targets: &[WarriorRef]) -> Attack {
        let stat = |component| {
            owner
                .warrior()
                .and_then(|w| self.field.component(w, component))
        };
        let raw = match stat(Component::Damage) {
            Some(damage) => percent_of(u64::from(damage), multiplier),
            None => u64::from(multiplier),
        };
        let odds = stat(Component::CriticalOdds).unwrap_or_default();
        let critical_loss = stat(Component::CriticalLoss).unwrap_or(100);
        let critical = odds > 0 && self.rng.random_range(0..100_u32) < odds;

        let mut losses = Vec::with_capacity(targets.len());
        for &target in targets {
            let defense = self
                .field
                .component(target, Component::Defense)
                .unwrap_or_default();
            let mut loss = raw.saturating_sub(u64::from(defense)).max(1);
            if critical {
                loss = percent_of(loss, critical_loss);
            }
            let loss = u32::try_from(loss).unwrap_or(u32::MAX);
            let removed = self
                .field
                .health_mut(target)
                .map_or(0, |health| health.lower(loss));
            if let Some(fallen) = self
                .field
                .warrior(target)
                .filter(|w| removed > 0 && !w.is_alive())
            {
                debug!(warrior = %target, name = %fallen.name, "Warrior fell");
            }
            losses.push((target, removed));
        }
        Attack { critical, losses }
    }

    /// Restore `percent` of each target's maximum health, at least one point.
    fn heal(&mut self, percent: u32, targets: &[WarriorRef]) -> Heal {
        let mut rises = Vec::with_capacity(targets.len());
        for &target in targets {
            let rise = self.field.health_mut(target).map_or(0, |health| {
                let amount = percent_of(u64::from(health.maximum), percent).max(1);
                health.raise(u32::try_from(amount).unwrap_or(u32::MAX))
            });
            rises.push((target, rise));
        }
        Heal { rises }
    }

    /// Grant a fresh instance of `template`, or refresh the oldest one when
    /// the target already holds `capacity` of them.
    fn buff(
        &mut self,
        template: ReactorId,
        duration: u32,
        capacity: u32,
        targets: &[WarriorRef],
    ) -> Buff {
        let mut provisions = Vec::new();
        let mut overflows = Vec::new();
        let capacity = usize::try_from(capacity).unwrap_or(usize::MAX);
        for &target in targets {
            let held = self.field.instances_of(target, template);
            if held.len() >= capacity {
                if let Some(&oldest) = held.first() {
                    self.field.rewind(oldest);
                    overflows.push((target, oldest));
                }
            } else if let Some(instance) = self.field.attach(target, template, duration) {
                provisions.push((target, instance));
            }
        }
        Buff {
            reactor: template,
            provisions,
            overflows,
        }
    }

    /// Take an expired buff off its holder.
    fn purge(
        &mut self,
        holder: WarriorRef,
        buff: ReactorId,
        trigger: &Signal,
        bus: &mut Bus<'_, '_>,
    ) -> Result<(), ArenaError> {
        let id = self.next_action();
        let pre = self.emit(SignalKind::PreAction(id), Some(trigger));
        self.dispatch(&pre, bus)?;

        let (targets, false_targets, recycles) = if self.field.detach(holder, buff) {
            (vec![holder], Vec::new(), vec![(holder, vec![buff])])
        } else {
            (Vec::new(), vec![holder], Vec::new())
        };
        debug!(%holder, buff = %buff, "Buff expired");
        let action = Action {
            id,
            script: Script {
                signal: Box::new(trigger.clone()),
                source: Source {
                    scripter: Scripter::Ground,
                    reactor: buff,
                },
            },
            targets,
            false_targets,
            immune_targets: Vec::new(),
            verb: Verb::Purge(Purge { recycles }),
        };
        let post = self.emit(SignalKind::PostAction(Box::new(action)), Some(trigger));
        self.dispatch(&post, bus)
    }
}

/// Every (listener, slot) pair plus the engine's own slot, highest priority
/// first. Equal priorities keep the engine first, then registration order.
fn schedule(listeners: &[&mut dyn Listener]) -> Rc<[Slot]> {
    let mut slots = vec![(ENGINE_PRIORITY, Slot::Engine)];
    for (index, listener) in listeners.iter().enumerate() {
        for (slot, &priority) in listener.slots().iter().enumerate() {
            slots.push((priority, Slot::Listener { index, slot }));
        }
    }
    slots.sort_by_key(|&(priority, _)| Reverse(priority));
    slots.into_iter().map(|(_, slot)| slot).collect()
}

fn percent_of(value: u64, percent: u32) -> u64 {
    value.saturating_mul(u64::from(percent)) / 100
}
