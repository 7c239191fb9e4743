//! In-memory battlefield used by unit tests.

use std::collections::BTreeMap;

use battleground_types::{Battlefield, Component, Lifecycle, Ratio, ReactorId, WarriorRef};

#[derive(Debug, Default)]
pub struct FakeField {
    roster: Vec<(WarriorRef, Ratio)>,
    buffs: BTreeMap<WarriorRef, Vec<ReactorId>>,
    reactors: BTreeMap<ReactorId, (Option<String>, Option<Lifecycle>)>,
}

impl FakeField {
    pub fn add_warrior(&mut self, warrior: WarriorRef, current: u32, maximum: u32) {
        self.roster.push((warrior, Ratio { current, maximum }));
    }

    pub fn set_health(&mut self, warrior: WarriorRef, current: u32) {
        for (id, health) in &mut self.roster {
            if *id == warrior {
                health.current = current;
            }
        }
    }

    pub fn add_reactor(
        &mut self,
        reactor: ReactorId,
        label: Option<&str>,
        lifecycle: Option<Lifecycle>,
    ) {
        self.reactors
            .insert(reactor, (label.map(str::to_owned), lifecycle));
    }

    pub fn attach_buff(&mut self, warrior: WarriorRef, reactor: ReactorId) {
        self.buffs.entry(warrior).or_default().push(reactor);
    }
}

impl Battlefield for FakeField {
    fn warriors(&self) -> Vec<WarriorRef> {
        self.roster.iter().map(|(warrior, _)| *warrior).collect()
    }

    fn health(&self, warrior: WarriorRef) -> Option<Ratio> {
        self.roster
            .iter()
            .find(|(id, _)| *id == warrior)
            .map(|(_, health)| *health)
    }

    fn component(&self, warrior: WarriorRef, component: Component) -> Option<u32> {
        self.health(warrior)?;
        Some(match component {
            Component::Damage | Component::Speed => 10,
            Component::Defense => 5,
            Component::CriticalOdds => 0,
            Component::CriticalLoss => 200,
        })
    }

    fn buffs(&self, warrior: WarriorRef) -> Vec<ReactorId> {
        self.buffs.get(&warrior).cloned().unwrap_or_default()
    }

    fn label(&self, reactor: ReactorId) -> Option<&str> {
        self.reactors
            .get(&reactor)
            .and_then(|(label, _)| label.as_deref())
    }

    fn lifecycle(&self, reactor: ReactorId) -> Option<Lifecycle> {
        self.reactors.get(&reactor).and_then(|(_, lifecycle)| *lifecycle)
    }
}
