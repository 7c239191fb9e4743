//! Per-combatant stat snapshots.
//!
//! A [`Profile`] captures a living combatant's health, derived stat
//! components, and active buffs at the instant a round opens. Profiles are
//! never updated afterwards; the round's sentences describe what changed.

use battleground_types::{Battlefield, Component, Ratio, WarriorRef};
use serde::Serialize;
use ts_rs::TS;

use crate::error::RecordError;
use crate::view::{ReactorLifecycle, ReactorView};

/// Snapshot of one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Profile {
    /// The combatant.
    pub warrior: WarriorRef,
    /// Health at snapshot time.
    pub health: Ratio,
    /// Derived damage.
    pub damage: u32,
    /// Derived defense.
    pub defense: u32,
    /// Derived critical odds (percent).
    pub critical_odds: u32,
    /// Derived critical loss multiplier (percent).
    pub critical_loss: u32,
    /// Derived speed.
    pub speed: u32,
    /// Active buffs with their lifecycles, oldest first.
    pub reactors: Vec<ReactorLifecycle>,
}

impl Profile {
    /// Snapshot `warrior` through the battlefield's query surface.
    pub fn capture(warrior: WarriorRef, field: &dyn Battlefield) -> Result<Self, RecordError> {
        let health = field
            .health(warrior)
            .ok_or(RecordError::UnknownWarrior(warrior))?;
        let component = |component: Component| {
            field
                .component(warrior, component)
                .ok_or(RecordError::UnknownWarrior(warrior))
        };

        let reactors = field
            .buffs(warrior)
            .into_iter()
            .map(|reactor| {
                let lifecycle = field
                    .lifecycle(reactor)
                    .ok_or(RecordError::MissingLifecycle(reactor))?;
                Ok(ReactorLifecycle {
                    reactor: ReactorView::capture(reactor, field),
                    lifecycle,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        Ok(Self {
            warrior,
            health,
            damage: component(Component::Damage)?,
            defense: component(Component::Defense)?,
            critical_odds: component(Component::CriticalOdds)?,
            critical_loss: component(Component::CriticalLoss)?,
            speed: component(Component::Speed)?,
            reactors,
        })
    }
}

/// Snapshot every living combatant, in roster order.
///
/// Combatants whose health has reached zero are left out.
pub fn capture_profiles(field: &dyn Battlefield) -> Result<Vec<Profile>, RecordError> {
    let mut profiles = Vec::new();
    for warrior in field.warriors() {
        let health = field
            .health(warrior)
            .ok_or(RecordError::UnknownWarrior(warrior))?;
        if health.is_depleted() {
            continue;
        }
        profiles.push(Profile::capture(warrior, field)?);
    }
    Ok(profiles)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use battleground_types::{Lifecycle, ReactorId, Side};

    use super::*;
    use crate::testutil::FakeField;

    #[test]
    fn dead_warriors_are_not_profiled() {
        let mut field = FakeField::default();
        field.add_warrior(WarriorRef::new(Side::Left, 0), 100, 100);
        field.add_warrior(WarriorRef::new(Side::Right, 0), 0, 80);
        field.add_warrior(WarriorRef::new(Side::Right, 1), 40, 80);

        let profiles = capture_profiles(&field).unwrap();
        let warriors: Vec<_> = profiles.iter().map(|p| p.warrior).collect();
        assert_eq!(
            warriors,
            vec![WarriorRef::new(Side::Left, 0), WarriorRef::new(Side::Right, 1)]
        );
    }

    #[test]
    fn profile_carries_components_and_buffs() {
        let warrior = WarriorRef::new(Side::Left, 2);
        let buff = ReactorId::new(11);
        let mut field = FakeField::default();
        field.add_warrior(warrior, 50, 120);
        field.add_reactor(buff, Some("Fortify"), Some(Lifecycle::cooling(2)));
        field.attach_buff(warrior, buff);

        let profile = Profile::capture(warrior, &field);
        assert!(profile.is_ok());
        let json = profile.ok().and_then(|p| serde_json::to_value(p).ok());
        assert_eq!(
            json,
            Some(serde_json::json!({
                "warrior": { "side": "Left", "position": 2 },
                "health": { "current": 50, "maximum": 120 },
                "damage": 10,
                "defense": 5,
                "critical_odds": 0,
                "critical_loss": 200,
                "speed": 10,
                "reactors": [
                    { "reactor": "Fortify", "lifecycle": { "cooling": { "current": 2, "maximum": 2 } } }
                ],
            }))
        );
    }

    #[test]
    fn buff_without_lifecycle_is_a_contract_violation() {
        let warrior = WarriorRef::new(Side::Right, 0);
        let buff = ReactorId::new(3);
        let mut field = FakeField::default();
        field.add_warrior(warrior, 10, 10);
        field.add_reactor(buff, None, None);
        field.attach_buff(warrior, buff);

        assert!(matches!(
            Profile::capture(warrior, &field),
            Err(RecordError::MissingLifecycle(id)) if id == buff
        ));
    }

    #[test]
    fn unknown_warrior_is_rejected() {
        let field = FakeField::default();
        assert!(matches!(
            Profile::capture(WarriorRef::new(Side::Left, 9), &field),
            Err(RecordError::UnknownWarrior(_))
        ));
    }
}
