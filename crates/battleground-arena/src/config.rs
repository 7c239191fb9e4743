//! Battle files: the roster, skill catalog, and run limits.
//!
//! A battle file is YAML that mirrors a battle request: a seed, a catalog
//! of skills and characters, the characters fielded on each side keyed by
//! position, skills carried by the ground, and a round cap.
//!
//! ```yaml
//! seed: 7
//! max_rounds: 20
//! skills:
//!   - id: 1
//!     name: Normal Attack
//!     verb: { kind: attack }
//! characters:
//!   - { id: 1, name: Oda, damage: 10, defense: 5, critical_odds: 10,
//!       critical_loss: 200, health: 200, speed: 10, skills: [1] }
//! left: { 0: 1 }
//! right: { 0: 1 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use battleground_types::{Component, Side};
use serde::Deserialize;

/// Errors that can occur when loading or validating a battle file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the battle file from disk.
    #[error("failed to read battle file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse battle YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A roster slot names a character missing from the catalog.
    #[error("unknown character id {0}")]
    UnknownCharacter(u32),

    /// A character or the ground names a skill missing from the catalog.
    #[error("unknown skill id {0}")]
    UnknownSkill(u32),

    /// One side fields no combatant.
    #[error("{0} side has no combatants")]
    EmptySide(Side),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A complete battle request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BattleConfig {
    /// Seed for every random roll in the battle.
    #[serde(default)]
    pub seed: u64,

    /// Rounds after which the battle stops undecided.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Skill catalog.
    #[serde(default)]
    pub skills: Vec<SkillSpec>,

    /// Character catalog.
    #[serde(default)]
    pub characters: Vec<CharacterSpec>,

    /// Left side: position to character id.
    #[serde(default)]
    pub left: BTreeMap<u32, u32>,

    /// Right side: position to character id.
    #[serde(default)]
    pub right: BTreeMap<u32, u32>,

    /// Skill ids carried by the battlefield itself.
    #[serde(default)]
    pub ground: Vec<u32>,
}

impl BattleConfig {
    /// Load a battle file from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a battle file from a YAML string and validate references.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that both sides are populated and every referenced character
    /// and skill exists in the catalogs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in Side::ALL {
            let roster = self.roster(side);
            if roster.is_empty() {
                return Err(ConfigError::EmptySide(side));
            }
            for &character in roster.values() {
                let spec = self.character(character)?;
                for &skill in &spec.skills {
                    self.skill(skill)?;
                }
            }
        }
        for &skill in &self.ground {
            self.skill(skill)?;
        }
        Ok(())
    }

    /// Positions and character ids fielded on `side`.
    pub const fn roster(&self, side: Side) -> &BTreeMap<u32, u32> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Look up a character in the catalog.
    pub fn character(&self, id: u32) -> Result<&CharacterSpec, ConfigError> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or(ConfigError::UnknownCharacter(id))
    }

    /// Look up a skill in the catalog.
    pub fn skill(&self, id: u32) -> Result<&SkillSpec, ConfigError> {
        self.skills
            .iter()
            .find(|s| s.id == id)
            .ok_or(ConfigError::UnknownSkill(id))
    }
}

/// A character template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CharacterSpec {
    /// Catalog id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Baseline damage.
    pub damage: u32,
    /// Baseline defense.
    pub defense: u32,
    /// Baseline critical odds (percent).
    #[serde(default)]
    pub critical_odds: u32,
    /// Baseline critical loss multiplier (percent).
    #[serde(default = "default_critical_loss")]
    pub critical_loss: u32,
    /// Maximum health.
    pub health: u32,
    /// Baseline speed.
    pub speed: u32,
    /// Skill ids, in the order they are tried on a turn.
    #[serde(default)]
    pub skills: Vec<u32>,
}

/// A skill template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkillSpec {
    /// Catalog id.
    pub id: u32,
    /// Display label.
    pub name: String,
    /// Signal the skill reacts to.
    #[serde(default)]
    pub trigger: Trigger,
    /// Whom the skill targets.
    #[serde(default)]
    pub target: Target,
    /// Round ends counted down after firing before the skill is ready
    /// again (0 = always ready).
    #[serde(default)]
    pub cooldown: u32,
    /// What the skill does.
    pub verb: VerbSpec,
}

/// Signal a skill reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The owner's turn. Only the first ready skill fires.
    #[default]
    Launch,
    /// Every round opening.
    RoundStart,
    /// The battle opening.
    BattleStart,
}

/// Target selection rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// First living opponent by position.
    #[default]
    Enemy,
    /// Every living opponent.
    Enemies,
    /// The owner.
    Itself,
    /// Every living ally, owner included.
    Allies,
    /// The living ally with the lowest health ratio.
    WeakestAlly,
}

/// What a skill does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerbSpec {
    /// Deal damage.
    Attack {
        /// Percent of the owner's damage used as raw damage.
        #[serde(default = "default_multiplier")]
        multiplier: u32,
    },
    /// Restore health.
    Heal {
        /// Percent of the target's maximum health restored.
        percent: u32,
    },
    /// Grant a timed buff.
    Buff {
        /// Display label of the granted buff.
        label: String,
        /// Effect while the buff is active.
        effect: BuffEffect,
        /// Rounds the buff lasts.
        duration: u32,
        /// Instances one target may hold at once.
        #[serde(default = "default_capacity")]
        capacity: u32,
    },
}

/// Effect of an active buff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuffEffect {
    /// Shift one stat component by a signed amount.
    Modify {
        /// The component.
        component: Component,
        /// The shift.
        delta: i32,
    },
    /// Ignore incoming attacks.
    Immune,
}

const fn default_max_rounds() -> u32 {
    100
}

const fn default_critical_loss() -> u32 {
    200
}

const fn default_multiplier() -> u32 {
    100
}

const fn default_capacity() -> u32 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DUEL: &str = r"
seed: 3
skills:
  - id: 1
    name: Normal Attack
    verb: { kind: attack }
  - id: 2
    name: Fortify
    target: itself
    cooldown: 3
    verb:
      kind: buff
      label: Fortified
      duration: 2
      effect: { kind: modify, component: defense, delta: 5 }
characters:
  - { id: 1, name: Oda, damage: 10, defense: 5, health: 200, speed: 10, skills: [2, 1] }
  - { id: 2, name: Ueno, damage: 9, defense: 4, critical_odds: 20, health: 180, speed: 9, skills: [1] }
left: { 0: 1 }
right: { 0: 2 }
";

    #[test]
    fn parses_with_defaults() {
        let config = BattleConfig::parse(DUEL).unwrap();
        assert_eq!(config.max_rounds, 100);
        assert_eq!(config.seed, 3);
        assert_eq!(config.character(1).unwrap().critical_loss, 200);
        let fortify = config.skill(2).unwrap();
        assert_eq!(fortify.target, Target::Itself);
        assert_eq!(
            fortify.verb,
            VerbSpec::Buff {
                label: "Fortified".to_owned(),
                effect: BuffEffect::Modify {
                    component: Component::Defense,
                    delta: 5,
                },
                duration: 2,
                capacity: 1,
            }
        );
        assert_eq!(config.skill(1).unwrap().trigger, Trigger::Launch);
    }

    #[test]
    fn rejects_empty_side() {
        let yaml = DUEL.replace("right: { 0: 2 }", "right: {}");
        assert!(matches!(
            BattleConfig::parse(&yaml),
            Err(ConfigError::EmptySide(Side::Right))
        ));
    }

    #[test]
    fn rejects_unknown_character() {
        let yaml = DUEL.replace("right: { 0: 2 }", "right: { 0: 9 }");
        assert!(matches!(
            BattleConfig::parse(&yaml),
            Err(ConfigError::UnknownCharacter(9))
        ));
    }

    #[test]
    fn rejects_unknown_ground_skill() {
        let yaml = format!("{DUEL}ground: [42]\n");
        assert!(matches!(
            BattleConfig::parse(&yaml),
            Err(ConfigError::UnknownSkill(42))
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            BattleConfig::parse("seed: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.yaml");
        std::fs::write(&path, DUEL).unwrap();
        let config = BattleConfig::from_file(&path).unwrap();
        assert_eq!(config.left.len(), 1);
        assert!(matches!(
            BattleConfig::from_file(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
