//! Static stat catalogue consulted when enemies and towers are created.
//!
//! The catalogue maps enemy and tower type tokens to immutable stat blocks.
//! Lookups never fail: an unknown token falls back to the default block and
//! logs a warning.

use std::{collections::BTreeMap, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::{CombatStats, EnemyKind, TowerKind};

/// Errors raised while reading catalogue text.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The text is not valid TOML or does not match the catalogue layout.
    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] toml::de::Error),
    /// An enemy table used a key that names no enemy kind.
    #[error("unknown enemy type `{0}`")]
    UnknownEnemy(String),
    /// A tower table used a key that names no tower kind.
    #[error("unknown tower type `{0}`")]
    UnknownTower(String),
}

/// Converts a configured number of seconds into a [`Duration`].
///
/// The result is rounded to whole microseconds so that decimal settings such
/// as `0.2` convert exactly. Negative and non-finite values collapse to zero.
#[must_use]
pub fn seconds(value: f32) -> Duration {
    if !value.is_finite() || value <= 0.0 {
        return Duration::ZERO;
    }
    let micros = (f64::from(value) * 1_000_000.0).round();
    if micros >= u64::MAX as f64 {
        return Duration::MAX;
    }
    Duration::from_micros(micros as u64)
}

/// Stat block describing one enemy type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    /// Starting health.
    pub health: u32,
    /// Attack used against the player base.
    pub attack: u32,
    /// Armour compared against tower armour.
    pub armor: u32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Gold awarded when the enemy is slain.
    pub gold: u32,
    /// Half-width of the square the player can click to strike the enemy.
    pub click_radius: f32,
    /// Optional special ability.
    pub ability: Option<AbilityConfig>,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            health: 30,
            attack: 10,
            armor: 0,
            speed: 2.0,
            gold: 250,
            click_radius: 0.5,
            ability: None,
        }
    }
}

impl EnemyStats {
    fn new(health: u32, attack: u32, armor: u32, speed: f32, gold: u32) -> Self {
        Self {
            health,
            attack,
            armor,
            speed,
            gold,
            ..Self::default()
        }
    }

    fn with_ability(mut self, ability: AbilityConfig) -> Self {
        self.ability = Some(ability);
        self
    }

    /// Combat block an enemy of this type starts with.
    #[must_use]
    pub fn combat(&self) -> CombatStats {
        CombatStats::new(self.health, self.attack, self.armor)
    }
}

/// Stat block describing one tower type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerStats {
    /// Structural health.
    pub health: u32,
    /// Attack applied to enemies.
    pub attack: u32,
    /// Armour compared against enemy armour.
    pub armor: u32,
    /// Attack range in world units.
    pub range: f32,
    /// Seconds between shots.
    pub cooldown: f32,
    /// Purchase price in gold.
    pub cost: u32,
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            health: 1,
            attack: 0,
            armor: 0,
            range: 5.0,
            cooldown: 1.0,
            cost: 100,
        }
    }
}

impl TowerStats {
    fn new(attack: u32, armor: u32, range: f32, cooldown: f32, cost: u32) -> Self {
        Self {
            health: 50,
            attack,
            armor,
            range,
            cooldown,
            cost,
        }
    }

    /// Attacker profile used when the tower hits an enemy.
    #[must_use]
    pub fn attack_profile(&self) -> CombatStats {
        CombatStats::new(self.health, self.attack, self.armor)
    }

    /// Time between consecutive shots.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        seconds(self.cooldown)
    }
}

/// Parameters of an enemy's special ability.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityConfig {
    /// Periodic invulnerable stealth.
    Cloak(CloakConfig),
    /// Offspring released on death.
    Nursing(NursingConfig),
    /// Periodic minion spawning while alive.
    Alpha(AlphaConfig),
    /// Periodic speed bursts.
    Pounce(PounceConfig),
}

/// Cloak timings in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CloakConfig {
    /// Shortest stealth phase.
    pub min_cloak_time: f32,
    /// Longest stealth phase.
    pub max_cloak_time: f32,
    /// Shortest visible phase.
    pub min_idle_time: f32,
    /// Longest visible phase.
    pub max_idle_time: f32,
    /// Standstill before and after each stealth phase.
    pub pause_time: f32,
}

impl Default for CloakConfig {
    fn default() -> Self {
        Self {
            min_cloak_time: 3.0,
            max_cloak_time: 5.0,
            min_idle_time: 4.0,
            max_idle_time: 7.0,
            pause_time: 1.0,
        }
    }
}

/// Offspring released when a nursing enemy dies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NursingConfig {
    /// Fewest offspring released.
    pub min_spawn_count: u32,
    /// Most offspring released.
    pub max_spawn_count: u32,
    /// Type of the offspring.
    pub offspring: EnemyKind,
    /// Radius of the ring the offspring are arranged on.
    pub radius: f32,
}

impl Default for NursingConfig {
    fn default() -> Self {
        Self {
            min_spawn_count: 2,
            max_spawn_count: 4,
            offspring: EnemyKind::Scavenger,
            radius: 0.8,
        }
    }
}

/// Minion spawning cadence of a brood commander.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    /// Shortest wait between spawns.
    pub min_alpha_time: f32,
    /// Longest wait between spawns.
    pub max_alpha_time: f32,
    /// Standstill preceding each spawn.
    pub pause_time: f32,
    /// Fewest minions per spawn.
    pub min_spawn_count: u32,
    /// Most minions per spawn.
    pub max_spawn_count: u32,
    /// Type of the minions.
    pub offspring: EnemyKind,
}

impl Default for AlphaConfig {
    fn default() -> Self {
        Self {
            min_alpha_time: 6.0,
            max_alpha_time: 10.0,
            pause_time: 1.0,
            min_spawn_count: 1,
            max_spawn_count: 3,
            offspring: EnemyKind::Scavenger,
        }
    }
}

/// Pounce timings in seconds and speed multipliers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PounceConfig {
    /// Shortest wait between pounces.
    pub min_cooldown: f32,
    /// Longest wait between pounces.
    pub max_cooldown: f32,
    /// Length of the burst.
    pub duration: f32,
    /// Smallest speed multiplier during the burst.
    pub min_speed_multiplier: f32,
    /// Largest speed multiplier during the burst.
    pub max_speed_multiplier: f32,
    /// Standstill before the burst.
    pub preparation_duration: f32,
}

impl Default for PounceConfig {
    fn default() -> Self {
        Self {
            min_cooldown: 3.0,
            max_cooldown: 7.0,
            duration: 0.5,
            min_speed_multiplier: 2.5,
            max_speed_multiplier: 4.0,
            preparation_duration: 0.5,
        }
    }
}

/// Partial catalogue as written in configuration text.
///
/// Keys are type tokens such as `hunter` or `machine_gun`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueOverrides {
    /// Enemy stat blocks keyed by enemy token.
    pub enemies: BTreeMap<String, EnemyStats>,
    /// Tower stat blocks keyed by tower token.
    pub towers: BTreeMap<String, TowerStats>,
}

/// Immutable mapping from type tokens to stat blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalogue {
    enemies: BTreeMap<EnemyKind, EnemyStats>,
    towers: BTreeMap<TowerKind, TowerStats>,
}

impl Default for Catalogue {
    fn default() -> Self {
        let enemies = BTreeMap::from([
            (EnemyKind::Scavenger, EnemyStats::new(30, 5, 0, 2.0, 10)),
            (
                EnemyKind::Hunter,
                EnemyStats::new(45, 10, 1, 1.8, 20)
                    .with_ability(AbilityConfig::Pounce(PounceConfig::default())),
            ),
            (
                EnemyKind::Stalker,
                EnemyStats::new(40, 10, 1, 1.6, 25)
                    .with_ability(AbilityConfig::Cloak(CloakConfig::default())),
            ),
            (
                EnemyKind::Nursing,
                EnemyStats::new(80, 10, 2, 1.2, 40)
                    .with_ability(AbilityConfig::Nursing(NursingConfig::default())),
            ),
            (
                EnemyKind::BroodCommander,
                EnemyStats::new(150, 20, 3, 1.0, 80)
                    .with_ability(AbilityConfig::Alpha(AlphaConfig::default())),
            ),
        ]);
        let towers = BTreeMap::from([
            (TowerKind::MachineGun, TowerStats::new(5, 0, 4.0, 0.2, 100)),
            (TowerKind::Railgun, TowerStats::new(25, 2, 7.0, 1.5, 250)),
            (TowerKind::Rocket, TowerStats::new(15, 1, 5.0, 1.0, 200)),
        ]);
        Self { enemies, towers }
    }
}

impl Catalogue {
    /// Parses a complete catalogue from TOML text.
    ///
    /// Types absent from the text resolve to the default stat blocks on lookup.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogueError> {
        let overrides: CatalogueOverrides = toml::from_str(text)?;
        Self {
            enemies: BTreeMap::new(),
            towers: BTreeMap::new(),
        }
        .with_overrides(overrides)
    }

    /// Replaces the stat blocks named in `overrides`, keeping every other entry.
    pub fn with_overrides(mut self, overrides: CatalogueOverrides) -> Result<Self, CatalogueError> {
        for (key, stats) in overrides.enemies {
            let kind =
                EnemyKind::from_config_key(&key).ok_or(CatalogueError::UnknownEnemy(key))?;
            let _ = self.enemies.insert(kind, stats);
        }
        for (key, stats) in overrides.towers {
            let kind =
                TowerKind::from_config_key(&key).ok_or(CatalogueError::UnknownTower(key))?;
            let _ = self.towers.insert(kind, stats);
        }
        Ok(self)
    }

    /// Stat block for the provided enemy type.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> EnemyStats {
        match self.enemies.get(&kind) {
            Some(stats) => stats.clone(),
            None => {
                warn!(enemy = kind.config_key(), "no stats configured, using defaults");
                EnemyStats::default()
            }
        }
    }

    /// Stat block for the provided tower type.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> TowerStats {
        match self.towers.get(&kind) {
            Some(stats) => stats.clone(),
            None => {
                warn!(tower = kind.config_key(), "no stats configured, using defaults");
                TowerStats::default()
            }
        }
    }
}
