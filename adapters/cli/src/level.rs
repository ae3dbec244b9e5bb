//! Level definitions read from TOML, plus the built-in level.

use serde::Deserialize;
use thiserror::Error;
use wave_defence_core::{
    Catalogue, CatalogueError, CatalogueOverrides, EnemyKind, GridCell, Position,
    TargetingStrategy, TowerKind, Vec2,
};
use wave_defence_system_waves::Wave;

/// Reasons a level definition is rejected.
#[derive(Debug, Error)]
pub(crate) enum LevelError {
    /// The text is not valid TOML or does not match the level layout.
    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),
    /// Enemies need at least one waypoint to walk towards.
    #[error("level declares no waypoints")]
    NoWaypoints,
    /// A wave would never release more than its first enemy.
    #[error("wave {index} has non-positive spawn rate {rate}")]
    InvalidSpawnRate {
        /// Index of the offending wave.
        index: u32,
        /// Rate found in the file.
        rate: f32,
    },
    /// A wave lists an enemy token the catalogue does not know.
    #[error("wave {index} lists unknown enemy `{token}`")]
    UnknownEnemy {
        /// Index of the offending wave.
        index: u32,
        /// Token found in the file.
        token: String,
    },
    /// The catalogue override table is invalid.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

/// Tower placed automatically before the first wave.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) cell: GridCell,
    #[serde(default)]
    pub(crate) strategy: TargetingStrategy,
}

/// Validated level ready to drive a simulation.
#[derive(Clone, Debug)]
pub(crate) struct Level {
    pub(crate) waypoints: Vec<Position>,
    pub(crate) spawn_point: Position,
    pub(crate) base_health: u32,
    pub(crate) starting_gold: u32,
    pub(crate) seed: u64,
    pub(crate) waves: Vec<Wave>,
    pub(crate) towers: Vec<TowerPlacement>,
    pub(crate) catalogue: Catalogue,
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    waypoints: Vec<Position>,
    spawn_point: Position,
    #[serde(default = "default_base_health")]
    base_health: u32,
    #[serde(default = "default_starting_gold")]
    starting_gold: u32,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    waves: Vec<WaveFile>,
    #[serde(default)]
    towers: Vec<TowerPlacement>,
    #[serde(default)]
    catalogue: CatalogueOverrides,
}

#[derive(Debug, Deserialize)]
struct WaveFile {
    index: u32,
    #[serde(default)]
    boss: bool,
    spawn_rate: f32,
    enemies: Vec<String>,
}

fn default_base_health() -> u32 {
    100
}

fn default_starting_gold() -> u32 {
    500
}

impl Level {
    /// Parses and validates a TOML level definition.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        let file: LevelFile = toml::from_str(contents)?;
        if file.waypoints.is_empty() {
            return Err(LevelError::NoWaypoints);
        }

        let waves = file
            .waves
            .into_iter()
            .map(WaveFile::into_wave)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            waypoints: file.waypoints,
            spawn_point: file.spawn_point,
            base_health: file.base_health,
            starting_gold: file.starting_gold,
            seed: file.seed,
            waves,
            towers: file.towers,
            catalogue: Catalogue::default().with_overrides(file.catalogue)?,
        })
    }
}

impl WaveFile {
    fn into_wave(self) -> Result<Wave, LevelError> {
        let index = self.index;
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.0) {
            return Err(LevelError::InvalidSpawnRate {
                index,
                rate: self.spawn_rate,
            });
        }
        let enemies = self
            .enemies
            .into_iter()
            .map(|token| {
                EnemyKind::from_config_key(&token)
                    .ok_or(LevelError::UnknownEnemy { index, token })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Wave::new(index, self.boss, self.spawn_rate, enemies))
    }
}

impl Default for Level {
    /// Ten-waypoint winding path with three escalating waves.
    fn default() -> Self {
        use EnemyKind::{Hunter as H, Nursing, Scavenger as S};

        let waypoints = [
            (0.0, 5.0),
            (2.0, 5.0),
            (2.0, 2.0),
            (7.0, 2.0),
            (7.0, 5.0),
            (10.0, 5.0),
            (10.0, 7.0),
            (14.0, 7.0),
            (14.0, 2.0),
            (20.0, 2.0),
        ]
        .into_iter()
        .map(|(x, y)| Vec2::new(x, y))
        .collect();

        let tower = |kind, column, row| TowerPlacement {
            kind,
            cell: GridCell::new(column, row),
            strategy: TargetingStrategy::Closest,
        };

        Self {
            waypoints,
            spawn_point: Vec2::new(-5.0, 5.0),
            base_health: default_base_health(),
            starting_gold: 750,
            seed: 0,
            waves: vec![
                Wave::new(0, false, 1.0, vec![Nursing]),
                Wave::new(1, false, 1.0, vec![S, S, S, S, H]),
                Wave::new(2, true, 0.75, vec![S, H, S, H, H, S, H, S, H, S]),
            ],
            towers: vec![
                tower(TowerKind::MachineGun, 4, 3),
                tower(TowerKind::Rocket, 9, 4),
                tower(TowerKind::Railgun, 12, 5),
                tower(TowerKind::MachineGun, 17, 3),
            ],
            catalogue: Catalogue::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        waypoints = [[0.0, 0.0], [6.0, 0.0]]
        spawn_point = [-1.0, 0.0]
        base_health = 20
        seed = 9

        [[waves]]
        index = 0
        spawn_rate = 2.0
        enemies = ["scavenger", "brood_commander"]

        [[towers]]
        kind = "railgun"
        cell = { column = 3, row = 1 }
        strategy = "strongest"

        [catalogue.enemies.scavenger]
        health = 12
    "#;

    #[test]
    fn parses_a_complete_level() {
        let level = Level::from_toml_str(LEVEL).expect("level parses");

        assert_eq!(level.waypoints, vec![Vec2::ZERO, Vec2::new(6.0, 0.0)]);
        assert_eq!(level.base_health, 20);
        assert_eq!(level.starting_gold, 500);
        assert_eq!(level.seed, 9);
        assert_eq!(
            level.waves,
            vec![Wave::new(
                0,
                false,
                2.0,
                vec![EnemyKind::Scavenger, EnemyKind::BroodCommander]
            )]
        );
        assert_eq!(
            level.towers,
            vec![TowerPlacement {
                kind: TowerKind::Railgun,
                cell: GridCell::new(3, 1),
                strategy: TargetingStrategy::Strongest,
            }]
        );
        assert_eq!(level.catalogue.enemy(EnemyKind::Scavenger).health, 12);
    }

    #[test]
    fn unknown_enemy_tokens_are_rejected() {
        let contents = LEVEL.replace("brood_commander", "dragon");
        match Level::from_toml_str(&contents) {
            Err(LevelError::UnknownEnemy { index: 0, token }) => assert_eq!(token, "dragon"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn stalled_waves_are_rejected() {
        let contents = LEVEL.replace("spawn_rate = 2.0", "spawn_rate = 0.0");
        assert!(matches!(
            Level::from_toml_str(&contents),
            Err(LevelError::InvalidSpawnRate { index: 0, .. })
        ));
    }

    #[test]
    fn empty_paths_are_rejected() {
        let contents = LEVEL.replace("[[0.0, 0.0], [6.0, 0.0]]", "[]");
        assert!(matches!(
            Level::from_toml_str(&contents),
            Err(LevelError::NoWaypoints)
        ));
    }

    #[test]
    fn bundled_level_matches_the_builtin_one() {
        let bundled = Level::from_toml_str(include_str!("../../../levels/outpost.toml"))
            .expect("bundled level parses");
        let builtin = Level::default();

        assert_eq!(bundled.waypoints, builtin.waypoints);
        assert_eq!(bundled.spawn_point, builtin.spawn_point);
        assert_eq!(bundled.starting_gold, builtin.starting_gold);
        assert_eq!(bundled.waves, builtin.waves);
        assert_eq!(bundled.towers, builtin.towers);
    }

    #[test]
    fn builtin_level_fits_the_tower_budget() {
        let level = Level::default();
        let catalogue = Catalogue::default();
        let spent: u32 = level
            .towers
            .iter()
            .map(|placement| catalogue.tower(placement.kind).cost)
            .sum();

        assert_eq!(level.waypoints.len(), 10);
        assert_eq!(level.waves.len(), 3);
        assert!(spent <= level.starting_gold);
    }
}
