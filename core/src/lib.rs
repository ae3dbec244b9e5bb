#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Wave Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

pub mod combat;
pub mod config;
pub mod timers;

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use combat::CombatStats;
pub use config::{
    seconds, AbilityConfig, AlphaConfig, Catalogue, CatalogueError, CatalogueOverrides,
    CloakConfig, EnemyStats, NursingConfig, PounceConfig, TowerStats,
};
pub use timers::{TimerHandle, TimerWheel};

/// Continuous position expressed in world units. One world unit spans one grid cell.
pub type Position = Vec2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy be instantiated.
    SpawnEnemy {
        /// Type token resolved against the stat catalogue.
        kind: EnemyKind,
        /// Initial position of the enemy.
        position: Position,
        /// Index of the first waypoint the enemy chases.
        waypoint_index: usize,
    },
    /// Moves an enemy to a new position computed by the chase driver.
    MoveEnemy {
        /// Identifier of the enemy being moved.
        enemy: EnemyId,
        /// Destination of the move.
        position: Position,
    },
    /// Applies the player's strike to every enemy whose click box covers the position.
    StrikeAt {
        /// World position of the strike.
        position: Position,
    },
    /// Deals damage to the player's base.
    DamageBase {
        /// Amount of health removed from the base.
        amount: u32,
    },
    /// Adds gold to the player's purse.
    AwardGold {
        /// Amount of gold awarded.
        amount: u32,
    },
    /// Enables or disables build mode.
    SetBuildMode {
        /// Whether build mode should be active.
        enabled: bool,
    },
    /// Chooses the tower type used by subsequent placements.
    SelectTowerType {
        /// Tower type to select.
        kind: TowerKind,
    },
    /// Requests placement of a tower on the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that will hold the tower.
        cell: GridCell,
    },
    /// Marks a tower as selected so upgrade and sell actions may target it.
    SelectTower {
        /// Tower that was clicked.
        tower: TowerId,
    },
    /// Clears the current tower selection.
    DeselectTower,
    /// Upgrades a tower by one level in exchange for gold.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Sells a tower, refunding part of its cost and freeing its cell.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Changes the rule a tower uses to pick targets.
    SetTargetingStrategy {
        /// Tower whose strategy changes.
        tower: TowerId,
        /// Strategy to apply.
        strategy: TargetingStrategy,
    },
    /// Records the tower's current target. `None` clears a stale reference.
    AssignTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// New target, if any.
        target: Option<EnemyId>,
    },
    /// Requests that a ready tower attack the provided enemy.
    FireAt {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy that receives the hit.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the live set.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Type of the enemy.
        kind: EnemyKind,
        /// Position the enemy spawned at.
        position: Position,
        /// Waypoint the enemy chases first.
        waypoint_index: usize,
    },
    /// Reports that an enemy arrived at a waypoint and now chases the next one.
    WaypointReached {
        /// Enemy that arrived.
        enemy: EnemyId,
        /// Index of the waypoint the enemy now chases.
        waypoint_index: usize,
    },
    /// Reports that an enemy exhausted its path. Emitted at most once per enemy.
    EnemyReachedBase {
        /// Enemy that reached the base.
        enemy: EnemyId,
        /// Damage the enemy deals to the base.
        damage: u32,
    },
    /// Reports an enemy health mutation.
    EnemyHealthChanged {
        /// Enemy whose health changed.
        enemy: EnemyId,
        /// Health after the mutation.
        health: u32,
    },
    /// Reports that an enemy was slain. Emitted at most once per enemy.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Gold awarded for the kill.
        gold: u32,
    },
    /// Confirms that a dead enemy left the live set.
    EnemyRemoved {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Reports that an ability requested additional enemies.
    OffspringRequested {
        /// Enemy whose ability requested the spawn.
        parent: EnemyId,
        /// Type of the requested offspring.
        kind: EnemyKind,
        /// Number of offspring requested.
        count: u32,
        /// Position the offspring gather around.
        position: Position,
        /// Waypoint the offspring chase first.
        waypoint_index: usize,
        /// Arrangement of the offspring around `position`.
        formation: OffspringFormation,
    },
    /// Reports that an enemy entered or left stealth.
    CloakChanged {
        /// Enemy whose stealth state changed.
        enemy: EnemyId,
        /// Whether the enemy is now cloaked.
        cloaked: bool,
    },
    /// Reports that a tower attacked an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was attacked.
        enemy: EnemyId,
        /// Damage applied. Zero when the hit was absorbed.
        damage: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of the tower.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: GridCell,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell provided in the request.
        cell: GridCell,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a tower was upgraded.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: u32,
    },
    /// Reports that a tower was sold.
    TowerSold {
        /// Tower that was sold.
        tower: TowerId,
        /// Gold refunded to the player.
        refund: u32,
    },
    /// Reports that an upgrade, sell, or selection request was rejected.
    TowerActionRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Reason the request failed.
        reason: TowerActionError,
    },
    /// Reports that a tower's targeting strategy changed.
    TargetingStrategyChanged {
        /// Tower whose strategy changed.
        tower: TowerId,
        /// Strategy now in effect.
        strategy: TargetingStrategy,
    },
    /// Announces that a tower became selected.
    TowerClicked {
        /// Tower that was selected.
        tower: TowerId,
    },
    /// Announces that the tower selection was cleared.
    TowerDeselected,
    /// Reports the player's gold after a change.
    GoldChanged {
        /// Gold held after the change.
        gold: u32,
    },
    /// Reports that build mode was toggled.
    BuildModeChanged {
        /// Whether build mode is active.
        enabled: bool,
    },
    /// Reports the tower type selected for placement.
    TowerTypeSelected {
        /// Tower type now selected.
        kind: TowerKind,
    },
    /// Reports the base health after a change.
    BaseHealthChanged {
        /// Health after the change.
        health: u32,
    },
    /// Reports that the base health reached zero. Emitted once.
    BaseDestroyed,
}

/// Arrangement used when placing offspring around their parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffspringFormation {
    /// Offspring are spread evenly on a circle of the provided radius.
    Ring {
        /// Distance from the parent position, in world units.
        radius: f32,
    },
    /// Offspring appear on top of the parent.
    Stacked,
}

impl OffspringFormation {
    /// Position of the `index`-th of `count` offspring placed around `origin`.
    #[must_use]
    pub fn offset(self, origin: Position, index: u32, count: u32) -> Position {
        match self {
            Self::Stacked => origin,
            Self::Ring { radius } => {
                if count == 0 {
                    return origin;
                }
                let angle = std::f32::consts::TAU * index as f32 / count as f32;
                origin + Vec2::new(angle.cos(), angle.sin()) * radius
            }
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Cells may lie outside the visible map (enemies enter from off-screen), so
/// both coordinates are signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: i32,
    row: i32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// World position anchoring the cell.
    #[must_use]
    pub fn to_position(self) -> Position {
        Vec2::new(self.column as f32, self.row as f32)
    }

    /// Cell that contains the provided world position.
    #[must_use]
    pub fn containing(position: Position) -> Self {
        Self::new(position.x.round() as i32, position.y.round() as i32)
    }
}

/// Enemy type tokens understood by the stat catalogue.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline walker without abilities.
    Scavenger,
    /// Pounces forward in short speed bursts.
    Hunter,
    /// Cycles through invulnerable stealth phases.
    Stalker,
    /// Releases scavengers when slain.
    Nursing,
    /// Periodically stops to spawn minions while alive.
    BroodCommander,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 5] = [
        Self::Scavenger,
        Self::Hunter,
        Self::Stalker,
        Self::Nursing,
        Self::BroodCommander,
    ];

    /// Key used for the kind in configuration files.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Scavenger => "scavenger",
            Self::Hunter => "hunter",
            Self::Stalker => "stalker",
            Self::Nursing => "nursing",
            Self::BroodCommander => "brood_commander",
        }
    }

    /// Resolves a configuration key back into a kind.
    #[must_use]
    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.config_key() == key)
    }
}

/// Types of towers that can be constructed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Fast-firing, low-damage sentry.
    #[default]
    MachineGun,
    /// Slow, long-ranged, armour-piercing sentry.
    Railgun,
    /// Mid-range sentry with heavy hits.
    Rocket,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 3] = [Self::MachineGun, Self::Railgun, Self::Rocket];

    /// Key used for the kind in configuration files.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::MachineGun => "machine_gun",
            Self::Railgun => "railgun",
            Self::Rocket => "rocket",
        }
    }

    /// Resolves a configuration key back into a kind.
    #[must_use]
    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.config_key() == key)
    }

    /// Human readable name used in run reports.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MachineGun => "Machine Gun Sentry",
            Self::Railgun => "Railgun Sentry",
            Self::Rocket => "Rocket Sentry",
        }
    }
}

/// Rule a tower uses to pick which in-range enemy to attack.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetingStrategy {
    /// Minimum distance to the tower.
    #[default]
    Closest,
    /// First enemy in live-set iteration order.
    First,
    /// Highest current health.
    Strongest,
    /// Lowest current health.
    Weakest,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// Build mode is off, so placement is disabled.
    BuildModeDisabled,
    /// The cell already holds a tower or belongs to the enemy path.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientGold,
}

/// Reasons an upgrade, sell, or selection request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerActionError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The player cannot afford the upgrade.
    InsufficientGold,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Type of the enemy.
    pub kind: EnemyKind,
    /// Current position.
    pub position: Position,
    /// Current health. Zero means the enemy awaits removal.
    pub health: u32,
    /// Movement speed after ability modifiers, in world units per second.
    pub speed: f32,
    /// Waypoint currently being chased, if the path is not exhausted.
    pub waypoint: Option<Position>,
    /// Index of the waypoint currently being chased.
    pub waypoint_index: usize,
    /// Whether the enemy currently ignores damage.
    pub cloaked: bool,
}

impl EnemySnapshot {
    /// Reports whether the enemy is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Read-only snapshot describing all enemies in the live set.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Snapshots are ordered by identifier, which matches spawn order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: GridCell,
    /// World position the tower measures distances from.
    pub position: Position,
    /// Attack range in world units.
    pub attack_range: f32,
    /// Time until the tower may fire again. Zero means ready.
    pub ready_in: Duration,
    /// Target remembered from a previous frame. A lookup key only.
    pub current_target: Option<EnemyId>,
    /// Rule used to acquire new targets.
    pub strategy: TargetingStrategy,
    /// Upgrade level, starting at one.
    pub level: u32,
}

/// Read-only snapshot describing all towers placed in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of the provided tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Target resolved for a tower during the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that owns the assignment.
    pub tower: TowerId,
    /// Enemy the tower should track, if any.
    pub enemy: Option<EnemyId>,
    /// Whether the tower's cooldown has elapsed this frame.
    pub ready: bool,
}
