#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cross-Domain Survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, read immutable
//! views, and respond exclusively with new command batches.
//!
//! The value types every layer agrees on live here as well: geometry helpers,
//! projectiles, weapons, the static [`Catalog`] and the persisted
//! [`PlayerSnapshot`].

pub mod catalog;
pub mod geometry;
pub mod projectile;
pub mod snapshot;
pub mod weapon;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use catalog::{Archetype, Catalog, CatalogError, MedkitSpec, SpawnTable, SpawnWeight};
pub use geometry::{Aim, Bounds, Rect};
pub use projectile::{Owner, Projectile};
pub use snapshot::{PlayerSnapshot, SnapshotError};
pub use weapon::{MeleeWeapon, RangedWeapon, UpgradeTable, Weapon, WeaponKind, WeaponSpec};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Cross-Domain Survival.";

/// Width of the playfield in pixels.
pub const SCREEN_WIDTH: f32 = 960.0;

/// Height of the playfield in pixels.
pub const SCREEN_HEIGHT: f32 = 640.0;

/// Number of maps in a session; the last one hosts the boss.
pub const MAP_COUNT: usize = 4;

/// Speed of enemy projectiles in pixels per tick.
pub const BULLET_SPEED: f32 = 9.0;

/// Side length of the player's square hitbox.
pub const PLAYER_SIZE: f32 = 36.0;

/// Health the player starts with and can heal up to.
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Player movement in pixels per tick.
pub const PLAYER_SPEED: f32 = 4.0;

/// Top-left corner of the player hitbox at the start of a session.
pub const PLAYER_START: Vec2 = Vec2::new(60.0, 60.0);

/// Player centre after moving on to the next map.
pub const MAP_ENTRY_CENTER: Vec2 = Vec2::new(80.0, 80.0);

/// Health restored when moving on to the next map.
pub const MAP_ENTRY_HEAL: u32 = 15;

/// Side length of a regular enemy hitbox.
pub const ENEMY_SIZE: f32 = 36.0;

/// Side length of the boss hitbox.
pub const BOSS_SIZE: f32 = 96.0;

/// Money credited for an enemy whose archetype names no reward.
pub const MONEY_PER_ENEMY: u32 = 150;

/// Side length of the portal opened on a cleared map.
pub const PORTAL_SIZE: f32 = 52.0;

/// Side length of the exit opened once the boss falls.
pub const EXIT_SIZE: f32 = 80.0;

/// Scale applied to each axis when moving diagonally.
pub const DIAGONAL_FACTOR: f32 = 0.7071;

/// Screen dimensions used by the standard session.
pub const SCREEN_BOUNDS: Bounds = Bounds::new(SCREEN_WIDTH, SCREEN_HEIGHT);

/// Frame length adapters step the simulation with by default.
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Enters the first map. Only valid before the session has started.
    StartSession,
    /// Advances the simulation by one frame using the player's input.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Player input sampled for this frame.
        intent: PlayerIntent,
    },
    /// Requests that the player switch to the weapon in the given slot.
    EquipWeapon {
        /// Zero-based inventory slot.
        index: usize,
    },
    /// Requests that an enemy be placed on the current map.
    SpawnEnemy {
        /// Archetype name; unknown names fall back to the default archetype.
        archetype: String,
        /// Centre of the enemy's hitbox, also its patrol anchor.
        position: Vec2,
        /// Radius of the patrol circle; zero keeps the enemy stationary.
        patrol_radius: f32,
        /// Initial angle on the patrol circle in radians.
        patrol_phase: f32,
    },
    /// Opens the portal leading to the shop on a cleared map.
    OpenPortal {
        /// Area the player must touch.
        region: Rect,
    },
    /// Opens the exit on the cleared final map.
    OpenExit {
        /// Area the player must touch.
        region: Rect,
    },
    /// Buys a weapon from the shop by name.
    BuyWeapon {
        /// Catalog weapon name.
        name: String,
    },
    /// Buys the next upgrade level of an owned weapon.
    UpgradeWeapon {
        /// Owned weapon name.
        name: String,
    },
    /// Buys a medkit and uses it immediately.
    BuyMedkit,
    /// Leaves the shop and enters the next map.
    AdvanceMap,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session moved to another phase.
    SessionPhaseChanged {
        /// Phase that became active.
        phase: SessionPhase,
    },
    /// Announces that the player arrived on a map.
    MapEntered {
        /// Zero-based map index.
        map: usize,
        /// Whether this is the boss map.
        is_final: bool,
    },
    /// Confirms that an enemy was placed on the map.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Resolved archetype name.
        archetype: String,
        /// Centre of the enemy hitbox.
        position: Vec2,
        /// Whether the enemy runs the boss behaviour.
        boss: bool,
    },
    /// Reports projectiles released by a weapon or boss skill.
    ProjectilesFired {
        /// Side the projectiles belong to.
        owner: Owner,
        /// Number of projectiles released.
        count: usize,
    },
    /// Reports enemy projectiles turned around by a melee swing.
    ProjectilesReflected {
        /// Number of projectiles reflected.
        count: usize,
    },
    /// Reports damage dealt to an enemy.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage applied.
        amount: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Reports an enemy killed by the player.
    EnemyDied {
        /// Identifier of the enemy.
        enemy: EnemyId,
        /// Money credited to the player.
        reward: u32,
    },
    /// Reports damage dealt to the player.
    PlayerDamaged {
        /// Damage applied.
        amount: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Reports health restored to the player.
    PlayerHealed {
        /// Health actually restored after capping.
        amount: u32,
    },
    /// Reports that the player's health reached zero.
    PlayerDied,
    /// Announces a boss behaviour transition.
    BossPhaseChanged {
        /// Identifier of the boss.
        enemy: EnemyId,
        /// Phase the boss entered.
        phase: BossPhase,
    },
    /// Announces that every enemy on the map is dead.
    MapCleared {
        /// Zero-based map index.
        map: usize,
        /// Whether this is the boss map.
        is_final: bool,
    },
    /// Confirms that the portal is open.
    PortalOpened {
        /// Area the player must touch.
        region: Rect,
    },
    /// Confirms that the exit is open.
    ExitOpened {
        /// Area the player must touch.
        region: Rect,
    },
    /// Reports that the player touched the portal.
    PortalReached {
        /// Map the portal belonged to.
        map: usize,
    },
    /// Reports that the player touched the exit.
    ExitReached {
        /// Map the exit belonged to.
        map: usize,
    },
    /// Confirms a weapon purchase.
    WeaponPurchased {
        /// Weapon name.
        name: String,
        /// Money paid.
        cost: u32,
    },
    /// Confirms a weapon upgrade.
    WeaponUpgraded {
        /// Weapon name.
        name: String,
        /// Level reached.
        level: u32,
        /// Money paid.
        cost: u32,
    },
    /// Confirms a medkit purchase.
    MedkitPurchased {
        /// Money paid.
        cost: u32,
    },
    /// Reports that a shop request was rejected.
    PurchaseRejected {
        /// Requested item.
        item: ShopItem,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that the player switched weapons.
    WeaponEquipped {
        /// Inventory slot now equipped.
        index: usize,
        /// Name of the equipped weapon.
        name: String,
    },
    /// Reports that a weapon switch was rejected.
    EquipRejected {
        /// Requested inventory slot.
        index: usize,
        /// Specific reason the switch failed.
        reason: EquipError,
    },
}

/// Player input for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    /// Requested movement; each axis is interpreted by its sign only.
    pub movement: Vec2,
    /// World position the player aims at.
    pub aim: Vec2,
    /// Whether the fire button is held.
    pub fire: bool,
    /// Whether the melee button is held.
    pub melee: bool,
}

impl PlayerIntent {
    /// Intent that only aims, with no movement or attack.
    #[must_use]
    pub fn aim_at(aim: Vec2) -> Self {
        Self {
            aim,
            ..Self::default()
        }
    }

    /// Returns the intent with the fire button held.
    #[must_use]
    pub fn firing(mut self) -> Self {
        self.fire = true;
        self
    }

    /// Returns the intent with the melee button held.
    #[must_use]
    pub fn swinging(mut self) -> Self {
        self.melee = true;
        self
    }

    /// Returns the intent moving along the provided direction.
    #[must_use]
    pub fn moving(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }
}

/// Overall flow of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No map has been entered yet.
    Ready,
    /// Combat on a map.
    Playing,
    /// Between maps; shop commands are accepted.
    Shopping,
    /// The final map was completed.
    Victory,
    /// The player died.
    Defeat,
}

impl SessionPhase {
    /// Whether the session can no longer progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Behaviour phases of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    /// Circling the player at the preferred radius.
    Orbit,
    /// Emitting projectile rings while circling slowly.
    Burst,
    /// Standing still before a dash.
    DashLock,
    /// Charging along a locked direction.
    Dash,
    /// Standing still after a dash.
    Recover,
}

/// Items the shop can sell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    /// A catalog weapon.
    Weapon(String),
    /// The next upgrade level of an owned weapon.
    Upgrade(String),
    /// A medkit.
    Medkit,
}

/// Reasons a shop request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseError {
    /// The session is not in the shopping phase.
    InvalidPhase,
    /// No catalog entry carries the requested name.
    UnknownItem,
    /// A weapon with that name is already owned.
    AlreadyOwned,
    /// The weapon to upgrade is not owned.
    NotOwned,
    /// The weapon has no upgrade table.
    NotUpgradable,
    /// The weapon is already at its highest level.
    MaxLevel,
    /// The player cannot afford the price.
    InsufficientFunds,
}

/// Reasons a weapon switch may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipError {
    /// The session is over.
    InvalidPhase,
    /// The inventory has no such slot.
    InvalidSlot,
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

/// Session-wide configuration of the world.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Playfield dimensions.
    pub bounds: Bounds,
    /// Number of maps; the last one is the boss map.
    pub map_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: SCREEN_BOUNDS,
            map_count: MAP_COUNT,
        }
    }
}

/// Read-only view of the player's wallet and inventory.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadoutView {
    /// Money available to spend.
    pub money: u32,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Inventory slot of the equipped weapon.
    pub equipped_index: usize,
    /// Owned weapons in inventory order.
    pub slots: Vec<LoadoutSlot>,
}

impl LoadoutView {
    /// Finds the slot holding the named weapon, ignoring ASCII case.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&LoadoutSlot> {
        self.slots
            .iter()
            .find(|slot| slot.name.eq_ignore_ascii_case(name))
    }
}

/// A single owned weapon in a [`LoadoutView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadoutSlot {
    /// Weapon name.
    pub name: String,
    /// Weapon capability.
    pub kind: WeaponKind,
    /// Upgrade level, always zero for melee weapons.
    pub upgrade_level: u32,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Resolved archetype name.
    pub archetype: String,
    /// Centre of the hitbox.
    pub center: Vec2,
    /// Side length of the hitbox.
    pub size: f32,
    /// Current health.
    pub health: u32,
    /// Starting health.
    pub max_health: u32,
    /// Whether the enemy is still fighting.
    pub alive: bool,
    /// Boss behaviour phase, `None` for regular enemies.
    pub boss_phase: Option<BossPhase>,
}
