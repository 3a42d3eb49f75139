//! Static game tables: weapon prototypes, upgrade costs, enemy archetypes,
//! per-map spawn weights and the medkit offer.
//!
//! [`Catalog::standard`] carries the built-in balance. Every table is serde
//! friendly so adapters can substitute a catalog loaded from disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weapon::{
    MeleeSpec, MuzzleSpec, RangedSpec, RangedWeapon, UpgradeTable, Weapon, WeaponSpec,
};
use crate::BULLET_SPEED;

/// Archetype used when a requested archetype is unknown.
pub const DEFAULT_ARCHETYPE: &str = "grunt";

/// Archetype that is spawned as the final boss.
pub const BOSS_ARCHETYPE: &str = "boss";

/// Weapon every player starts with and enemies fall back to.
pub const DEFAULT_WEAPON: &str = "Basic Pistol";

/// Range of the fallback enemy pistol in pixels.
pub const DEFAULT_WEAPON_RANGE: f32 = 800.0;

/// Failures raised when resolving catalog entries by name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No weapon prototype carries the requested name.
    #[error("unknown weapon `{0}`")]
    UnknownWeapon(String),
    /// No archetype carries the requested name.
    #[error("unknown enemy archetype `{0}`")]
    UnknownArchetype(String),
}

/// Stat block shared by all enemies of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Starting and maximum health.
    pub health: u32,
    /// Distance at which the enemy starts shooting.
    pub detect_range: f32,
    /// Cooldown between shots in milliseconds.
    pub fire_cooldown_ms: u32,
    /// Damage dealt by each projectile.
    pub bullet_damage: u32,
    /// Name of the carried weapon, matched case-insensitively.
    pub weapon: String,
    /// Money credited to the player on kill.
    pub reward: u32,
}

impl Default for Archetype {
    fn default() -> Self {
        Self {
            health: 30,
            detect_range: 360.0,
            fire_cooldown_ms: 1200,
            bullet_damage: 12,
            weapon: DEFAULT_WEAPON.to_owned(),
            reward: crate::MONEY_PER_ENEMY,
        }
    }
}

/// Relative spawn probability of one archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeight {
    /// Archetype name.
    pub archetype: String,
    /// Non-negative weight; weights need not sum to one.
    pub weight: f32,
}

/// Ordered spawn weights for a single map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    /// Candidate archetypes in selection order.
    pub entries: Vec<SpawnWeight>,
}

impl SpawnTable {
    /// Builds a table from `(archetype, weight)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, f32)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(archetype, weight)| SpawnWeight {
                    archetype: (*archetype).to_owned(),
                    weight: *weight,
                })
                .collect(),
        }
    }

    /// Sum of every weight in the table.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|entry| entry.weight).sum()
    }

    /// Whether the table can only ever produce the boss.
    #[must_use]
    pub fn is_boss_only(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|entry| entry.archetype.eq_ignore_ascii_case(BOSS_ARCHETYPE))
    }
}

/// Consumable healing item sold in the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedkitSpec {
    /// Price in money.
    pub cost: u32,
    /// Health restored, capped at the player's maximum.
    pub heal: u32,
}

impl Default for MedkitSpec {
    fn default() -> Self {
        Self {
            cost: 120,
            heal: 45,
        }
    }
}

/// Every static table the session consults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Weapon prototypes in shop order.
    pub weapons: Vec<WeaponSpec>,
    /// Upgrade tables keyed by weapon name.
    #[serde(default)]
    pub upgrades: BTreeMap<String, UpgradeTable>,
    /// Enemy archetypes keyed by lowercase name.
    pub archetypes: BTreeMap<String, Archetype>,
    /// Spawn weights indexed by map.
    pub spawn_tables: Vec<SpawnTable>,
    /// Medkit offer.
    #[serde(default)]
    pub medkit: MedkitSpec,
}

impl Catalog {
    /// The built-in balance tables.
    #[must_use]
    pub fn standard() -> Self {
        let weapons = vec![
            WeaponSpec::Ranged(RangedSpec {
                name: DEFAULT_WEAPON.to_owned(),
                cost: 0,
                cooldown_ms: 250,
                damage: 18,
                speed: 12.0,
                range: 800.0,
                pellets: 1,
                spread: 0.0,
                muzzle: MuzzleSpec {
                    recoil_strength: 6.0,
                    recoil_return_speed: 90.0,
                    flash_ms: 40.0,
                    shake_ms: 60.0,
                    shake_strength: 2.0,
                    muzzle_offset: 12.0,
                },
            }),
            WeaponSpec::Ranged(RangedSpec {
                name: "Shotgun".to_owned(),
                cost: 250,
                cooldown_ms: 700,
                damage: 10,
                speed: 10.0,
                range: 320.0,
                pellets: 5,
                spread: 0.9,
                muzzle: MuzzleSpec {
                    recoil_strength: 14.0,
                    recoil_return_speed: 140.0,
                    flash_ms: 70.0,
                    shake_ms: 140.0,
                    shake_strength: 6.0,
                    muzzle_offset: 18.0,
                },
            }),
            WeaponSpec::Ranged(RangedSpec {
                name: "Sniper Rifle".to_owned(),
                cost: 400,
                cooldown_ms: 900,
                damage: 80,
                speed: 18.0,
                range: 1200.0,
                pellets: 1,
                spread: 0.0,
                muzzle: MuzzleSpec {
                    recoil_strength: 18.0,
                    recoil_return_speed: 200.0,
                    flash_ms: 90.0,
                    shake_ms: 100.0,
                    shake_strength: 4.0,
                    muzzle_offset: 28.0,
                },
            }),
            WeaponSpec::Melee(MeleeSpec {
                name: "Cleaver".to_owned(),
                cost: 150,
                cooldown_ms: 500,
                damage: 40,
                radius: 48.0,
                reflect: false,
            }),
            WeaponSpec::Melee(MeleeSpec {
                name: "Reflector Sword".to_owned(),
                cost: 300,
                cooldown_ms: 800,
                damage: 20,
                radius: 64.0,
                reflect: true,
            }),
        ];

        let mut upgrades = BTreeMap::new();
        let _ = upgrades.insert(
            DEFAULT_WEAPON.to_owned(),
            UpgradeTable {
                max_level: 3,
                costs: vec![0, 120, 220, 340],
                damage_mult: vec![1.0, 1.15, 1.30, 1.50],
                cooldown_mult: vec![1.0, 0.93, 0.90, 0.86],
                range_add: vec![0.0, 40.0, 80.0, 120.0],
            },
        );
        let _ = upgrades.insert(
            "Shotgun".to_owned(),
            UpgradeTable {
                max_level: 3,
                costs: vec![0, 180, 260, 360],
                damage_mult: vec![1.0, 1.10, 1.22, 1.35],
                cooldown_mult: vec![1.0, 0.96, 0.93, 0.90],
                range_add: vec![0.0, 20.0, 40.0, 70.0],
            },
        );
        let _ = upgrades.insert(
            "Sniper Rifle".to_owned(),
            UpgradeTable {
                max_level: 3,
                costs: vec![0, 240, 320, 420],
                damage_mult: vec![1.0, 1.12, 1.25, 1.42],
                cooldown_mult: vec![1.0, 0.97, 0.94, 0.90],
                range_add: vec![0.0, 80.0, 140.0, 220.0],
            },
        );

        let archetype = |health: u32,
                         detect_range: f32,
                         fire_cooldown_ms: u32,
                         bullet_damage: u32,
                         weapon: &str,
                         reward: u32| Archetype {
            health,
            detect_range,
            fire_cooldown_ms,
            bullet_damage,
            weapon: weapon.to_owned(),
            reward,
        };
        let archetypes = BTreeMap::from([
            (
                "grunt".to_owned(),
                archetype(30, 360.0, 1200, 12, "basic pistol", 150),
            ),
            (
                "shotgunner".to_owned(),
                archetype(36, 340.0, 900, 10, "shotgun", 170),
            ),
            (
                "sniper".to_owned(),
                archetype(42, 460.0, 1400, 32, "sniper rifle", 200),
            ),
            (
                BOSS_ARCHETYPE.to_owned(),
                archetype(600, 520.0, 1400, 18, "heavy cannon", 1500),
            ),
        ]);

        let spawn_tables = vec![
            SpawnTable::from_pairs(&[("grunt", 1.0)]),
            SpawnTable::from_pairs(&[("grunt", 0.6), ("shotgunner", 0.4)]),
            SpawnTable::from_pairs(&[("grunt", 0.4), ("shotgunner", 0.35), ("sniper", 0.25)]),
            SpawnTable::from_pairs(&[(BOSS_ARCHETYPE, 1.0)]),
        ];

        Self {
            weapons,
            upgrades,
            archetypes,
            spawn_tables,
            medkit: MedkitSpec::default(),
        }
    }

    /// Looks up a weapon prototype, ignoring ASCII case.
    #[must_use]
    pub fn weapon_spec(&self, name: &str) -> Option<&WeaponSpec> {
        self.weapons
            .iter()
            .find(|spec| spec.name().eq_ignore_ascii_case(name))
    }

    /// Looks up the upgrade table of a weapon, ignoring ASCII case.
    #[must_use]
    pub fn upgrade_table(&self, name: &str) -> Option<&UpgradeTable> {
        self.upgrades
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, table)| table)
    }

    /// Builds a fresh weapon instance at the provided upgrade level.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownWeapon`] when no prototype matches.
    pub fn instantiate(&self, name: &str, level: u32) -> Result<Weapon, CatalogError> {
        let spec = self
            .weapon_spec(name)
            .ok_or_else(|| CatalogError::UnknownWeapon(name.to_owned()))?;
        let mut weapon = Weapon::from_spec(spec);
        weapon.apply_upgrade(level, self.upgrade_table(spec.name()));
        Ok(weapon)
    }

    /// Looks up an archetype by name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownArchetype`] when no archetype matches.
    pub fn archetype(&self, name: &str) -> Result<&Archetype, CatalogError> {
        self.archetypes
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| CatalogError::UnknownArchetype(name.to_owned()))
    }

    /// Resolves an archetype, substituting the grunt for unknown names.
    #[must_use]
    pub fn archetype_or_default(&self, name: &str) -> Archetype {
        self.archetype(name)
            .or_else(|_| self.archetype(DEFAULT_ARCHETYPE))
            .cloned()
            .unwrap_or_default()
    }

    /// Builds the gun an archetype carries.
    ///
    /// The archetype's cooldown and damage always replace the prototype's.
    /// Unknown or melee weapon names fall back to a basic pistol.
    #[must_use]
    pub fn weapon_or_default(&self, archetype: &Archetype) -> RangedWeapon {
        let weapon = match self.weapon_spec(&archetype.weapon) {
            Some(WeaponSpec::Ranged(spec)) => RangedWeapon::from_spec(spec),
            _ => Self::fallback_pistol(archetype),
        };
        weapon.with_base_stats(archetype.fire_cooldown_ms, archetype.bullet_damage)
    }

    /// Spawn table for a map, reusing the last table past the end.
    #[must_use]
    pub fn spawn_table(&self, map_index: usize) -> Option<&SpawnTable> {
        let last = self.spawn_tables.len().checked_sub(1)?;
        self.spawn_tables.get(map_index.min(last))
    }

    fn fallback_pistol(archetype: &Archetype) -> RangedWeapon {
        RangedWeapon::from_spec(&RangedSpec {
            name: DEFAULT_WEAPON.to_owned(),
            cost: 0,
            cooldown_ms: archetype.fire_cooldown_ms,
            damage: archetype.bullet_damage,
            speed: BULLET_SPEED,
            range: DEFAULT_WEAPON_RANGE,
            pellets: 1,
            spread: 0.0,
            muzzle: MuzzleSpec::default(),
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
