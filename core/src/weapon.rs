//! Ranged and melee weapons.
//!
//! Weapons are plain values: every owner holds its own instance, built from a
//! [`WeaponSpec`] prototype, so upgrades and cosmetic timers are never shared.
//! The only state a weapon carries between ticks is cosmetic and never
//! influences a gameplay outcome.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{distance, unit_from_angle, vec_from_points};
use crate::projectile::{Owner, Projectile};

/// Sideways offset of the weapon hand from the aim line, in pixels.
pub const HAND_LATERAL_OFFSET: f32 = 10.0;

/// Computes where a weapon held by an actor of the given body size sits.
///
/// The mount point lies in front of the centre along `direction` and slightly
/// to the side, so shots leave from the hand rather than the body centre.
#[must_use]
pub fn hand_mount(center: Vec2, direction: Vec2, body_size: f32) -> Vec2 {
    let forward = (body_size / 2.0 - 2.0).max(0.0);
    let lateral = Vec2::new(-direction.y, direction.x);
    center + direction * forward + lateral * HAND_LATERAL_OFFSET
}

/// Per-level upgrade table for a ranged weapon.
///
/// Every list is indexed by upgrade level, level zero being the base weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTable {
    /// Highest level that may be purchased.
    pub max_level: u32,
    /// Price paid to reach each level.
    #[serde(default)]
    pub costs: Vec<u32>,
    /// Damage multiplier applied to the base damage.
    #[serde(default)]
    pub damage_mult: Vec<f32>,
    /// Cooldown multiplier applied to the base cooldown.
    #[serde(default)]
    pub cooldown_mult: Vec<f32>,
    /// Range added to the base range.
    #[serde(default)]
    pub range_add: Vec<f32>,
}

impl UpgradeTable {
    /// Price of the level following `current`, if one can still be bought.
    #[must_use]
    pub fn next_cost(&self, current: u32) -> Option<u32> {
        if current >= self.max_level {
            return None;
        }
        let next = usize::try_from(current).ok()?.checked_add(1)?;
        self.costs.get(next).copied()
    }
}

/// Returns the table entry for `level`, clamped to the last entry.
fn level_entry(values: &[f32], level: usize) -> Option<f32> {
    let last = values.len().checked_sub(1)?;
    values.get(level.min(last)).copied()
}

/// Cosmetic recoil, muzzle flash and screen shake configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MuzzleSpec {
    /// Recoil distance applied when firing, in pixels.
    pub recoil_strength: f32,
    /// Speed at which recoil returns to rest, in pixels per second.
    pub recoil_return_speed: f32,
    /// Muzzle flash duration in milliseconds.
    pub flash_ms: f32,
    /// Screen shake duration in milliseconds.
    pub shake_ms: f32,
    /// Maximum screen shake displacement in pixels.
    pub shake_strength: f32,
    /// Distance from the hand to the muzzle along the aim line.
    pub muzzle_offset: f32,
}

impl Default for MuzzleSpec {
    fn default() -> Self {
        Self {
            recoil_strength: 8.0,
            recoil_return_speed: 60.0,
            flash_ms: 50.0,
            shake_ms: 80.0,
            shake_strength: 3.0,
            muzzle_offset: 24.0,
        }
    }
}

/// Static description of a ranged weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangedSpec {
    /// Display and lookup name.
    pub name: String,
    /// Shop price.
    pub cost: u32,
    /// Minimum time between shots in milliseconds.
    pub cooldown_ms: u32,
    /// Damage per projectile.
    pub damage: u32,
    /// Projectile speed in pixels per tick.
    pub speed: f32,
    /// Projectile range in pixels.
    pub range: f32,
    /// Number of projectiles per shot.
    #[serde(default = "default_pellets")]
    pub pellets: u32,
    /// Total fan angle in radians for multi-pellet shots.
    #[serde(default)]
    pub spread: f32,
    /// Cosmetic firing feedback.
    #[serde(default)]
    pub muzzle: MuzzleSpec,
}

fn default_pellets() -> u32 {
    1
}

/// Static description of a melee weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeleeSpec {
    /// Display and lookup name.
    pub name: String,
    /// Shop price.
    pub cost: u32,
    /// Minimum time between swings in milliseconds.
    pub cooldown_ms: u32,
    /// Damage per enemy hit.
    pub damage: u32,
    /// Radius of the circular hit area in pixels.
    pub radius: f32,
    /// Whether enemy projectiles inside the radius are sent back.
    #[serde(default)]
    pub reflect: bool,
}

/// Prototype entry of the weapon catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaponSpec {
    /// Gun firing projectiles.
    Ranged(RangedSpec),
    /// Close-range weapon hitting everything in a circle.
    Melee(MeleeSpec),
}

impl WeaponSpec {
    /// Name of the described weapon.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ranged(spec) => &spec.name,
            Self::Melee(spec) => &spec.name,
        }
    }

    /// Shop price of the described weapon.
    #[must_use]
    pub fn cost(&self) -> u32 {
        match self {
            Self::Ranged(spec) => spec.cost,
            Self::Melee(spec) => spec.cost,
        }
    }

    /// Capability of the described weapon.
    #[must_use]
    pub fn kind(&self) -> WeaponKind {
        match self {
            Self::Ranged(_) => WeaponKind::Ranged,
            Self::Melee(_) => WeaponKind::Melee,
        }
    }
}

/// Capability discriminant of a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Fires projectiles.
    Ranged,
    /// Strikes in a radius.
    Melee,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MuzzleFx {
    spec: MuzzleSpec,
    recoil: f32,
    flash_ms: f32,
    shake_ms: f32,
}

impl MuzzleFx {
    fn new(spec: MuzzleSpec) -> Self {
        Self {
            spec,
            recoil: 0.0,
            flash_ms: 0.0,
            shake_ms: 0.0,
        }
    }

    fn trigger(&mut self) {
        self.recoil = self.spec.recoil_strength;
        self.flash_ms = self.spec.flash_ms;
        self.shake_ms = self.spec.shake_ms;
    }

    fn decay(&mut self, dt_ms: f32) {
        let recoil_step = self.spec.recoil_return_speed * dt_ms / 1000.0;
        self.recoil = (self.recoil - recoil_step).max(0.0);
        self.flash_ms = (self.flash_ms - dt_ms).max(0.0);
        self.shake_ms = (self.shake_ms - dt_ms).max(0.0);
    }
}

/// A gun owned by a single actor.
#[derive(Clone, Debug, PartialEq)]
pub struct RangedWeapon {
    name: String,
    cost: u32,
    base_damage: u32,
    base_cooldown_ms: u32,
    base_range: f32,
    damage: u32,
    cooldown_ms: u32,
    range: f32,
    speed: f32,
    pellets: u32,
    spread: f32,
    upgrade_level: u32,
    fx: MuzzleFx,
}

impl RangedWeapon {
    /// Builds a fresh, unupgraded instance from its prototype.
    #[must_use]
    pub fn from_spec(spec: &RangedSpec) -> Self {
        Self {
            name: spec.name.clone(),
            cost: spec.cost,
            base_damage: spec.damage,
            base_cooldown_ms: spec.cooldown_ms,
            base_range: spec.range,
            damage: spec.damage,
            cooldown_ms: spec.cooldown_ms,
            range: spec.range,
            speed: spec.speed,
            pellets: spec.pellets.max(1),
            spread: spec.spread,
            upgrade_level: 0,
            fx: MuzzleFx::new(spec.muzzle),
        }
    }

    /// Replaces the base cooldown and damage, as enemy archetypes do for the
    /// guns they carry.
    #[must_use]
    pub fn with_base_stats(mut self, cooldown_ms: u32, damage: u32) -> Self {
        self.base_cooldown_ms = cooldown_ms;
        self.cooldown_ms = cooldown_ms;
        self.base_damage = damage;
        self.damage = damage;
        self
    }

    /// Weapon name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shop price.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Current damage per projectile.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Current cooldown between shots in milliseconds.
    #[must_use]
    pub const fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }

    /// Current projectile range in pixels.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Projectile speed in pixels per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Projectiles per shot.
    #[must_use]
    pub const fn pellets(&self) -> u32 {
        self.pellets
    }

    /// Total fan angle in radians.
    #[must_use]
    pub const fn spread(&self) -> f32 {
        self.spread
    }

    /// Upgrade level most recently applied.
    #[must_use]
    pub const fn upgrade_level(&self) -> u32 {
        self.upgrade_level
    }

    /// Current recoil displacement in pixels.
    #[must_use]
    pub const fn recoil(&self) -> f32 {
        self.fx.recoil
    }

    /// Whether the muzzle flash is visible.
    #[must_use]
    pub fn flash_visible(&self) -> bool {
        self.fx.flash_ms > 0.0
    }

    /// Current screen shake amplitude, zero when the shake has elapsed.
    #[must_use]
    pub fn shake_strength(&self) -> f32 {
        if self.fx.shake_ms > 0.0 {
            self.fx.spec.shake_strength
        } else {
            0.0
        }
    }

    /// Distance from the hand to the muzzle.
    #[must_use]
    pub const fn muzzle_offset(&self) -> f32 {
        self.fx.spec.muzzle_offset
    }

    /// Re-derives damage, cooldown and range for `level` from the base values.
    ///
    /// The level is recorded even without a table; without one the stats stay
    /// untouched. Applying the same level twice yields identical stats.
    pub fn apply_upgrade(&mut self, level: u32, table: Option<&UpgradeTable>) {
        self.upgrade_level = level;
        let Some(table) = table else {
            return;
        };

        let index = usize::try_from(level.min(table.max_level)).unwrap_or(usize::MAX);
        if let Some(multiplier) = level_entry(&table.damage_mult, index) {
            self.damage = (self.base_damage as f32 * multiplier).round() as u32;
        }
        if let Some(multiplier) = level_entry(&table.cooldown_mult, index) {
            self.cooldown_ms = (self.base_cooldown_ms as f32 * multiplier).round() as u32;
        }
        if let Some(addend) = level_entry(&table.range_add, index) {
            self.range = (self.base_range + addend).round();
        }
    }

    /// Fires a shot from `origin` towards `aim`.
    ///
    /// Always yields `pellets` projectiles (at least one). Multi-pellet shots
    /// fan out evenly over the spread angle, centred on the aim direction.
    /// Cooldown gating is left to the caller.
    #[must_use]
    pub fn fire(&self, origin: Vec2, aim: Vec2, owner: Owner) -> Vec<Projectile> {
        let (mut direction, length) = vec_from_points(origin, aim);
        if length == 0.0 {
            direction = Vec2::X;
        }

        let spawn = |direction: Vec2| {
            Projectile::new(owner, origin, direction, self.speed, self.damage, self.range)
        };

        if self.pellets <= 1 {
            return vec![spawn(direction)];
        }

        let base_angle = direction.y.atan2(direction.x);
        let last = (self.pellets - 1) as f32;
        (0..self.pellets)
            .map(|index| {
                let offset = index as f32 / last - 0.5;
                spawn(unit_from_angle(base_angle + offset * self.spread))
            })
            .collect()
    }

    /// Starts recoil, muzzle flash and screen shake.
    pub fn trigger_fire_visual(&mut self) {
        self.fx.trigger();
    }

    /// Decays cosmetic timers.
    pub fn update(&mut self, dt: Duration) {
        self.fx.decay(dt.as_secs_f32() * 1000.0);
    }
}

/// Something a melee swing can damage.
pub trait MeleeTarget {
    /// Whether the target can still be hit.
    fn is_alive(&self) -> bool;

    /// Centre used for the radius check.
    fn center(&self) -> Vec2;

    /// Applies damage and reports whether this blow was lethal.
    fn receive_damage(&mut self, amount: u32) -> bool;
}

/// Result of a melee swing. Entries are indices into the slices passed to
/// [`MeleeWeapon::attack`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeleeOutcome {
    /// Targets that took damage, lethal or not.
    pub hit: Vec<usize>,
    /// Subset of `hit` killed by this swing.
    pub killed: Vec<usize>,
    /// Projectiles that were reflected.
    pub reflected: Vec<usize>,
}

const SWING_DURATION_MS: f32 = 220.0;
const SWING_ARC_DEGREES: f32 = 140.0;

/// A close-range weapon owned by a single actor.
#[derive(Clone, Debug, PartialEq)]
pub struct MeleeWeapon {
    name: String,
    cost: u32,
    cooldown_ms: u32,
    damage: u32,
    radius: f32,
    reflect: bool,
    swing_ms: f32,
    swing_sign: f32,
}

impl MeleeWeapon {
    /// Builds a fresh instance from its prototype.
    #[must_use]
    pub fn from_spec(spec: &MeleeSpec) -> Self {
        Self {
            name: spec.name.clone(),
            cost: spec.cost,
            cooldown_ms: spec.cooldown_ms,
            damage: spec.damage,
            radius: spec.radius,
            reflect: spec.reflect,
            swing_ms: 0.0,
            swing_sign: 1.0,
        }
    }

    /// Weapon name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shop price.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Minimum time between swings in milliseconds.
    #[must_use]
    pub const fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }

    /// Damage per enemy hit.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Radius of the hit area.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether the weapon reflects enemy projectiles.
    #[must_use]
    pub const fn reflects(&self) -> bool {
        self.reflect
    }

    /// Swing progress in `0.0..1.0` and the signed arc offset in degrees, or
    /// `None` when no swing is playing.
    #[must_use]
    pub fn swing(&self) -> Option<(f32, f32)> {
        if self.swing_ms <= 0.0 {
            return None;
        }
        let progress = 1.0 - self.swing_ms / SWING_DURATION_MS;
        let arc = (progress * 2.0 - 1.0) * (SWING_ARC_DEGREES * 0.5) * self.swing_sign;
        Some((progress, arc))
    }

    /// Swings at every living target within the radius of `origin` and, when
    /// the weapon reflects, turns nearby enemy projectiles around.
    ///
    /// Player-owned projectiles are never reflected. Cooldown gating is left
    /// to the caller.
    pub fn attack<T, P>(&self, origin: Vec2, targets: &mut [T], projectiles: &mut [P]) -> MeleeOutcome
    where
        T: MeleeTarget,
        P: AsMut<Projectile>,
    {
        let mut outcome = MeleeOutcome::default();

        for (index, target) in targets.iter_mut().enumerate() {
            if !target.is_alive() || distance(origin, target.center()) > self.radius {
                continue;
            }
            if target.receive_damage(self.damage) {
                outcome.killed.push(index);
            }
            outcome.hit.push(index);
        }

        if self.reflect {
            for (index, projectile) in projectiles.iter_mut().enumerate() {
                let projectile = projectile.as_mut();
                if !projectile.is_alive() || projectile.owner() == Owner::Player {
                    continue;
                }
                if distance(origin, projectile.position()) <= self.radius {
                    projectile.reflect();
                    outcome.reflected.push(index);
                }
            }
        }

        outcome
    }

    /// Starts the swing animation, alternating its direction every time.
    pub fn trigger_swing_visual(&mut self) {
        self.swing_ms = SWING_DURATION_MS;
        self.swing_sign = -self.swing_sign;
    }

    /// Decays the swing timer.
    pub fn update(&mut self, dt: Duration) {
        self.swing_ms = (self.swing_ms - dt.as_secs_f32() * 1000.0).max(0.0);
    }
}

/// A weapon instance of either capability.
#[derive(Clone, Debug, PartialEq)]
pub enum Weapon {
    /// Gun.
    Ranged(RangedWeapon),
    /// Close-range weapon.
    Melee(MeleeWeapon),
}

impl Weapon {
    /// Builds a fresh instance from a catalog prototype.
    #[must_use]
    pub fn from_spec(spec: &WeaponSpec) -> Self {
        match spec {
            WeaponSpec::Ranged(spec) => Self::Ranged(RangedWeapon::from_spec(spec)),
            WeaponSpec::Melee(spec) => Self::Melee(MeleeWeapon::from_spec(spec)),
        }
    }

    /// Weapon name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ranged(weapon) => weapon.name(),
            Self::Melee(weapon) => weapon.name(),
        }
    }

    /// Shop price.
    #[must_use]
    pub fn cost(&self) -> u32 {
        match self {
            Self::Ranged(weapon) => weapon.cost(),
            Self::Melee(weapon) => weapon.cost(),
        }
    }

    /// Cooldown between uses in milliseconds.
    #[must_use]
    pub fn cooldown_ms(&self) -> u32 {
        match self {
            Self::Ranged(weapon) => weapon.cooldown_ms(),
            Self::Melee(weapon) => weapon.cooldown_ms(),
        }
    }

    /// Capability discriminant.
    #[must_use]
    pub fn kind(&self) -> WeaponKind {
        match self {
            Self::Ranged(_) => WeaponKind::Ranged,
            Self::Melee(_) => WeaponKind::Melee,
        }
    }

    /// Applies an upgrade level. Melee weapons have no upgrades.
    pub fn apply_upgrade(&mut self, level: u32, table: Option<&UpgradeTable>) {
        if let Self::Ranged(weapon) = self {
            weapon.apply_upgrade(level, table);
        }
    }

    /// Decays cosmetic timers.
    pub fn update(&mut self, dt: Duration) {
        match self {
            Self::Ranged(weapon) => weapon.update(dt),
            Self::Melee(weapon) => weapon.update(dt),
        }
    }

    /// Render data describing how the weapon sits in the owner's hand.
    #[must_use]
    pub fn mount(&self, body_size: f32) -> Mount {
        let forward = (body_size / 2.0 - 2.0).max(0.0);
        match self {
            Self::Ranged(weapon) => Mount {
                forward: forward - weapon.recoil(),
                lateral: HAND_LATERAL_OFFSET,
                arc_degrees: 0.0,
                flash_offset: weapon.flash_visible().then(|| weapon.muzzle_offset()),
                shake: weapon.shake_strength(),
            },
            Self::Melee(weapon) => {
                let (reach, arc_degrees) = weapon
                    .swing()
                    .map(|(progress, arc)| (6.0 * (progress * std::f32::consts::PI).sin(), arc))
                    .unwrap_or((0.0, 0.0));
                Mount {
                    forward: forward + reach,
                    lateral: HAND_LATERAL_OFFSET,
                    arc_degrees,
                    flash_offset: None,
                    shake: 0.0,
                }
            }
        }
    }
}

/// Presentation data for drawing a held weapon relative to its owner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mount {
    /// Offset along the facing direction, recoil and swing reach included.
    pub forward: f32,
    /// Offset perpendicular to the facing direction.
    pub lateral: f32,
    /// Extra sprite rotation for melee swings in degrees.
    pub arc_degrees: f32,
    /// Distance of the muzzle flash from the hand while it is visible.
    pub flash_offset: Option<f32>,
    /// Screen shake amplitude in pixels.
    pub shake: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shotgun() -> RangedWeapon {
        RangedWeapon::from_spec(&RangedSpec {
            name: "Shotgun".to_owned(),
            cost: 250,
            cooldown_ms: 700,
            damage: 10,
            speed: 10.0,
            range: 320.0,
            pellets: 5,
            spread: 0.9,
            muzzle: MuzzleSpec::default(),
        })
    }

    fn shotgun_table() -> UpgradeTable {
        UpgradeTable {
            max_level: 3,
            costs: vec![0, 180, 260, 360],
            damage_mult: vec![1.0, 1.10, 1.22, 1.35],
            cooldown_mult: vec![1.0, 0.96, 0.93, 0.90],
            range_add: vec![0.0, 20.0, 40.0, 70.0],
        }
    }

    struct Dummy {
        center: Vec2,
        health: u32,
    }

    impl MeleeTarget for Dummy {
        fn is_alive(&self) -> bool {
            self.health > 0
        }

        fn center(&self) -> Vec2 {
            self.center
        }

        fn receive_damage(&mut self, amount: u32) -> bool {
            self.health = self.health.saturating_sub(amount);
            self.health == 0
        }
    }

    #[test]
    fn pellet_fan_is_symmetric_for_odd_counts() {
        let weapon = shotgun();
        let shots = weapon.fire(Vec2::ZERO, Vec2::new(0.0, 50.0), Owner::Player);
        assert_eq!(shots.len(), 5);

        let middle = shots[2].direction();
        assert!((middle - Vec2::new(0.0, 1.0)).length() < 1e-5);
        for (left, right) in [(0, 4), (1, 3)] {
            let a = shots[left].direction();
            let b = shots[right].direction();
            assert!((a.x + b.x).abs() < 1e-5, "fan mirrors across the aim line");
            assert!((a.y - b.y).abs() < 1e-5);
        }
        let outer = shots[0].direction().y.atan2(shots[0].direction().x);
        assert!((outer - (std::f32::consts::FRAC_PI_2 - 0.45)).abs() < 1e-5);
    }

    #[test]
    fn even_pellet_fan_straddles_the_aim_line() {
        let weapon = RangedWeapon::from_spec(&RangedSpec {
            pellets: 4,
            spread: 0.9,
            ..ranged_spec()
        });
        let shots = weapon.fire(Vec2::ZERO, Vec2::new(80.0, 0.0), Owner::Player);
        assert_eq!(shots.len(), 4);

        let angles: Vec<f32> = shots
            .iter()
            .map(|shot| shot.direction().y.atan2(shot.direction().x))
            .collect();
        for (angle, expected) in angles.iter().zip([-0.45, -0.15, 0.15, 0.45]) {
            assert!((angle - expected).abs() < 1e-5, "{angle} != {expected}");
        }
        assert!(angles.iter().all(|angle| angle.abs() > 0.1));
    }

    #[test]
    fn coincident_aim_defaults_to_positive_x() {
        let weapon = RangedWeapon::from_spec(&RangedSpec {
            pellets: 1,
            ..ranged_spec()
        });
        let shots = weapon.fire(Vec2::ONE, Vec2::ONE, Owner::Enemy);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].direction(), Vec2::X);
        assert_eq!(shots[0].owner(), Owner::Enemy);
    }

    #[test]
    fn zero_pellets_still_fire_once() {
        let weapon = RangedWeapon::from_spec(&RangedSpec {
            pellets: 0,
            ..ranged_spec()
        });
        assert_eq!(weapon.fire(Vec2::ZERO, Vec2::X, Owner::Player).len(), 1);
    }

    #[test]
    fn upgrade_rederives_from_base_values() {
        let mut weapon = shotgun();
        let table = shotgun_table();

        weapon.apply_upgrade(2, Some(&table));
        assert_eq!(weapon.damage(), 12);
        assert_eq!(weapon.cooldown_ms(), 651);
        assert_eq!(weapon.range(), 360.0);

        let once = weapon.clone();
        weapon.apply_upgrade(2, Some(&table));
        assert_eq!(weapon, once, "applying the same level twice is idempotent");

        weapon.apply_upgrade(0, Some(&table));
        assert_eq!(weapon.damage(), 10);
        assert_eq!(weapon.cooldown_ms(), 700);
        assert_eq!(weapon.range(), 320.0);
    }

    #[test]
    fn upgrade_level_beyond_table_uses_last_entry() {
        let mut weapon = shotgun();
        let table = UpgradeTable {
            max_level: 5,
            damage_mult: vec![1.0, 2.0],
            ..shotgun_table()
        };
        weapon.apply_upgrade(4, Some(&table));
        assert_eq!(weapon.damage(), 20);
        assert_eq!(weapon.upgrade_level(), 4);
    }

    #[test]
    fn next_cost_stops_at_max_level() {
        let table = shotgun_table();
        assert_eq!(table.next_cost(0), Some(180));
        assert_eq!(table.next_cost(2), Some(360));
        assert_eq!(table.next_cost(3), None);
    }

    #[test]
    fn melee_hits_living_targets_in_radius() {
        let sword = MeleeWeapon::from_spec(&MeleeSpec {
            name: "Cleaver".to_owned(),
            cost: 150,
            cooldown_ms: 500,
            damage: 40,
            radius: 48.0,
            reflect: false,
        });
        let mut targets = vec![
            Dummy { center: Vec2::new(30.0, 0.0), health: 30 },
            Dummy { center: Vec2::new(0.0, 40.0), health: 100 },
            Dummy { center: Vec2::new(60.0, 0.0), health: 30 },
            Dummy { center: Vec2::new(10.0, 0.0), health: 0 },
        ];
        let mut projectiles = vec![Projectile::new(
            Owner::Enemy,
            Vec2::new(5.0, 0.0),
            Vec2::X,
            5.0,
            10,
            100.0,
        )];

        let outcome = sword.attack(Vec2::ZERO, &mut targets, &mut projectiles);

        assert_eq!(outcome.hit, vec![0, 1]);
        assert_eq!(outcome.killed, vec![0]);
        assert!(outcome.reflected.is_empty(), "cleaver does not reflect");
        assert_eq!(targets[1].health, 60);
        assert_eq!(projectiles[0].owner(), Owner::Enemy);
    }

    #[test]
    fn reflection_skips_player_projectiles() {
        let sword = MeleeWeapon::from_spec(&MeleeSpec {
            name: "Reflector Sword".to_owned(),
            cost: 300,
            cooldown_ms: 800,
            damage: 20,
            radius: 64.0,
            reflect: true,
        });
        let mut projectiles = vec![
            Projectile::new(Owner::Enemy, Vec2::new(10.0, 0.0), Vec2::X, 5.0, 10, 100.0),
            Projectile::new(Owner::Player, Vec2::new(10.0, 0.0), Vec2::X, 5.0, 10, 100.0),
            Projectile::new(Owner::Enemy, Vec2::new(100.0, 0.0), Vec2::X, 5.0, 10, 100.0),
        ];
        let mut targets: Vec<Dummy> = Vec::new();

        let outcome = sword.attack(Vec2::ZERO, &mut targets, &mut projectiles);

        assert_eq!(outcome.reflected, vec![0]);
        assert_eq!(projectiles[0].owner(), Owner::Player);
        assert_eq!(projectiles[0].damage(), 9);
        assert_eq!(projectiles[0].direction(), Vec2::new(-1.0, 0.0));
        assert_eq!(projectiles[1].damage(), 10);
        assert_eq!(projectiles[2].owner(), Owner::Enemy);
    }

    #[test]
    fn cosmetic_timers_decay_to_rest() {
        let mut weapon = shotgun();
        weapon.trigger_fire_visual();
        assert!(weapon.flash_visible());
        assert!(weapon.recoil() > 0.0);

        weapon.update(Duration::from_secs(1));
        assert!(!weapon.flash_visible());
        assert_eq!(weapon.recoil(), 0.0);
        assert_eq!(weapon.shake_strength(), 0.0);
    }

    #[test]
    fn swing_alternates_direction() {
        let mut sword = MeleeWeapon::from_spec(&MeleeSpec {
            name: "Cleaver".to_owned(),
            cost: 150,
            cooldown_ms: 500,
            damage: 40,
            radius: 48.0,
            reflect: false,
        });
        sword.trigger_swing_visual();
        let (_, first) = sword.swing().expect("swing playing");
        sword.trigger_swing_visual();
        let (_, second) = sword.swing().expect("swing playing");
        assert_eq!(first, -second);

        sword.update(Duration::from_millis(300));
        assert!(sword.swing().is_none());
    }

    fn ranged_spec() -> RangedSpec {
        RangedSpec {
            name: "Basic Pistol".to_owned(),
            cost: 0,
            cooldown_ms: 250,
            damage: 18,
            speed: 12.0,
            range: 800.0,
            pellets: 1,
            spread: 0.0,
            muzzle: MuzzleSpec::default(),
        }
    }
}
