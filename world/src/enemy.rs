//! Regular enemies: patrol, detection and ranged attacks.

use std::time::Duration;

use glam::Vec2;
use survival_core::{
    geometry::{vec_from_points, Rect},
    weapon::{hand_mount, MeleeTarget},
    Archetype, Catalog, EnemyId, Owner, Projectile, RangedWeapon, ENEMY_SIZE,
};

/// Angular patrol speed in radians per millisecond.
const PATROL_ANGULAR_SPEED: f32 = 0.001;

/// What an enemy shoots at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AimTarget {
    /// A bare position.
    Point(Vec2),
    /// An actor's hitbox; aimed at its centre.
    Actor(Rect),
}

impl AimTarget {
    /// Position aimed at.
    #[must_use]
    pub fn point(&self) -> Vec2 {
        match self {
            Self::Point(point) => *point,
            Self::Actor(hitbox) => hitbox.center(),
        }
    }

    /// Hitbox of the target when it is an actor.
    #[must_use]
    pub const fn hitbox(&self) -> Option<Rect> {
        match self {
            Self::Point(_) => None,
            Self::Actor(hitbox) => Some(*hitbox),
        }
    }
}

impl From<Vec2> for AimTarget {
    fn from(point: Vec2) -> Self {
        Self::Point(point)
    }
}

impl From<&crate::Player> for AimTarget {
    fn from(player: &crate::Player) -> Self {
        Self::Actor(player.hitbox())
    }
}

/// A hostile actor that patrols and shoots at the player.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    archetype: String,
    hitbox: Rect,
    health: u32,
    max_health: u32,
    detect_range: f32,
    fire_cooldown_ms: u32,
    bullet_damage: u32,
    reward: u32,
    anchor: Vec2,
    patrol_radius: f32,
    patrol_angle: f32,
    facing: Vec2,
    last_shot_ms: Option<u64>,
    last_target: Option<Vec2>,
    weapon: RangedWeapon,
    alive: bool,
}

impl Enemy {
    /// Creates an enemy of the named archetype centred on `center`.
    ///
    /// Unknown archetypes resolve to the default one. The archetype's cooldown
    /// and damage are imposed on its weapon, and detection reaches at least as
    /// far as the weapon does.
    #[must_use]
    pub fn spawn(
        id: EnemyId,
        catalog: &Catalog,
        archetype: &str,
        center: Vec2,
        patrol_radius: f32,
        patrol_phase: f32,
    ) -> Self {
        let stats = catalog.archetype_or_default(archetype);
        let name = if catalog.archetype(archetype).is_ok() {
            archetype.to_ascii_lowercase()
        } else {
            survival_core::catalog::DEFAULT_ARCHETYPE.to_owned()
        };
        let weapon = catalog.weapon_or_default(&stats);
        Self::with_stats(id, name, &stats, weapon, center, ENEMY_SIZE, patrol_radius, patrol_phase)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn with_stats(
        id: EnemyId,
        archetype: String,
        stats: &Archetype,
        weapon: RangedWeapon,
        center: Vec2,
        size: f32,
        patrol_radius: f32,
        patrol_phase: f32,
    ) -> Self {
        Self {
            id,
            archetype,
            hitbox: Rect::square(center, size),
            health: stats.health,
            max_health: stats.health,
            detect_range: stats.detect_range.max(weapon.range()),
            fire_cooldown_ms: stats.fire_cooldown_ms,
            bullet_damage: weapon.damage(),
            reward: stats.reward,
            anchor: center,
            patrol_radius: patrol_radius.max(0.0),
            patrol_angle: patrol_phase,
            facing: Vec2::X,
            last_shot_ms: None,
            last_target: None,
            weapon,
            alive: true,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Resolved archetype name.
    #[must_use]
    pub fn archetype(&self) -> &str {
        &self.archetype
    }

    /// Square hitbox.
    #[must_use]
    pub const fn hitbox(&self) -> Rect {
        self.hitbox
    }

    /// Centre of the hitbox.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Starting health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Whether the enemy is still fighting.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Distance within which the enemy engages.
    #[must_use]
    pub const fn detect_range(&self) -> f32 {
        self.detect_range
    }

    /// Damage of each projectile the enemy fires.
    #[must_use]
    pub const fn bullet_damage(&self) -> u32 {
        self.bullet_damage
    }

    /// Money credited to the player on kill.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Unit vector the enemy faces.
    #[must_use]
    pub const fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Carried weapon.
    #[must_use]
    pub const fn weapon(&self) -> &RangedWeapon {
        &self.weapon
    }

    /// Patrol anchor, the spawn centre.
    #[must_use]
    pub const fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Last position the enemy aimed at.
    #[must_use]
    pub const fn last_target(&self) -> Option<Vec2> {
        self.last_target
    }

    pub(crate) fn set_center(&mut self, center: Vec2) {
        self.hitbox = self.hitbox.with_center(center);
    }

    pub(crate) fn remember_target(&mut self, point: Vec2) {
        self.last_target = Some(point);
    }

    pub(crate) fn set_facing(&mut self, facing: Vec2) {
        self.facing = facing;
    }

    /// Applies damage and reports whether this blow killed the enemy.
    ///
    /// Dead enemies ignore further damage, so a kill is reported once.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Advances the circular patrol and decays weapon cosmetics.
    pub fn update(&mut self, dt: Duration) {
        if self.patrol_radius > 0.0 {
            let dt_ms = dt.as_secs_f32() * 1000.0;
            self.patrol_angle += dt_ms * PATROL_ANGULAR_SPEED;
            let previous = self.center();
            let next = self.anchor
                + Vec2::new(self.patrol_angle.cos(), self.patrol_angle.sin()) * self.patrol_radius;
            self.set_center(next);
            let (direction, length) = vec_from_points(previous, next);
            if length != 0.0 {
                self.facing = direction;
            }
        }
        self.weapon.update(dt);
    }

    /// Shoots at `target` when it is within detection range and the cooldown
    /// has elapsed. Always turns to face the target.
    pub fn try_shoot(&mut self, target: impl Into<AimTarget>, now_ms: u64) -> Vec<Projectile> {
        let point = target.into().point();
        self.remember_target(point);

        let (direction, length) = vec_from_points(self.center(), point);
        if length != 0.0 {
            self.facing = direction;
        }

        let ready = self
            .last_shot_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= u64::from(self.fire_cooldown_ms));
        if length > self.detect_range || !ready {
            return Vec::new();
        }

        self.last_shot_ms = Some(now_ms);
        let origin = hand_mount(self.center(), direction, self.hitbox.size().x);
        self.weapon.trigger_fire_visual();
        self.weapon.fire(origin, point, Owner::Enemy)
    }
}

impl MeleeTarget for Enemy {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    fn receive_damage(&mut self, amount: u32) -> bool {
        self.take_damage(amount)
    }
}
