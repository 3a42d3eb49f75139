//! Straight-line projectiles fired by weapons and boss skills.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{distance, Bounds, Rect};

/// Side length of a projectile's square hitbox in pixels.
pub const PROJECTILE_SIZE: f32 = 6.0;

/// Distance beyond the screen edge a projectile may travel before expiring.
pub const OFFSCREEN_MARGIN: f32 = 50.0;

/// Fraction of its damage a projectile keeps after being reflected.
const REFLECT_DAMAGE_FACTOR: f32 = 0.9;

/// Side that fired a projectile and therefore who it can hurt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Fired by (or reflected by) the player; damages enemies.
    Player,
    /// Fired by an enemy; damages the player.
    Enemy,
}

/// A projectile travelling in a straight line at a constant per-tick speed.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    owner: Owner,
    position: Vec2,
    origin: Vec2,
    direction: Vec2,
    speed: f32,
    damage: u32,
    max_range: f32,
    travelled: f32,
    alive: bool,
}

impl Projectile {
    /// Spawns a live projectile at `position`.
    ///
    /// `direction` is expected to be a unit vector; `speed` is applied once
    /// per [`Projectile::advance`] call.
    #[must_use]
    pub fn new(
        owner: Owner,
        position: Vec2,
        direction: Vec2,
        speed: f32,
        damage: u32,
        max_range: f32,
    ) -> Self {
        Self {
            owner,
            position,
            origin: position,
            direction,
            speed,
            damage,
            max_range,
            travelled: 0.0,
            alive: true,
        }
    }

    /// Side the projectile currently belongs to.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Current sub-pixel position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Distance covered per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage dealt on impact.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Maximum distance from the spawn point before the projectile expires.
    #[must_use]
    pub const fn max_range(&self) -> f32 {
        self.max_range
    }

    /// Straight-line distance between the spawn point and the current position.
    #[must_use]
    pub const fn travelled(&self) -> f32 {
        self.travelled
    }

    /// Whether the projectile still participates in the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Square hitbox centred on the current position.
    #[must_use]
    pub fn hitbox(&self) -> Rect {
        Rect::square(self.position, PROJECTILE_SIZE)
    }

    /// Moves the projectile one tick and expires it when it leaves the
    /// margin-expanded screen or exhausts its range.
    ///
    /// Expired projectiles no longer move.
    pub fn advance(&mut self, bounds: &Bounds) {
        if !self.alive {
            return;
        }

        self.position += self.direction * self.speed;
        self.travelled = distance(self.origin, self.position);

        if !bounds.contains_with_margin(self.position, OFFSCREEN_MARGIN)
            || self.travelled >= self.max_range
        {
            self.alive = false;
        }
    }

    /// Removes the projectile from play. There is no way back.
    pub fn expire(&mut self) {
        self.alive = false;
    }

    /// Sends the projectile back the way it came on behalf of the player.
    ///
    /// Damage drops to 90%, rounded down.
    pub fn reflect(&mut self) {
        self.direction = -self.direction;
        self.owner = Owner::Player;
        self.damage = (self.damage as f32 * REFLECT_DAMAGE_FACTOR).floor() as u32;
    }
}

impl AsRef<Projectile> for Projectile {
    fn as_ref(&self) -> &Projectile {
        self
    }
}

impl AsMut<Projectile> for Projectile {
    fn as_mut(&mut self) -> &mut Projectile {
        self
    }
}
