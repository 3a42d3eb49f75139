//! A single map: its enemies and the regions that end it.

use std::time::Duration;

use glam::Vec2;
use survival_core::{
    geometry::{Bounds, Rect},
    weapon::MeleeTarget,
    BossPhase, EnemyId, EnemySnapshot,
};

use crate::{
    boss::{Boss, BossAttack},
    enemy::{AimTarget, Enemy},
};

/// An enemy on the map, regular or boss.
#[derive(Clone, Debug)]
pub enum Hostile {
    /// Patrolling shooter.
    Regular(Enemy),
    /// Final-map boss.
    Boss(Boss),
}

impl Hostile {
    /// Shared enemy state.
    #[must_use]
    pub const fn body(&self) -> &Enemy {
        match self {
            Self::Regular(enemy) => enemy,
            Self::Boss(boss) => boss.body(),
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.body().id()
    }

    /// Whether the enemy is still fighting.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.body().is_alive()
    }

    /// Boss phase, `None` for regular enemies.
    #[must_use]
    pub const fn boss_phase(&self) -> Option<BossPhase> {
        match self {
            Self::Regular(_) => None,
            Self::Boss(boss) => Some(boss.phase()),
        }
    }

    /// Applies damage and reports whether this blow was lethal.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        match self {
            Self::Regular(enemy) => enemy.take_damage(amount),
            Self::Boss(boss) => boss.take_damage(amount),
        }
    }

    /// Advances movement and timers.
    pub fn update(&mut self, dt: Duration, now_ms: u64, bounds: &Bounds) {
        match self {
            Self::Regular(enemy) => enemy.update(dt),
            Self::Boss(boss) => boss.update(dt, now_ms, bounds),
        }
    }

    /// Runs one attack step against `target`.
    pub fn try_shoot(&mut self, target: AimTarget, now_ms: u64) -> BossAttack {
        match self {
            Self::Regular(enemy) => BossAttack {
                projectiles: enemy.try_shoot(target, now_ms),
                contact_damage: None,
            },
            Self::Boss(boss) => boss.try_shoot(target, now_ms),
        }
    }

    /// Read-only summary of the enemy.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        let body = self.body();
        EnemySnapshot {
            id: body.id(),
            archetype: body.archetype().to_owned(),
            center: body.center(),
            size: body.hitbox().size().x,
            health: body.health(),
            max_health: body.max_health(),
            alive: body.is_alive(),
            boss_phase: self.boss_phase(),
        }
    }
}

impl MeleeTarget for Hostile {
    fn is_alive(&self) -> bool {
        self.body().is_alive()
    }

    fn center(&self) -> Vec2 {
        self.body().center()
    }

    fn receive_damage(&mut self, amount: u32) -> bool {
        self.take_damage(amount)
    }
}

/// State of the map the player is on.
#[derive(Clone, Debug)]
pub struct GameMap {
    index: usize,
    is_final: bool,
    enemies: Vec<Hostile>,
    portal: Option<Rect>,
    exit: Option<Rect>,
    cleared: bool,
}

impl GameMap {
    pub(crate) fn new(index: usize, is_final: bool) -> Self {
        Self {
            index,
            is_final,
            enemies: Vec::new(),
            portal: None,
            exit: None,
            cleared: false,
        }
    }

    /// Zero-based map index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether this is the boss map.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Every enemy placed on the map, dead ones included.
    #[must_use]
    pub fn enemies(&self) -> &[Hostile] {
        &self.enemies
    }

    pub(crate) fn enemies_mut(&mut self) -> &mut [Hostile] {
        &mut self.enemies
    }

    /// Portal region, once opened.
    #[must_use]
    pub const fn portal(&self) -> Option<Rect> {
        self.portal
    }

    /// Exit region, once opened.
    #[must_use]
    pub const fn exit(&self) -> Option<Rect> {
        self.exit
    }

    /// Whether no living enemy remains.
    #[must_use]
    pub fn all_dead(&self) -> bool {
        !self.enemies.iter().any(Hostile::is_alive)
    }

    pub(crate) fn add_enemy(&mut self, enemy: Hostile) {
        self.enemies.push(enemy);
    }

    /// Marks the map cleared; `true` only the first time every enemy is dead.
    pub(crate) fn take_cleared(&mut self) -> bool {
        if self.cleared || !self.all_dead() {
            return false;
        }
        self.cleared = true;
        true
    }

    /// Opens the portal; ignored while enemies live or once it is open.
    pub(crate) fn open_portal(&mut self, region: Rect) -> bool {
        if self.portal.is_some() || !self.all_dead() {
            return false;
        }
        self.portal = Some(region);
        true
    }

    /// Opens the exit on the final map; ignored elsewhere, while enemies
    /// live, or once it is open.
    pub(crate) fn open_exit(&mut self, region: Rect) -> bool {
        if !self.is_final || self.exit.is_some() || !self.all_dead() {
            return false;
        }
        self.exit = Some(region);
        true
    }

    /// Killing credit for projectiles: the first living enemy whose hitbox
    /// overlaps `hitbox`.
    pub(crate) fn first_hit(&mut self, hitbox: &Rect) -> Option<&mut Hostile> {
        self.enemies
            .iter_mut()
            .find(|enemy| enemy.is_alive() && enemy.body().hitbox().intersects(hitbox))
    }

    pub(crate) fn enemy(&self, id: EnemyId) -> Option<&Hostile> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }
}
