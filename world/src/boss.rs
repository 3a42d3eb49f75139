//! Boss behaviour: orbiting, projectile barrages and dashes.

use std::time::Duration;

use glam::Vec2;
use survival_core::{
    catalog::{BOSS_ARCHETYPE, DEFAULT_WEAPON_RANGE},
    geometry::{vec_from_points, Bounds, Rect},
    weapon::MeleeTarget,
    BossPhase, Catalog, EnemyId, Owner, Projectile, BOSS_SIZE, BULLET_SPEED,
};

use crate::enemy::{AimTarget, Enemy};

/// Timing and movement parameters of the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossTuning {
    /// Distance kept from the player while orbiting.
    pub preferred_radius: f32,
    /// Orbit movement speed in pixels per millisecond.
    pub orbit_speed: f32,
    /// Relative wobble of the orbit radius.
    pub orbit_jitter: f32,
    /// Movement speed multiplier during a barrage.
    pub burst_slow_factor: f32,
    /// Cooldown between barrages in milliseconds.
    pub barrage_cooldown_ms: f32,
    /// Length of a barrage in milliseconds.
    pub barrage_duration_ms: u64,
    /// Time between rings of a barrage in milliseconds.
    pub barrage_interval_ms: u64,
    /// Angle between neighbouring ring projectiles in degrees.
    pub ring_step_degrees: u32,
    /// Ring projectile speed relative to regular enemy projectiles.
    pub ring_speed_factor: f32,
    /// Cooldown between dashes in milliseconds.
    pub dash_cooldown_ms: f32,
    /// Wind-up before a dash in milliseconds.
    pub dash_lock_ms: f32,
    /// Maximum length of a dash in milliseconds.
    pub dash_duration_ms: f32,
    /// Dash speed in pixels per millisecond.
    pub dash_speed: f32,
    /// Pause after a dash in milliseconds.
    pub recover_ms: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            preferred_radius: 220.0,
            orbit_speed: 0.095,
            orbit_jitter: 0.35,
            burst_slow_factor: 0.55,
            barrage_cooldown_ms: 3600.0,
            barrage_duration_ms: 2400,
            barrage_interval_ms: 140,
            ring_step_degrees: 20,
            ring_speed_factor: 0.85,
            dash_cooldown_ms: 1400.0,
            dash_lock_ms: 420.0,
            dash_duration_ms: 720.0,
            dash_speed: 0.55,
            recover_ms: 500.0,
        }
    }
}

/// Outcome of a boss attack step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BossAttack {
    /// Projectiles released this step.
    pub projectiles: Vec<Projectile>,
    /// Damage dealt by dash contact.
    pub contact_damage: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Orbit,
    Burst { until_ms: u64, last_emit_ms: Option<u64> },
    DashLock { velocity: Vec2, has_hit: bool },
    Dash { velocity: Vec2, has_hit: bool },
    Recover,
}

impl State {
    const fn phase(&self) -> BossPhase {
        match self {
            Self::Orbit => BossPhase::Orbit,
            Self::Burst { .. } => BossPhase::Burst,
            Self::DashLock { .. } => BossPhase::DashLock,
            Self::Dash { .. } => BossPhase::Dash,
            Self::Recover => BossPhase::Recover,
        }
    }
}

/// The final-map enemy.
///
/// Burst and dash are variants of one state, so they can never overlap.
#[derive(Clone, Debug)]
pub struct Boss {
    body: Enemy,
    tuning: BossTuning,
    state: State,
    state_elapsed_ms: f32,
    orbit_angle: f32,
    barrage_cooldown_ms: f32,
    dash_cooldown_ms: f32,
}

impl Boss {
    /// Creates the boss centred on `center`.
    #[must_use]
    pub fn spawn(id: EnemyId, catalog: &Catalog, center: Vec2, tuning: BossTuning) -> Self {
        let stats = catalog.archetype_or_default(BOSS_ARCHETYPE);
        let weapon = catalog.weapon_or_default(&stats);
        let body = Enemy::with_stats(
            id,
            BOSS_ARCHETYPE.to_owned(),
            &stats,
            weapon,
            center,
            BOSS_SIZE,
            0.0,
            0.0,
        );
        Self {
            body,
            tuning,
            state: State::Orbit,
            state_elapsed_ms: 0.0,
            orbit_angle: 0.0,
            barrage_cooldown_ms: 0.0,
            dash_cooldown_ms: 0.0,
        }
    }

    /// Shared enemy state: health, hitbox, weapon.
    #[must_use]
    pub const fn body(&self) -> &Enemy {
        &self.body
    }

    /// Current behaviour phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.state.phase()
    }

    /// Remaining barrage and dash cooldowns in milliseconds.
    #[must_use]
    pub fn cooldowns(&self) -> (f32, f32) {
        (self.barrage_cooldown_ms, self.dash_cooldown_ms)
    }

    /// Damage dealt by dash contact.
    #[must_use]
    pub const fn dash_damage(&self) -> u32 {
        self.body.bullet_damage()
    }

    /// Applies damage and reports whether this blow killed the boss.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.body.take_damage(amount)
    }

    /// Advances cooldowns, phase timers and movement, then keeps the centre
    /// inside `bounds`.
    pub fn update(&mut self, dt: Duration, now_ms: u64, bounds: &Bounds) {
        let dt_ms = dt.as_secs_f32() * 1000.0;
        self.tick_cooldowns(dt_ms, now_ms);

        self.state_elapsed_ms += dt_ms;
        let target = self.body.last_target().unwrap_or(self.body.anchor());

        match self.state {
            State::Orbit => self.orbit(target, dt_ms, 1.0),
            State::Burst { .. } => self.orbit(target, dt_ms, self.tuning.burst_slow_factor),
            State::DashLock { velocity, has_hit } => {
                if self.state_elapsed_ms >= self.tuning.dash_lock_ms {
                    self.enter(State::Dash { velocity, has_hit });
                }
            }
            State::Dash { velocity, .. } => {
                let center = self.body.center() + velocity * dt_ms;
                self.body.set_center(center);
                if !bounds.contains(center) || self.state_elapsed_ms >= self.tuning.dash_duration_ms {
                    self.dash_cooldown_ms = self.tuning.dash_cooldown_ms;
                    self.enter(State::Recover);
                }
            }
            State::Recover => {
                if self.state_elapsed_ms >= self.tuning.recover_ms {
                    self.enter(State::Orbit);
                }
            }
        }

        let clamped = bounds.clamp_point(self.body.center());
        self.body.set_center(clamped);
        self.body.update(dt);
    }

    /// Runs one attack step against `target`.
    ///
    /// Priority: dash contact while dashing, barrage rings while bursting,
    /// then starting a barrage, then starting a dash, then a regular shot.
    pub fn try_shoot(&mut self, target: impl Into<AimTarget>, now_ms: u64) -> BossAttack {
        let target = target.into();
        let point = target.point();
        self.body.remember_target(point);
        let (direction, distance) = vec_from_points(self.body.center(), point);
        if distance != 0.0 {
            self.body.set_facing(direction);
        }

        let mut attack = BossAttack::default();
        match self.state {
            State::DashLock { has_hit, .. } | State::Dash { has_hit, .. } => {
                let touching = target
                    .hitbox()
                    .is_some_and(|hitbox| hitbox.intersects(&self.body.hitbox()));
                if touching && !has_hit {
                    self.mark_dash_hit();
                    attack.contact_damage = Some(self.dash_damage());
                }
                return attack;
            }
            State::Burst { until_ms, last_emit_ms } => {
                let due = last_emit_ms.map_or(true, |last| {
                    now_ms.saturating_sub(last) >= self.tuning.barrage_interval_ms
                });
                if due {
                    self.state = State::Burst {
                        until_ms,
                        last_emit_ms: Some(now_ms),
                    };
                    attack.projectiles = self.ring(direction);
                }
                return attack;
            }
            State::Orbit | State::Recover => {}
        }

        let in_range = distance <= self.body.detect_range();
        if self.barrage_cooldown_ms <= 0.0 && in_range {
            self.enter(State::Burst {
                until_ms: now_ms + self.tuning.barrage_duration_ms,
                last_emit_ms: None,
            });
            return attack;
        }

        if self.dash_cooldown_ms <= 0.0 && in_range {
            if distance != 0.0 {
                self.enter(State::DashLock {
                    velocity: direction * self.tuning.dash_speed,
                    has_hit: false,
                });
            }
            return attack;
        }

        attack.projectiles = self.body.try_shoot(point, now_ms);
        attack
    }

    fn mark_dash_hit(&mut self) {
        self.state = match self.state {
            State::DashLock { velocity, .. } => State::DashLock {
                velocity,
                has_hit: true,
            },
            State::Dash { velocity, .. } => State::Dash {
                velocity,
                has_hit: true,
            },
            other => other,
        };
    }

    fn enter(&mut self, state: State) {
        self.state = state;
        self.state_elapsed_ms = 0.0;
    }

    fn tick_cooldowns(&mut self, dt_ms: f32, now_ms: u64) {
        if let State::Burst { until_ms, .. } = self.state {
            if now_ms >= until_ms {
                self.barrage_cooldown_ms = self.tuning.barrage_cooldown_ms;
                self.enter(State::Orbit);
            }
        }
        self.barrage_cooldown_ms = (self.barrage_cooldown_ms - dt_ms).max(0.0);
        self.dash_cooldown_ms = (self.dash_cooldown_ms - dt_ms).max(0.0);
    }

    fn orbit(&mut self, target: Vec2, dt_ms: f32, slow_factor: f32) {
        self.orbit_angle += 0.009 * (dt_ms / 16.67);
        let wobble = (self.orbit_angle * 0.7).sin() * self.tuning.orbit_jitter * self.tuning.preferred_radius * 0.2;
        let radius = self.tuning.preferred_radius + wobble;
        let desired = target + Vec2::new(self.orbit_angle.cos(), self.orbit_angle.sin()) * radius;

        let (direction, length) = vec_from_points(self.body.center(), desired);
        if length > 0.0 {
            let step = length.min(self.tuning.orbit_speed * slow_factor * dt_ms);
            let center = self.body.center() + direction * step;
            self.body.set_center(center);
        }
    }

    fn ring(&self, direction: Vec2) -> Vec<Projectile> {
        let center = self.body.center();
        let half = self.body.hitbox().size() / 2.0;
        let base_degrees = direction.y.atan2(direction.x).to_degrees();
        let step = self.tuning.ring_step_degrees.max(1);

        (0..360)
            .step_by(step as usize)
            .enumerate()
            .filter(|(index, _)| !matches!(index % 5, 3 | 4))
            .map(|(_, degrees)| {
                let radians = (degrees as f32 + base_degrees).to_radians();
                let velocity = Vec2::new(radians.cos(), radians.sin());
                Projectile::new(
                    Owner::Enemy,
                    center + velocity * half,
                    velocity,
                    BULLET_SPEED * self.tuning.ring_speed_factor,
                    self.body.bullet_damage(),
                    DEFAULT_WEAPON_RANGE,
                )
            })
            .collect()
    }
}

impl MeleeTarget for Boss {
    fn is_alive(&self) -> bool {
        self.body.is_alive()
    }

    fn center(&self) -> Vec2 {
        self.body.center()
    }

    fn receive_damage(&mut self, amount: u32) -> bool {
        self.take_damage(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_core::{SCREEN_BOUNDS, SCREEN_HEIGHT, SCREEN_WIDTH};

    const FRAME: Duration = Duration::from_millis(16);

    fn boss_at(center: Vec2) -> Boss {
        Boss::spawn(EnemyId::new(1), &Catalog::standard(), center, BossTuning::default())
    }

    fn target_at(center: Vec2) -> AimTarget {
        AimTarget::Actor(Rect::square(center, 36.0))
    }

    #[test]
    fn starts_barrage_before_dash() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        let attack = boss.try_shoot(target_at(Vec2::new(200.0, 320.0)), 1_000);
        assert!(attack.projectiles.is_empty());
        assert_eq!(boss.phase(), BossPhase::Burst);

        let ring = boss.try_shoot(target_at(Vec2::new(200.0, 320.0)), 1_016);
        assert_eq!(ring.projectiles.len(), 12);
        assert!(boss.try_shoot(target_at(Vec2::new(200.0, 320.0)), 1_100).projectiles.is_empty());
        assert_eq!(
            boss.try_shoot(target_at(Vec2::new(200.0, 320.0)), 1_156).projectiles.len(),
            12
        );
    }

    #[test]
    fn ring_starts_at_the_hitbox_edge() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        let _ = boss.try_shoot(Vec2::new(600.0, 320.0), 0);
        let ring = boss.try_shoot(Vec2::new(600.0, 320.0), 1).projectiles;
        let first = &ring[0];
        assert!((first.position() - Vec2::new(528.0, 320.0)).length() < 1e-3);
        assert!((first.speed() - BULLET_SPEED * 0.85).abs() < 1e-5);
        assert_eq!(first.damage(), 18);
        assert!(ring.iter().all(|projectile| projectile.owner() == Owner::Enemy));
    }

    #[test]
    fn barrage_ends_after_its_duration() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        let _ = boss.try_shoot(Vec2::new(300.0, 320.0), 0);
        assert_eq!(boss.phase(), BossPhase::Burst);

        boss.update(FRAME, 2_400, &SCREEN_BOUNDS);
        assert_eq!(boss.phase(), BossPhase::Orbit);
        assert!(boss.cooldowns().0 > 3_000.0);
    }

    #[test]
    fn dash_follows_when_barrage_is_cooling_down() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        let _ = boss.try_shoot(Vec2::new(300.0, 320.0), 0);
        boss.update(FRAME, 2_400, &SCREEN_BOUNDS);

        let _ = boss.try_shoot(Vec2::new(300.0, 320.0), 2_416);
        assert_eq!(boss.phase(), BossPhase::DashLock);

        boss.update(Duration::from_millis(420), 2_836, &SCREEN_BOUNDS);
        assert_eq!(boss.phase(), BossPhase::Dash);
    }

    #[test]
    fn dash_contact_hits_once() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        let _ = boss.try_shoot(Vec2::new(300.0, 320.0), 0);
        boss.update(FRAME, 2_400, &SCREEN_BOUNDS);
        let _ = boss.try_shoot(Vec2::new(300.0, 320.0), 2_416);
        assert_eq!(boss.phase(), BossPhase::DashLock);

        let touching = target_at(Vec2::new(500.0, 320.0));
        let first = boss.try_shoot(touching, 2_432);
        assert_eq!(first.contact_damage, Some(18));
        let second = boss.try_shoot(touching, 2_448);
        assert_eq!(second.contact_damage, None);
        assert!(second.projectiles.is_empty());
    }

    #[test]
    fn dash_ends_at_the_screen_edge_and_recovers() {
        let mut boss = boss_at(Vec2::new(100.0, 320.0));
        let _ = boss.try_shoot(Vec2::new(0.0, 320.0), 0);
        boss.update(FRAME, 2_400, &SCREEN_BOUNDS);
        let _ = boss.try_shoot(Vec2::new(0.0, 320.0), 2_416);
        boss.update(Duration::from_millis(420), 2_836, &SCREEN_BOUNDS);
        assert_eq!(boss.phase(), BossPhase::Dash);

        for step in 0..40 {
            boss.update(FRAME, 2_852 + step * 16, &SCREEN_BOUNDS);
            if boss.phase() != BossPhase::Dash {
                break;
            }
        }
        assert_eq!(boss.phase(), BossPhase::Recover);
        assert!(boss.body().center().x >= 0.0);
        assert!(boss.cooldowns().1 > 0.0);

        boss.update(Duration::from_millis(500), 4_000, &SCREEN_BOUNDS);
        assert_eq!(boss.phase(), BossPhase::Orbit);
    }

    #[test]
    fn recovering_boss_starts_barrage_when_ready() {
        let mut boss = boss_at(Vec2::new(480.0, 320.0));
        boss.state = State::Recover;
        boss.barrage_cooldown_ms = 0.0;
        assert_eq!(boss.phase(), BossPhase::Recover);

        let target = target_at(Vec2::new(300.0, 320.0));
        let attack = boss.try_shoot(target, 5_000);
        assert!(attack.projectiles.is_empty());
        assert_eq!(boss.phase(), BossPhase::Burst);
        assert_eq!(boss.try_shoot(target, 5_016).projectiles.len(), 12);
    }

    #[test]
    fn centre_stays_on_screen() {
        let mut boss = boss_at(Vec2::new(SCREEN_WIDTH - 1.0, SCREEN_HEIGHT - 1.0));
        let _ = boss.try_shoot(Vec2::new(SCREEN_WIDTH + 400.0, SCREEN_HEIGHT + 400.0), 0);
        for step in 0..200 {
            boss.update(FRAME, step * 16, &SCREEN_BOUNDS);
            let center = boss.body().center();
            assert!(SCREEN_BOUNDS.contains(center));
        }
    }

    #[test]
    fn orbit_moves_toward_preferred_radius() {
        let anchor = Vec2::new(480.0, 320.0);
        let mut boss = boss_at(anchor);
        for step in 0..200 {
            boss.update(FRAME, step * 16, &SCREEN_BOUNDS);
        }
        assert_eq!(boss.phase(), BossPhase::Orbit);
        let distance = boss.body().center().distance(anchor);
        assert!(distance > 100.0, "boss keeps its distance, got {distance}");
    }

    #[test]
    fn out_of_range_falls_back_to_regular_fire() {
        let mut boss = boss_at(Vec2::new(0.0, 0.0));
        let attack = boss.try_shoot(Vec2::new(900.0, 600.0), 0);
        assert_eq!(boss.phase(), BossPhase::Orbit);
        assert!(attack.projectiles.is_empty());
        assert!(attack.contact_damage.is_none());
    }
}
