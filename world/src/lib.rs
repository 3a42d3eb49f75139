#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cross-Domain Survival.
//!
//! The world owns the player, the current map with its enemies, and the
//! transient projectile list. Every mutation goes through [`apply`]; a
//! [`Command::Tick`] runs one frame of the combat loop in a fixed order:
//! player movement, player weapon timers, firing, melee, enemy updates and
//! attacks, clear detection, projectile movement, hit resolution, then the
//! portal, exit and death checks.

mod boss;
mod enemy;
mod map;
mod player;

use std::time::Duration;

use survival_core::{
    catalog::BOSS_ARCHETYPE, BossPhase, Catalog, Command, EnemyId, EquipError, Event, Owner,
    PlayerIntent, PlayerSnapshot, Projectile, PurchaseError, SessionPhase, ShopItem,
    SnapshotError, Weapon, WorldConfig, MAP_ENTRY_CENTER, MAP_ENTRY_HEAL, WELCOME_BANNER,
};
use tracing::{debug, info};

pub use boss::{Boss, BossAttack, BossTuning};
pub use enemy::{AimTarget, Enemy};
pub use map::{GameMap, Hostile};
pub use player::Player;

/// Represents the authoritative Cross-Domain Survival world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    catalog: Catalog,
    boss_tuning: BossTuning,
    phase: SessionPhase,
    clock: Duration,
    player: Player,
    map: Option<GameMap>,
    projectiles: Vec<Projectile>,
    next_enemy_id: u32,
}

impl World {
    /// Creates a world with the standard screen, map count and catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default(), Catalog::standard())
    }

    /// Creates a world from explicit configuration and tables.
    #[must_use]
    pub fn with_config(config: WorldConfig, catalog: Catalog) -> Self {
        let player = Player::new(&catalog);
        Self {
            banner: WELCOME_BANNER,
            config,
            catalog,
            boss_tuning: BossTuning::default(),
            phase: SessionPhase::Ready,
            clock: Duration::ZERO,
            player,
            map: None,
            projectiles: Vec::new(),
            next_enemy_id: 0,
        }
    }

    /// Replaces the boss parameters used for subsequently spawned bosses.
    #[must_use]
    pub fn with_boss_tuning(mut self, tuning: BossTuning) -> Self {
        self.boss_tuning = tuning;
        self
    }

    /// Replaces the player with one rebuilt from a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns the validation failure and leaves the current player untouched
    /// when the snapshot is inconsistent.
    pub fn restore_player(&mut self, snapshot: &PlayerSnapshot) -> Result<(), SnapshotError> {
        let mut player = Player::from_snapshot(snapshot, &self.catalog)?;
        player.set_center(self.player.center());
        self.player = player;
        info!(money = self.player.money(), "restored player");
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.clock.as_millis()).unwrap_or(u64::MAX)
    }

    fn set_phase(&mut self, phase: SessionPhase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        info!(from = ?self.phase, to = ?phase, "session phase changed");
        self.phase = phase;
        out_events.push(Event::SessionPhaseChanged { phase });
    }

    fn enter_map(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let is_final = index + 1 >= self.config.map_count;
        self.map = Some(GameMap::new(index, is_final));
        self.projectiles.clear();

        if index > 0 {
            self.player.set_center(MAP_ENTRY_CENTER);
            let healed = self.player.heal(MAP_ENTRY_HEAL);
            if healed > 0 {
                out_events.push(Event::PlayerHealed { amount: healed });
            }
        }

        self.set_phase(SessionPhase::Playing, out_events);
        info!(map = index, is_final, "entered map");
        out_events.push(Event::MapEntered {
            map: index,
            is_final,
        });
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        id
    }

    fn spawn_enemy(
        &mut self,
        archetype: &str,
        position: glam::Vec2,
        patrol_radius: f32,
        patrol_phase: f32,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != SessionPhase::Playing || self.map.is_none() {
            return;
        }

        let id = self.allocate_enemy_id();
        let is_boss = archetype.eq_ignore_ascii_case(BOSS_ARCHETYPE);
        let hostile = if is_boss {
            let center = self.config.bounds.clamp_point(position);
            Hostile::Boss(Boss::spawn(id, &self.catalog, center, self.boss_tuning))
        } else {
            Hostile::Regular(Enemy::spawn(
                id,
                &self.catalog,
                archetype,
                position,
                patrol_radius,
                patrol_phase,
            ))
        };

        let body = hostile.body();
        debug!(enemy = id.get(), archetype = body.archetype(), "spawned enemy");
        out_events.push(Event::EnemySpawned {
            enemy: id,
            archetype: body.archetype().to_owned(),
            position: body.center(),
            boss: is_boss,
        });
        if let Some(map) = self.map.as_mut() {
            map.add_enemy(hostile);
        }
    }

    fn tick(&mut self, dt: Duration, intent: PlayerIntent, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        let now_ms = self.now_ms();
        out_events.push(Event::TimeAdvanced { dt });

        let bounds = self.config.bounds;
        let Self {
            player,
            map,
            projectiles,
            ..
        } = self;
        let Some(map) = map.as_mut() else {
            return;
        };

        player.steer(intent.movement, &bounds);
        player.face(intent.aim);
        player.update(dt);

        if intent.fire {
            let shots = player.try_shoot(intent.aim, now_ms);
            if !shots.is_empty() {
                out_events.push(Event::ProjectilesFired {
                    owner: Owner::Player,
                    count: shots.len(),
                });
                projectiles.extend(shots);
            }
        }

        if intent.melee {
            let damage = match player.equipped() {
                Some(Weapon::Melee(weapon)) => weapon.damage(),
                _ => 0,
            };
            if let Some(outcome) = player.try_melee(now_ms, map.enemies_mut(), projectiles.as_mut_slice()) {
                for index in outcome.hit {
                    let body = map.enemies()[index].body();
                    out_events.push(Event::EnemyDamaged {
                        enemy: body.id(),
                        amount: damage,
                        remaining: body.health(),
                    });
                }
                for index in outcome.killed {
                    let body = map.enemies()[index].body();
                    credit_kill(player, body, out_events);
                }
                if !outcome.reflected.is_empty() {
                    out_events.push(Event::ProjectilesReflected {
                        count: outcome.reflected.len(),
                    });
                }
            }
        }

        let target = AimTarget::from(&*player);
        for enemy in map.enemies_mut() {
            if !enemy.is_alive() {
                continue;
            }
            let before = enemy.boss_phase();
            enemy.update(dt, now_ms, &bounds);
            report_boss_phase(enemy, before, out_events);

            let before = enemy.boss_phase();
            let attack = enemy.try_shoot(target, now_ms);
            report_boss_phase(enemy, before, out_events);

            if !attack.projectiles.is_empty() {
                out_events.push(Event::ProjectilesFired {
                    owner: Owner::Enemy,
                    count: attack.projectiles.len(),
                });
                projectiles.extend(attack.projectiles);
            }
            if let Some(amount) = attack.contact_damage {
                let remaining = player.take_damage(amount);
                out_events.push(Event::PlayerDamaged { amount, remaining });
            }
        }

        if map.take_cleared() {
            info!(map = map.index(), "map cleared");
            out_events.push(Event::MapCleared {
                map: map.index(),
                is_final: map.is_final(),
            });
        }

        for projectile in projectiles.iter_mut() {
            projectile.advance(&bounds);
        }
        projectiles.retain(Projectile::is_alive);

        for projectile in projectiles.iter_mut() {
            match projectile.owner() {
                Owner::Player => {
                    let Some(enemy) = map.first_hit(&projectile.hitbox()) else {
                        continue;
                    };
                    let killed = enemy.take_damage(projectile.damage());
                    projectile.expire();
                    let body = enemy.body();
                    out_events.push(Event::EnemyDamaged {
                        enemy: body.id(),
                        amount: projectile.damage(),
                        remaining: body.health(),
                    });
                    if killed {
                        credit_kill(player, body, out_events);
                    }
                }
                Owner::Enemy => {
                    if projectile.hitbox().intersects(&player.hitbox()) {
                        let remaining = player.take_damage(projectile.damage());
                        projectile.expire();
                        out_events.push(Event::PlayerDamaged {
                            amount: projectile.damage(),
                            remaining,
                        });
                    }
                }
            }
        }
        projectiles.retain(Projectile::is_alive);

        let hitbox = player.hitbox();
        let map_index = map.index();
        let is_final = map.is_final();
        let reached_portal = map.portal().is_some_and(|portal| portal.intersects(&hitbox));
        let reached_exit = is_final && map.exit().is_some_and(|exit| exit.intersects(&hitbox));
        let died = !player.is_alive();

        if reached_portal {
            out_events.push(Event::PortalReached { map: map_index });
            let next = if is_final {
                SessionPhase::Victory
            } else {
                SessionPhase::Shopping
            };
            self.set_phase(next, out_events);
            return;
        }
        if reached_exit {
            out_events.push(Event::ExitReached { map: map_index });
            self.set_phase(SessionPhase::Victory, out_events);
            return;
        }
        if died {
            info!(map = map_index, "player died");
            out_events.push(Event::PlayerDied);
            self.set_phase(SessionPhase::Defeat, out_events);
        }
    }

    fn reject_purchase(&self, item: ShopItem, reason: PurchaseError, out_events: &mut Vec<Event>) {
        debug!(?item, ?reason, money = self.player.money(), "purchase rejected");
        out_events.push(Event::PurchaseRejected { item, reason });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn credit_kill(player: &mut Player, enemy: &Enemy, out_events: &mut Vec<Event>) {
    let reward = enemy.reward();
    player.add_money(reward);
    info!(enemy = enemy.id().get(), reward, "enemy killed");
    out_events.push(Event::EnemyDied {
        enemy: enemy.id(),
        reward,
    });
}

fn report_boss_phase(
    enemy: &Hostile,
    before: Option<BossPhase>,
    out_events: &mut Vec<Event>,
) {
    let after = enemy.boss_phase();
    if let Some(phase) = after.filter(|phase| Some(*phase) != before) {
        debug!(enemy = enemy.id().get(), ?phase, "boss phase changed");
        out_events.push(Event::BossPhaseChanged {
            enemy: enemy.id(),
            phase,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => {
            if world.phase == SessionPhase::Ready {
                world.enter_map(0, out_events);
            }
        }
        Command::Tick { dt, intent } => {
            if world.phase == SessionPhase::Playing {
                world.tick(dt, intent, out_events);
            }
        }
        Command::EquipWeapon { index } => {
            if world.phase.is_terminal() {
                out_events.push(Event::EquipRejected {
                    index,
                    reason: EquipError::InvalidPhase,
                });
                return;
            }
            match world.player.equip(index) {
                Ok(weapon) => out_events.push(Event::WeaponEquipped {
                    index,
                    name: weapon.name().to_owned(),
                }),
                Err(reason) => out_events.push(Event::EquipRejected { index, reason }),
            }
        }
        Command::SpawnEnemy {
            archetype,
            position,
            patrol_radius,
            patrol_phase,
        } => world.spawn_enemy(&archetype, position, patrol_radius, patrol_phase, out_events),
        Command::OpenPortal { region } => {
            if world.phase != SessionPhase::Playing {
                return;
            }
            if let Some(map) = world.map.as_mut() {
                if map.open_portal(region) {
                    info!(map = map.index(), "portal opened");
                    out_events.push(Event::PortalOpened { region });
                }
            }
        }
        Command::OpenExit { region } => {
            if world.phase != SessionPhase::Playing {
                return;
            }
            if let Some(map) = world.map.as_mut() {
                if map.open_exit(region) {
                    info!(map = map.index(), "exit opened");
                    out_events.push(Event::ExitOpened { region });
                }
            }
        }
        Command::BuyWeapon { name } => {
            let item = ShopItem::Weapon(name.clone());
            if world.phase != SessionPhase::Shopping {
                world.reject_purchase(item, PurchaseError::InvalidPhase, out_events);
                return;
            }
            match world.player.buy_weapon(&world.catalog, &name) {
                Ok(slot) => {
                    let weapon = &world.player.inventory()[slot];
                    let name = weapon.name().to_owned();
                    let cost = weapon.cost();
                    info!(weapon = %name, cost, "weapon purchased");
                    out_events.push(Event::WeaponPurchased {
                        name: name.clone(),
                        cost,
                    });
                    if world.player.equip(slot).is_ok() {
                        out_events.push(Event::WeaponEquipped { index: slot, name });
                    }
                }
                Err(reason) => world.reject_purchase(item, reason, out_events),
            }
        }
        Command::UpgradeWeapon { name } => {
            let item = ShopItem::Upgrade(name.clone());
            if world.phase != SessionPhase::Shopping {
                world.reject_purchase(item, PurchaseError::InvalidPhase, out_events);
                return;
            }
            match world.player.upgrade_weapon(&world.catalog, &name) {
                Ok((level, cost)) => {
                    let name = world
                        .player
                        .find_weapon_index(&name)
                        .map_or(name, |slot| world.player.inventory()[slot].name().to_owned());
                    info!(weapon = %name, level, cost, "weapon upgraded");
                    out_events.push(Event::WeaponUpgraded { name, level, cost });
                }
                Err(reason) => world.reject_purchase(item, reason, out_events),
            }
        }
        Command::BuyMedkit => {
            if world.phase != SessionPhase::Shopping {
                world.reject_purchase(ShopItem::Medkit, PurchaseError::InvalidPhase, out_events);
                return;
            }
            let medkit = world.catalog.medkit;
            if let Err(reason) = world.player.spend(medkit.cost) {
                world.reject_purchase(ShopItem::Medkit, reason, out_events);
                return;
            }
            out_events.push(Event::MedkitPurchased { cost: medkit.cost });
            let healed = world.player.heal(medkit.heal);
            if healed > 0 {
                out_events.push(Event::PlayerHealed { amount: healed });
            }
        }
        Command::AdvanceMap => {
            if world.phase != SessionPhase::Shopping {
                return;
            }
            let next = world.map.as_ref().map_or(0, |map| map.index() + 1);
            if next < world.config.map_count {
                world.enter_map(next, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{GameMap, Player, World};
    use survival_core::{
        Bounds, Catalog, EnemyId, EnemySnapshot, LoadoutView, PlayerSnapshot, Projectile, Rect,
        SessionPhase,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current session phase.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Playfield dimensions.
    #[must_use]
    pub fn bounds(world: &World) -> Bounds {
        world.config.bounds
    }

    /// Static tables the world was created with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Captures the player's wallet and inventory.
    #[must_use]
    pub fn loadout(world: &World) -> LoadoutView {
        world.player.loadout()
    }

    /// Captures the persistable part of the player's state.
    #[must_use]
    pub fn player_snapshot(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Provides read-only access to the current map.
    #[must_use]
    pub fn current_map(world: &World) -> Option<&GameMap> {
        world.map.as_ref()
    }

    /// Captures every enemy on the current map in identifier order.
    #[must_use]
    pub fn enemy_view(world: &World) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = world
            .map
            .iter()
            .flat_map(|map| map.enemies().iter().map(|enemy| enemy.snapshot()))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures a single enemy on the current map.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world
            .map
            .as_ref()
            .and_then(|map| map.enemy(id))
            .map(|enemy| enemy.snapshot())
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> &[Projectile] {
        &world.projectiles
    }

    /// Portal region of the current map, once opened.
    #[must_use]
    pub fn portal(world: &World) -> Option<Rect> {
        world.map.as_ref().and_then(GameMap::portal)
    }

    /// Exit region of the current map, once opened.
    #[must_use]
    pub fn exit(world: &World) -> Option<Rect> {
        world.map.as_ref().and_then(GameMap::exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use survival_core::{Rect, BOSS_SIZE, DEFAULT_FRAME};

    fn started() -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        (world, events)
    }

    fn spawn(world: &mut World, archetype: &str, position: Vec2) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                archetype: archetype.to_owned(),
                position,
                patrol_radius: 0.0,
                patrol_phase: 0.0,
            },
            &mut events,
        );
        events
    }

    fn tick(world: &mut World, intent: PlayerIntent) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: DEFAULT_FRAME,
                intent,
            },
            &mut events,
        );
        events
    }

    fn kill_everything(world: &mut World) {
        if let Some(map) = world.map.as_mut() {
            for enemy in map.enemies_mut() {
                let _ = enemy.take_damage(u32::MAX);
            }
        }
    }

    #[test]
    fn start_session_enters_first_map() {
        let (world, events) = started();
        assert_eq!(query::phase(&world), SessionPhase::Playing);
        assert_eq!(
            events,
            vec![
                Event::SessionPhaseChanged {
                    phase: SessionPhase::Playing
                },
                Event::MapEntered {
                    map: 0,
                    is_final: false
                },
            ]
        );
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn ticks_before_start_are_ignored() {
        let mut world = World::new();
        let events = tick(&mut world, PlayerIntent::default());
        assert!(events.is_empty());
        assert_eq!(query::elapsed(&world), Duration::ZERO);
    }

    #[test]
    fn player_fire_kills_enemy_and_pays_once() {
        let (mut world, _) = started();
        let _ = spawn(&mut world, "grunt", Vec2::new(300.0, 78.0));
        let aim = Vec2::new(300.0, 78.0);

        let mut died = 0;
        let mut cleared = 0;
        for _ in 0..200 {
            for event in tick(&mut world, PlayerIntent::aim_at(aim).firing()) {
                match event {
                    Event::EnemyDied { reward, .. } => {
                        assert_eq!(reward, 150);
                        died += 1;
                    }
                    Event::MapCleared { map, is_final } => {
                        assert_eq!((map, is_final), (0, false));
                        cleared += 1;
                    }
                    _ => {}
                }
            }
        }

        assert_eq!(died, 1);
        assert_eq!(cleared, 1);
        assert_eq!(query::loadout(&world).money, 150);
        assert!(query::enemy_view(&world).iter().all(|enemy| !enemy.alive));
    }

    #[test]
    fn overkill_projectile_reports_one_death_and_one_reward() {
        let (mut world, _) = started();
        let center = Vec2::new(800.0, 500.0);
        let _ = spawn(&mut world, "grunt", center);
        if let Some(map) = world.map.as_mut() {
            let _ = map.enemies_mut()[0].take_damage(20);
        }
        let enemy = query::enemy_view(&world)[0].clone();
        assert_eq!(enemy.health, 10);

        world.projectiles.push(Projectile::new(
            Owner::Player,
            center,
            Vec2::X,
            1.0,
            20,
            400.0,
        ));
        let events = tick(&mut world, PlayerIntent::default());

        assert!(events.contains(&Event::EnemyDamaged {
            enemy: enemy.id,
            amount: 20,
            remaining: 0,
        }));
        let deaths: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDied { .. }))
            .collect();
        assert_eq!(
            deaths,
            vec![&Event::EnemyDied {
                enemy: enemy.id,
                reward: 150,
            }]
        );
        assert_eq!(query::loadout(&world).money, 150);
        assert!(query::projectiles(&world)
            .iter()
            .filter(|shot| shot.owner() == Owner::Player)
            .all(|shot| !shot.is_alive()));

        for _ in 0..10 {
            let events = tick(&mut world, PlayerIntent::default());
            assert!(!events
                .iter()
                .any(|event| matches!(event, Event::EnemyDied { .. })));
        }
        assert_eq!(query::loadout(&world).money, 150);
    }

    #[test]
    fn portal_leads_to_shop_and_next_map() {
        let (mut world, _) = started();
        let _ = spawn(&mut world, "grunt", Vec2::new(800.0, 500.0));
        kill_everything(&mut world);
        let _ = world.player.take_damage(40);
        world.player.add_money(150);

        let mut events = Vec::new();
        let region = Rect::from_min_size(Vec2::new(60.0, 60.0), Vec2::splat(52.0));
        apply(&mut world, Command::OpenPortal { region }, &mut events);
        assert_eq!(events, vec![Event::PortalOpened { region }]);

        let events = tick(&mut world, PlayerIntent::default());
        assert!(events.contains(&Event::PortalReached { map: 0 }));
        assert_eq!(query::phase(&world), SessionPhase::Shopping);

        let mut events = Vec::new();
        apply(&mut world, Command::BuyWeapon { name: "Shotgun".to_owned() }, &mut events);
        apply(&mut world, Command::BuyMedkit, &mut events);
        apply(&mut world, Command::AdvanceMap, &mut events);

        assert_eq!(
            events[0],
            Event::PurchaseRejected {
                item: ShopItem::Weapon("Shotgun".to_owned()),
                reason: PurchaseError::InsufficientFunds,
            }
        );
        assert!(events.contains(&Event::MedkitPurchased { cost: 120 }));
        assert!(events.contains(&Event::MapEntered {
            map: 1,
            is_final: false
        }));
        assert_eq!(query::player(&world).center(), MAP_ENTRY_CENTER);
        assert_eq!(query::player(&world).health(), 100);
        assert_eq!(query::loadout(&world).money, 30);
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn shop_commands_require_shopping_phase() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        apply(&mut world, Command::BuyMedkit, &mut events);
        apply(&mut world, Command::UpgradeWeapon { name: "Basic Pistol".to_owned() }, &mut events);
        apply(&mut world, Command::AdvanceMap, &mut events);
        assert_eq!(
            events,
            vec![
                Event::PurchaseRejected {
                    item: ShopItem::Medkit,
                    reason: PurchaseError::InvalidPhase,
                },
                Event::PurchaseRejected {
                    item: ShopItem::Upgrade("Basic Pistol".to_owned()),
                    reason: PurchaseError::InvalidPhase,
                },
            ]
        );
    }

    #[test]
    fn enemy_fire_can_end_the_session() {
        let (mut world, _) = started();
        let _ = world.player.take_damage(95);
        let _ = spawn(&mut world, "grunt", Vec2::new(300.0, 78.0));

        let mut defeated = false;
        for _ in 0..300 {
            let events = tick(&mut world, PlayerIntent::default());
            if events.contains(&Event::PlayerDied) {
                defeated = true;
                break;
            }
        }

        assert!(defeated);
        assert_eq!(query::phase(&world), SessionPhase::Defeat);
        assert!(tick(&mut world, PlayerIntent::default()).is_empty());
    }

    #[test]
    fn boss_announces_barrage() {
        let mut world = World::with_config(
            WorldConfig {
                map_count: 1,
                ..WorldConfig::default()
            },
            Catalog::standard(),
        );
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        assert!(events.contains(&Event::MapEntered {
            map: 0,
            is_final: true
        }));

        let spawned = spawn(&mut world, "boss", Vec2::new(480.0, 320.0));
        assert!(matches!(spawned[0], Event::EnemySpawned { boss: true, .. }));

        let events = tick(&mut world, PlayerIntent::default());
        assert!(events.iter().any(|event| matches!(
            event,
            Event::BossPhaseChanged {
                phase: BossPhase::Burst,
                ..
            }
        )));
        let view = query::enemy_view(&world);
        assert_eq!(view[0].boss_phase, Some(BossPhase::Burst));
        assert_eq!(view[0].size, BOSS_SIZE);
    }

    #[test]
    fn final_map_exit_is_victory() {
        let mut world = World::with_config(
            WorldConfig {
                map_count: 1,
                ..WorldConfig::default()
            },
            Catalog::standard(),
        );
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        let _ = spawn(&mut world, "boss", Vec2::new(480.0, 320.0));
        kill_everything(&mut world);

        let events = tick(&mut world, PlayerIntent::default());
        assert!(events.contains(&Event::MapCleared {
            map: 0,
            is_final: true
        }));

        let mut events = Vec::new();
        let region = Rect::from_min_size(Vec2::new(40.0, 40.0), Vec2::splat(80.0));
        apply(&mut world, Command::OpenExit { region }, &mut events);
        let events = tick(&mut world, PlayerIntent::default());
        assert!(events.contains(&Event::ExitReached { map: 0 }));
        assert_eq!(query::phase(&world), SessionPhase::Victory);
    }

    #[test]
    fn reflector_turns_enemy_projectiles_around() {
        let (mut world, _) = started();
        world.player.add_money(300);
        let slot = world
            .player
            .buy_weapon(&world.catalog, "Reflector Sword")
            .expect("affordable");
        let _ = world.player.equip(slot).expect("slot exists");

        let center = world.player.center();
        world.projectiles.push(Projectile::new(
            Owner::Enemy,
            center + Vec2::new(30.0, 0.0),
            Vec2::new(-1.0, 0.0),
            1.0,
            20,
            800.0,
        ));

        let events = tick(&mut world, PlayerIntent::aim_at(center + Vec2::X).swinging());
        assert!(events.contains(&Event::ProjectilesReflected { count: 1 }));
        assert!(!events.iter().any(|event| matches!(event, Event::PlayerDamaged { .. })));

        let projectile = &query::projectiles(&world)[0];
        assert_eq!(projectile.owner(), Owner::Player);
        assert_eq!(projectile.damage(), 18);
    }

    #[test]
    fn equip_rejects_unknown_slot() {
        let (mut world, _) = started();
        let mut events = Vec::new();
        apply(&mut world, Command::EquipWeapon { index: 4 }, &mut events);
        apply(&mut world, Command::EquipWeapon { index: 0 }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::EquipRejected {
                    index: 4,
                    reason: EquipError::InvalidSlot,
                },
                Event::WeaponEquipped {
                    index: 0,
                    name: "Basic Pistol".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn restoring_invalid_snapshot_keeps_player() {
        let mut world = World::new();
        let snapshot = PlayerSnapshot {
            money: 999,
            equipped_index: 5,
            inventory: vec!["Basic Pistol".to_owned()],
            ..PlayerSnapshot::default()
        };
        assert!(world.restore_player(&snapshot).is_err());
        assert_eq!(query::loadout(&world).money, 0);

        let snapshot = PlayerSnapshot {
            equipped_index: 0,
            ..snapshot
        };
        world.restore_player(&snapshot).expect("valid snapshot");
        assert_eq!(query::loadout(&world).money, 999);
    }
}
