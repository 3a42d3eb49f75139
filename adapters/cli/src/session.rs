//! Headless session driver: feeds world events to the systems, applies the
//! commands they emit and steers the player with a simple autopilot.

use std::time::Duration;

use glam::Vec2;
use survival_core::{Command, Event, PlayerIntent, SessionPhase, Weapon, WeaponKind};
use survival_system_shop::{Offer, OfferKind, Shop, ShopAction};
use survival_system_spawning::{Config, Spawning};
use survival_world::{self as world, query, World};
use tracing::{debug, info};

/// Upper bound on command cascades triggered by a single input.
const MAX_CASCADE_DEPTH: usize = 8;

/// Closest the autopilot walks towards a melee target.
const MELEE_APPROACH: f32 = 24.0;

/// Running tallies reported at the end of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) kills: u32,
    pub(crate) maps_cleared: u32,
    pub(crate) damage_taken: u32,
    pub(crate) purchases: u32,
}

/// A world plus the systems that react to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
    shop: Shop,
    tally: Tally,
}

impl Session {
    pub(crate) fn new(world: World, seed: u64) -> Self {
        let spawning = Spawning::new(Config::new(query::bounds(&world), seed));
        Self {
            world,
            spawning,
            shop: Shop::new(),
            tally: Tally::default(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn tally(&self) -> Tally {
        self.tally
    }

    /// Plays until the session ends or `max_frames` frames have elapsed.
    pub(crate) fn run(&mut self, max_frames: u32, frame: Duration) -> SessionPhase {
        self.pump(vec![Command::StartSession]);

        for _ in 0..max_frames {
            match query::phase(&self.world) {
                SessionPhase::Playing => {
                    let intent = autopilot_intent(&self.world);
                    self.pump(vec![Command::Tick { dt: frame, intent }]);
                }
                SessionPhase::Shopping => self.visit_shop(),
                SessionPhase::Ready => self.pump(vec![Command::StartSession]),
                SessionPhase::Victory | SessionPhase::Defeat => break,
            }
        }

        query::phase(&self.world)
    }

    fn visit_shop(&mut self) {
        let loadout = query::loadout(&self.world);
        let offers = self.shop.offers(&loadout, query::catalog(&self.world));
        let mut actions = shopping_list(&offers, loadout.money, loadout.health < loadout.max_health);
        actions.push(ShopAction::Leave);

        for action in actions {
            let loadout = query::loadout(&self.world);
            let mut commands = Vec::new();
            self.shop
                .select(action, &loadout, query::catalog(&self.world), &mut commands);
            self.pump(commands);
        }
    }

    fn pump(&mut self, mut commands: Vec<Command>) {
        for _ in 0..MAX_CASCADE_DEPTH {
            if commands.is_empty() {
                return;
            }
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            for event in &events {
                self.record(event);
            }
            self.shop.handle(&events);
            self.spawning
                .handle(&events, query::catalog(&self.world), &mut commands);
        }
        debug!(pending = commands.len(), "command cascade truncated");
    }

    fn record(&mut self, event: &Event) {
        match event {
            Event::TimeAdvanced { .. } | Event::ProjectilesFired { .. } => {}
            Event::EnemyDied { .. } => self.tally.kills += 1,
            Event::MapCleared { .. } => self.tally.maps_cleared += 1,
            Event::PlayerDamaged { amount, remaining } => {
                self.tally.damage_taken += amount;
                debug!(amount, remaining, "player hit");
            }
            Event::WeaponPurchased { .. } | Event::WeaponUpgraded { .. } | Event::MedkitPurchased { .. } => {
                self.tally.purchases += 1;
                info!(?event, "shop");
            }
            other => debug!(event = ?other, "world event"),
        }
    }
}

/// Chases the nearest living enemy, or walks to the open portal or exit.
pub(crate) fn autopilot_intent(world: &World) -> PlayerIntent {
    let player = query::player(world);
    let center = player.center();
    let wields_melee = matches!(player.equipped(), Some(Weapon::Melee(_)));

    let nearest = query::enemy_view(world)
        .into_iter()
        .filter(|enemy| enemy.alive)
        .map(|enemy| enemy.center)
        .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)));

    if let Some(target) = nearest {
        if wields_melee {
            let movement = if target.distance(center) > MELEE_APPROACH {
                target - center
            } else {
                Vec2::ZERO
            };
            return PlayerIntent::aim_at(target).swinging().moving(movement);
        }
        return PlayerIntent::aim_at(target).firing();
    }

    match query::portal(world).or_else(|| query::exit(world)) {
        Some(region) => PlayerIntent::aim_at(region.center()).moving(region.center() - center),
        None => PlayerIntent::aim_at(center),
    }
}

/// Decides what to buy: a medkit when hurt, then the first affordable ranged
/// weapon not yet owned, then upgrades for the equipped gun.
pub(crate) fn shopping_list(offers: &[Offer], money: u32, hurt: bool) -> Vec<ShopAction> {
    let mut budget = money;
    let mut actions = Vec::new();

    if hurt {
        if let Some(row) = offers.iter().position(|offer| offer.kind == OfferKind::Medkit) {
            if budget >= offers[row].cost {
                budget -= offers[row].cost;
                actions.push(ShopAction::Buy(row));
            }
        }
    }

    let gun = offers.iter().position(|offer| {
        !offer.owned
            && matches!(offer.kind, OfferKind::Weapon(WeaponKind::Ranged))
            && offer.cost <= budget
    });
    if let Some(row) = gun {
        actions.push(ShopAction::Buy(row));
        return actions;
    }

    if let Some(row) = offers.iter().position(|offer| offer.equipped) {
        if let Some(cost) = offers[row].next_upgrade_cost.filter(|cost| *cost <= budget) {
            budget -= cost;
            actions.push(ShopAction::Upgrade(row));
        }
    }
    debug!(budget, planned = actions.len(), "shopping list");
    actions
}
