//! The player actor: movement, weapons, wallet and persistence.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use survival_core::{
    catalog::DEFAULT_WEAPON,
    geometry::{aim_info, Aim, Bounds, Rect},
    weapon::{hand_mount, MeleeOutcome, MeleeTarget, MuzzleSpec, RangedSpec, RangedWeapon},
    Catalog, EquipError, LoadoutSlot, LoadoutView, Owner, PlayerSnapshot, Projectile,
    PurchaseError, SnapshotError, UpgradeTable, Weapon, WeaponSpec, DIAGONAL_FACTOR,
    PLAYER_MAX_HEALTH, PLAYER_SIZE, PLAYER_SPEED, PLAYER_START,
};
use tracing::debug;

/// The player-controlled actor.
#[derive(Clone, Debug)]
pub struct Player {
    hitbox: Rect,
    health: u32,
    max_health: u32,
    speed: f32,
    money: u32,
    inventory: Vec<Weapon>,
    equipped: usize,
    weapon_levels: BTreeMap<String, u32>,
    last_shot_ms: Option<u64>,
    last_melee_ms: Option<u64>,
    aim: Aim,
}

impl Player {
    /// Creates a player at the session start position holding the default
    /// weapon from `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        let pistol = catalog
            .instantiate(DEFAULT_WEAPON, 0)
            .unwrap_or_else(|_| Weapon::Ranged(starter_pistol()));
        Self::with_inventory(vec![pistol])
    }

    fn with_inventory(inventory: Vec<Weapon>) -> Self {
        Self {
            hitbox: Rect::from_min_size(PLAYER_START, Vec2::splat(PLAYER_SIZE)),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            speed: PLAYER_SPEED,
            money: 0,
            inventory,
            equipped: 0,
            weapon_levels: BTreeMap::new(),
            last_shot_ms: None,
            last_melee_ms: None,
            aim: Aim {
                direction: Vec2::X,
                angle_degrees: 0.0,
                flip: false,
            },
        }
    }

    /// Rebuilds a player from a saved snapshot.
    ///
    /// Weapons are recreated from `catalog`; names it does not know are
    /// dropped. An inventory left empty receives the default weapon.
    ///
    /// # Errors
    ///
    /// Returns the validation failure when the snapshot is inconsistent.
    pub fn from_snapshot(snapshot: &PlayerSnapshot, catalog: &Catalog) -> Result<Self, SnapshotError> {
        snapshot.validate(PLAYER_MAX_HEALTH)?;

        let mut inventory = Vec::with_capacity(snapshot.inventory.len());
        let mut equipped = 0;
        for (index, name) in snapshot.inventory.iter().enumerate() {
            let level = snapshot
                .weapon_levels
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map_or(0, |(_, level)| *level);
            match catalog.instantiate(name, level) {
                Ok(weapon) => {
                    if index == snapshot.equipped_index {
                        equipped = inventory.len();
                    }
                    inventory.push(weapon);
                }
                Err(error) => debug!(%error, "dropping saved weapon"),
            }
        }

        let mut player = if inventory.is_empty() {
            Self::new(catalog)
        } else {
            Self::with_inventory(inventory)
        };
        player.equipped = equipped;
        player.money = snapshot.money;
        if let Some(health) = snapshot.health {
            player.health = health;
        }
        player.weapon_levels = snapshot.weapon_levels.clone();
        Ok(player)
    }

    /// Captures the persistable part of the player's state.
    ///
    /// A dead player is saved without health and restores at full health.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            money: self.money,
            health: (self.health > 0).then_some(self.health),
            equipped_index: self.equipped,
            inventory: self
                .inventory
                .iter()
                .map(|weapon| weapon.name().to_owned())
                .collect(),
            weapon_levels: self.weapon_levels.clone(),
        }
    }

    /// Read-only summary of wallet and inventory.
    #[must_use]
    pub fn loadout(&self) -> LoadoutView {
        LoadoutView {
            money: self.money,
            health: self.health,
            max_health: self.max_health,
            equipped_index: self.equipped,
            slots: self
                .inventory
                .iter()
                .map(|weapon| LoadoutSlot {
                    name: weapon.name().to_owned(),
                    kind: weapon.kind(),
                    upgrade_level: match weapon {
                        Weapon::Ranged(ranged) => ranged.upgrade_level(),
                        Weapon::Melee(_) => 0,
                    },
                })
                .collect(),
        }
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

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Whether the player still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Money available to spend.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Owned weapons in inventory order.
    #[must_use]
    pub fn inventory(&self) -> &[Weapon] {
        &self.inventory
    }

    /// Inventory slot of the equipped weapon.
    #[must_use]
    pub const fn equipped_index(&self) -> usize {
        self.equipped
    }

    /// The equipped weapon.
    #[must_use]
    pub fn equipped(&self) -> Option<&Weapon> {
        self.inventory.get(self.equipped)
    }

    /// Current facing.
    #[must_use]
    pub const fn aim(&self) -> Aim {
        self.aim
    }

    /// Stored upgrade level for a weapon name.
    #[must_use]
    pub fn weapon_level(&self, name: &str) -> u32 {
        self.weapon_levels
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map_or(0, |(_, level)| *level)
    }

    /// Whether a weapon with this name is owned.
    #[must_use]
    pub fn has_weapon(&self, name: &str) -> bool {
        self.find_weapon_index(name).is_some()
    }

    /// Inventory slot of the named weapon.
    #[must_use]
    pub fn find_weapon_index(&self, name: &str) -> Option<usize> {
        self.inventory
            .iter()
            .position(|weapon| weapon.name().eq_ignore_ascii_case(name))
    }

    /// Credits money to the wallet.
    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Moves the hitbox so that its centre sits at `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.hitbox = self.hitbox.with_center(center);
    }

    /// Moves according to a movement intent.
    ///
    /// Each axis only contributes its sign. Diagonal motion is scaled down so
    /// it is not faster than straight motion, and the hitbox stays on screen.
    pub fn steer(&mut self, movement: Vec2, bounds: &Bounds) {
        let axis = |value: f32| {
            if value > 0.0 {
                1.0
            } else if value < 0.0 {
                -1.0
            } else {
                0.0
            }
        };
        let mut delta = Vec2::new(axis(movement.x), axis(movement.y)) * self.speed;
        if delta.x != 0.0 && delta.y != 0.0 {
            delta *= DIAGONAL_FACTOR;
        }
        self.move_by(delta, bounds);
    }

    /// Translates the hitbox and clamps it to the screen.
    pub fn move_by(&mut self, delta: Vec2, bounds: &Bounds) {
        let moved = Rect::from_min_size(self.hitbox.min() + delta, self.hitbox.size());
        self.hitbox = bounds.clamp_rect(moved);
    }

    /// Turns to face `target`, keeping the previous facing when it coincides
    /// with the centre.
    pub fn face(&mut self, target: Vec2) {
        self.aim = aim_info(self.center(), target, self.aim.direction);
    }

    /// Decays the equipped weapon's cosmetic timers.
    pub fn update(&mut self, dt: Duration) {
        if let Some(weapon) = self.inventory.get_mut(self.equipped) {
            weapon.update(dt);
        }
    }

    /// Hand position and aim direction for a shot towards `target`.
    #[must_use]
    pub fn gun_mount(&self, target: Vec2) -> (Vec2, Vec2) {
        let center = self.center();
        let direction = (target - center)
            .try_normalize()
            .unwrap_or(self.aim.direction);
        (hand_mount(center, direction, PLAYER_SIZE), direction)
    }

    /// Fires the equipped ranged weapon towards `target`.
    ///
    /// Returns no projectiles while the cooldown runs or when a melee weapon
    /// is equipped.
    pub fn try_shoot(&mut self, target: Vec2, now_ms: u64) -> Vec<Projectile> {
        let (origin, _) = self.gun_mount(target);
        let Some(Weapon::Ranged(weapon)) = self.inventory.get_mut(self.equipped) else {
            return Vec::new();
        };
        if !cooldown_elapsed(self.last_shot_ms, now_ms, weapon.cooldown_ms()) {
            return Vec::new();
        }
        self.last_shot_ms = Some(now_ms);
        weapon.trigger_fire_visual();
        weapon.fire(origin, target, Owner::Player)
    }

    /// Swings the equipped melee weapon at everything around the player.
    ///
    /// Returns `None` while the cooldown runs or when a ranged weapon is
    /// equipped.
    pub fn try_melee<T, P>(&mut self, now_ms: u64, targets: &mut [T], projectiles: &mut [P]) -> Option<MeleeOutcome>
    where
        T: MeleeTarget,
        P: AsMut<Projectile>,
    {
        let center = self.center();
        let Some(Weapon::Melee(weapon)) = self.inventory.get_mut(self.equipped) else {
            return None;
        };
        if !cooldown_elapsed(self.last_melee_ms, now_ms, weapon.cooldown_ms()) {
            return None;
        }
        self.last_melee_ms = Some(now_ms);
        weapon.trigger_swing_visual();
        Some(weapon.attack(center, targets, projectiles))
    }

    /// Buys a catalog weapon, returning its new inventory slot.
    ///
    /// The bought copy receives any upgrade level already stored for its name.
    ///
    /// # Errors
    ///
    /// Fails when the weapon is unknown, already owned or unaffordable. The
    /// player is left untouched on failure.
    pub fn buy_weapon(&mut self, catalog: &Catalog, name: &str) -> Result<usize, PurchaseError> {
        let spec = catalog.weapon_spec(name).ok_or(PurchaseError::UnknownItem)?;
        if self.has_weapon(spec.name()) {
            return Err(PurchaseError::AlreadyOwned);
        }
        if self.money < spec.cost() {
            return Err(PurchaseError::InsufficientFunds);
        }

        let mut weapon = Weapon::from_spec(spec);
        weapon.apply_upgrade(self.weapon_level(spec.name()), catalog.upgrade_table(spec.name()));
        self.money -= spec.cost();
        self.inventory.push(weapon);
        Ok(self.inventory.len() - 1)
    }

    /// Buys the next upgrade level of an owned ranged weapon, returning the
    /// level reached and the price paid.
    ///
    /// # Errors
    ///
    /// Fails when the weapon is not owned, has no upgrade table, is already at
    /// its highest level or the upgrade is unaffordable.
    pub fn upgrade_weapon(&mut self, catalog: &Catalog, name: &str) -> Result<(u32, u32), PurchaseError> {
        let index = self.find_weapon_index(name).ok_or(PurchaseError::NotOwned)?;
        let canonical = self.inventory[index].name().to_owned();
        let upgradable = matches!(catalog.weapon_spec(&canonical), Some(WeaponSpec::Ranged(_)));
        let table = catalog
            .upgrade_table(&canonical)
            .filter(|_| upgradable)
            .ok_or(PurchaseError::NotUpgradable)?;

        let level = self.weapon_level(&canonical);
        let cost = table.next_cost(level).ok_or(PurchaseError::MaxLevel)?;
        if self.money < cost {
            return Err(PurchaseError::InsufficientFunds);
        }

        self.money -= cost;
        let next = level + 1;
        self.set_weapon_upgrade_level(&canonical, next, Some(table));
        Ok((next, cost))
    }

    /// Stores an upgrade level and re-derives the stats of every owned weapon
    /// with that name.
    pub fn set_weapon_upgrade_level(&mut self, name: &str, level: u32, table: Option<&UpgradeTable>) {
        let key = self
            .weapon_levels
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_owned());
        let _ = self.weapon_levels.insert(key, level);
        for weapon in &mut self.inventory {
            if weapon.name().eq_ignore_ascii_case(name) {
                weapon.apply_upgrade(level, table);
            }
        }
    }

    /// Restores health up to the maximum, returning the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Applies damage, returning the remaining health.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }

    /// Deducts a price from the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::InsufficientFunds`] and leaves the wallet
    /// untouched when the price is too high.
    pub fn spend(&mut self, cost: u32) -> Result<(), PurchaseError> {
        self.money = self
            .money
            .checked_sub(cost)
            .ok_or(PurchaseError::InsufficientFunds)?;
        Ok(())
    }

    /// Switches to the weapon in `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EquipError::InvalidSlot`] when the slot does not exist.
    pub fn equip(&mut self, index: usize) -> Result<&Weapon, EquipError> {
        if index >= self.inventory.len() {
            return Err(EquipError::InvalidSlot);
        }
        self.equipped = index;
        Ok(&self.inventory[index])
    }
}

fn cooldown_elapsed(last_ms: Option<u64>, now_ms: u64, cooldown_ms: u32) -> bool {
    last_ms.map_or(true, |last| now_ms.saturating_sub(last) >= u64::from(cooldown_ms))
}

fn starter_pistol() -> RangedWeapon {
    RangedWeapon::from_spec(&RangedSpec {
        name: DEFAULT_WEAPON.to_owned(),
        cost: 0,
        cooldown_ms: 250,
        damage: 18,
        speed: survival_core::BULLET_SPEED,
        range: 800.0,
        pellets: 1,
        spread: 0.0,
        muzzle: MuzzleSpec::default(),
    })
}
