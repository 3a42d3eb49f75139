#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Between-map shop: lists what is for sale and turns selections into
//! world commands.
//!
//! The shop owns no money or inventory. It reads the player's
//! [`LoadoutView`] and the [`Catalog`], and the world remains the authority
//! that accepts or rejects each emitted command.

use survival_core::{Catalog, Command, Event, LoadoutView, SessionPhase, WeaponKind};

/// What a shop row sells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferKind {
    /// A weapon of the given capability.
    Weapon(WeaponKind),
    /// A consumable heal.
    Medkit,
}

/// A single row of the shop listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    /// Display name.
    pub name: String,
    /// What the row sells.
    pub kind: OfferKind,
    /// Purchase price.
    pub cost: u32,
    /// Whether the player already owns this weapon.
    pub owned: bool,
    /// Whether this weapon is the one in hand.
    pub equipped: bool,
    /// Current upgrade level of an owned ranged weapon.
    pub upgrade_level: u32,
    /// Price of the next upgrade, `None` when not upgradable or maxed out.
    pub next_upgrade_cost: Option<u32>,
    /// Whether the player can pay the purchase price.
    pub affordable: bool,
}

/// Player action on a shop row, or leaving the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopAction {
    /// Buy the weapon or medkit on the row.
    Buy(usize),
    /// Upgrade the weapon on the row.
    Upgrade(usize),
    /// Equip the owned weapon on the row.
    Equip(usize),
    /// Continue to the next map.
    Leave,
}

/// Pure system tracking whether the shop is open and translating actions.
#[derive(Debug, Default)]
pub struct Shop {
    open: bool,
}

impl Shop {
    /// Creates a closed shop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is currently between maps.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Consumes world events to follow the session phase.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::SessionPhaseChanged { phase } = event {
                self.open = *phase == SessionPhase::Shopping;
            }
        }
    }

    /// Lists every catalog weapon followed by the medkit.
    #[must_use]
    pub fn offers(&self, loadout: &LoadoutView, catalog: &Catalog) -> Vec<Offer> {
        if !self.open {
            return Vec::new();
        }

        let equipped = loadout
            .slots
            .get(loadout.equipped_index)
            .map(|slot| slot.name.as_str());

        let mut offers: Vec<Offer> = catalog
            .weapons
            .iter()
            .map(|spec| {
                let name = spec.name();
                let slot = loadout.slot(name);
                let upgrade_level = slot.map_or(0, |slot| slot.upgrade_level);
                let next_upgrade_cost = match (slot, spec.kind()) {
                    (Some(_), WeaponKind::Ranged) => catalog
                        .upgrade_table(name)
                        .and_then(|table| table.next_cost(upgrade_level)),
                    _ => None,
                };
                Offer {
                    name: name.to_owned(),
                    kind: OfferKind::Weapon(spec.kind()),
                    cost: spec.cost(),
                    owned: slot.is_some(),
                    equipped: equipped.is_some_and(|held| held.eq_ignore_ascii_case(name)),
                    upgrade_level,
                    next_upgrade_cost,
                    affordable: loadout.money >= spec.cost(),
                }
            })
            .collect();

        offers.push(Offer {
            name: "Medkit".to_owned(),
            kind: OfferKind::Medkit,
            cost: catalog.medkit.cost,
            owned: false,
            equipped: false,
            upgrade_level: 0,
            next_upgrade_cost: None,
            affordable: loadout.money >= catalog.medkit.cost,
        });
        offers
    }

    /// Translates a shop action into the world command it requests.
    ///
    /// Nothing is emitted while the shop is closed, for rows that do not
    /// exist, or for actions that make no sense on the row (upgrading the
    /// medkit, equipping a weapon that is not owned). Affordability is left
    /// to the world so that rejections are reported as events.
    pub fn select(
        &self,
        action: ShopAction,
        loadout: &LoadoutView,
        catalog: &Catalog,
        out: &mut Vec<Command>,
    ) {
        if !self.open {
            return;
        }

        let medkit_row = catalog.weapons.len();
        match action {
            ShopAction::Leave => out.push(Command::AdvanceMap),
            ShopAction::Buy(row) if row == medkit_row => out.push(Command::BuyMedkit),
            ShopAction::Buy(row) => {
                if let Some(spec) = catalog.weapons.get(row) {
                    out.push(Command::BuyWeapon {
                        name: spec.name().to_owned(),
                    });
                }
            }
            ShopAction::Upgrade(row) => {
                if let Some(spec) = catalog.weapons.get(row) {
                    out.push(Command::UpgradeWeapon {
                        name: spec.name().to_owned(),
                    });
                }
            }
            ShopAction::Equip(row) => {
                let Some(spec) = catalog.weapons.get(row) else {
                    return;
                };
                let index = loadout
                    .slots
                    .iter()
                    .position(|slot| slot.name.eq_ignore_ascii_case(spec.name()));
                if let Some(index) = index {
                    out.push(Command::EquipWeapon { index });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_core::LoadoutSlot;

    fn loadout(money: u32) -> LoadoutView {
        LoadoutView {
            money,
            health: 100,
            max_health: 100,
            equipped_index: 0,
            slots: vec![LoadoutSlot {
                name: "Basic Pistol".to_owned(),
                kind: WeaponKind::Ranged,
                upgrade_level: 0,
            }],
        }
    }

    fn open_shop() -> Shop {
        let mut shop = Shop::new();
        shop.handle(&[Event::SessionPhaseChanged {
            phase: SessionPhase::Shopping,
        }]);
        shop
    }

    #[test]
    fn closed_shop_offers_nothing() {
        let shop = Shop::new();
        let catalog = Catalog::standard();
        assert!(shop.offers(&loadout(1000), &catalog).is_empty());

        let mut out = Vec::new();
        shop.select(ShopAction::Leave, &loadout(1000), &catalog, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn shop_closes_when_play_resumes() {
        let mut shop = open_shop();
        assert!(shop.is_open());
        shop.handle(&[Event::SessionPhaseChanged {
            phase: SessionPhase::Playing,
        }]);
        assert!(!shop.is_open());
    }

    #[test]
    fn offers_reflect_ownership_and_prices() {
        let shop = open_shop();
        let catalog = Catalog::standard();
        let offers = shop.offers(&loadout(200), &catalog);

        assert_eq!(offers.len(), catalog.weapons.len() + 1);

        let pistol = &offers[0];
        assert!(pistol.owned && pistol.equipped);
        assert_eq!(pistol.next_upgrade_cost, Some(120));

        let shotgun = offers.iter().find(|offer| offer.name == "Shotgun").expect("listed");
        assert!(!shotgun.owned);
        assert!(!shotgun.affordable);
        assert_eq!(shotgun.next_upgrade_cost, None);

        let medkit = offers.last().expect("medkit row");
        assert_eq!(medkit.kind, OfferKind::Medkit);
        assert_eq!(medkit.cost, 120);
        assert!(medkit.affordable);
    }

    #[test]
    fn actions_map_to_commands() {
        let shop = open_shop();
        let catalog = Catalog::standard();
        let view = loadout(0);
        let medkit_row = catalog.weapons.len();

        let mut out = Vec::new();
        shop.select(ShopAction::Buy(1), &view, &catalog, &mut out);
        shop.select(ShopAction::Buy(medkit_row), &view, &catalog, &mut out);
        shop.select(ShopAction::Upgrade(0), &view, &catalog, &mut out);
        shop.select(ShopAction::Equip(0), &view, &catalog, &mut out);
        shop.select(ShopAction::Equip(1), &view, &catalog, &mut out);
        shop.select(ShopAction::Buy(medkit_row + 1), &view, &catalog, &mut out);
        shop.select(ShopAction::Leave, &view, &catalog, &mut out);

        assert_eq!(
            out,
            vec![
                Command::BuyWeapon {
                    name: catalog.weapons[1].name().to_owned()
                },
                Command::BuyMedkit,
                Command::UpgradeWeapon {
                    name: "Basic Pistol".to_owned()
                },
                Command::EquipWeapon { index: 0 },
                Command::AdvanceMap,
            ]
        );
    }
}
