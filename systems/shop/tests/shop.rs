use survival_core::{
    Command, Event, PlayerIntent, PlayerSnapshot, PurchaseError, Rect, SessionPhase, ShopItem,
    DEFAULT_FRAME,
};
use survival_system_shop::{ShopAction, Shop};
use survival_world::{self as world, query, World};

fn apply_all(world: &mut World, shop: &mut Shop, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    shop.handle(&events);
    events
}

fn enter_shop(world: &mut World, shop: &mut Shop) {
    let center = query::player(world).center();
    let region = Rect::from_center(center, glam::Vec2::splat(52.0));
    let _ = apply_all(
        world,
        shop,
        vec![
            Command::StartSession,
            Command::OpenPortal { region },
            Command::Tick {
                dt: DEFAULT_FRAME,
                intent: PlayerIntent::default(),
            },
        ],
    );
    assert_eq!(query::phase(world), SessionPhase::Shopping);
    assert!(shop.is_open());
}

fn select(world: &mut World, shop: &mut Shop, action: ShopAction) -> Vec<Event> {
    let loadout = query::loadout(world);
    let catalog = query::catalog(world).clone();
    let mut commands = Vec::new();
    shop.select(action, &loadout, &catalog, &mut commands);
    apply_all(world, shop, commands)
}

#[test]
fn broke_player_cannot_buy() {
    let mut world = World::new();
    let mut shop = Shop::new();
    enter_shop(&mut world, &mut shop);

    let events = select(&mut world, &mut shop, ShopAction::Buy(1));
    assert_eq!(
        events,
        vec![Event::PurchaseRejected {
            item: ShopItem::Weapon("Shotgun".to_owned()),
            reason: PurchaseError::InsufficientFunds,
        }]
    );
    assert_eq!(query::loadout(&world).slots.len(), 1);
    assert_eq!(query::loadout(&world).money, 0);
}

#[test]
fn buying_and_upgrading_spends_money() {
    let mut world = World::new();
    world
        .restore_player(&PlayerSnapshot {
            money: 1484,
            inventory: vec!["Basic Pistol".to_owned()],
            ..PlayerSnapshot::default()
        })
        .expect("valid snapshot");
    let mut shop = Shop::new();
    enter_shop(&mut world, &mut shop);

    let events = select(&mut world, &mut shop, ShopAction::Buy(1));
    assert!(events.contains(&Event::WeaponPurchased {
        name: "Shotgun".to_owned(),
        cost: 250,
    }));
    assert!(events.contains(&Event::WeaponEquipped {
        index: 1,
        name: "Shotgun".to_owned(),
    }));

    let events = select(&mut world, &mut shop, ShopAction::Upgrade(1));
    assert_eq!(
        events,
        vec![Event::WeaponUpgraded {
            name: "Shotgun".to_owned(),
            level: 1,
            cost: 180,
        }]
    );

    let snapshot = query::player_snapshot(&world);
    assert_eq!(snapshot.money, 1054);
    assert_eq!(snapshot.weapon_levels.get("Shotgun"), Some(&1));

    let offers = shop.offers(&query::loadout(&world), query::catalog(&world));
    let shotgun = &offers[1];
    assert!(shotgun.owned && shotgun.equipped);
    assert_eq!(shotgun.upgrade_level, 1);
    assert_eq!(shotgun.next_upgrade_cost, Some(260));

    let events = select(&mut world, &mut shop, ShopAction::Buy(1));
    assert_eq!(
        events,
        vec![Event::PurchaseRejected {
            item: ShopItem::Weapon("Shotgun".to_owned()),
            reason: PurchaseError::AlreadyOwned,
        }]
    );
}

#[test]
fn melee_weapons_cannot_be_upgraded() {
    let mut world = World::new();
    world
        .restore_player(&PlayerSnapshot {
            money: 500,
            inventory: vec!["Basic Pistol".to_owned(), "Cleaver".to_owned()],
            ..PlayerSnapshot::default()
        })
        .expect("valid snapshot");
    let mut shop = Shop::new();
    enter_shop(&mut world, &mut shop);

    let cleaver_row = query::catalog(&world)
        .weapons
        .iter()
        .position(|spec| spec.name() == "Cleaver")
        .expect("cleaver listed");
    let events = select(&mut world, &mut shop, ShopAction::Upgrade(cleaver_row));
    assert_eq!(
        events,
        vec![Event::PurchaseRejected {
            item: ShopItem::Upgrade("Cleaver".to_owned()),
            reason: PurchaseError::NotUpgradable,
        }]
    );

    let events = select(&mut world, &mut shop, ShopAction::Equip(cleaver_row));
    assert_eq!(
        events,
        vec![Event::WeaponEquipped {
            index: 1,
            name: "Cleaver".to_owned(),
        }]
    );
    assert_eq!(query::loadout(&world).money, 500);
}

#[test]
fn leaving_enters_next_map_and_closes_shop() {
    let mut world = World::new();
    let mut shop = Shop::new();
    enter_shop(&mut world, &mut shop);

    let events = select(&mut world, &mut shop, ShopAction::Leave);
    assert!(events.contains(&Event::MapEntered {
        map: 1,
        is_final: false,
    }));
    assert!(!shop.is_open());
    assert_eq!(query::phase(&world), SessionPhase::Playing);
}
