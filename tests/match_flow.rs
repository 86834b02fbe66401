// Match lifecycle: spawners, economy, upgrades, rally muster, hero death
// and the victory trigger.

use bevy::prelude::*;

use bulwark::game::arena::Arena;
use bulwark::game::config::SimConfig;
use bulwark::game::simulation::*;
use bulwark::game::GamePlugin;

fn new_match_with_spawners() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(GamePlugin);
    app.add_systems(
        Startup,
        |mut starts: MessageWriter<StartMatchCommand>| {
            starts.write(StartMatchCommand { difficulty: 1 });
        },
    );
    app.update();
    app.world_mut().resource_mut::<Arena>().statics.clear();
    app
}

/// Spawners silenced so scenarios only contain what the test places.
fn new_match() -> App {
    let mut app = new_match_with_spawners();
    app.world_mut().resource_mut::<SimConfig>().troop_cap = 0;
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn spawn_troop_at(app: &mut App, team: Team, kind: TroopKind, level: u32, pos: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            MatchEntity,
            Troop,
            kind,
            team,
            SimPosition(pos),
            Facing(0.0),
            Health::new(kind.max_hp(level)),
            UnitLevel(level),
            CollisionRadius(kind.radius()),
            CombatState::default(),
            StatusEffects::default(),
        ))
        .id()
}

fn hero_entity(app: &mut App) -> Entity {
    let world = app.world_mut();
    let mut query = world.query_filtered::<Entity, With<Hero>>();
    query.single(world).unwrap()
}

fn find_structure(app: &mut App, wanted: StructureKind, team: Team) -> Entity {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &StructureKind, &Team)>();
    query
        .iter(world)
        .find(|(_, kind, t)| **kind == wanted && **t == team)
        .map(|(entity, ..)| entity)
        .unwrap()
}

#[test]
fn spawners_field_one_of_each_kind_per_side() {
    let mut app = new_match_with_spawners();

    // First wave lands once the base interval elapses.
    run_ticks(&mut app, 105);

    let stats = app.world().resource::<MatchStats>();
    assert_eq!(stats.troop_counts[Team::Ally.index()], [1, 1, 1, 1]);
    assert_eq!(stats.troop_counts[Team::Enemy.index()], [1, 1, 1, 1]);
}

#[test]
fn kills_pay_gold_and_refund_hero_mana() {
    let mut app = new_match();
    let hero = hero_entity(&mut app);
    app.world_mut().get_mut::<Mana>(hero).unwrap().current = 50.0;
    let victim =
        spawn_troop_at(&mut app, Team::Enemy, TroopKind::Warrior, 1, Vec2::new(1.0, 60.0));
    app.world_mut().get_mut::<Health>(victim).unwrap().current = 1.0;
    app.world_mut().resource_mut::<HeroInput>().attacking = true;

    run_ticks(&mut app, 40);

    let economy = app.world().resource::<Economy>();
    assert_eq!(economy.gold[Team::Ally.index()], 15);
    assert_eq!(economy.kills[Team::Ally.index()], 1);
    let mana = app.world().get::<Mana>(hero).unwrap();
    assert_eq!(mana.current, 60.0);
}

#[test]
fn upgrades_cost_gold_and_scale_the_hero() {
    let mut app = new_match();
    let hero = hero_entity(&mut app);
    app.world_mut().resource_mut::<Economy>().gold[Team::Ally.index()] = 150;

    app.world_mut().write_message(UpgradeCommand {
        team: Team::Ally,
        target: UpgradeTarget::HeroLevel,
    });
    run_ticks(&mut app, 1);

    assert_eq!(app.world().resource::<UpgradeState>().hero_level, 2);
    assert_eq!(app.world().resource::<Economy>().gold[0], 50);
    assert_eq!(app.world().get::<Health>(hero).unwrap().max, 120.0);
    assert_eq!(app.world().get::<Mana>(hero).unwrap().max, 120.0);

    // 50 gold is not enough for a second purchase.
    app.world_mut().write_message(UpgradeCommand {
        team: Team::Ally,
        target: UpgradeTarget::HeroLevel,
    });
    run_ticks(&mut app, 1);
    assert_eq!(app.world().resource::<UpgradeState>().hero_level, 2);
    assert_eq!(app.world().resource::<Economy>().gold[0], 50);
}

#[test]
fn difficulty_seeds_enemy_unit_levels() {
    let mut app = new_match();
    app.world_mut()
        .write_message(StartMatchCommand { difficulty: 7 });
    app.update();

    let upgrades = app.world().resource::<UpgradeState>();
    for kind in TroopKind::ALL {
        assert_eq!(upgrades.unit_level(Team::Enemy, kind), 7);
        assert_eq!(upgrades.unit_level(Team::Ally, kind), 1);
    }
}

#[test]
fn destroying_the_enemy_base_wins_after_a_delay() {
    let mut app = new_match();
    let hero = hero_entity(&mut app);
    let base = find_structure(&mut app, StructureKind::Base, Team::Enemy);
    app.world_mut().get_mut::<Health>(base).unwrap().current = 10.0;
    app.world_mut().get_mut::<SimPosition>(hero).unwrap().0 = Vec2::new(0.0, -61.0);
    app.world_mut().resource_mut::<HeroInput>().attacking = true;

    // The first sweep fells the base; the announcement rides a one
    // second delay.
    run_ticks(&mut app, 20);
    assert!(app.world().get::<Dead>(base).is_some());
    assert_eq!(app.world().resource::<MatchOutcome>().0, None);

    run_ticks(&mut app, 20);

    assert_eq!(
        app.world().resource::<MatchOutcome>().0,
        Some(Outcome::Victory)
    );
    assert_eq!(
        app.world().resource::<MatchStats>().outcome,
        Some(Outcome::Victory)
    );
    assert!(app.world().resource::<Economy>().gold[0] >= 500);
}

#[test]
fn hero_death_and_revive_cycle() {
    let mut app = new_match();
    let hero = hero_entity(&mut app);
    app.world_mut().get_mut::<Health>(hero).unwrap().current = 2.0;
    let killer =
        spawn_troop_at(&mut app, Team::Enemy, TroopKind::Warrior, 1, Vec2::new(1.0, 60.0));

    run_ticks(&mut app, 60);

    assert!(app.world().get::<Dead>(hero).is_some());
    assert_eq!(app.world().resource::<Economy>().kills[Team::Enemy.index()], 1);

    // Clear the spawn area so nothing shoves the revived hero off the pad.
    app.world_mut().entity_mut(killer).despawn();
    app.world_mut().write_message(ReviveHeroCommand);
    run_ticks(&mut app, 1);

    assert!(app.world().get::<Dead>(hero).is_none());
    let health = app.world().get::<Health>(hero).unwrap();
    assert_eq!(health.current, health.max);
    assert_eq!(
        app.world().get::<SimPosition>(hero).unwrap().0,
        Vec2::new(0.0, 60.0)
    );
    assert!(app.world().get::<HeroStatus>(hero).unwrap().invincible);

    // The revive grace wears off on its own.
    run_ticks(&mut app, 190);
    assert!(!app.world().get::<HeroStatus>(hero).unwrap().invincible);
}

#[test]
fn holding_lancers_keep_their_separation() {
    let mut app = new_match();
    let left = spawn_troop_at(
        &mut app,
        Team::Ally,
        TroopKind::Lancer,
        1,
        Vec2::new(10.0, 55.3),
    );
    let right = spawn_troop_at(
        &mut app,
        Team::Ally,
        TroopKind::Lancer,
        1,
        Vec2::new(10.1, 55.3),
    );
    for lancer in [left, right] {
        app.world_mut().entity_mut(lancer).insert(Rallying);
    }

    // Both start inside the hold band, overlapping. The hold still runs
    // the corrective pass, so they shove each other apart.
    run_ticks(&mut app, 10);

    let a = app.world().get::<SimPosition>(left).unwrap().0;
    let b = app.world().get::<SimPosition>(right).unwrap().0;
    assert!(
        a.distance(b) >= 1.5,
        "holding lancers should not stack, at {a:?} / {b:?}"
    );
}

#[test]
fn lancers_hold_the_rally_line_until_enough_muster() {
    let mut app = new_match();
    let mut lancers = Vec::new();
    for i in 0..3 {
        let lancer = spawn_troop_at(
            &mut app,
            Team::Ally,
            TroopKind::Lancer,
            1,
            Vec2::new(10.0 + i as f32, 65.0),
        );
        app.world_mut().entity_mut(lancer).insert(Rallying);
        lancers.push(lancer);
    }

    run_ticks(&mut app, 240);

    // Three is not enough: they drift to the rally line and hold.
    for &lancer in &lancers {
        let pos = app.world().get::<SimPosition>(lancer).unwrap().0;
        assert!(
            pos.y > 50.0 && pos.y < 58.0,
            "holding lancer strayed to {pos:?}"
        );
    }

    for i in 0..3 {
        let lancer = spawn_troop_at(
            &mut app,
            Team::Ally,
            TroopKind::Lancer,
            1,
            Vec2::new(10.0 + i as f32, 64.0),
        );
        app.world_mut().entity_mut(lancer).insert(Rallying);
        lancers.push(lancer);
    }

    // Six mustered: the group releases and charges downfield.
    run_ticks(&mut app, 300);
    let deepest = lancers
        .iter()
        .map(|&lancer| app.world().get::<SimPosition>(lancer).unwrap().0.y)
        .fold(f32::INFINITY, f32::min);
    assert!(deepest < 20.0, "released lancers should charge, deepest {deepest}");
}
