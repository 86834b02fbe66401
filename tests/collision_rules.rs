// Gate permeability, hazard zones and the slow field, exercised through
// the full pipeline rather than the resolver in isolation.

use bevy::prelude::*;

use bulwark::game::arena::Arena;
use bulwark::game::config::SimConfig;
use bulwark::game::simulation::*;
use bulwark::game::GamePlugin;

fn new_match() -> App {
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

fn spawn_zone(app: &mut App, kind: HazardKind, pos: Vec2, expires_ms: f64) {
    app.world_mut().spawn((
        MatchEntity,
        SimPosition(pos),
        AreaEffect {
            kind,
            radius: kind.radius(),
            created_ms: 0.0,
            expires_ms,
        },
    ));
}

#[test]
fn own_gate_lets_troops_through() {
    let mut app = new_match();
    let runner = spawn_troop_at(&mut app, Team::Ally, TroopKind::Warrior, 1, Vec2::new(0.0, 53.0));

    run_ticks(&mut app, 90);

    let pos = app.world().get::<SimPosition>(runner).unwrap().0;
    assert!(
        pos.y < 45.0,
        "ally warrior should march through its own gate, at {pos:?}"
    );
}

#[test]
fn enemy_troops_cannot_pass_a_standing_gate() {
    let mut app = new_match();
    let attacker =
        spawn_troop_at(&mut app, Team::Enemy, TroopKind::Warrior, 1, Vec2::new(0.0, 44.0));

    run_ticks(&mut app, 150);

    let pos = app.world().get::<SimPosition>(attacker).unwrap().0;
    assert!(pos.y < 46.6, "warrior must stop and siege, at {pos:?}");
    let gate = find_structure(&mut app, StructureKind::Gate, Team::Ally);
    let gate_hp = app.world().get::<Health>(gate).unwrap();
    assert!(gate_hp.current < gate_hp.max, "gate should be under attack");
}

#[test]
fn dead_gate_opens_the_way() {
    let mut app = new_match();
    let gate = find_structure(&mut app, StructureKind::Gate, Team::Ally);
    app.world_mut()
        .entity_mut(gate)
        .insert(Dead { at_ms: 0.0 });
    let attacker =
        spawn_troop_at(&mut app, Team::Enemy, TroopKind::Warrior, 1, Vec2::new(0.0, 44.0));

    run_ticks(&mut app, 150);

    let pos = app.world().get::<SimPosition>(attacker).unwrap().0;
    assert!(
        pos.y > 51.5,
        "with the gate down the courtyard is open, at {pos:?}"
    );
}

#[test]
fn fire_walls_burn_once_then_push_units_out() {
    let mut app = new_match();
    spawn_zone(&mut app, HazardKind::FireWall, Vec2::new(30.0, 0.0), 60_000.0);
    let warrior =
        spawn_troop_at(&mut app, Team::Ally, TroopKind::Warrior, 1, Vec2::new(30.0, 0.5));

    run_ticks(&mut app, 3);

    // One burn tick lands before the resolver expels the warrior.
    let health = app.world().get::<Health>(warrior).unwrap();
    assert_eq!(health.current, 40.0);
    let pos = app.world().get::<SimPosition>(warrior).unwrap().0;
    assert!(
        pos.distance(Vec2::new(30.0, 0.0)) >= 2.9,
        "warrior should be shoved clear of the flames, at {pos:?}"
    );
}

#[test]
fn burn_kills_are_credited_to_the_victims_opponent() {
    let mut app = new_match();
    spawn_zone(&mut app, HazardKind::FireWall, Vec2::new(30.0, 0.0), 60_000.0);
    let victim =
        spawn_troop_at(&mut app, Team::Enemy, TroopKind::Warrior, 1, Vec2::new(30.0, 0.0));
    app.world_mut().get_mut::<Health>(victim).unwrap().current = 10.0;

    run_ticks(&mut app, 2);

    let economy = app.world().resource::<Economy>();
    assert_eq!(economy.kills[0], 1);
    assert_eq!(economy.gold[0], 15);
}

#[test]
fn hazard_zones_expire() {
    let mut app = new_match();
    spawn_zone(&mut app, HazardKind::FireWall, Vec2::new(30.0, 0.0), 1000.0);

    run_ticks(&mut app, 45);

    let world = app.world_mut();
    let mut zones = world.query::<&AreaEffect>();
    assert_eq!(zones.iter(world).count(), 0);
}

#[test]
fn craters_slow_movement() {
    let mut app = new_match();
    spawn_zone(&mut app, HazardKind::Crater, Vec2::new(30.0, 0.0), 60_000.0);
    let walker = spawn_troop_at(&mut app, Team::Ally, TroopKind::Warrior, 1, Vec2::new(30.0, 1.0));

    // Let the slow field take hold, then measure a short march.
    run_ticks(&mut app, 2);
    let before = app.world().get::<SimPosition>(walker).unwrap().0;
    run_ticks(&mut app, 10);
    let after = app.world().get::<SimPosition>(walker).unwrap().0;

    let covered = before.distance(after);
    assert!(
        covered < 1.0,
        "slowed warrior covered {covered} in a third of a second"
    );
    assert!(covered > 0.1, "the crater slows, it does not root");
}

#[test]
fn craters_slow_the_hero_too() {
    let mut app = new_match();
    let hero = hero_entity(&mut app);
    spawn_zone(&mut app, HazardKind::Crater, Vec2::new(0.0, 60.0), 60_000.0);
    app.world_mut().resource_mut::<HeroInput>().move_dir = Vec2::new(0.0, -1.0);

    let before = app.world().get::<SimPosition>(hero).unwrap().0;
    run_ticks(&mut app, 10);
    let after = app.world().get::<SimPosition>(hero).unwrap().0;

    // Full speed would cover 3.0 units in a third of a second.
    let covered = before.distance(after);
    assert!(
        covered < 1.5,
        "slowed hero covered {covered} in a third of a second"
    );
    assert!(covered > 0.5);
}
