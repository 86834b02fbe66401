/// Game layer: arena generation, configuration and the battle simulation.

use bevy::prelude::*;

pub mod arena;
pub mod collision;
pub mod config;
pub mod simulation;
pub mod terrain;

use arena::Arena;
use config::{ConfigPlugin, SimConfig};
use simulation::*;

use std::f32::consts::PI;

/// Top level plugin wiring the whole game together.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((ConfigPlugin, SimulationPlugin))
            .add_message::<StartMatchCommand>()
            .add_systems(Update, start_match);
    }
}

/// Tears down any running match and starts a fresh one.
///
/// Everything carrying `MatchEntity` is despawned, every sim resource is
/// reset, the arena is regenerated, and the hero plus both castles are
/// placed. The requested difficulty seeds the enemy's starting unit levels.
#[allow(clippy::too_many_arguments)]
pub fn start_match(
    mut commands: Commands,
    mut requests: MessageReader<StartMatchCommand>,
    config: Res<SimConfig>,
    existing: Query<Entity, With<MatchEntity>>,
    mut arena: ResMut<Arena>,
    mut clock: ResMut<SimClock>,
    mut input: ResMut<HeroInput>,
    mut economy: ResMut<Economy>,
    mut upgrades: ResMut<UpgradeState>,
    mut spawn_timers: ResMut<SpawnTimers>,
    mut regen: ResMut<RegenTimer>,
    mut outcome: ResMut<MatchOutcome>,
    mut deferred: ResMut<DeferredActions>,
    mut stats: ResMut<MatchStats>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    info!("Starting match at difficulty {}", request.difficulty);

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    *arena = Arena::generate(&config);
    *clock = SimClock::default();
    *input = HeroInput::default();
    *economy = Economy::default();
    *spawn_timers = SpawnTimers::default();
    *regen = RegenTimer::default();
    *outcome = MatchOutcome::default();
    *deferred = DeferredActions::default();
    *stats = MatchStats::default();

    *upgrades = UpgradeState::default();
    let difficulty = request.difficulty.max(1);
    for kind in TroopKind::ALL {
        upgrades.unit_levels[Team::Enemy.index()][kind.index()] = difficulty;
    }

    // The hero starts just inside the home courtyard, facing the field.
    commands.spawn((
        MatchEntity,
        Hero,
        Team::Ally,
        SimPosition(Vec2::new(0.0, config.castle_z - config.hero_spawn_offset)),
        Facing(PI),
        Health::new(config.hero_max_hp(1)),
        Mana {
            current: config.hero_max_mp(1),
            max: config.hero_max_mp(1),
        },
        CollisionRadius(config.hero_radius),
        CombatState::default(),
        StatusEffects::default(),
        HeroStatus::default(),
        Abilities::default(),
    ));

    for team in [Team::Ally, Team::Enemy] {
        let sign = team.home_sign();
        spawn_structure(
            &mut commands,
            &config,
            team,
            StructureKind::Base,
            Vec2::new(0.0, config.castle_z * sign),
            config.base_radius,
        );
        spawn_structure(
            &mut commands,
            &config,
            team,
            StructureKind::Gate,
            Vec2::new(0.0, (config.castle_z - 15.0) * sign),
            config.gate_radius,
        );
    }
}

fn spawn_structure(
    commands: &mut Commands,
    config: &SimConfig,
    team: Team,
    kind: StructureKind,
    pos: Vec2,
    radius: f32,
) {
    commands.spawn((
        MatchEntity,
        kind,
        team,
        SimPosition(pos),
        Facing(if team == Team::Ally { PI } else { 0.0 }),
        Health::new(config.base_hp),
        CollisionRadius(radius),
        StatusEffects::default(),
    ));
}
