/// Spawner timers, lancer rally release and the enemy economy brain.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::PI;

use crate::game::arena::spawn_point;
use crate::game::config::SimConfig;

use super::components::{
    CollisionRadius, CombatState, Dead, Facing, Health, MatchEntity, Rallying, SimPosition,
    StatusEffects, Team, Troop, TroopKind, UnitLevel,
};
use super::events::{UpgradeCommand, UpgradeTarget};
use super::resources::{Economy, SimClock, SpawnTimers, UpgradeState};

/// Spawn one troop of `kind` for `team`. Level is baked in at spawn;
/// later upgrades only affect future waves.
pub fn spawn_troop(
    commands: &mut Commands,
    config: &SimConfig,
    rng: &mut impl Rng,
    team: Team,
    kind: TroopKind,
    level: u32,
) -> Entity {
    let jitter = config.spawn_jitter;
    let base = spawn_point(team, kind);
    let pos = base
        + Vec2::new(
            rng.random_range(-jitter..jitter),
            rng.random_range(-jitter..jitter),
        );
    let facing = if team == Team::Ally { PI } else { 0.0 };
    let mut entity = commands.spawn((
        MatchEntity,
        Troop,
        kind,
        team,
        SimPosition(pos),
        Facing(facing),
        Health::new(kind.max_hp(level)),
        UnitLevel(level),
        CollisionRadius(kind.radius()),
        CombatState::default(),
        StatusEffects::default(),
    ));
    // Lancers muster at the rally line until enough of them gather.
    if kind == TroopKind::Lancer {
        entity.insert(Rallying);
    }
    entity.id()
}

/// Per-side, per-kind spawner timers. The cap counts living troops only;
/// a full side keeps its timer running and spawns as soon as room opens up.
pub fn spawn_troops(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    upgrades: Res<UpgradeState>,
    mut timers: ResMut<SpawnTimers>,
    living: Query<&Team, (With<Troop>, Without<Dead>)>,
) {
    let mut counts = [0usize; 2];
    for team in &living {
        counts[team.index()] += 1;
    }

    let mut rng = rand::rng();
    for team in [Team::Ally, Team::Enemy] {
        for kind in TroopKind::ALL {
            let side = team.index();
            let interval = config.spawn_interval_ms(upgrades.spawner_level(team, kind));
            if clock.now_ms - timers.last_spawn_ms[side][kind.index()] < interval {
                continue;
            }
            if counts[side] >= config.troop_cap {
                continue;
            }
            timers.last_spawn_ms[side][kind.index()] = clock.now_ms;
            let level = upgrades.unit_level(team, kind);
            spawn_troop(&mut commands, &config, &mut rng, team, kind, level);
            counts[side] += 1;
        }
    }
}

/// Once a side has mustered enough lancers, the whole group charges.
pub fn release_rallies(
    mut commands: Commands,
    config: Res<SimConfig>,
    rallying: Query<(Entity, &Team), (With<Rallying>, Without<Dead>)>,
) {
    let mut counts = [0usize; 2];
    for (_, team) in &rallying {
        counts[team.index()] += 1;
    }
    for (entity, team) in &rallying {
        if counts[team.index()] >= config.rally_release_count {
            commands.entity(entity).remove::<Rallying>();
        }
    }
}

/// The enemy spends its gold as soon as it can afford to, on a random
/// upgrade. Rejected purchases (spawner at cap) cost nothing, so the
/// gold simply rides to the next tick's roll.
pub fn enemy_auto_upgrade(
    config: Res<SimConfig>,
    economy: Res<Economy>,
    mut upgrades: MessageWriter<UpgradeCommand>,
) {
    if economy.gold[Team::Enemy.index()] < config.upgrade_cost {
        return;
    }
    let mut rng = rand::rng();
    let roll = rng.random_range(0..8usize);
    let kind = TroopKind::ALL[roll % 4];
    let target = if roll < 4 {
        UpgradeTarget::UnitLevel(kind)
    } else {
        UpgradeTarget::SpawnerLevel(kind)
    };
    upgrades.write(UpgradeCommand {
        team: Team::Enemy,
        target,
    });
}
