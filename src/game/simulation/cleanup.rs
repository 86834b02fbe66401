/// Corpse pruning and the externally visible per-tick stats snapshot.

use bevy::prelude::*;

use crate::game::config::SimConfig;

use super::components::{
    Abilities, Dead, Health, Hero, Mana, StructureKind, Team, Troop, TroopKind,
};
use super::resources::{Economy, MatchOutcome, MatchStats, SimClock, UpgradeState};

/// Despawns corpses once their retention window passes. The hero's body
/// stays on the field so a revive has something to bring back.
pub fn prune_dead(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    corpses: Query<(Entity, &Dead), Without<Hero>>,
) {
    for (entity, dead) in &corpses {
        if clock.now_ms - dead.at_ms > config.corpse_retention_ms {
            commands.entity(entity).despawn();
        }
    }
}

/// Refreshes the read-only `MatchStats` resource. This keeps running after
/// the outcome freeze so the final state stays observable.
pub fn update_match_stats(
    economy: Res<Economy>,
    upgrades: Res<UpgradeState>,
    outcome: Res<MatchOutcome>,
    mut stats: ResMut<MatchStats>,
    heroes: Query<(&Health, &Mana, &Abilities, Option<&Dead>), With<Hero>>,
    structures: Query<(&StructureKind, &Team, &Health)>,
    troops: Query<(&Team, &TroopKind), (With<Troop>, Without<Dead>)>,
) {
    if let Ok((health, mana, abilities, dead)) = heroes.single() {
        stats.hero_hp = health.current;
        stats.hero_max_hp = health.max;
        stats.hero_mp = mana.current;
        stats.hero_max_mp = mana.max;
        stats.hero_dead = dead.is_some();
        stats.ability_ready_at_ms = abilities.ready_at_ms.clone();
    }
    stats.hero_level = upgrades.hero_level;
    stats.gold = economy.gold;
    stats.kills = economy.kills;
    stats.outcome = outcome.0;

    stats.troop_counts = [[0; 4]; 2];
    for (team, kind) in &troops {
        stats.troop_counts[team.index()][kind.index()] += 1;
    }
    for (structure, team, health) in &structures {
        match structure {
            StructureKind::Base => stats.base_hp[team.index()] = health.current,
            StructureKind::Gate => stats.gate_hp[team.index()] = health.current,
        }
    }
}
