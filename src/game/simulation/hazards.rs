/// Ground hazards: fire wall burn ticks and crater slow fields.

use bevy::prelude::*;

use crate::game::config::SimConfig;

use super::components::{
    AreaEffect, CollisionRadius, Dead, HazardKind, Health, Hero, HeroStatus, SimPosition,
    StatusEffects, StructureKind, Team,
};
use super::damage::apply_hit;
use super::events::KillEvent;
use super::resources::SimClock;

/// Removes zones whose lifetime has run out.
pub fn expire_area_effects(
    mut commands: Commands,
    clock: Res<SimClock>,
    zones: Query<(Entity, &AreaEffect)>,
) {
    for (entity, zone) in &zones {
        if clock.now_ms >= zone.expires_ms {
            commands.entity(entity).despawn();
        }
    }
}

/// Applies zone effects to everything standing in them.
///
/// Fire walls burn anything they overlap (structures included) on a fixed
/// interval per victim; the burn is credited to the victim's opponent. The
/// crater slow is recomputed from scratch each tick, so leaving the zone
/// restores full speed with no bookkeeping.
pub fn apply_hazards(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut kills: MessageWriter<KillEvent>,
    zones: Query<(&AreaEffect, &SimPosition)>,
    mut units: Query<
        (
            Entity,
            &Team,
            &SimPosition,
            &CollisionRadius,
            Option<&StructureKind>,
            Option<&Hero>,
            Option<&HeroStatus>,
            &mut Health,
            &mut StatusEffects,
        ),
        Without<Dead>,
    >,
) {
    for (entity, team, pos, radius, structure, hero, hero_status, mut health, mut status) in
        &mut units
    {
        status.speed_multiplier = 1.0;
        let mut burning = false;
        for (zone, zone_pos) in &zones {
            if pos.0.distance(zone_pos.0) >= zone.radius + radius.0 {
                continue;
            }
            match zone.kind {
                HazardKind::Crater => status.speed_multiplier = config.crater_slow_multiplier,
                HazardKind::FireWall => burning = true,
            }
        }
        if !burning {
            continue;
        }
        if hero.is_some() && hero_status.is_some_and(|s| s.invincible) {
            continue;
        }
        if status
            .last_burn_ms
            .is_some_and(|last| clock.now_ms - last < config.burn_interval_ms)
        {
            continue;
        }
        status.last_burn_ms = Some(clock.now_ms);
        apply_hit(
            &mut commands,
            &mut kills,
            clock.now_ms,
            entity,
            *team,
            structure.copied(),
            &mut health,
            config.burn_damage,
            team.opponent(),
            *team == Team::Enemy,
        );
    }
}
