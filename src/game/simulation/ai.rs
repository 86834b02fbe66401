/// Per-tick world snapshot and troop decision making.

use bevy::prelude::*;
use rand::Rng;

use crate::game::collision::{resolve_position, DynamicBody};
use crate::game::config::SimConfig;
use crate::game::terrain::surface_point;
use crate::game::arena::Arena;

use super::components::{
    AreaEffect, CollisionRadius, CombatState, Dead, Facing, HazardKind, Health, Hero, HeroStatus,
    Projectile, ProjectileAim, MatchEntity, Rallying, SimPosition, StatusEffects, StructureKind,
    Team, Troop, TroopKind, UnitLevel,
};
use super::damage::apply_hit;
use super::events::KillEvent;
use super::resources::{
    DeferredAction, DeferredActions, SimClock, SnapshotEntry, WorldSnapshot,
};

/// Rebuilds the immutable view every decision this tick reads from.
/// Everyone targets and collides against the same frozen state, so tick
/// order between units never changes who they see.
pub fn build_snapshot(
    mut snapshot: ResMut<WorldSnapshot>,
    units: Query<
        (
            Entity,
            &Team,
            &SimPosition,
            &CollisionRadius,
            Option<&StructureKind>,
            Option<&Hero>,
            Option<&HeroStatus>,
        ),
        Without<Dead>,
    >,
    zones: Query<(&AreaEffect, &SimPosition)>,
) {
    snapshot.clear();
    for (entity, team, pos, radius, structure, hero, status) in &units {
        snapshot.entries.push(SnapshotEntry {
            entity,
            team: *team,
            pos: pos.0,
            radius: radius.0,
            structure: structure.copied(),
            hero: hero.is_some(),
            invisible: status.is_some_and(|s| s.invisible),
        });
        snapshot.bodies.push(DynamicBody {
            entity,
            team: *team,
            pos: pos.0,
            radius: radius.0,
            gate: structure == Some(&StructureKind::Gate),
        });
    }
    for (zone, pos) in &zones {
        if zone.kind == HazardKind::FireWall {
            snapshot.fire_walls.push((pos.0, zone.radius));
        }
    }
}

/// Attack reach for a troop against a given target.
fn attack_range(config: &SimConfig, kind: TroopKind, target: &SnapshotEntry) -> f32 {
    if target.structure.is_some() {
        return config.structure_range;
    }
    let base = if kind.is_ranged() {
        config.ranged_range
    } else {
        config.melee_range
    };
    base * kind.range_multiplier()
}

/// Troop brain: pick the nearest visible enemy, close to range, swing.
/// Rallying lancers instead hold the rally line until released, breaking
/// off only to defend themselves at point-blank.
#[allow(clippy::too_many_arguments)]
pub fn troop_ai(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    arena: Res<Arena>,
    snapshot: Res<WorldSnapshot>,
    mut deferred: ResMut<DeferredActions>,
    mut kills: MessageWriter<KillEvent>,
    mut troops: Query<
        (
            Entity,
            &TroopKind,
            &Team,
            &UnitLevel,
            &mut SimPosition,
            &mut Facing,
            &mut CombatState,
            &StatusEffects,
            &CollisionRadius,
            Option<&Rallying>,
        ),
        (With<Troop>, Without<Dead>),
    >,
    mut victims: Query<
        (
            &Team,
            Option<&StructureKind>,
            Option<&Hero>,
            Option<&HeroStatus>,
            &mut Health,
        ),
        Without<Dead>,
    >,
) {
    let dt = config.tick_dt();
    let mut rng = rand::rng();

    for (entity, kind, team, level, mut pos, mut facing, mut combat, status, radius, rallying) in
        &mut troops
    {
        // Nearest live, visible opponent.
        let mut nearest: Option<(&SnapshotEntry, f32)> = None;
        for target in snapshot.targets_for(*team) {
            let dist = pos.0.distance(target.pos);
            if nearest.is_none_or(|(_, best)| dist < best) {
                nearest = Some((target, dist));
            }
        }
        let Some((target, dist)) = nearest else {
            combat.moving = false;
            combat.attacking = false;
            continue;
        };

        if rallying.is_some() {
            if dist < config.rally_self_defense_radius {
                // Cornered: drop the hold and fight this tick.
                commands.entity(entity).remove::<Rallying>();
            } else {
                let line_z = config.rally_line_z * team.home_sign();
                let dz = line_z - pos.0.y;
                combat.attacking = false;
                if dz.abs() > 1.0 {
                    combat.moving = true;
                    let speed = config.troop_speed * TroopKind::Lancer.speed_factor();
                    let step = Vec2::new(0.0, dz.signum() * speed * dt);
                    facing.0 = f32::atan2(0.0, dz.signum());
                    pos.0 = resolve_position(
                        pos.0 + step,
                        radius.0,
                        entity,
                        *team,
                        &arena,
                        &snapshot.fire_walls,
                        &snapshot.bodies,
                        config.bound,
                    );
                } else {
                    // Holding at the line still yields to neighbors.
                    combat.moving = false;
                    pos.0 = resolve_position(
                        pos.0,
                        radius.0,
                        entity,
                        *team,
                        &arena,
                        &snapshot.fire_walls,
                        &snapshot.bodies,
                        config.bound,
                    );
                }
                continue;
            }
        }

        let range = attack_range(&config, *kind, target);
        let to_target = target.pos - pos.0;

        if dist > range {
            combat.moving = true;
            combat.attacking = false;
            let level_bonus = 1.0 + (level.0.saturating_sub(1)) as f32 * config.level_speed_step;
            let speed =
                config.troop_speed * kind.speed_factor() * level_bonus * status.speed_multiplier;
            let step = to_target.normalize_or_zero() * speed * dt;
            facing.0 = f32::atan2(to_target.x, to_target.y);
            pos.0 = resolve_position(
                pos.0 + step,
                radius.0,
                entity,
                *team,
                &arena,
                &snapshot.fire_walls,
                &snapshot.bodies,
                config.bound,
            );
            continue;
        }

        // In range: hold position (still pushed around by neighbors) and swing.
        combat.moving = false;
        facing.0 = f32::atan2(to_target.x, to_target.y);
        pos.0 = resolve_position(
            pos.0,
            radius.0,
            entity,
            *team,
            &arena,
            &snapshot.fire_walls,
            &snapshot.bodies,
            config.bound,
        );

        let jitter = rng.random_range(0.0..config.attack_jitter_ms);
        if clock.now_ms - combat.last_attack_ms < config.attack_cooldown_ms + jitter {
            continue;
        }
        combat.last_attack_ms = clock.now_ms;
        combat.attacking = true;
        deferred.schedule(
            clock.now_ms + config.attack_anim_ms,
            DeferredAction::ClearAttacking(entity),
        );

        let damage = kind.damage(level.0);
        if kind.is_ranged() {
            // Loose an arrow that chases its mark.
            let start = surface_point(pos.0) + Vec3::Y;
            let target_pos = surface_point(target.pos) + Vec3::Y;
            commands.spawn((
                MatchEntity,
                Projectile {
                    owner_team: *team,
                    aim: ProjectileAim::Homing(target.entity),
                    start,
                    target_pos,
                    pos: start,
                    progress: 0.0,
                    speed: config.arrow_speed,
                    damage,
                    hit_radius: 0.0,
                    blast_radius: None,
                    payload: None,
                },
            ));
        } else if let Ok((victim_team, structure, hero, hero_status, mut health)) =
            victims.get_mut(target.entity)
        {
            let mut amount = damage;
            if hero.is_some() {
                if hero_status.is_some_and(|s| s.invincible) {
                    continue;
                }
                amount = (amount * 0.5).floor();
            }
            apply_hit(
                &mut commands,
                &mut kills,
                clock.now_ms,
                target.entity,
                *victim_team,
                structure.copied(),
                &mut health,
                amount,
                *team,
                false,
            );
        }
    }
}
