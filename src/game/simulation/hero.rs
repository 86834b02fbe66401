/// Hero control: movement, melee sweep, abilities, revive and regen.

use bevy::prelude::*;
use std::f32::consts::PI;

use crate::game::arena::Arena;
use crate::game::collision::resolve_position;
use crate::game::config::SimConfig;
use crate::game::terrain::surface_point;

use super::components::{
    Abilities, AbilityKind, AreaEffect, CollisionRadius, CombatState, Dead, Facing, HazardKind,
    Health, Hero, HeroStatus, Mana, MatchEntity, Projectile, ProjectileAim, SimPosition,
    StatusEffects, StructureKind, Team,
};
use super::damage::apply_hit;
use super::events::{CastAbilityCommand, KillEvent, LearnAbilityCommand, ReviveHeroCommand};
use super::resources::{
    DeferredAction, DeferredActions, HeroInput, SimClock, UpgradeState, WorldSnapshot,
};

// Body-hit distance of an ability shot mid-flight.
fn shot_hit_radius(ability: AbilityKind) -> f32 {
    match ability {
        AbilityKind::Cannon => 1.5,
        _ => 1.0,
    }
}

/// Moves the hero from player input and swings the melee sweep. The sweep
/// hits every opponent in reach at once; an active invincibility buff
/// doubles its damage.
#[allow(clippy::too_many_arguments)]
pub fn hero_move_and_sweep(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    input: Res<HeroInput>,
    arena: Res<Arena>,
    snapshot: Res<WorldSnapshot>,
    upgrades: Res<UpgradeState>,
    mut kills: MessageWriter<KillEvent>,
    mut heroes: Query<
        (
            Entity,
            &mut SimPosition,
            &mut Facing,
            &mut CombatState,
            &HeroStatus,
            &StatusEffects,
            &CollisionRadius,
        ),
        (With<Hero>, Without<Dead>),
    >,
    mut victims: Query<(&Team, Option<&StructureKind>, &mut Health), Without<Dead>>,
) {
    let Ok((entity, mut pos, mut facing, mut combat, status, effects, radius)) =
        heroes.single_mut()
    else {
        return;
    };
    let dt = config.tick_dt();
    let level = upgrades.hero_level;

    // Movement, rotated into world space by the camera yaw.
    let dir = input.move_dir;
    let mut desired = pos.0;
    if dir.x.abs() > 0.05 || dir.y.abs() > 0.05 {
        let (sin, cos) = input.camera_yaw.sin_cos();
        let world = Vec2::new(dir.x * cos + dir.y * sin, -dir.x * sin + dir.y * cos);
        let level_bonus = 1.0 + (level.saturating_sub(1)) as f32 * config.level_speed_step;
        let speed = config.hero_speed * level_bonus * effects.speed_multiplier;
        desired += world.normalize_or_zero() * speed * dt;
        facing.0 = f32::atan2(world.x, world.y);
        combat.moving = true;
    } else {
        combat.moving = false;
    }
    // Resolve even when standing still: neighbors push the hero around.
    pos.0 = resolve_position(
        desired,
        radius.0,
        entity,
        Team::Ally,
        &arena,
        &snapshot.fire_walls,
        &snapshot.bodies,
        config.bound,
    );

    if !input.attacking {
        combat.attacking = false;
        return;
    }
    combat.attacking = true;
    if clock.now_ms - combat.last_attack_ms < config.attack_cooldown_ms {
        return;
    }
    combat.last_attack_ms = clock.now_ms;

    let mut damage = config.hero_melee_damage(level);
    if status.invincible {
        damage *= 2.0;
    }
    let sweep_range = config.melee_range * config.hero_sweep_multiplier;
    for target in snapshot.targets_for(Team::Ally) {
        let range = if target.structure.is_some() {
            config.structure_range
        } else {
            sweep_range
        };
        if pos.0.distance(target.pos) >= range {
            continue;
        }
        if let Ok((victim_team, structure, mut health)) = victims.get_mut(target.entity) {
            apply_hit(
                &mut commands,
                &mut kills,
                clock.now_ms,
                target.entity,
                *victim_team,
                structure.copied(),
                &mut health,
                damage,
                Team::Ally,
                true,
            );
        }
    }
}

/// Resolves queued ability casts: gate on known/cooldown/mana, then either
/// launch a shot along the hero's facing or start a timed buff.
pub fn cast_abilities(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    upgrades: Res<UpgradeState>,
    mut deferred: ResMut<DeferredActions>,
    mut casts: MessageReader<CastAbilityCommand>,
    mut heroes: Query<
        (&SimPosition, &Facing, &mut Mana, &mut Abilities, &mut HeroStatus),
        (With<Hero>, Without<Dead>),
    >,
) {
    for cast in casts.read() {
        let Ok((pos, facing, mut mana, mut abilities, mut status)) = heroes.single_mut() else {
            return;
        };
        let ability = cast.ability;
        if !abilities.knows(ability) {
            warn!("Cast of unlearned ability {:?} ignored", ability);
            continue;
        }
        let stats = ability.stats();
        if clock.now_ms < abilities.ready_at_ms.get(&ability).copied().unwrap_or(0.0) {
            continue;
        }
        if mana.current < stats.mana_cost {
            continue;
        }
        mana.current -= stats.mana_cost;
        abilities
            .ready_at_ms
            .insert(ability, clock.now_ms + stats.cooldown_ms);

        if ability.is_projectile() {
            let damage =
                stats.damage + (upgrades.hero_level.saturating_sub(1)) as f32
                    * config.ability_damage_per_level;
            let start = surface_point(pos.0) + Vec3::Y * 1.5;
            let dir = Vec3::new(facing.0.sin(), 0.0, facing.0.cos());
            let payload = match ability {
                AbilityKind::Fireball => Some(HazardKind::FireWall),
                AbilityKind::Cannon => Some(HazardKind::Crater),
                _ => None,
            };
            commands.spawn((
                MatchEntity,
                Projectile {
                    owner_team: Team::Ally,
                    aim: ProjectileAim::Directional,
                    start,
                    target_pos: start + dir * config.ability_fire_range,
                    pos: start,
                    progress: 0.0,
                    speed: stats.projectile_speed,
                    damage,
                    hit_radius: shot_hit_radius(ability),
                    blast_radius: Some(stats.blast_radius),
                    payload,
                },
            ));
        } else {
            let until = clock.now_ms + stats.duration_ms;
            match ability {
                AbilityKind::Invisibility => {
                    status.invisible = true;
                    status.invisible_until_ms = until;
                    deferred.schedule(until, DeferredAction::ExpireInvisibility);
                }
                AbilityKind::Invincible => {
                    status.invincible = true;
                    status.invincible_until_ms = until;
                    deferred.schedule(until, DeferredAction::ExpireInvincibility);
                }
                _ => {}
            }
        }
    }
}

/// Unlocks abilities by spending mana.
pub fn learn_abilities(
    mut requests: MessageReader<LearnAbilityCommand>,
    mut heroes: Query<(&mut Mana, &mut Abilities), With<Hero>>,
) {
    for request in requests.read() {
        let Ok((mut mana, mut abilities)) = heroes.single_mut() else {
            return;
        };
        let ability = request.ability;
        if abilities.knows(ability) {
            continue;
        }
        let cost = ability.stats().unlock_cost;
        if mana.current < cost {
            continue;
        }
        mana.current -= cost;
        abilities.learned.push(ability);
        info!("Learned ability {:?}", ability);
    }
}

/// Brings a fallen hero back at the home spawn with full bars, a short
/// invincibility grace, and a cleared battlefield of hazards.
#[allow(clippy::too_many_arguments)]
pub fn revive_hero(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut deferred: ResMut<DeferredActions>,
    mut requests: MessageReader<ReviveHeroCommand>,
    upgrades: Res<UpgradeState>,
    mut heroes: Query<
        (
            Entity,
            &mut SimPosition,
            &mut Facing,
            &mut Health,
            &mut Mana,
            &mut HeroStatus,
        ),
        (With<Hero>, With<Dead>),
    >,
    hazards: Query<Entity, With<AreaEffect>>,
) {
    for _ in requests.read() {
        let Ok((entity, mut pos, mut facing, mut health, mut mana, mut status)) =
            heroes.single_mut()
        else {
            continue;
        };
        commands.entity(entity).remove::<Dead>();
        pos.0 = Vec2::new(0.0, config.castle_z - config.hero_spawn_offset);
        facing.0 = PI;
        health.current = health.max;
        mana.current = mana.max;
        status.invisible = false;
        let grace = AbilityKind::Invincible.stats().duration_ms;
        status.invincible = true;
        status.invincible_until_ms = clock.now_ms + grace;
        deferred.schedule(
            clock.now_ms + grace,
            DeferredAction::ExpireInvincibility,
        );
        for hazard in &hazards {
            commands.entity(hazard).despawn();
        }
        info!("Hero revived at level {}", upgrades.hero_level);
    }
}

/// Slow trickle of hp and mp while the hero is alive.
pub fn hero_regen(
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut timer: ResMut<super::resources::RegenTimer>,
    mut heroes: Query<(&mut Health, &mut Mana), (With<Hero>, Without<Dead>)>,
) {
    if clock.now_ms - timer.last_ms < config.regen_interval_ms {
        return;
    }
    timer.last_ms = clock.now_ms;
    let Ok((mut health, mut mana)) = heroes.single_mut() else {
        return;
    };
    if health.current < health.max {
        health.current = (health.current + config.regen_amount).min(health.max);
    }
    if mana.current < mana.max {
        mana.current = (mana.current + config.regen_amount).min(mana.max);
    }
}
