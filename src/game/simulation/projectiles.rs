/// Projectile flight and impact resolution.
///
/// Distance checks are ground-plane only; the vertical arc is cosmetic.

use bevy::prelude::*;

use crate::game::config::SimConfig;

use super::components::{
    AreaEffect, Dead, Health, Hero, HeroStatus, MatchEntity, Projectile, ProjectileAim,
    SimPosition, StructureKind, Team,
};
use super::damage::apply_hit;
use super::events::KillEvent;
use super::resources::SimClock;

fn ground_distance(a: Vec3, b: Vec2) -> f32 {
    Vec2::new(a.x, a.z).distance(b)
}

/// Advances every projectile one step, then resolves any that arrive.
///
/// Directional shots detonate on the first body within their hit radius or
/// at the end of their path, splashing everything inside the blast radius
/// and dropping their hazard payload. Homing arrows deliver their damage at
/// the end of flight if the mark is still alive, wherever it has moved.
#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles(
    mut commands: Commands,
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut kills: MessageWriter<KillEvent>,
    mut projectiles: Query<(Entity, &mut Projectile)>,
    positions: Query<(Entity, &Team, &SimPosition, Option<&Hero>), Without<Dead>>,
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
    crate::profile_log!(clock.tick, "Stepping {} projectiles", projectiles.iter().count());

    for (entity, mut shot) in &mut projectiles {
        shot.progress = (shot.progress + shot.speed * config.projectile_step * dt).min(1.0);
        shot.pos = shot.start.lerp(shot.target_pos, shot.progress);

        match shot.aim {
            ProjectileAim::Directional => {
                let mut hit = shot.progress >= 1.0;
                if !hit {
                    for (_, team, pos, hero) in &positions {
                        if *team == shot.owner_team || hero.is_some() {
                            continue;
                        }
                        if ground_distance(shot.pos, pos.0) < shot.hit_radius {
                            hit = true;
                            break;
                        }
                    }
                }
                if !hit {
                    continue;
                }
                let boom = Vec2::new(shot.pos.x, shot.pos.z);
                if let Some(blast) = shot.blast_radius {
                    // Collect first; the damage query conflicts with the scan.
                    let caught: Vec<Entity> = positions
                        .iter()
                        .filter(|(_, team, pos, _)| {
                            **team != shot.owner_team && pos.0.distance(boom) <= blast
                        })
                        .map(|(e, ..)| e)
                        .collect();
                    for victim in caught {
                        if let Ok((victim_team, structure, hero, status, mut health)) =
                            victims.get_mut(victim)
                        {
                            let mut amount = shot.damage;
                            if hero.is_some() {
                                if status.is_some_and(|s| s.invincible) {
                                    continue;
                                }
                                amount = (amount * 0.5).floor();
                            }
                            apply_hit(
                                &mut commands,
                                &mut kills,
                                clock.now_ms,
                                victim,
                                *victim_team,
                                structure.copied(),
                                &mut health,
                                amount,
                                shot.owner_team,
                                true,
                            );
                        }
                    }
                }
                if let Some(kind) = shot.payload {
                    commands.spawn((
                        MatchEntity,
                        SimPosition(boom),
                        AreaEffect {
                            kind,
                            radius: kind.radius(),
                            created_ms: clock.now_ms,
                            expires_ms: clock.now_ms + kind.duration_ms(),
                        },
                    ));
                }
                commands.entity(entity).despawn();
            }
            ProjectileAim::Homing(target) => {
                if shot.progress < 1.0 {
                    continue;
                }
                if let Ok((victim_team, structure, hero, status, mut health)) =
                    victims.get_mut(target)
                {
                    let mut amount = shot.damage;
                    let mut blocked = false;
                    if hero.is_some() {
                        if status.is_some_and(|s| s.invincible) {
                            blocked = true;
                        }
                        amount = (amount * 0.5).floor();
                    }
                    if !blocked {
                        apply_hit(
                            &mut commands,
                            &mut kills,
                            clock.now_ms,
                            target,
                            *victim_team,
                            structure.copied(),
                            &mut health,
                            amount,
                            shot.owner_team,
                            false,
                        );
                    }
                }
                commands.entity(entity).despawn();
            }
        }
    }
}
