/// Pure position resolution against battlefield geometry and other bodies.
///
/// Movement systems compute a desired position and then run it through
/// [`resolve_position`], which pushes it out of everything solid in a fixed
/// order: static geometry, the opposing side's front walls, fire walls, then
/// dynamic bodies. Dynamic separation runs at half strength so crowds squeeze
/// past each other instead of deadlocking; live enemy gates are the one
/// dynamic body treated as a solid rectangle.

use bevy::prelude::*;

use super::arena::{gate_rect, Arena, ObstacleShape, RectCollider};
use super::simulation::components::Team;

/// Dynamic separation damping. Below 1.0 bodies overlap briefly under
/// pressure rather than jittering.
const DYNAMIC_PUSH: f32 = 0.5;

/// Snapshot of one live body for the collision pass.
#[derive(Debug, Clone, Copy)]
pub struct DynamicBody {
    pub entity: Entity,
    pub team: Team,
    pub pos: Vec2,
    pub radius: f32,
    pub gate: bool,
}

/// Push `pos` out of a solid circle. `strength` scales the correction.
pub fn resolve_circle_circle(
    pos: Vec2,
    radius: f32,
    center: Vec2,
    obstacle_radius: f32,
    strength: f32,
) -> Vec2 {
    let min_dist = radius + obstacle_radius;
    let delta = pos - center;
    let dist_sq = delta.length_squared();
    if dist_sq >= min_dist * min_dist {
        return pos;
    }
    let dist = dist_sq.sqrt();
    if dist <= 1e-5 {
        // Exactly coincident centers have no separation axis; leave the
        // point alone and let the next tick's movement break the tie.
        return pos;
    }
    pos + (delta / dist) * ((min_dist - dist) * strength)
}

/// Push `pos` out of a solid rectangle. The correction runs from the closest
/// point on the rectangle; a center inside the rectangle is expelled through
/// the nearest face.
pub fn resolve_circle_rect(pos: Vec2, radius: f32, rect: &RectCollider, strength: f32) -> Vec2 {
    let hw = rect.half_width();
    let hd = rect.half_depth();
    let closest = Vec2::new(
        pos.x.clamp(rect.center.x - hw, rect.center.x + hw),
        pos.y.clamp(rect.center.y - hd, rect.center.y + hd),
    );
    let delta = pos - closest;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius * radius {
        return pos;
    }

    if dist_sq <= f32::EPSILON {
        // Center inside the rectangle: leave through the nearest face.
        let to_left = pos.x - (rect.center.x - hw);
        let to_right = (rect.center.x + hw) - pos.x;
        let to_near = pos.y - (rect.center.y - hd);
        let to_far = (rect.center.y + hd) - pos.y;
        let min = to_left.min(to_right).min(to_near).min(to_far);
        let resolved = if min == to_left {
            Vec2::new(rect.center.x - hw - radius, pos.y)
        } else if min == to_right {
            Vec2::new(rect.center.x + hw + radius, pos.y)
        } else if min == to_near {
            Vec2::new(pos.x, rect.center.y - hd - radius)
        } else {
            Vec2::new(pos.x, rect.center.y + hd + radius)
        };
        return pos + (resolved - pos) * strength;
    }

    let dist = dist_sq.sqrt();
    pos + (delta / dist) * ((radius - dist) * strength)
}

/// Resolve a desired position for `mover` against the whole battlefield.
///
/// `fire_walls` are (center, radius) pairs of active fire walls. `bodies`
/// holds every live entity with a footprint, including `mover` itself (it is
/// skipped by entity id).
pub fn resolve_position(
    desired: Vec2,
    radius: f32,
    mover: Entity,
    team: Team,
    arena: &Arena,
    fire_walls: &[(Vec2, f32)],
    bodies: &[DynamicBody],
    bound: f32,
) -> Vec2 {
    let mut pos = desired;

    for shape in &arena.statics {
        pos = match shape {
            ObstacleShape::Circle { center, radius: r } => {
                resolve_circle_circle(pos, radius, *center, *r, 1.0)
            }
            ObstacleShape::Rect(rect) => resolve_circle_rect(pos, radius, rect, 1.0),
        };
    }

    for wall in &arena.front_walls[team.opponent().index()] {
        pos = resolve_circle_rect(pos, radius, wall, 1.0);
    }

    for (center, r) in fire_walls {
        pos = resolve_circle_circle(pos, radius, *center, *r, 1.0);
    }

    for body in bodies {
        if body.entity == mover {
            continue;
        }
        if body.gate {
            // A side's own gate never blocks its own troops.
            if body.team != team {
                pos = resolve_circle_rect(pos, radius, &gate_rect(body.team), 1.0);
            }
        } else {
            pos = resolve_circle_circle(pos, radius, body.pos, body.radius, DYNAMIC_PUSH);
        }
    }

    pos.x = pos.x.clamp(-bound, bound);
    pos.y = pos.y.clamp(-bound, bound);
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_push_is_radial() {
        let resolved = resolve_circle_circle(Vec2::new(0.5, 0.0), 0.5, Vec2::ZERO, 1.0, 1.0);
        assert!((resolved.x - 1.5).abs() < 1e-4);
        assert_eq!(resolved.y, 0.0);
    }

    #[test]
    fn circle_outside_is_untouched() {
        let pos = Vec2::new(3.0, 0.0);
        assert_eq!(resolve_circle_circle(pos, 0.5, Vec2::ZERO, 1.0, 1.0), pos);
    }

    #[test]
    fn coincident_centers_are_left_alone() {
        let resolved = resolve_circle_circle(Vec2::ZERO, 0.5, Vec2::ZERO, 0.5, 1.0);
        assert_eq!(resolved, Vec2::ZERO);
    }

    #[test]
    fn rect_pushes_through_nearest_face() {
        let rect = RectCollider::new(0.0, 0.0, 4.0, 2.0);
        // Just inside the long face: pushed out in z, not x.
        let resolved = resolve_circle_rect(Vec2::new(0.3, 0.8), 0.5, &rect, 1.0);
        assert_eq!(resolved.x, 0.3);
        assert!((resolved.y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn rect_center_inside_is_expelled() {
        let rect = RectCollider::new(0.0, 0.0, 4.0, 2.0);
        let resolved = resolve_circle_rect(Vec2::new(-1.9, 0.0), 0.5, &rect, 1.0);
        assert!((resolved.x + 2.5).abs() < 1e-4, "resolved {resolved:?}");
        assert_eq!(resolved.y, 0.0);
    }

    #[test]
    fn dynamic_separation_is_half_strength() {
        let a = Entity::from_bits(1);
        let b = Entity::from_bits(2);
        let arena = Arena::default();
        let bodies = [DynamicBody {
            entity: b,
            team: Team::Ally,
            pos: Vec2::ZERO,
            radius: 0.5,
            gate: false,
        }];
        let resolved = resolve_position(
            Vec2::new(0.5, 0.0),
            0.5,
            a,
            Team::Ally,
            &arena,
            &[],
            &bodies,
            85.0,
        );
        // Full resolution would land at x = 1.0; half strength gives 0.75.
        assert!((resolved.x - 0.75).abs() < 1e-4);
    }

    #[test]
    fn own_gate_is_permeable_enemy_gate_is_solid() {
        let mover = Entity::from_bits(1);
        let gate_entity = Entity::from_bits(2);
        let arena = Arena::default();
        let gate = gate_rect(Team::Ally);
        let inside = Vec2::new(0.0, gate.center.y);
        let bodies = [DynamicBody {
            entity: gate_entity,
            team: Team::Ally,
            pos: inside,
            radius: 0.5,
            gate: true,
        }];

        let own = resolve_position(
            inside,
            0.5,
            mover,
            Team::Ally,
            &arena,
            &[],
            &bodies,
            85.0,
        );
        assert_eq!(own, inside, "own gate should not block");

        let foe = resolve_position(
            inside,
            0.5,
            mover,
            Team::Enemy,
            &arena,
            &[],
            &bodies,
            85.0,
        );
        assert_ne!(foe, inside, "enemy gate should block");
    }

    #[test]
    fn positions_clamp_to_bounds() {
        let mover = Entity::from_bits(1);
        let arena = Arena::default();
        let resolved = resolve_position(
            Vec2::new(200.0, -200.0),
            0.5,
            mover,
            Team::Ally,
            &arena,
            &[],
            &[],
            85.0,
        );
        assert_eq!(resolved, Vec2::new(85.0, -85.0));
    }
}
