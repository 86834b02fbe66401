/// Battlefield layout: castle walls, scattered obstacles, and spawn pads.
///
/// The arena is regenerated whenever a match starts. Castle walls are fixed
/// geometry; trees and rocks are scattered randomly across the midfield so no
/// two matches play out over the same ground.

use bevy::prelude::*;
use rand::Rng;

use super::config::SimConfig;
use super::simulation::components::{Team, TroopKind};

// ============================================================================
// Collision Shapes
// ============================================================================

/// Axis-aligned rectangular blocker on the ground plane. `center.y` is the
/// world z coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectCollider {
    pub center: Vec2,
    pub width: f32,
    pub depth: f32,
}

impl RectCollider {
    pub fn new(x: f32, z: f32, width: f32, depth: f32) -> Self {
        Self {
            center: Vec2::new(x, z),
            width,
            depth,
        }
    }

    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    pub fn half_depth(&self) -> f32 {
        self.depth * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() < self.half_width()
            && (point.y - self.center.y).abs() < self.half_depth()
    }
}

/// Static blocker shape.
#[derive(Debug, Clone, Copy)]
pub enum ObstacleShape {
    Circle { center: Vec2, radius: f32 },
    Rect(RectCollider),
}

// ============================================================================
// Arena Resource
// ============================================================================

/// All static battlefield geometry for the current match.
///
/// `front_walls` is indexed by the owning side ([`Team::index`]): movers only
/// collide with the *opposing* side's front wall segments, so troops walk out
/// through their own gate opening unimpeded.
#[derive(Resource, Default)]
pub struct Arena {
    pub statics: Vec<ObstacleShape>,
    pub front_walls: [Vec<RectCollider>; 2],
}

impl Arena {
    /// Build a fresh arena: castle walls, spawner pads, and random scatter.
    pub fn generate(config: &SimConfig) -> Self {
        let mut statics = Vec::new();
        let castle_z = config.castle_z;

        // Back walls and side walls of both castles.
        for sign in [1.0f32, -1.0] {
            statics.push(ObstacleShape::Rect(RectCollider::new(
                0.0,
                sign * (castle_z + 15.0),
                44.0,
                4.0,
            )));
            for x in [-20.0f32, 20.0] {
                statics.push(ObstacleShape::Rect(RectCollider::new(
                    x,
                    sign * castle_z,
                    4.0,
                    30.0,
                )));
            }
        }

        // Spawner pads.
        for team in [Team::Ally, Team::Enemy] {
            for kind in TroopKind::ALL {
                statics.push(ObstacleShape::Circle {
                    center: spawn_point(team, kind),
                    radius: 1.0,
                });
            }
        }

        // Random scatter rolled on rings around the center. Rolls landing in
        // a courtyard are simply dropped, so the exact count varies by match.
        let mut rng = rand::rng();
        let outer = config.map_size - 20.0;
        for _ in 0..40 {
            if let Some(center) = ring_point(&mut rng, 15.0, outer) {
                statics.push(ObstacleShape::Circle {
                    center,
                    radius: 0.6,
                });
            }
        }
        for _ in 0..20 {
            if let Some(center) = ring_point(&mut rng, 10.0, outer) {
                let scale = rng.random_range(0.5..1.2);
                statics.push(ObstacleShape::Circle {
                    center,
                    radius: scale,
                });
            }
        }

        // Each side's front wall runs along its courtyard line with a gate
        // opening in the middle.
        let front_z = 50.0;
        let mut front_walls: [Vec<RectCollider>; 2] = [Vec::new(), Vec::new()];
        for team in [Team::Ally, Team::Enemy] {
            let z = team.home_sign() * front_z;
            front_walls[team.index()] = vec![
                RectCollider::new(-14.0, z, 16.0, 4.0),
                RectCollider::new(14.0, z, 16.0, 4.0),
            ];
        }

        Self {
            statics,
            front_walls,
        }
    }
}

fn ring_point(rng: &mut impl Rng, min_r: f32, max_r: f32) -> Option<Vec2> {
    let r = rng.random_range(min_r..max_r);
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    let p = Vec2::new(theta.sin() * r, theta.cos() * r);
    // Keep the courtyards clear for the castles.
    (p.y.abs() <= 40.0).then_some(p)
}

// ============================================================================
// Spawn Layout
// ============================================================================

/// Fixed spawn pad position for a troop type. The enemy layout mirrors the
/// ally layout across the centerline.
pub fn spawn_point(team: Team, kind: TroopKind) -> Vec2 {
    let local = match kind {
        TroopKind::Warrior => Vec2::new(-6.0, 58.0),
        TroopKind::Archer => Vec2::new(6.0, 58.0),
        TroopKind::Axeman => Vec2::new(-12.0, 65.0),
        TroopKind::Lancer => Vec2::new(12.0, 65.0),
    };
    Vec2::new(local.x, local.y * team.home_sign())
}

/// Gate footprint for a side: the solid blocker that sits in the wall opening
/// while the gate structure is alive.
pub fn gate_rect(team: Team) -> RectCollider {
    RectCollider::new(0.0, team.home_sign() * 50.0, 12.0, 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_points_mirror_across_centerline() {
        for kind in TroopKind::ALL {
            let ally = spawn_point(Team::Ally, kind);
            let enemy = spawn_point(Team::Enemy, kind);
            assert_eq!(ally.x, enemy.x);
            assert_eq!(ally.y, -enemy.y);
        }
    }

    #[test]
    fn scatter_stays_out_of_courtyards() {
        let config = SimConfig::default();
        let arena = Arena::generate(&config);
        let mut scatter = 0;
        let mut courtyard_circles = 0;
        for shape in &arena.statics {
            if let ObstacleShape::Circle { center, .. } = shape {
                if center.y.abs() <= 40.0 {
                    scatter += 1;
                } else {
                    courtyard_circles += 1;
                }
            }
        }
        // At most 40 trees + 20 rocks survive the courtyard cut; the only
        // circles allowed past the line are the 8 spawner pads.
        assert!(scatter <= 60);
        assert_eq!(courtyard_circles, 8);
    }

    #[test]
    fn front_walls_leave_a_gate_opening() {
        let config = SimConfig::default();
        let arena = Arena::generate(&config);
        for team in [Team::Ally, Team::Enemy] {
            let z = team.home_sign() * 50.0;
            let walls = &arena.front_walls[team.index()];
            assert_eq!(walls.len(), 2);
            // The opening spans |x| < 6; both segments must stop short of it.
            for wall in walls {
                assert!(!wall.contains(Vec2::new(0.0, z)));
                assert!(wall.contains(Vec2::new(wall.center.x, z)));
            }
            assert!(gate_rect(team).contains(Vec2::new(0.0, z)));
        }
    }
}
