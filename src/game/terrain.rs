/// Terrain height sampling.
///
/// The battlefield is a rolling dune field between the two castles. Past
/// |z| = 50 the ground blends down to flat over 10 units so structures and
/// spawn pads sit level. Height is pure math over (x, z), so every system
/// that needs a world-space y samples the same surface without shared state.

use bevy::prelude::*;

/// z extent past which the ground starts blending to flat.
pub const COURTYARD_Z: f32 = 50.0;

/// Sample the ground height at a world (x, z) position.
pub fn ground_height(x: f32, z: f32) -> f32 {
    let base = (x * 0.1).sin() * 1.5 + (z * 0.1).cos() * 1.5;
    if z.abs() > COURTYARD_Z {
        let transition = (1.0 - (z.abs() - COURTYARD_Z) / 10.0).max(0.0);
        return (base * transition).max(0.0);
    }
    let detail = (x * 0.3 + z * 0.2).sin() * 0.5;
    (base + detail).max(0.0)
}

/// Lift a ground-plane position into world space on the terrain surface.
pub fn surface_point(pos: Vec2) -> Vec3 {
    Vec3::new(pos.x, ground_height(pos.x, pos.y), pos.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courtyards_flatten_out() {
        for x in [-40.0, -7.3, 0.0, 12.9, 33.0] {
            assert_eq!(ground_height(x, 62.0), 0.0);
            assert_eq!(ground_height(x, -71.5), 0.0);
        }
    }

    #[test]
    fn transition_band_shrinks_toward_flat() {
        // Inside the band the hill height can only go down as |z| grows.
        let at_52 = ground_height(13.0, 52.0);
        let at_58 = ground_height(13.0, 58.0);
        assert!(at_58 <= at_52);
    }

    #[test]
    fn midfield_height_is_bounded_and_non_negative() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let x = rng.f32() * 180.0 - 90.0;
            let z = rng.f32() * 100.0 - 50.0;
            let h = ground_height(x, z);
            assert!(h >= 0.0, "negative height at ({x}, {z})");
            assert!(h <= 3.5, "height spike at ({x}, {z}): {h}");
        }
    }

    #[test]
    fn surface_point_matches_height() {
        let p = surface_point(Vec2::new(10.0, 20.0));
        assert_eq!(p.x, 10.0);
        assert_eq!(p.z, 20.0);
        assert_eq!(p.y, ground_height(10.0, 20.0));
    }
}
