/// Component definitions for the battle simulation.
///
/// This module contains all components attached to sim entities (hero,
/// troops, structures, projectiles, hazards) plus the per-kind stat tables.
/// Stats live in lookup methods on the kind enums rather than per-entity
/// copies; a troop carries only its kind and spawn-time level.

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

// ============================================================================
// Identity & Teams
// ============================================================================

/// Which side an entity fights for. Ally is the player's side (home at +z),
/// Enemy mirrors it at -z.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Ally,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Ally => Team::Enemy,
            Team::Enemy => Team::Ally,
        }
    }

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Team::Ally => 0,
            Team::Enemy => 1,
        }
    }

    /// Sign of this side's home z coordinate.
    pub fn home_sign(self) -> f32 {
        match self {
            Team::Ally => 1.0,
            Team::Enemy => -1.0,
        }
    }
}

/// Marker for every entity spawned into a match, used for teardown on reset.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MatchEntity;

/// Marker for spawned troops (not the hero, not structures).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Troop;

/// Marker for the player-controlled hero.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hero;

/// Structures are the win condition: a side's base falling ends the match,
/// its gate falling opens the wall.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    Base,
    Gate,
}

// ============================================================================
// Troop Stat Table
// ============================================================================

/// The four troop types. All per-kind numbers live in the methods below.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TroopKind {
    Warrior,
    Archer,
    Axeman,
    Lancer,
}

impl TroopKind {
    pub const ALL: [TroopKind; 4] = [
        TroopKind::Warrior,
        TroopKind::Archer,
        TroopKind::Axeman,
        TroopKind::Lancer,
    ];

    /// Index into per-kind arrays (spawn timers, upgrade levels).
    pub fn index(self) -> usize {
        match self {
            TroopKind::Warrior => 0,
            TroopKind::Archer => 1,
            TroopKind::Axeman => 2,
            TroopKind::Lancer => 3,
        }
    }

    pub fn max_hp(self, level: u32) -> f32 {
        let base = match self {
            TroopKind::Archer => 25.0,
            TroopKind::Lancer => 80.0,
            _ => 50.0,
        };
        let per_level = match self {
            TroopKind::Lancer => 15.0,
            _ => 10.0,
        };
        base + (level.saturating_sub(1)) as f32 * per_level
    }

    /// Swing damage at a given level.
    pub fn damage(self, level: u32) -> f32 {
        let base = match self {
            TroopKind::Warrior => 4.0,
            TroopKind::Archer => 3.0,
            TroopKind::Axeman => 7.0,
            TroopKind::Lancer => 8.0,
        };
        base + (level.saturating_sub(1)) as f32 * 1.5
    }

    pub fn radius(self) -> f32 {
        match self {
            TroopKind::Lancer => 0.8,
            _ => 0.5,
        }
    }

    /// Per-kind multiplier on the shared troop speed.
    pub fn speed_factor(self) -> f32 {
        match self {
            TroopKind::Axeman => 0.7,
            TroopKind::Lancer => 1.4,
            _ => 1.0,
        }
    }

    pub fn is_ranged(self) -> bool {
        matches!(self, TroopKind::Archer)
    }

    /// Lancers get a slight reach bonus over the base range band.
    pub fn range_multiplier(self) -> f32 {
        match self {
            TroopKind::Lancer => 1.2,
            _ => 1.0,
        }
    }
}

// ============================================================================
// Spatial Components
// ============================================================================

/// Logical ground-plane position. `0.y` is the world z coordinate; the world
/// y comes from terrain sampling.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SimPosition(pub Vec2);

/// Heading in radians; 0 faces +z, matching `atan2(dx, dz)`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Facing(pub f32);

/// Footprint radius used by separation and body-hit checks.
#[derive(Component, Debug, Clone, Copy)]
pub struct CollisionRadius(pub f32);

// ============================================================================
// Combat Components
// ============================================================================

#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Troop upgrade level at spawn time. Hero level lives in `UpgradeState`.
#[derive(Component, Debug, Clone, Copy)]
pub struct UnitLevel(pub u32);

/// Per-entity combat bookkeeping.
#[derive(Component, Debug, Clone, Copy)]
pub struct CombatState {
    pub moving: bool,
    pub attacking: bool,
    pub last_attack_ms: f64,
}

impl Default for CombatState {
    fn default() -> Self {
        Self {
            moving: false,
            attacking: false,
            // "Never swung": a fresh unit attacks as soon as it has a
            // target in range instead of sitting out one full cooldown.
            last_attack_ms: f64::NEG_INFINITY,
        }
    }
}

/// Hazard effects applied this tick. `speed_multiplier` is recomputed every
/// tick from the craters the entity stands in.
#[derive(Component, Debug, Clone, Copy)]
pub struct StatusEffects {
    pub speed_multiplier: f32,
    pub last_burn_ms: Option<f64>,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            last_burn_ms: None,
        }
    }
}

/// Lancers hold at their side's rally line until released in a group. Any
/// damage taken breaks the rally immediately.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Rallying;

/// Inserted exactly once when hp reaches zero. Dead entities stop acting and
/// stop blocking, and are pruned after the retention window (hero excepted).
#[derive(Component, Debug, Clone, Copy)]
pub struct Dead {
    pub at_ms: f64,
}

// ============================================================================
// Hero Components
// ============================================================================

#[derive(Component, Debug, Clone, Copy)]
pub struct Mana {
    pub current: f32,
    pub max: f32,
}

impl Mana {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }
}

/// Active hero buffs. The flags are authoritative; the `until` timestamps let
/// a re-cast extend a buff past a stale expiry callback.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HeroStatus {
    pub invisible: bool,
    pub invisible_until_ms: f64,
    pub invincible: bool,
    pub invincible_until_ms: f64,
}

/// Learned abilities and their per-ability cooldown gates.
#[derive(Component, Debug, Clone, Default)]
pub struct Abilities {
    pub learned: SmallVec<[AbilityKind; 4]>,
    /// Earliest sim time each ability may fire again.
    pub ready_at_ms: FxHashMap<AbilityKind, f64>,
}

impl Abilities {
    pub fn knows(&self, ability: AbilityKind) -> bool {
        self.learned.contains(&ability)
    }
}

// ============================================================================
// Ability Stat Table
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    Fireball,
    Cannon,
    Invisibility,
    Invincible,
}

/// Flat stat row for one ability. Zeroed fields do not apply to that kind.
#[derive(Debug, Clone, Copy)]
pub struct AbilityStats {
    pub damage: f32,
    pub mana_cost: f32,
    pub cooldown_ms: f64,
    pub projectile_speed: f32,
    pub blast_radius: f32,
    pub duration_ms: f64,
    pub unlock_cost: f32,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 4] = [
        AbilityKind::Fireball,
        AbilityKind::Cannon,
        AbilityKind::Invisibility,
        AbilityKind::Invincible,
    ];

    pub fn stats(self) -> AbilityStats {
        match self {
            AbilityKind::Fireball => AbilityStats {
                damage: 50.0,
                mana_cost: 30.0,
                cooldown_ms: 3000.0,
                projectile_speed: 0.4,
                blast_radius: 4.5,
                duration_ms: 0.0,
                unlock_cost: 100.0,
            },
            AbilityKind::Cannon => AbilityStats {
                damage: 150.0,
                mana_cost: 60.0,
                cooldown_ms: 6000.0,
                projectile_speed: 0.6,
                blast_radius: 7.0,
                duration_ms: 0.0,
                unlock_cost: 300.0,
            },
            AbilityKind::Invisibility => AbilityStats {
                damage: 0.0,
                mana_cost: 50.0,
                cooldown_ms: 5000.0,
                projectile_speed: 0.0,
                blast_radius: 0.0,
                duration_ms: 5000.0,
                unlock_cost: 200.0,
            },
            AbilityKind::Invincible => AbilityStats {
                damage: 0.0,
                mana_cost: 80.0,
                cooldown_ms: 15000.0,
                projectile_speed: 0.0,
                blast_radius: 0.0,
                duration_ms: 6000.0,
                unlock_cost: 400.0,
            },
        }
    }

    pub fn is_projectile(self) -> bool {
        matches!(self, AbilityKind::Fireball | AbilityKind::Cannon)
    }
}

// ============================================================================
// Projectiles & Hazards
// ============================================================================

/// What a projectile steers toward.
#[derive(Debug, Clone, Copy)]
pub enum ProjectileAim {
    /// Arrow locked onto the target's position at launch time. The entity id
    /// is only used to deliver the hit if the target is still alive.
    Homing(Entity),
    /// Ability shot traveling a fixed path, resolving on the first body hit.
    Directional,
}

/// In-flight projectile. Positions are full 3d points; flight is a lerp from
/// `start` to `target_pos` tracked by `progress` in [0, 1].
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner_team: Team,
    pub aim: ProjectileAim,
    pub start: Vec3,
    pub target_pos: Vec3,
    /// Current position along the flight path, refreshed each tick.
    pub pos: Vec3,
    pub progress: f32,
    pub speed: f32,
    pub damage: f32,
    /// Body-hit distance for directional shots.
    pub hit_radius: f32,
    /// Splash radius applied on impact, if any.
    pub blast_radius: Option<f32>,
    /// Hazard left on the ground at the impact point, if any.
    pub payload: Option<HazardKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    FireWall,
    Crater,
}

impl HazardKind {
    pub fn radius(self) -> f32 {
        match self {
            HazardKind::FireWall => 2.5,
            HazardKind::Crater => 3.5,
        }
    }

    pub fn duration_ms(self) -> f64 {
        match self {
            HazardKind::FireWall => 3000.0,
            HazardKind::Crater => 5000.0,
        }
    }
}

/// A hazard zone on the ground: fire walls burn and block, craters slow.
#[derive(Component, Debug, Clone, Copy)]
pub struct AreaEffect {
    pub kind: HazardKind,
    pub radius: f32,
    pub created_ms: f64,
    pub expires_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn troop_damage_scales_with_level() {
        assert_eq!(TroopKind::Warrior.damage(1), 4.0);
        assert_eq!(TroopKind::Warrior.damage(3), 7.0);
        assert_eq!(TroopKind::Lancer.damage(1), 8.0);
        assert_eq!(TroopKind::Archer.damage(5), 9.0);
    }

    #[test]
    fn lancer_is_the_heavy_unit() {
        assert_eq!(TroopKind::Lancer.max_hp(1), 80.0);
        assert_eq!(TroopKind::Lancer.max_hp(3), 110.0);
        assert_eq!(TroopKind::Warrior.max_hp(3), 70.0);
        assert_eq!(TroopKind::Lancer.radius(), 0.8);
        assert!(TroopKind::Lancer.speed_factor() > 1.0);
        assert!(TroopKind::Lancer.range_multiplier() > 1.0);
    }

    #[test]
    fn only_the_archer_is_ranged() {
        for kind in TroopKind::ALL {
            assert_eq!(kind.is_ranged(), kind == TroopKind::Archer);
        }
    }

    #[test]
    fn ability_unlock_costs() {
        assert_eq!(AbilityKind::Fireball.stats().unlock_cost, 100.0);
        assert_eq!(AbilityKind::Invisibility.stats().unlock_cost, 200.0);
        assert_eq!(AbilityKind::Cannon.stats().unlock_cost, 300.0);
        assert_eq!(AbilityKind::Invincible.stats().unlock_cost, 400.0);
        assert!(AbilityKind::Fireball.is_projectile());
        assert!(!AbilityKind::Invincible.is_projectile());
    }
}
