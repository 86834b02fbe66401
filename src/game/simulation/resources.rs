/// Resource definitions for the battle simulation.
///
/// Per-side values live in two-element arrays indexed by [`Team::index`].

use bevy::prelude::*;
use rustc_hash::FxHashMap;

use super::components::{AbilityKind, StructureKind, Team, TroopKind};
use crate::game::collision::DynamicBody;

// ============================================================================
// Clock
// ============================================================================

/// Simulation clock, advanced a fixed step per tick rather than from wall
/// time. Every cooldown and timer in the sim is keyed to `now_ms`, which makes
/// manually driven schedules in tests exactly reproducible.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    pub now_ms: f64,
    pub tick: u64,
}

impl SimClock {
    pub fn advance(&mut self, step_ms: f64) {
        self.now_ms += step_ms;
        self.tick += 1;
    }
}

// ============================================================================
// Player Input
// ============================================================================

/// External control surface for the hero, written by whatever drives the app
/// (joystick adapter, scripted harness, tests) and read each tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct HeroInput {
    /// Stick direction, x right / y forward, magnitude up to 1.
    pub move_dir: Vec2,
    /// Held attack button: the hero swings whenever the cooldown allows.
    pub attacking: bool,
    /// Camera yaw the stick is relative to.
    pub camera_yaw: f32,
}

// ============================================================================
// Economy & Upgrades
// ============================================================================

/// Gold and kill tallies per side.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Economy {
    pub gold: [u32; 2],
    pub kills: [u32; 2],
}

/// Upgrade levels per side. A troop's level is baked in at spawn, so a unit
/// upgrade only strengthens waves fielded after the purchase.
#[derive(Resource, Debug, Clone, Copy)]
pub struct UpgradeState {
    pub unit_levels: [[u32; 4]; 2],
    pub spawner_levels: [[u32; 4]; 2],
    pub hero_level: u32,
}

impl Default for UpgradeState {
    fn default() -> Self {
        Self {
            unit_levels: [[1; 4]; 2],
            spawner_levels: [[1; 4]; 2],
            hero_level: 1,
        }
    }
}

impl UpgradeState {
    pub fn unit_level(&self, team: Team, kind: TroopKind) -> u32 {
        self.unit_levels[team.index()][kind.index()]
    }

    pub fn spawner_level(&self, team: Team, kind: TroopKind) -> u32 {
        self.spawner_levels[team.index()][kind.index()]
    }
}

// ============================================================================
// Spawning & Upkeep Timers
// ============================================================================

/// Last spawn time per side and troop type.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SpawnTimers {
    pub last_spawn_ms: [[f64; 4]; 2],
}

/// Gate for the hero's slow hp/mp trickle.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RegenTimer {
    pub last_ms: f64,
}

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Set once, a beat after a base falls. While set, the simulation freezes.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MatchOutcome(pub Option<Outcome>);

// ============================================================================
// Deferred Actions
// ============================================================================

/// One-shot actions scheduled for a later tick, drained in fire order at the
/// top of each tick.
#[derive(Debug, Clone, Copy)]
pub enum DeferredAction {
    /// Drop a troop's swing animation flag.
    ClearAttacking(Entity),
    /// Re-check invisibility expiry; no-ops if a re-cast extended the buff.
    ExpireInvisibility,
    /// Re-check invincibility expiry; no-ops if a re-cast extended the buff.
    ExpireInvincibility,
    /// Announce the match outcome a beat after the base fell.
    AnnounceOutcome(Outcome),
}

#[derive(Debug, Clone, Copy)]
pub struct Deferred {
    pub fire_at_ms: f64,
    pub action: DeferredAction,
}

#[derive(Resource, Debug, Default)]
pub struct DeferredActions {
    pub queue: Vec<Deferred>,
}

impl DeferredActions {
    pub fn schedule(&mut self, fire_at_ms: f64, action: DeferredAction) {
        self.queue.push(Deferred { fire_at_ms, action });
    }

    /// Pop every action due at `now_ms`, in scheduling order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        self.queue.retain(|d| {
            if d.fire_at_ms <= now_ms {
                due.push(d.action);
                false
            } else {
                true
            }
        });
        due
    }
}

// ============================================================================
// World Snapshot
// ============================================================================

/// One live entity as seen by this tick's AI and collision passes.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotEntry {
    pub entity: Entity,
    pub team: Team,
    pub pos: Vec2,
    pub radius: f32,
    pub structure: Option<StructureKind>,
    pub hero: bool,
    pub invisible: bool,
}

/// Immutable view of the battlefield built once at the start of the AI phase.
/// Every unit targets and separates against the same positions, so in-tick
/// movement never reorders target choices.
#[derive(Resource, Debug, Default)]
pub struct WorldSnapshot {
    pub entries: Vec<SnapshotEntry>,
    pub bodies: Vec<DynamicBody>,
    /// (center, radius) of each active fire wall, for movement blocking.
    pub fire_walls: Vec<(Vec2, f32)>,
}

impl WorldSnapshot {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.bodies.clear();
        self.fire_walls.clear();
    }

    /// Live targets for an attacker on `team`: everything on the other side,
    /// minus an invisible hero.
    pub fn targets_for(&self, team: Team) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries
            .iter()
            .filter(move |e| e.team == team.opponent() && !(e.hero && e.invisible))
    }
}

// ============================================================================
// Match Stats
// ============================================================================

/// Output snapshot refreshed at the end of every tick for whatever sits on
/// top of the sim (HUD, harness, tests).
#[derive(Resource, Debug, Clone, Default)]
pub struct MatchStats {
    pub hero_hp: f32,
    pub hero_max_hp: f32,
    pub hero_mp: f32,
    pub hero_max_mp: f32,
    pub hero_level: u32,
    pub hero_dead: bool,
    pub gold: [u32; 2],
    pub kills: [u32; 2],
    pub troop_counts: [[u32; 4]; 2],
    pub base_hp: [f32; 2],
    pub gate_hp: [f32; 2],
    pub ability_ready_at_ms: FxHashMap<AbilityKind, f64>,
    pub outcome: Option<Outcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_actions_fire_once_in_order() {
        let mut actions = DeferredActions::default();
        actions.schedule(100.0, DeferredAction::ExpireInvisibility);
        actions.schedule(50.0, DeferredAction::ExpireInvincibility);
        actions.schedule(500.0, DeferredAction::AnnounceOutcome(Outcome::Victory));

        let due = actions.drain_due(200.0);
        assert_eq!(due.len(), 2);
        assert!(matches!(due[0], DeferredAction::ExpireInvisibility));
        assert!(matches!(due[1], DeferredAction::ExpireInvincibility));

        assert!(actions.drain_due(200.0).is_empty());
        assert_eq!(actions.drain_due(600.0).len(), 1);
    }

    #[test]
    fn clock_advances_by_fixed_step() {
        let mut clock = SimClock::default();
        for _ in 0..30 {
            clock.advance(1000.0 / 30.0);
        }
        assert_eq!(clock.tick, 30);
        assert!((clock.now_ms - 1000.0).abs() < 1e-6);
    }
}
