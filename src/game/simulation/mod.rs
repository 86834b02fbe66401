/// Simulation layer - the battle itself.
///
/// This module is organized into:
/// - **components**: Sim components and the troop/ability stat tables
/// - **resources**: Sim resources (clock, economy, snapshot, stats, etc.)
/// - **events**: Commands and events for controlling the match
/// - **damage**: The single damage/kill funnel every system routes through
/// - **spawning**: Spawner timers, rally release, enemy auto-upgrades
/// - **ai**: Per-tick troop targeting, movement, and swings
/// - **hero**: Hero movement, melee sweep, abilities, revive, regen
/// - **projectiles**: Arrow and ability-shot flight and impact
/// - **hazards**: Fire wall burn and crater slow zones
/// - **rewards**: Kill payouts and upgrade application
/// - **timers**: The deferred one-shot action queue
/// - **cleanup**: Corpse pruning and the per-tick stats snapshot

use bevy::prelude::*;

// Module declarations
pub mod components;
pub mod resources;
pub mod events;
pub mod damage;
pub mod spawning;
pub mod ai;
pub mod hero;
pub mod projectiles;
pub mod hazards;
pub mod rewards;
pub mod timers;
pub mod cleanup;

// Re-export commonly used items
pub use components::*;
pub use resources::*;
pub use events::*;

use crate::game::config::SimConfig;

// System sets for organizing execution order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Clock,       // Advance sim time, fire deferred actions
    Spawn,       // Spawners, rally release, upgrades, revive, regen
    Hazards,     // Fire wall burn, crater slow
    Ai,          // Snapshot build, hero control, troop decisions
    Projectiles, // Flight, impact, blasts
    Cleanup,     // Kill rewards, corpse pruning
}

/// The match freezes the moment an outcome is announced.
pub fn match_live(outcome: Res<MatchOutcome>) -> bool {
    outcome.0.is_none()
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Configure FixedUpdate timestep (re-pinned from InitialConfig at startup)
        app.insert_resource(Time::<Fixed>::from_hz(30.0));

        // Initialize resources
        app.init_resource::<SimConfig>();
        app.init_resource::<SimClock>();
        app.init_resource::<HeroInput>();
        app.init_resource::<Economy>();
        app.init_resource::<UpgradeState>();
        app.init_resource::<SpawnTimers>();
        app.init_resource::<RegenTimer>();
        app.init_resource::<MatchOutcome>();
        app.init_resource::<DeferredActions>();
        app.init_resource::<WorldSnapshot>();
        app.init_resource::<MatchStats>();
        app.init_resource::<crate::game::arena::Arena>();

        // Register events
        app.add_message::<ReviveHeroCommand>();
        app.add_message::<CastAbilityCommand>();
        app.add_message::<LearnAbilityCommand>();
        app.add_message::<UpgradeCommand>();
        app.add_message::<KillEvent>();

        // Configure System Sets
        app.configure_sets(
            FixedUpdate,
            (
                SimSet::Clock,
                SimSet::Spawn,
                // Burns land before movement, so a wall dropped on top of a
                // unit gets one tick in before the resolver expels it.
                SimSet::Hazards,
                SimSet::Ai,
                SimSet::Projectiles,
                SimSet::Cleanup,
            )
                .chain()
                .run_if(match_live),
        );

        // Fixed update systems (the simulation proper)
        app.add_systems(
            FixedUpdate,
            (
                (timers::advance_clock, timers::drain_deferred)
                    .chain()
                    .in_set(SimSet::Clock),
                (
                    spawning::spawn_troops,
                    spawning::release_rallies,
                    spawning::enemy_auto_upgrade,
                    rewards::apply_upgrades,
                    hero::revive_hero,
                    hero::hero_regen,
                )
                    .chain()
                    .in_set(SimSet::Spawn),
                (hazards::expire_area_effects, hazards::apply_hazards)
                    .chain()
                    .in_set(SimSet::Hazards),
                (
                    ai::build_snapshot,
                    hero::hero_move_and_sweep,
                    ai::troop_ai,
                    hero::cast_abilities,
                    hero::learn_abilities,
                )
                    .chain()
                    .in_set(SimSet::Ai),
                projectiles::advance_projectiles.in_set(SimSet::Projectiles),
                (rewards::apply_rewards, cleanup::prune_dead)
                    .chain()
                    .in_set(SimSet::Cleanup),
            ),
        );

        // The stats snapshot keeps refreshing after the outcome freeze so the
        // final state stays visible from outside.
        app.add_systems(
            FixedUpdate,
            cleanup::update_match_stats.after(SimSet::Cleanup),
        );
    }
}
