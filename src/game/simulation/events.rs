/// Commands and events for controlling the battle simulation.
///
/// Commands come from outside the sim (UI adapter, harness, tests); the kill
/// event is internal, emitted by the damage funnel and drained by the reward
/// system.

use bevy::prelude::*;

use super::components::{AbilityKind, StructureKind, Team, TroopKind};

// ============================================================================
// Match Control
// ============================================================================

/// Tear down any running match and start a fresh one. `difficulty` seeds the
/// enemy side's troop levels.
#[derive(Event, Message, Debug, Clone)]
pub struct StartMatchCommand {
    pub difficulty: u32,
}

/// Bring a dead hero back at the home spawn with full hp/mp and a grace
/// period of invincibility.
#[derive(Event, Message, Debug, Clone)]
pub struct ReviveHeroCommand;

// ============================================================================
// Hero Commands
// ============================================================================

/// Cast a learned ability if mana and cooldown allow.
#[derive(Event, Message, Debug, Clone)]
pub struct CastAbilityCommand {
    pub ability: AbilityKind,
}

/// Learn an ability by paying its unlock cost in mana.
#[derive(Event, Message, Debug, Clone)]
pub struct LearnAbilityCommand {
    pub ability: AbilityKind,
}

// ============================================================================
// Economy Commands
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeTarget {
    /// Raise a troop type's level: harder-hitting, tougher future spawns.
    UnitLevel(TroopKind),
    /// Raise a spawner's level: faster spawn cadence, capped.
    SpawnerLevel(TroopKind),
    /// Raise the hero's level: melee damage, speed, and max hp/mp.
    HeroLevel,
}

/// Spend a side's gold on one upgrade. Player purchases arrive from the UI;
/// the enemy side issues its own while its gold lasts.
#[derive(Event, Message, Debug, Clone)]
pub struct UpgradeCommand {
    pub team: Team,
    pub target: UpgradeTarget,
}

// ============================================================================
// Internal Events
// ============================================================================

/// Emitted exactly once per death by the damage funnel. The reward system
/// drains these to pay out gold, kills, and hero mana, and to schedule the
/// match outcome when a base falls.
#[derive(Event, Message, Debug, Clone)]
pub struct KillEvent {
    pub victim: Entity,
    pub victim_team: Team,
    pub killer_team: Team,
    pub structure: Option<StructureKind>,
    /// True when the hero dealt the blow directly (melee, blast or fire
    /// wall). Only these kills refund the hero's mana.
    pub hero_credit: bool,
}
