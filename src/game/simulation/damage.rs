/// The single funnel every hit goes through.
///
/// All damage sources (troop swings, hero sweeps, arrows, blasts, burns)
/// call `apply_hit` so that hp clamping, rally breaking, death marking and
/// the kill event fire exactly once, in one place.

use bevy::prelude::*;

use super::components::{Dead, Health, Rallying, StructureKind, Team};
use super::events::KillEvent;

/// Apply `amount` damage to `victim`. Returns true when this hit was lethal.
///
/// Already-depleted victims are skipped, so a unit that dies mid-tick can
/// never produce a second `KillEvent`.
#[allow(clippy::too_many_arguments)]
pub fn apply_hit(
    commands: &mut Commands,
    kills: &mut MessageWriter<KillEvent>,
    now_ms: f64,
    victim: Entity,
    victim_team: Team,
    structure: Option<StructureKind>,
    health: &mut Health,
    amount: f32,
    killer_team: Team,
    hero_credit: bool,
) -> bool {
    if health.is_depleted() {
        return false;
    }
    health.current = (health.current - amount).max(0.0);
    // Taking damage breaks a rally hold.
    commands.entity(victim).remove::<Rallying>();
    if health.is_depleted() {
        commands.entity(victim).insert(Dead { at_ms: now_ms });
        kills.write(KillEvent {
            victim,
            victim_team,
            killer_team,
            structure,
            hero_credit,
        });
        true
    } else {
        false
    }
}
