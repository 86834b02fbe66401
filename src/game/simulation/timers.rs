/// Clock advancement and the deferred one-shot action queue.

use bevy::prelude::*;

use crate::game::config::SimConfig;

use super::components::{CombatState, Hero, HeroStatus};
use super::resources::{DeferredAction, DeferredActions, MatchOutcome, SimClock};

/// First system of every tick. One fixed step of sim time.
pub fn advance_clock(config: Res<SimConfig>, mut clock: ResMut<SimClock>) {
    clock.advance(config.tick_ms());
}

/// Fires every deferred action whose timestamp has come due.
pub fn drain_deferred(
    clock: Res<SimClock>,
    mut deferred: ResMut<DeferredActions>,
    mut outcome: ResMut<MatchOutcome>,
    mut combat: Query<&mut CombatState>,
    mut heroes: Query<&mut HeroStatus, With<Hero>>,
) {
    for action in deferred.drain_due(clock.now_ms) {
        match action {
            DeferredAction::ClearAttacking(entity) => {
                // The attacker may have died and been pruned in the meantime.
                if let Ok(mut state) = combat.get_mut(entity) {
                    state.attacking = false;
                }
            }
            DeferredAction::ExpireInvisibility => {
                for mut status in &mut heroes {
                    // A re-cast pushes the deadline out; a stale expiry from
                    // the earlier cast must not cut the new one short.
                    if clock.now_ms >= status.invisible_until_ms {
                        status.invisible = false;
                    }
                }
            }
            DeferredAction::ExpireInvincibility => {
                for mut status in &mut heroes {
                    if clock.now_ms >= status.invincible_until_ms {
                        status.invincible = false;
                    }
                }
            }
            DeferredAction::AnnounceOutcome(result) => {
                if outcome.0.is_none() {
                    info!("Match over: {:?}", result);
                    outcome.0 = Some(result);
                }
            }
        }
    }
}
