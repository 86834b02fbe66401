/// Kill payouts, upgrade purchases and the victory trigger.

use bevy::prelude::*;

use crate::game::config::SimConfig;

use super::components::{Health, Hero, Mana, StructureKind, Team};
use super::events::{KillEvent, UpgradeCommand, UpgradeTarget};
use super::resources::{
    DeferredAction, DeferredActions, Economy, Outcome, SimClock, UpgradeState,
};

/// Spends gold on upgrade requests from either side. A request the side
/// cannot pay for, or a spawner already at the level cap, is dropped
/// without spending.
pub fn apply_upgrades(
    config: Res<SimConfig>,
    mut requests: MessageReader<UpgradeCommand>,
    mut economy: ResMut<Economy>,
    mut upgrades: ResMut<UpgradeState>,
    mut heroes: Query<(&mut Health, &mut Mana), With<Hero>>,
) {
    for request in requests.read() {
        let side = request.team.index();
        if economy.gold[side] < config.upgrade_cost {
            continue;
        }
        match request.target {
            UpgradeTarget::UnitLevel(kind) => {
                upgrades.unit_levels[side][kind.index()] += 1;
            }
            UpgradeTarget::SpawnerLevel(kind) => {
                if upgrades.spawner_levels[side][kind.index()] >= config.spawner_level_cap {
                    continue;
                }
                upgrades.spawner_levels[side][kind.index()] += 1;
            }
            UpgradeTarget::HeroLevel => {
                // Only one side fields a hero.
                if request.team != Team::Ally {
                    continue;
                }
                upgrades.hero_level += 1;
                if let Ok((mut health, mut mana)) = heroes.single_mut() {
                    health.max = config.hero_max_hp(upgrades.hero_level);
                    mana.max = config.hero_max_mp(upgrades.hero_level);
                }
            }
        }
        economy.gold[side] -= config.upgrade_cost;
    }
}

/// Pays out kills: gold and a kill tally to the killing side, mana back to
/// the hero for kills the hero dealt directly. Destroying a base schedules
/// the match outcome after a short delay.
pub fn apply_rewards(
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut kills: MessageReader<KillEvent>,
    mut economy: ResMut<Economy>,
    mut deferred: ResMut<DeferredActions>,
    mut heroes: Query<&mut Mana, With<Hero>>,
) {
    for kill in kills.read() {
        let side = kill.killer_team.index();
        let reward = if kill.structure == Some(StructureKind::Base) {
            config.gold_per_base
        } else {
            config.gold_per_troop
        };
        economy.gold[side] += reward;
        economy.kills[side] += 1;

        if kill.hero_credit && kill.killer_team == Team::Ally {
            if let Ok(mut mana) = heroes.single_mut() {
                mana.current = (mana.current + config.mp_on_kill).min(mana.max);
            }
        }

        if kill.structure == Some(StructureKind::Base) {
            let outcome = if kill.victim_team == Team::Ally {
                Outcome::Defeat
            } else {
                Outcome::Victory
            };
            deferred.schedule(
                clock.now_ms + config.outcome_delay_ms,
                DeferredAction::AnnounceOutcome(outcome),
            );
        }
    }
}
