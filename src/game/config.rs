use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Startup configuration loaded once from `assets/initial_config.ron`. These
/// are the tunables worth adjusting between runs without a rebuild; the full
/// balance table lives in [`SimConfig`] defaults.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
pub struct InitialConfig {
    pub tick_rate: f64,
    pub map_size: f32,
    pub bound: f32,
    pub hero_speed: f32,
    pub troop_speed: f32,
    pub troop_cap: usize,
    pub spawn_interval_base_ms: f64,
    pub spawn_interval_floor_ms: f64,
    pub base_hp: f32,
    pub corpse_retention_ms: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            tick_rate: sim.tick_rate,
            map_size: sim.map_size,
            bound: sim.bound,
            hero_speed: sim.hero_speed,
            troop_speed: sim.troop_speed,
            troop_cap: sim.troop_cap,
            spawn_interval_base_ms: sim.spawn_interval_base_ms,
            spawn_interval_floor_ms: sim.spawn_interval_floor_ms,
            base_hp: sim.base_hp,
            corpse_retention_ms: sim.corpse_retention_ms,
        }
    }
}

/// Full simulation balance table. Defaults are the shipped tuning; a subset
/// is overridden from [`InitialConfig`] at startup.
///
/// Speeds are world units per second. Ranges and radii are world units.
/// Durations are milliseconds of sim time.
#[derive(Resource, Clone, Debug)]
pub struct SimConfig {
    pub tick_rate: f64,

    // World extents
    pub map_size: f32,
    pub bound: f32,
    pub castle_z: f32,

    // Movement
    pub hero_speed: f32,
    pub troop_speed: f32,
    pub level_speed_step: f32,

    // Combat ranges and timing
    pub attack_cooldown_ms: f64,
    pub attack_jitter_ms: f64,
    pub attack_anim_ms: f64,
    pub melee_range: f32,
    pub ranged_range: f32,
    pub structure_range: f32,

    // Hero
    pub hero_radius: f32,
    pub hero_base_hp: f32,
    pub hero_base_mp: f32,
    pub hero_level_step: f32,
    pub hero_melee_base: f32,
    pub hero_melee_per_level: f32,
    pub hero_sweep_multiplier: f32,
    pub hero_spawn_offset: f32,
    pub ability_damage_per_level: f32,
    pub ability_fire_range: f32,

    // Structures
    pub base_hp: f32,
    pub base_radius: f32,
    pub gate_radius: f32,

    // Spawning
    pub spawn_interval_base_ms: f64,
    pub spawn_interval_step_ms: f64,
    pub spawn_interval_floor_ms: f64,
    pub spawn_jitter: f32,
    pub troop_cap: usize,
    pub spawner_level_cap: u32,

    // Lancer rally
    pub rally_release_count: usize,
    pub rally_self_defense_radius: f32,
    pub rally_line_z: f32,

    // Projectiles
    pub arrow_speed: f32,
    pub projectile_step: f32,

    // Hazards
    pub burn_damage: f32,
    pub burn_interval_ms: f64,
    pub crater_slow_multiplier: f32,

    // Economy
    pub gold_per_troop: u32,
    pub gold_per_base: u32,
    pub upgrade_cost: u32,
    pub mp_on_kill: f32,

    // Upkeep
    pub regen_interval_ms: f64,
    pub regen_amount: f32,
    pub corpse_retention_ms: f64,
    pub outcome_delay_ms: f64,
}

impl SimConfig {
    /// Seconds advanced per simulation tick.
    pub fn tick_dt(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }

    /// Milliseconds advanced per simulation tick.
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.tick_rate
    }

    /// Spawn interval for a spawner level: each level shaves 100ms off the
    /// base rate, floored so high levels stay sane.
    pub fn spawn_interval_ms(&self, spawner_level: u32) -> f64 {
        let reduced = self.spawn_interval_base_ms
            - (spawner_level.saturating_sub(1)) as f64 * self.spawn_interval_step_ms;
        reduced.max(self.spawn_interval_floor_ms)
    }

    /// Hero max hp at a level.
    pub fn hero_max_hp(&self, level: u32) -> f32 {
        self.hero_base_hp + (level.saturating_sub(1)) as f32 * self.hero_level_step
    }

    /// Hero max mp at a level.
    pub fn hero_max_mp(&self, level: u32) -> f32 {
        self.hero_base_mp + (level.saturating_sub(1)) as f32 * self.hero_level_step
    }

    /// Hero melee sweep damage at a level, before the invincibility doubler.
    pub fn hero_melee_damage(&self, level: u32) -> f32 {
        self.hero_melee_base + (level.saturating_sub(1)) as f32 * self.hero_melee_per_level
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            map_size: 90.0,
            bound: 85.0,
            castle_z: 65.0,
            hero_speed: 9.0,
            troop_speed: 4.8,
            level_speed_step: 0.05,
            attack_cooldown_ms: 1000.0,
            attack_jitter_ms: 500.0,
            attack_anim_ms: 300.0,
            melee_range: 2.5,
            ranged_range: 12.0,
            structure_range: 5.0,
            hero_radius: 0.5,
            hero_base_hp: 100.0,
            hero_base_mp: 100.0,
            hero_level_step: 20.0,
            hero_melee_base: 25.0,
            hero_melee_per_level: 5.0,
            hero_sweep_multiplier: 1.5,
            hero_spawn_offset: 5.0,
            ability_damage_per_level: 10.0,
            ability_fire_range: 30.0,
            base_hp: 1500.0,
            base_radius: 1.5,
            gate_radius: 4.0,
            spawn_interval_base_ms: 3100.0,
            spawn_interval_step_ms: 100.0,
            spawn_interval_floor_ms: 200.0,
            spawn_jitter: 0.5,
            troop_cap: 24,
            spawner_level_cap: 30,
            rally_release_count: 6,
            rally_self_defense_radius: 5.0,
            rally_line_z: 55.0,
            arrow_speed: 0.5,
            projectile_step: 6.0,
            burn_damage: 10.0,
            burn_interval_ms: 500.0,
            crater_slow_multiplier: 0.4,
            gold_per_troop: 15,
            gold_per_base: 500,
            upgrade_cost: 100,
            mp_on_kill: 10.0,
            regen_interval_ms: 2000.0,
            regen_amount: 1.0,
            corpse_retention_ms: 2000.0,
            outcome_delay_ms: 1000.0,
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (load_initial_config, apply_initial_config).chain());
    }
}

/// Load startup configuration synchronously. Runs before any system that
/// reads [`SimConfig`].
fn load_initial_config(mut commands: Commands) {
    let initial_config_path = "assets/initial_config.ron";

    match std::fs::read_to_string(initial_config_path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", initial_config_path);
                commands.insert_resource(config);
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                commands.insert_resource(InitialConfig::default());
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", initial_config_path, e);
            error!("Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

/// Copy the loaded overrides into [`SimConfig`] and pin the fixed timestep to
/// the configured tick rate.
fn apply_initial_config(
    initial: Res<InitialConfig>,
    mut config: ResMut<SimConfig>,
    mut fixed_time: ResMut<Time<Fixed>>,
) {
    config.tick_rate = initial.tick_rate;
    config.map_size = initial.map_size;
    config.bound = initial.bound;
    config.hero_speed = initial.hero_speed;
    config.troop_speed = initial.troop_speed;
    config.troop_cap = initial.troop_cap;
    config.spawn_interval_base_ms = initial.spawn_interval_base_ms;
    config.spawn_interval_floor_ms = initial.spawn_interval_floor_ms;
    config.base_hp = initial.base_hp;
    config.corpse_retention_ms = initial.corpse_retention_ms;

    fixed_time.set_timestep_hz(initial.tick_rate);
    info!("Simulation tick rate: {} Hz", initial.tick_rate);
}
