//! Immutable run configuration
//!
//! Every gameplay tunable lives in one struct, constructed once and passed by
//! reference into the wave director, the shop, and the checkpoint layer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Simulation tunables. Construct with [`SimConfig::default`] and override
/// fields as needed; the struct is never mutated after session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    // --- wave director ---
    /// Inclusive range of obstacles placed per wave
    pub obstacles_per_wave: (u32, u32),
    /// Inclusive range of ordinary enemies per wave
    pub enemies_per_wave: (u32, u32),
    /// Every Nth wave is a boss wave
    pub boss_wave_every: u32,
    /// Minimum enemy spawn distance from the world center
    pub min_spawn_dist: f32,
    /// Obstacles never intersect this radius around the world center
    pub center_safe_radius: f32,
    /// Action-silence grace period for enemies on the first wave (seconds)
    pub first_wave_silence: f32,
    /// Time budget of an ordinary wave (seconds)
    pub normal_wave_time: f32,
    /// Base time budget of a boss wave (seconds)
    pub boss_wave_time_base: f32,
    /// Added per successive boss wave (seconds)
    pub boss_wave_time_step: f32,

    // --- death rewards ---
    /// Fraction of a dead elite/boss enemy's lifetime XP split among survivors
    pub elite_redistrib_ratio: f32,
    /// Same, for ordinary enemy deaths
    pub generic_redistrib_ratio: f32,
    /// Lifetime XP above which an unflagged enemy counts as elite for rewards
    pub elite_xp_threshold: f32,
    /// Loot bonus for killing an elite-by-XP enemy
    pub elite_kill_bonus_normal: u32,
    /// Loot bonus for killing a flagged elite or boss
    pub elite_kill_bonus_special: u32,

    // --- shop ---
    /// Offers presented per refresh
    pub shop_slots: usize,
    /// Linear price growth per wave on every catalog entry
    pub shop_cost_growth_per_wave: f32,
    /// Loot cost of rerolling the shop
    pub reroll_cost: u32,

    // --- persistence ---
    /// Checkpoint file location
    pub save_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            obstacles_per_wave: (8, 14),
            enemies_per_wave: (10, 16),
            boss_wave_every: 5,
            min_spawn_dist: 50.0,
            center_safe_radius: 12.0,
            first_wave_silence: 0.6,
            normal_wave_time: 30.0,
            boss_wave_time_base: 45.0,
            boss_wave_time_step: 5.0,

            elite_redistrib_ratio: 0.7,
            generic_redistrib_ratio: 0.6,
            elite_xp_threshold: 40.0,
            elite_kill_bonus_normal: 4,
            elite_kill_bonus_special: 6,

            shop_slots: 4,
            shop_cost_growth_per_wave: 1.5,
            reroll_cost: 4,

            save_path: PathBuf::from("savegame.json"),
        }
    }
}
