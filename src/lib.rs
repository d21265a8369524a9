//! Arena Survivors - a wave-based survival arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, leveling, agents, combat, waves, shop)
//! - `session`: Home → Play → Pause/Shop → GameOver state machine
//! - `checkpoint`: Versioned wave-start snapshots with disk round-trip
//! - `config`: Immutable run tunables

pub mod checkpoint;
pub mod config;
pub mod session;
pub mod sim;

pub use checkpoint::Checkpoint;
pub use config::SimConfig;
pub use session::{Command, Phase, Session};

use glam::Vec2;

/// Fixed world and timestep constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (simulation units)
    pub const WORLD_W: f32 = 320.0;
    pub const WORLD_H: f32 = 180.0;

    /// Margin the player keeps from the world edge
    pub const PLAYER_MARGIN: f32 = 8.0;
    /// Margin enemies keep from the world edge
    pub const ENEMY_MARGIN: f32 = 6.0;

    /// Agent speeds are stored in units-per-frame at 60 Hz; this converts
    /// them to units per second before integrating with dt.
    pub const SPEED_SCALE: f32 = 60.0;
}

/// Center of the world rectangle
#[inline]
pub fn world_center() -> Vec2 {
    Vec2::new(consts::WORLD_W / 2.0, consts::WORLD_H / 2.0)
}

/// Normalize a direction, substituting +X for degenerate (zero-length) input
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO { Vec2::X } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_normalize_degenerate() {
        assert_eq!(safe_normalize(Vec2::ZERO), Vec2::X);
        let n = safe_normalize(Vec2::new(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
