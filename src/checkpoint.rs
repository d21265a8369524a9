//! Wave-start checkpoints and on-disk saves
//!
//! A checkpoint stores the minimum needed to restart a run at the top of its
//! current wave: the schema version, run seed, wave number, and the player's
//! carried progression. The world itself is not stored; applying a checkpoint
//! regenerates the wave layout from `seed + wave`, which reproduces it
//! exactly.
//!
//! Disk persistence is best-effort. A save that cannot be written or a file
//! that cannot be read is logged and otherwise ignored; it must never take a
//! run down with it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::sim::level::{Experience, Stats};
use crate::sim::state::SimState;

/// Current checkpoint schema version. Files carrying any other version are
/// rejected on load.
pub const CHECKPOINT_VERSION: u32 = 1;

/// The player progression a checkpoint carries across waves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub loot: u32,
    #[serde(default)]
    pub xp: f32,
    #[serde(default)]
    pub lifetime_xp: f32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "default_xp_next")]
    pub xp_next: f32,
}

fn default_level() -> u32 {
    1
}

fn default_xp_next() -> f32 {
    crate::sim::level::XP_BASE_TO_LEVEL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub seed: u64,
    pub wave: u32,
    pub player: PlayerSnapshot,
}

impl Checkpoint {
    /// Snapshot the run at the top of the current wave
    pub fn capture(state: &SimState) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            seed: state.seed,
            wave: state.director.wave,
            player: PlayerSnapshot {
                stats: state.player.stats.clone(),
                loot: state.player.loot,
                xp: state.player.xp.current,
                lifetime_xp: state.player.xp.lifetime,
                level: state.player.xp.level,
                xp_next: state.player.xp.to_next,
            },
        }
    }

    /// Rebuild `state` to the start of the checkpointed wave: regenerate the
    /// layout from the stored seed and restore the player's progression with
    /// hp clamped to the restored maximum.
    pub fn apply(&self, state: &mut SimState, cfg: &SimConfig) {
        state.seed = self.seed;
        state.director.wave = self.wave;
        state.begin_wave(cfg);
        state.player.alive = true;
        state.player.stats = self.player.stats.clone();
        state.player.stats.hp = state.player.stats.hp.min(state.player.stats.max_hp);
        state.player.loot = self.player.loot;
        state.player.xp = Experience {
            current: self.player.xp,
            lifetime: self.player.lifetime_xp,
            level: self.player.level,
            to_next: self.player.xp_next,
        };
        state.player.fire_timer = 0.0;
        state.player.hurt_timer = 0.0;
    }

    /// Best-effort write. Returns whether the file landed on disk.
    pub fn save(&self, path: &Path) -> bool {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to serialize checkpoint: {e}");
                return false;
            }
        };
        match fs::write(path, json) {
            Ok(()) => {
                log::debug!("checkpoint for wave {} saved to {}", self.wave, path.display());
                true
            }
            Err(e) => {
                log::warn!("failed to write {}: {e}", path.display());
                false
            }
        }
    }

    /// Best-effort read. Missing files, malformed JSON, and unknown schema
    /// versions all come back as `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to read {}: {e}", path.display());
                }
                return None;
            }
        };
        let cp: Checkpoint = match serde_json::from_str(&json) {
            Ok(cp) => cp,
            Err(e) => {
                log::warn!("ignoring malformed save {}: {e}", path.display());
                return None;
            }
        };
        if cp.version != CHECKPOINT_VERSION {
            log::warn!(
                "ignoring save {} with unsupported version {}",
                path.display(),
                cp.version
            );
            return None;
        }
        Some(cp)
    }

    /// Remove a stale save file, ignoring errors
    pub fn delete(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to remove {}: {e}", path.display());
            }
        }
    }
}
