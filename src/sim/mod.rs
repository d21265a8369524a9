//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable (spawn-order) entity iteration
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod pathfind;
pub mod shop;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::{Rect, closest_point_on_rect, intersects, resolve};
pub use level::{Experience, KindScaling, Stats, xp_scaling, XP_BASE_TO_LEVEL, XP_LEVEL_GROWTH};
pub use pathfind::{CellBlock, NavGrid, find_path};
pub use shop::{Shop, UpgradeEffect, UpgradeId, WeightedBag, apply_upgrade};
pub use state::{
    Enemy, EnemyKind, Obstacle, Pickup, PickupKind, Player, Projectile, Side, SimState,
};
pub use tick::{TickInput, TickOutcome, tick};
pub use wave::WaveDirector;
