//! Wave director: layout generation and difficulty pacing
//!
//! All randomness flows through the caller-provided RNG, so a wave layout is
//! fully determined by the RNG state at spawn time.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;
use crate::consts::*;
use crate::world_center;

use super::collision::{Rect, intersects};
use super::state::{Enemy, EnemyKind, Obstacle};

/// Owns the per-wave entity lists and the wave counter.
#[derive(Debug, Clone, Default)]
pub struct WaveDirector {
    pub wave: u32,
    pub enemies: Vec<Enemy>,
    pub obstacles: Vec<Obstacle>,
    next_id: u32,
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            wave: 1,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            next_id: 0,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_boss_wave(&self, cfg: &SimConfig) -> bool {
        self.wave % cfg.boss_wave_every == 0
    }

    /// How long this wave runs. Boss waves start longer and each subsequent
    /// one adds a fixed step.
    pub fn wave_duration(&self, cfg: &SimConfig) -> f32 {
        if self.is_boss_wave(cfg) {
            let boss_index = (self.wave / cfg.boss_wave_every).max(1);
            cfg.boss_wave_time_base + (boss_index - 1) as f32 * cfg.boss_wave_time_step
        } else {
            cfg.normal_wave_time
        }
    }

    /// Generate the current wave's layout: destructible obstacles kept clear
    /// of the center, enemies kept outside the minimum spawn distance, one
    /// random spawn promoted to champion, plus a boss on boss waves.
    pub fn spawn_wave(&mut self, cfg: &SimConfig, rng: &mut Pcg32) {
        self.enemies.clear();
        self.obstacles.clear();
        let center = world_center();

        let nobs = rng.random_range(cfg.obstacles_per_wave.0..=cfg.obstacles_per_wave.1);
        for _ in 0..nobs {
            for _try in 0..20 {
                let w = rng.random_range(8..=18) as f32;
                let h = rng.random_range(8..=18) as f32;
                let x = rng.random_range(8..=(WORLD_W as i32 - 8 - w as i32)) as f32;
                let y = rng.random_range(16..=(WORLD_H as i32 - 16 - h as i32)) as f32;
                let rect = Rect { x, y, w, h };
                if intersects(center, cfg.center_safe_radius, &rect) {
                    continue;
                }
                let hp = rng.random_range(30..=60) as f32;
                let loot = rng.random_range(1..=4);
                let xp = rng.random_range(4.0..10.0);
                self.obstacles.push(Obstacle::new(rect, hp, loot, xp));
                break;
            }
        }

        let is_boss = self.is_boss_wave(cfg);
        let mut count = rng.random_range(cfg.enemies_per_wave.0..=cfg.enemies_per_wave.1);
        if is_boss {
            // fewer trash, plus a boss
            count = count.saturating_sub(4).max(8);
        }
        for _ in 0..count {
            let kind = EnemyKind::ORDINARY[rng.random_range(0..EnemyKind::ORDINARY.len())];
            for _try in 0..50 {
                let x = rng.random_range(10..=(WORLD_W as i32 - 10)) as f32;
                let y = rng.random_range(20..=(WORLD_H as i32 - 20)) as f32;
                let pos = Vec2::new(x, y);
                if pos.distance(center) >= cfg.min_spawn_dist {
                    let id = self.alloc_id();
                    let mut e = Enemy::new(id, pos, kind, false);
                    e.gain_xp(kind.spawn_xp());
                    if self.wave == 1 {
                        e.spawn_silence = cfg.first_wave_silence;
                    }
                    self.enemies.push(e);
                    break;
                }
            }
        }

        // one champion per wave
        if !self.enemies.is_empty() {
            let idx = rng.random_range(0..self.enemies.len());
            let champ = &mut self.enemies[idx];
            champ.elite = true;
            champ.max_hp *= 1.4;
            champ.hp = champ.max_hp;
            champ.damage *= 1.35;
            champ.speed *= 1.05;
        }

        if is_boss {
            for _try in 0..50 {
                let x = rng.random_range(20..=(WORLD_W as i32 - 20)) as f32;
                let y = rng.random_range(20..=(WORLD_H as i32 - 20)) as f32;
                let pos = Vec2::new(x, y);
                if pos.distance(center) >= cfg.min_spawn_dist {
                    let id = self.alloc_id();
                    let mut boss = Enemy::new(id, pos, EnemyKind::Boss, true);
                    boss.gain_xp(EnemyKind::Boss.spawn_xp());
                    self.enemies.push(boss);
                    break;
                }
            }
        }

        log::info!(
            "wave {} spawned: {} enemies, {} obstacles{}",
            self.wave,
            self.enemies.len(),
            self.obstacles.len(),
            if is_boss { " (boss wave)" } else { "" }
        );
    }
}
