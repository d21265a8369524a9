//! The fixed-timestep simulation step
//!
//! One `tick` advances the world by `dt`: player movement and auto-fire,
//! enemy steering, auras and attacks, projectile resolution with staged kill
//! processing, pickup collection, and a single end-of-tick compaction of all
//! entity lists. Kills are staged during the projectile pass and processed
//! afterwards so XP redistribution always sees a consistent survivor set.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;

use super::collision::{intersects, resolve};
use super::state::{Enemy, EnemyKind, Obstacle, Pickup, Side, SimState};

/// Per-tick input from the control layer
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Normalized movement direction (zero when idle)
    pub move_dir: Vec2,
}

/// Separation leaves circles exactly touching, so contact tests that should
/// keep firing while an agent presses against a wall need a little slack.
const CONTACT_MARGIN: f32 = 0.25;

/// What the step concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    PlayerDied,
    /// Timer expired or all enemies are down
    WaveCleared,
}

/// Advance the simulation by one fixed step.
pub fn tick(state: &mut SimState, input: &TickInput, cfg: &SimConfig, dt: f32) -> TickOutcome {
    let SimState {
        rng,
        director,
        player,
        projectiles,
        pickups,
        wave_time_remaining,
        ..
    } = state;
    let wave = director.wave;
    let enemies = &mut director.enemies;
    let obstacles = &mut director.obstacles;

    // player movement, regen, and obstacle separation
    player.update(input.move_dir, dt);
    for o in obstacles.iter().filter(|o| o.alive) {
        player.pos = resolve(player.pos, player.radius, &o.rect);
    }

    if let Some(shot) = player.try_fire(enemies, rng) {
        projectiles.push(shot);
    }

    // support auras: gather sources first, then boost everyone in range.
    // The boost compounds gently over time rather than toggling on and off.
    let auras: Vec<(u32, Vec2, f32, f32)> = enemies
        .iter()
        .filter(|e| e.alive && !e.silenced() && e.kind == EnemyKind::Support)
        .map(|e| (e.id, e.pos, e.aura_radius, e.aura_mult))
        .collect();
    for e in enemies.iter_mut().filter(|e| e.alive) {
        for &(src_id, src_pos, radius, mult) in &auras {
            if e.id == src_id || e.pos.distance(src_pos) > radius {
                continue;
            }
            e.speed = (e.speed * mult.powf(dt * 0.2)).min(super::state::BOOSTED_SPEED_CAP);
            e.damage *= mult.powf(dt * 0.1);
        }
    }

    // enemy movement, separation, and attacks
    for e in enemies.iter_mut() {
        if !e.alive {
            continue;
        }
        e.update(player.pos, dt);
        if e.silenced() {
            continue;
        }
        for o in obstacles.iter().filter(|o| o.alive) {
            e.pos = resolve(e.pos, e.radius, &o.rect);
        }
        if let Some(shot) = e.try_fire(player.pos) {
            projectiles.push(shot);
        }
        if let Some(dmg) = e.try_melee(player.pos) {
            player.take_contact_damage(dmg);
        }
    }

    // enemies grind down obstacles they overlap, earning the obstacle's XP
    // if they land the destroying hit
    for e in enemies.iter_mut().filter(|e| e.alive && !e.silenced()) {
        for o in obstacles.iter_mut().filter(|o| o.alive) {
            if !intersects(e.pos, e.radius + CONTACT_MARGIN, &o.rect) {
                continue;
            }
            o.take_damage((e.damage * 0.6).max(2.0), Some(e.id));
            if !o.alive && o.last_attacker == Some(e.id) {
                e.gain_xp(o.xp_value);
                e.hp = (e.hp + 0.05 * e.max_hp).min(e.max_hp);
                maybe_drop_pickup(o, wave, player.stats.max_hp, rng, pickups);
            }
        }
    }

    // projectile pass; kills are staged, not processed inline
    let mut kills: Vec<usize> = Vec::new();
    for p in projectiles.iter_mut() {
        p.update(dt);
        if !p.alive {
            continue;
        }
        match p.side {
            Side::Player => {
                for (i, e) in enemies.iter_mut().enumerate() {
                    if !e.alive {
                        continue;
                    }
                    if e.pos.distance(p.pos) <= e.radius + p.radius {
                        e.take_damage(p.damage);
                        p.alive = false;
                        if !e.alive {
                            kills.push(i);
                        }
                        break;
                    }
                }
                if !p.alive {
                    continue;
                }
                for o in obstacles.iter_mut().filter(|o| o.alive) {
                    if o.rect.contains(p.pos) {
                        o.take_damage(p.damage, None);
                        p.alive = false;
                        if !o.alive {
                            player.loot += o.loot_value;
                            player.gain_xp(o.xp_value * 0.4);
                            maybe_drop_pickup(o, wave, player.stats.max_hp, rng, pickups);
                        }
                        break;
                    }
                }
            }
            Side::Enemy => {
                if player.alive && player.pos.distance(p.pos) <= player.radius + p.radius {
                    player.take_damage(p.damage);
                    p.alive = false;
                    continue;
                }
                for o in obstacles.iter_mut().filter(|o| o.alive) {
                    if o.rect.contains(p.pos) {
                        o.take_damage(p.damage, None);
                        p.alive = false;
                        break;
                    }
                }
            }
        }
    }

    for idx in kills {
        process_kill(enemies, idx, player, cfg, rng);
    }

    // pickups
    for it in pickups.iter_mut().filter(|it| it.alive) {
        if player.pos.distance(it.pos) <= player.radius + it.radius {
            player.stats.hp = (player.stats.hp + it.amount).min(player.stats.max_hp);
            it.alive = false;
        }
    }

    // single compaction point for all entity lists
    enemies.retain(|e| e.alive);
    obstacles.retain(|o| o.alive);
    projectiles.retain(|p| p.alive);
    pickups.retain(|it| it.alive);

    if !player.alive {
        log::info!("player died on wave {wave}");
        return TickOutcome::PlayerDied;
    }

    *wave_time_remaining = (*wave_time_remaining - dt).max(0.0);
    if *wave_time_remaining <= 0.0 || enemies.is_empty() {
        return TickOutcome::WaveCleared;
    }
    TickOutcome::Running
}

/// Grant kill rewards to the player and redistribute the victim's lifetime
/// XP among the survivors. Elites and bosses pass on a larger share.
fn process_kill(
    enemies: &mut [Enemy],
    idx: usize,
    player: &mut super::state::Player,
    cfg: &SimConfig,
    rng: &mut Pcg32,
) {
    let (kind, elite, lifetime) = {
        let e = &enemies[idx];
        (e.kind, e.elite, e.xp.lifetime)
    };
    let is_boss = kind == EnemyKind::Boss;

    let mut loot = rng.random_range(1..=3) + if elite { 2 } else { 0 };
    if elite || is_boss || lifetime >= cfg.elite_xp_threshold {
        loot += if elite || is_boss {
            cfg.elite_kill_bonus_special
        } else {
            cfg.elite_kill_bonus_normal
        };
    }
    player.loot += loot;
    player.gain_xp(8.0 + if elite { 4.0 } else { 0.0 });

    let survivors = enemies.iter().filter(|x| x.alive).count();
    if survivors == 0 {
        return;
    }
    let ratio = if elite || is_boss {
        cfg.elite_redistrib_ratio
    } else {
        cfg.generic_redistrib_ratio
    };
    let inherit = lifetime * ratio;
    if inherit <= 0.0 {
        return;
    }
    let share = inherit / survivors as f32;
    for s in enemies.iter_mut().filter(|x| x.alive) {
        s.gain_xp(share);
    }
    log::debug!(
        "kill of {kind:?} redistributed {inherit:.1} xp across {survivors} survivors"
    );
}

/// Roll a heal drop on obstacle destruction, at most once per obstacle.
/// Chance and potency both scale with the wave number.
fn maybe_drop_pickup(
    o: &mut Obstacle,
    wave: u32,
    player_max_hp: f32,
    rng: &mut Pcg32,
    pickups: &mut Vec<Pickup>,
) {
    if o.dropped {
        return;
    }
    o.dropped = true;
    let wave = wave.max(1) as f32;
    let chance = (0.25 + 0.02 * wave).clamp(0.25, 0.60);
    if rng.random::<f32>() < chance {
        let frac = (0.12 + 0.01 * wave).clamp(0.12, 0.35);
        let amount = (player_max_hp * frac).floor().max(8.0);
        pickups.push(Pickup::heal(o.rect.center(), amount));
    }
}
