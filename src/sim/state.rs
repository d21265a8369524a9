//! Simulation entities and aggregate state
//!
//! Everything the renderer reads and the checkpoint layer snapshots lives
//! here. Iteration order over entity lists is stable (spawn order) so a
//! seeded run is reproducible tick for tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::consts::*;
use crate::{safe_normalize, world_center};

use super::collision::Rect;
use super::level::{Experience, Stats, xp_scaling};
use super::wave::WaveDirector;

/// Projectile lifetime in seconds
pub const PROJECTILE_LIFETIME: f32 = 2.5;
/// Projectiles also expire past this traveled distance
pub const PROJECTILE_MAX_RANGE: f32 = 260.0;
/// Invulnerability window after the player takes contact damage
pub const PLAYER_HURT_COOLDOWN: f32 = 0.4;
/// Ranged enemies back away when the player is closer than this
pub const RANGED_KITE_DIST: f32 = 36.0;
/// Ranged enemies only fire within this distance (bosses ignore it)
pub const RANGED_ENGAGE_DIST: f32 = 80.0;
/// Radius growth cap for ordinary enemies
pub const ENEMY_RADIUS_CAP: f32 = 8.0;
/// Radius growth cap for the boss kind
pub const BOSS_RADIUS_CAP: f32 = 14.0;
/// Hard cap on enemy movement speed (units per frame)
pub const ENEMY_SPEED_CAP: f32 = 1.5;
/// Cap on speed raised by level-ups or support auras
pub const BOOSTED_SPEED_CAP: f32 = 1.15;

/// Which side a projectile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Closed set of enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Melee,
    Ranged,
    Suicide,
    Support,
    Boss,
}

impl EnemyKind {
    /// The four kinds the wave director draws uniformly for ordinary spawns
    pub const ORDINARY: [EnemyKind; 4] = [
        EnemyKind::Melee,
        EnemyKind::Ranged,
        EnemyKind::Suicide,
        EnemyKind::Support,
    ];

    /// Baseline XP granted on spawn so drip-scaling is active from wave 1
    pub fn spawn_xp(self) -> f32 {
        match self {
            EnemyKind::Melee => 12.0,
            EnemyKind::Ranged => 10.0,
            EnemyKind::Suicide => 8.0,
            EnemyKind::Support => 10.0,
            EnemyKind::Boss => 30.0,
        }
    }

    /// Kinds that fire projectiles at the player
    pub fn fires_projectiles(self) -> bool {
        matches!(self, EnemyKind::Ranged | EnemyKind::Boss)
    }
}

/// The controlled protagonist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub xp: Experience,
    pub stats: Stats,
    pub loot: u32,
    /// Seconds until the next automatic shot
    pub fire_timer: f32,
    /// Contact-damage invulnerability countdown
    pub hurt_timer: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: 4.0,
            alive: true,
            xp: Experience::default(),
            stats: Stats::default(),
            loot: 0,
            fire_timer: 0.0,
            hurt_timer: 0.0,
        }
    }

    pub fn gain_xp(&mut self, amount: f32) {
        let levels = self.xp.gain(amount);
        for _ in 0..levels {
            self.stats.apply_level_up();
        }
        if levels > 0 {
            log::debug!("player reached level {}", self.xp.level);
        }
    }

    /// Movement, passive regen, and timer countdown for one tick.
    /// `intent` is the input collaborator's already-normalized direction.
    pub fn update(&mut self, intent: Vec2, dt: f32) {
        self.stats.hp = (self.stats.hp + self.stats.regen * dt).clamp(0.0, self.stats.max_hp);
        self.pos += intent * self.stats.speed * SPEED_SCALE * dt;
        self.pos.x = self.pos.x.clamp(PLAYER_MARGIN, WORLD_W - PLAYER_MARGIN);
        self.pos.y = self.pos.y.clamp(PLAYER_MARGIN, WORLD_H - PLAYER_MARGIN);
        self.fire_timer = (self.fire_timer - dt).max(0.0);
        self.hurt_timer = (self.hurt_timer - dt).max(0.0);
    }

    /// Automatic fire at the nearest living enemy, if any is in range
    pub fn try_fire(&mut self, enemies: &[Enemy], rng: &mut Pcg32) -> Option<Projectile> {
        if self.fire_timer > 0.0 {
            return None;
        }
        let target = enemies
            .iter()
            .filter(|e| e.alive)
            .min_by(|a, b| {
                let da = self.pos.distance_squared(a.pos);
                let db = self.pos.distance_squared(b.pos);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })?;
        let to = target.pos - self.pos;
        let dist = to.length();
        if dist > self.stats.range {
            return None;
        }
        let vel = safe_normalize(to) * self.stats.projectile_speed;
        let mut dmg = self.stats.damage;
        if rng.random::<f32>() < self.stats.crit_chance {
            dmg *= self.stats.crit_mult;
        }
        self.fire_timer = self.stats.attack_cooldown;
        Some(Projectile::new(self.pos, vel, dmg, Side::Player))
    }

    pub fn take_damage(&mut self, dmg: f32) {
        self.stats.hp = (self.stats.hp - dmg).max(0.0);
        if self.stats.hp <= 0.0 {
            self.alive = false;
        }
    }

    /// Contact damage gated by the invulnerability window.
    /// Returns whether the hit registered.
    pub fn take_contact_damage(&mut self, dmg: f32) -> bool {
        if self.hurt_timer > 0.0 {
            return false;
        }
        self.take_damage(dmg);
        self.hurt_timer = PLAYER_HURT_COOLDOWN;
        true
    }
}

/// An autonomous opponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub alive: bool,
    pub xp: Experience,
    pub kind: EnemyKind,
    pub elite: bool,
    pub max_hp: f32,
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub melee_range: f32,
    /// Seconds between melee attacks
    pub attack_cooldown: f32,
    /// Seconds between shots (ranged/boss)
    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    /// Support kind only
    pub aura_radius: f32,
    pub aura_mult: f32,
    pub atk_timer: f32,
    pub fire_timer: f32,
    /// Post-spawn grace period during which no action is taken
    pub spawn_silence: f32,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind, elite: bool) -> Self {
        let mut e = Self {
            id,
            pos,
            radius: if kind == EnemyKind::Boss { 8.0 } else { 4.0 },
            alive: true,
            xp: Experience::default(),
            kind,
            elite,
            max_hp: 40.0,
            hp: 40.0,
            speed: 0.75,
            damage: 6.0,
            melee_range: 6.0,
            attack_cooldown: 0.8,
            fire_cooldown: 1.2,
            projectile_speed: 90.0,
            aura_radius: 40.0,
            aura_mult: 1.2,
            atk_timer: 0.0,
            fire_timer: 0.0,
            spawn_silence: 0.0,
        };
        match kind {
            EnemyKind::Melee => {}
            EnemyKind::Ranged => {
                e.max_hp = 30.0;
                e.hp = 30.0;
                e.projectile_speed = 95.0;
                e.fire_cooldown = 1.0;
                e.speed = 0.65;
            }
            EnemyKind::Suicide => {
                e.max_hp = 20.0;
                e.hp = 20.0;
                e.speed = 0.85;
                e.melee_range = 8.0;
                e.damage = 14.0;
            }
            EnemyKind::Support => {
                e.max_hp = 35.0;
                e.hp = 35.0;
                e.speed = 0.6;
            }
            EnemyKind::Boss => {
                e.max_hp = 220.0;
                e.hp = 220.0;
                e.speed = 1.0;
                e.damage = 10.0;
                e.melee_range = 10.0;
                e.fire_cooldown = 0.9;
                e.projectile_speed = 110.0;
            }
        }
        if elite {
            e.max_hp *= 1.6;
            e.hp = e.max_hp;
            e.damage *= 1.4;
            e.speed *= 1.05;
        }
        e
    }

    #[inline]
    pub fn silenced(&self) -> bool {
        self.spawn_silence > 0.0
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    /// Continuous, kind-dependent scaling per XP gained. Also heals a little
    /// and grows the collision radius up to its cap.
    fn apply_xp_scaling(&mut self, amount: f32) {
        let u = amount / 10.0;
        let t = xp_scaling(self.kind);
        self.max_hp *= 1.0 + t.max_hp * u;
        self.hp = (self.hp + self.max_hp * 0.05 * u).min(self.max_hp);
        self.damage *= 1.0 + t.damage * u;
        self.speed *= 1.0 + t.speed * u;
        if t.projectile_speed > 0.0 {
            self.projectile_speed *= 1.0 + t.projectile_speed * u;
        }
        if t.aura > 0.0 {
            self.aura_mult = (self.aura_mult * (1.0 + t.aura * u * 0.5)).clamp(1.0, 1.6);
        }
        if self.kind == EnemyKind::Boss {
            self.radius = (self.radius + 0.2 * u).min(BOSS_RADIUS_CAP);
        } else {
            self.radius = (self.radius + 0.3 * u).min(ENEMY_RADIUS_CAP);
        }
        self.speed = self.speed.min(ENEMY_SPEED_CAP);
    }

    /// Drip-scale, then run the discrete level loop
    pub fn gain_xp(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.apply_xp_scaling(amount);
        let levels = self.xp.gain(amount);
        for _ in 0..levels {
            self.on_level_up();
        }
    }

    fn on_level_up(&mut self) {
        self.max_hp *= 1.08;
        self.hp = (self.hp + self.max_hp * 0.2).min(self.max_hp);
        self.damage *= 1.07;
        self.speed = (self.speed * 1.015).min(BOOSTED_SPEED_CAP);
        self.melee_range *= 1.01;
        self.fire_cooldown = (self.fire_cooldown * 0.98).max(0.55);
        self.projectile_speed *= 1.02;
    }

    pub fn take_damage(&mut self, dmg: f32) {
        self.hp = (self.hp - dmg).max(0.0);
        if self.hp <= 0.0 {
            self.alive = false;
        }
    }

    /// Greedy steering toward (or, when kiting, away from) the player and
    /// timer countdown for one tick. Silenced enemies only run timers.
    pub fn update(&mut self, player_pos: Vec2, dt: f32) {
        if self.silenced() {
            self.spawn_silence = (self.spawn_silence - dt).max(0.0);
            self.atk_timer -= dt;
            self.fire_timer -= dt;
            return;
        }
        let to = player_pos - self.pos;
        let dist = to.length();
        let mut desire = if dist > 0.0 { to / dist } else { Vec2::X };
        if self.kind == EnemyKind::Ranged && dist < RANGED_KITE_DIST {
            desire = -desire;
        }
        self.pos += desire * self.speed * SPEED_SCALE * dt;
        self.pos.x = self.pos.x.clamp(ENEMY_MARGIN, WORLD_W - ENEMY_MARGIN);
        self.pos.y = self.pos.y.clamp(ENEMY_MARGIN, WORLD_H - ENEMY_MARGIN);
        self.atk_timer -= dt;
        self.fire_timer -= dt;
    }

    /// Ranged/boss fire at the player, gated by engagement distance
    /// (bosses ignore the gate)
    pub fn try_fire(&mut self, player_pos: Vec2) -> Option<Projectile> {
        if !self.kind.fires_projectiles() || self.fire_timer > 0.0 {
            return None;
        }
        let to = player_pos - self.pos;
        if to.length() > RANGED_ENGAGE_DIST && self.kind != EnemyKind::Boss {
            return None;
        }
        self.fire_timer = self.fire_cooldown;
        let vel = safe_normalize(to) * self.projectile_speed;
        Some(Projectile::new(self.pos, vel, self.damage * 0.8, Side::Enemy))
    }

    /// Melee/contact attack. The suicide kind detonates (dies) on its first
    /// successful attack. Returns damage dealt.
    pub fn try_melee(&mut self, player_pos: Vec2) -> Option<f32> {
        if self.kind == EnemyKind::Ranged {
            return None;
        }
        if self.atk_timer <= 0.0 && self.pos.distance(player_pos) <= self.melee_range {
            self.atk_timer = self.attack_cooldown;
            if self.kind == EnemyKind::Suicide {
                self.alive = false;
            }
            return Some(self.damage);
        }
        None
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub side: Side,
    pub radius: f32,
    pub life: f32,
    #[serde(default)]
    pub traveled: f32,
    pub alive: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, damage: f32, side: Side) -> Self {
        Self {
            pos,
            vel,
            damage,
            side,
            radius: 2.0,
            life: PROJECTILE_LIFETIME,
            traveled: 0.0,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let step = self.vel * dt;
        self.pos += step;
        self.traveled += step.length();
        self.life -= dt;
        if self.life <= 0.0 || self.traveled >= PROJECTILE_MAX_RANGE {
            self.alive = false;
        }
    }
}

/// Pickup kinds (heal is the only one so far)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Heal,
}

/// A collectible drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub amount: f32,
    pub radius: f32,
    pub alive: bool,
}

impl Pickup {
    pub fn heal(pos: Vec2, amount: f32) -> Self {
        Self {
            pos,
            kind: PickupKind::Heal,
            amount,
            radius: 3.0,
            alive: true,
        }
    }
}

/// A destructible rectangular obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub max_hp: f32,
    pub hp: f32,
    pub loot_value: u32,
    pub xp_value: f32,
    pub alive: bool,
    /// Id of the last enemy that damaged it, for XP attribution
    pub last_attacker: Option<u32>,
    /// One-shot guard so destruction rolls at most one pickup drop
    pub dropped: bool,
}

impl Obstacle {
    pub fn new(rect: Rect, hp: f32, loot_value: u32, xp_value: f32) -> Self {
        Self {
            rect,
            max_hp: hp,
            hp,
            loot_value,
            xp_value,
            alive: true,
            last_attacker: None,
            dropped: false,
        }
    }

    pub fn take_damage(&mut self, amount: f32, attacker: Option<u32>) {
        if !self.alive {
            return;
        }
        if attacker.is_some() {
            self.last_attacker = attacker;
        }
        self.hp = (self.hp - amount).max(0.0);
        if self.hp <= 0.0 {
            self.alive = false;
        }
    }

    pub fn integrity_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }
}

/// Complete simulation state for one run.
///
/// The wave RNG is reseeded to `seed + wave` at every wave start, so a wave's
/// layout is a pure function of the (seed, wave) pair and checkpoint
/// regeneration reproduces it exactly.
#[derive(Debug, Clone)]
pub struct SimState {
    pub seed: u64,
    pub rng: Pcg32,
    pub director: WaveDirector,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub wave_time_remaining: f32,
}

impl SimState {
    pub fn new(seed: u64, cfg: &SimConfig) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            director: WaveDirector::new(),
            player: Player::new(world_center()),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            wave_time_remaining: 0.0,
        };
        state.begin_wave(cfg);
        state
    }

    /// Regenerate the current wave from scratch: reseed, respawn the layout,
    /// clear transients, recenter the player, reset the timer.
    pub fn begin_wave(&mut self, cfg: &SimConfig) {
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.director.wave as u64));
        self.director.spawn_wave(cfg, &mut self.rng);
        self.projectiles.clear();
        self.pickups.clear();
        self.player.pos = world_center();
        self.wave_time_remaining = self.director.wave_duration(cfg);
    }

    pub fn next_wave(&mut self, cfg: &SimConfig) {
        self.director.wave += 1;
        self.begin_wave(cfg);
    }
}
