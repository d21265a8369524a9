//! Run lifecycle: phase machine, commands, and the fixed-step driver
//!
//! A `Session` owns the simulation plus everything around it: the shop, the
//! current wave checkpoint, and the phase the run is in. Frontends feed it
//! wall-clock time and `Command`s; it feeds the simulation fixed steps and
//! moves between phases on tick outcomes.

use rand::Rng;

use crate::checkpoint::Checkpoint;
use crate::config::SimConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::shop::Shop;
use crate::sim::state::SimState;
use crate::sim::tick::{TickInput, TickOutcome, tick};

/// Where the run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Home,
    Playing,
    Paused,
    Shop,
    GameOver,
}

/// Frontend-issued commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewRun,
    ContinueRun,
    /// Toggles pause; resuming returns to the phase that was paused
    Pause,
    /// Restart the current wave from its checkpoint
    Rollback,
    Purchase(usize),
    RerollShop,
    NextWave,
    GoHome,
}

/// Read-only snapshot of what a HUD needs each frame
#[derive(Debug, Clone, Copy)]
pub struct HudView {
    pub hp: f32,
    pub max_hp: f32,
    pub xp: f32,
    pub xp_next: f32,
    pub level: u32,
    pub loot: u32,
    pub wave: u32,
    pub time_remaining: f32,
    pub enemies_alive: usize,
}

pub struct Session {
    cfg: SimConfig,
    sim: SimState,
    shop: Shop,
    phase: Phase,
    prev_phase: Phase,
    checkpoint: Checkpoint,
    accumulator: f32,
}

impl Session {
    pub fn new(cfg: SimConfig) -> Self {
        let sim = SimState::new(0, &cfg);
        let checkpoint = Checkpoint::capture(&sim);
        Self {
            cfg,
            sim,
            shop: Shop::new(),
            phase: Phase::Home,
            prev_phase: Phase::Playing,
            checkpoint,
            accumulator: 0.0,
        }
    }

    /// Start playing immediately on a fixed seed, checkpointing as a new run
    pub fn with_seed(cfg: SimConfig, seed: u64) -> Self {
        let mut session = Self::new(cfg);
        session.sim = SimState::new(seed, &session.cfg);
        session.save_checkpoint();
        session.phase = Phase::Playing;
        session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sim(&self) -> &SimState {
        &self.sim
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn hud(&self) -> HudView {
        HudView {
            hp: self.sim.player.stats.hp,
            max_hp: self.sim.player.stats.max_hp,
            xp: self.sim.player.xp.current,
            xp_next: self.sim.player.xp.to_next,
            level: self.sim.player.xp.level,
            loot: self.sim.player.loot,
            wave: self.sim.director.wave,
            time_remaining: self.sim.wave_time_remaining,
            enemies_alive: self.sim.director.enemies.len(),
        }
    }

    /// Price of the shop slot at `idx` under current-wave pricing
    pub fn slot_cost(&self, idx: usize) -> Option<u32> {
        let id = *self.shop.slots.get(idx)?;
        Some(self.shop.cost(id, self.sim.director.wave, &self.cfg))
    }

    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::NewRun => self.new_run(),
            Command::ContinueRun => self.continue_run(),
            Command::Pause => match self.phase {
                Phase::Playing | Phase::Shop => {
                    self.prev_phase = self.phase;
                    self.phase = Phase::Paused;
                }
                Phase::Paused => self.phase = self.prev_phase,
                Phase::Home | Phase::GameOver => {}
            },
            Command::Rollback => {
                if self.phase == Phase::Paused || self.phase == Phase::GameOver {
                    self.checkpoint.apply(&mut self.sim, &self.cfg);
                    self.accumulator = 0.0;
                    self.phase = Phase::Playing;
                    log::info!("rolled back to wave {}", self.sim.director.wave);
                }
            }
            Command::Purchase(idx) => {
                if self.phase == Phase::Shop {
                    self.shop
                        .purchase(idx, &mut self.sim.player, self.sim.director.wave, &self.cfg);
                }
            }
            Command::RerollShop => {
                if self.phase == Phase::Shop {
                    let wave = self.sim.director.wave;
                    self.shop
                        .reroll(&mut self.sim.player, wave, &mut self.sim.rng, &self.cfg);
                }
            }
            Command::NextWave => {
                if self.phase == Phase::Shop {
                    self.sim.next_wave(&self.cfg);
                    self.save_checkpoint();
                    self.accumulator = 0.0;
                    self.phase = Phase::Playing;
                }
            }
            Command::GoHome => {
                if self.phase != Phase::Playing {
                    self.phase = Phase::Home;
                }
            }
        }
    }

    /// Advance by wall-clock `dt`, running as many fixed steps as fit
    /// (bounded, so a long stall cannot spiral).
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        if self.phase != Phase::Playing {
            return;
        }
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
            match tick(&mut self.sim, input, &self.cfg, SIM_DT) {
                TickOutcome::Running => {}
                TickOutcome::PlayerDied => {
                    self.phase = Phase::GameOver;
                    return;
                }
                TickOutcome::WaveCleared => {
                    self.enter_shop();
                    return;
                }
            }
        }
        // drop whatever the substep cap could not absorb
        if self.accumulator >= SIM_DT {
            self.accumulator = 0.0;
        }
    }

    fn enter_shop(&mut self) {
        // on timeout, whatever is still standing is swept away
        if self.sim.wave_time_remaining <= 0.0 {
            self.sim.director.enemies.clear();
            self.sim.projectiles.clear();
        }
        let wave = self.sim.director.wave;
        self.shop.roll(wave, self.cfg.shop_slots, &mut self.sim.rng);
        self.phase = Phase::Shop;
        log::info!("wave {wave} cleared, entering shop");
    }

    fn new_run(&mut self) {
        let seed = rand::rng().random::<u64>();
        log::info!("starting new run with seed {seed}");
        self.sim = SimState::new(seed, &self.cfg);
        self.shop = Shop::new();
        self.accumulator = 0.0;
        self.save_checkpoint();
        self.phase = Phase::Playing;
    }

    /// Resume the saved run, or fall back to a fresh one
    fn continue_run(&mut self) {
        match Checkpoint::load(&self.cfg.save_path) {
            Some(cp) => {
                cp.apply(&mut self.sim, &self.cfg);
                self.checkpoint = cp;
                self.shop = Shop::new();
                self.accumulator = 0.0;
                self.phase = Phase::Playing;
                log::info!("continuing run at wave {}", self.sim.director.wave);
            }
            None => self.new_run(),
        }
    }

    fn save_checkpoint(&mut self) {
        self.checkpoint = Checkpoint::capture(&self.sim);
        self.checkpoint.save(&self.cfg.save_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg(name: &str) -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.save_path = std::env::temp_dir().join(format!(
            "arena-survivors-session-{name}-{}.json",
            std::process::id()
        ));
        cfg
    }

    fn cleanup(cfg: &SimConfig) {
        Checkpoint::delete(&cfg.save_path);
    }

    #[test]
    fn test_new_run_enters_play_and_saves() {
        let cfg = test_cfg("new-run");
        let mut s = Session::new(cfg.clone());
        assert_eq!(s.phase(), Phase::Home);
        s.handle(Command::NewRun);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.sim().director.wave, 1);
        assert!(Checkpoint::load(&cfg.save_path).is_some());
        cleanup(&cfg);
    }

    #[test]
    fn test_pause_resumes_to_previous_phase() {
        let cfg = test_cfg("pause");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.handle(Command::Pause);
        assert_eq!(s.phase(), Phase::Paused);
        s.handle(Command::Pause);
        assert_eq!(s.phase(), Phase::Playing);
        cleanup(&cfg);
    }

    #[test]
    fn test_update_is_inert_outside_play() {
        let cfg = test_cfg("inert");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.handle(Command::Pause);
        let time = s.sim().wave_time_remaining;
        s.update(&TickInput::default(), 1.0);
        assert_eq!(s.sim().wave_time_remaining, time);
        cleanup(&cfg);
    }

    #[test]
    fn test_timer_expiry_enters_shop_and_sweeps() {
        let cfg = test_cfg("timeout");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.wave_time_remaining = 0.001;
        s.sim.player.fire_timer = 100.0;
        s.update(&TickInput::default(), SIM_DT);
        assert_eq!(s.phase(), Phase::Shop);
        assert!(s.sim().director.enemies.is_empty());
        assert!(s.sim().projectiles.is_empty());
        assert_eq!(s.shop().slots.len(), cfg.shop_slots);
        cleanup(&cfg);
    }

    #[test]
    fn test_clearing_all_enemies_enters_shop() {
        let cfg = test_cfg("cleared");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.director.enemies.clear();
        s.update(&TickInput::default(), SIM_DT);
        assert_eq!(s.phase(), Phase::Shop);
        cleanup(&cfg);
    }

    #[test]
    fn test_next_wave_advances_and_checkpoints() {
        let cfg = test_cfg("next-wave");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.director.enemies.clear();
        s.update(&TickInput::default(), SIM_DT);
        assert_eq!(s.phase(), Phase::Shop);
        s.handle(Command::NextWave);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.sim().director.wave, 2);
        let saved = Checkpoint::load(&cfg.save_path).expect("saved");
        assert_eq!(saved.wave, 2);
        cleanup(&cfg);
    }

    #[test]
    fn test_rollback_restores_wave_start() {
        let cfg = test_cfg("rollback");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        let enemies_at_start = s.sim().director.enemies.len();
        // damage the wave a bit, then roll back from pause
        s.sim.director.enemies.truncate(2);
        s.sim.wave_time_remaining = 5.0;
        s.handle(Command::Pause);
        s.handle(Command::Rollback);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.sim().director.enemies.len(), enemies_at_start);
        assert_eq!(
            s.sim().wave_time_remaining,
            s.sim().director.wave_duration(&cfg)
        );
        cleanup(&cfg);
    }

    #[test]
    fn test_continue_run_restores_saved_progress() {
        let cfg = test_cfg("continue");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.director.enemies.clear();
        s.update(&TickInput::default(), SIM_DT);
        s.handle(Command::NextWave); // saves wave 2
        let seed = s.sim().seed;

        let mut resumed = Session::new(cfg.clone());
        resumed.handle(Command::ContinueRun);
        assert_eq!(resumed.phase(), Phase::Playing);
        assert_eq!(resumed.sim().director.wave, 2);
        assert_eq!(resumed.sim().seed, seed);
        cleanup(&cfg);
    }

    #[test]
    fn test_continue_without_save_starts_fresh() {
        let cfg = test_cfg("continue-fresh");
        Checkpoint::delete(&cfg.save_path);
        let mut s = Session::new(cfg.clone());
        s.handle(Command::ContinueRun);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.sim().director.wave, 1);
        cleanup(&cfg);
    }

    #[test]
    fn test_purchase_only_valid_in_shop() {
        let cfg = test_cfg("purchase-phase");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.player.loot = 1000;
        let loot = s.sim().player.loot;
        s.handle(Command::Purchase(0));
        assert_eq!(s.sim().player.loot, loot);

        s.sim.director.enemies.clear();
        s.update(&TickInput::default(), SIM_DT);
        assert_eq!(s.phase(), Phase::Shop);
        s.handle(Command::Purchase(0));
        assert!(s.sim().player.loot < loot);
        cleanup(&cfg);
    }

    #[test]
    fn test_game_over_on_player_death() {
        let cfg = test_cfg("death");
        let mut s = Session::new(cfg.clone());
        s.handle(Command::NewRun);
        s.sim.player.stats.hp = 0.1;
        let pos = s.sim.player.pos;
        let mut killer =
            crate::sim::state::Enemy::new(9999, pos, crate::sim::state::EnemyKind::Melee, false);
        killer.damage = 1000.0;
        s.sim.director.enemies.push(killer);
        s.update(&TickInput::default(), SIM_DT);
        assert_eq!(s.phase(), Phase::GameOver);
        cleanup(&cfg);
    }
}
