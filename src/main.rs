//! Headless demo runner
//!
//! Drives a session with a simple autopilot: kite away from the nearest
//! enemy, drift toward heal pickups, buy greedily in the shop. Useful for
//! balance smoke-testing without a frontend.
//!
//! Usage: arena-survivors [seed] [max-waves]

use glam::Vec2;

use arena_survivors::consts::SIM_DT;
use arena_survivors::sim::{EnemyKind, TickInput};
use arena_survivors::{Command, Phase, Session, SimConfig, safe_normalize};

fn autopilot(session: &Session) -> TickInput {
    let sim = session.sim();
    let player = &sim.player;

    let mut dir = Vec2::ZERO;
    if let Some(threat) = sim
        .director
        .enemies
        .iter()
        .filter(|e| e.alive)
        .min_by(|a, b| {
            player
                .pos
                .distance_squared(a.pos)
                .total_cmp(&player.pos.distance_squared(b.pos))
        })
    {
        let dist = player.pos.distance(threat.pos);
        let flee_radius = if threat.kind == EnemyKind::Suicide { 60.0 } else { 30.0 };
        if dist < flee_radius {
            dir += safe_normalize(player.pos - threat.pos);
        }
    }
    if let Some(heal) = sim.pickups.iter().find(|p| p.alive) {
        dir += safe_normalize(heal.pos - player.pos) * 0.5;
    }
    TickInput {
        move_dir: safe_normalize(dir) * dir.length().min(1.0),
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: Option<u64> = args.next().and_then(|s| s.parse().ok());
    let max_waves: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);

    let mut session = match seed {
        Some(seed) => Session::with_seed(SimConfig::default(), seed),
        None => {
            let mut s = Session::new(SimConfig::default());
            s.handle(Command::NewRun);
            s
        }
    };

    loop {
        match session.phase() {
            Phase::Playing => {
                let input = autopilot(&session);
                session.update(&input, SIM_DT);
            }
            Phase::Shop => {
                // buy slot 0 while affordable, then move on
                while session
                    .slot_cost(0)
                    .is_some_and(|c| session.sim().player.loot >= c)
                {
                    session.handle(Command::Purchase(0));
                }
                if session.hud().wave >= max_waves {
                    break;
                }
                session.handle(Command::NextWave);
            }
            Phase::GameOver => break,
            Phase::Home | Phase::Paused => break,
        }
    }

    let hud = session.hud();
    println!(
        "run ended: wave {}, level {}, {} loot, {:.0}/{:.0} hp, phase {:?}",
        hud.wave,
        hud.level,
        hud.loot,
        hud.hp.max(0.0),
        hud.max_hp,
        session.phase()
    );
}
