//! Experience accumulation and stat scaling
//!
//! Two mechanisms stack: a discrete level loop with a geometrically growing
//! threshold, and (for enemies) continuous per-XP drip scaling driven by the
//! kind tables below. An agent's power is therefore a smooth, path-dependent
//! function of total XP received, not just its level.

use serde::{Deserialize, Serialize};

use super::state::EnemyKind;

/// XP required for the first level-up
pub const XP_BASE_TO_LEVEL: f32 = 25.0;
/// Threshold multiplier per level
pub const XP_LEVEL_GROWTH: f32 = 1.35;

/// Experience counters shared by every agent.
///
/// `current` is net-of-levels and stays strictly below `to_next` outside the
/// leveling loop; `lifetime` tracks gross gain and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub current: f32,
    pub lifetime: f32,
    pub level: u32,
    pub to_next: f32,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            current: 0.0,
            lifetime: 0.0,
            level: 1,
            to_next: XP_BASE_TO_LEVEL,
        }
    }
}

impl Experience {
    /// Add experience, consuming thresholds as they are crossed.
    /// Returns the number of level-ups triggered so the caller can apply its
    /// per-level bonuses once per level. Non-positive amounts are a no-op.
    pub fn gain(&mut self, amount: f32) -> u32 {
        if amount <= 0.0 {
            return 0;
        }
        self.lifetime += amount;
        self.current += amount;
        let mut levels = 0;
        while self.current >= self.to_next {
            self.current -= self.to_next;
            self.level += 1;
            self.to_next *= XP_LEVEL_GROWTH;
            levels += 1;
        }
        levels
    }
}

/// The player's full combat stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: f32,
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    /// Seconds between shots
    pub attack_cooldown: f32,
    pub projectile_speed: f32,
    pub crit_chance: f32,
    pub crit_mult: f32,
    /// Passive hp per second
    pub regen: f32,
    pub range: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_hp: 80.0,
            hp: 80.0,
            speed: 1.6,
            damage: 4.0,
            attack_cooldown: 0.7,
            projectile_speed: 100.0,
            crit_chance: 0.03,
            crit_mult: 1.8,
            regen: 0.15,
            range: 50.0,
        }
    }
}

impl Stats {
    /// Multiplicative bonuses applied once per player level-up
    pub fn apply_level_up(&mut self) {
        self.max_hp *= 1.05;
        self.hp = (self.hp + self.max_hp * 0.25).min(self.max_hp);
        self.damage *= 1.06;
        self.speed *= 1.02;
        self.range *= 1.02;
        self.regen *= 1.04;
        self.attack_cooldown *= 0.99;
    }
}

/// Per-XP-unit fractional multipliers for enemy continuous scaling.
/// One unit is 10 XP; a field of 0.015 means +1.5% per unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindScaling {
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    /// Ranged/boss kinds only
    pub projectile_speed: f32,
    /// Support kind only
    pub aura: f32,
}

/// Continuous scaling table, exhaustive over the closed kind set
pub fn xp_scaling(kind: EnemyKind) -> KindScaling {
    match kind {
        EnemyKind::Melee => KindScaling {
            max_hp: 0.015,
            damage: 0.012,
            speed: 0.006,
            projectile_speed: 0.0,
            aura: 0.0,
        },
        EnemyKind::Ranged => KindScaling {
            max_hp: 0.010,
            damage: 0.010,
            speed: 0.006,
            projectile_speed: 0.008,
            aura: 0.0,
        },
        EnemyKind::Suicide => KindScaling {
            max_hp: 0.008,
            damage: 0.018,
            speed: 0.010,
            projectile_speed: 0.0,
            aura: 0.0,
        },
        EnemyKind::Support => KindScaling {
            max_hp: 0.012,
            damage: 0.008,
            speed: 0.005,
            projectile_speed: 0.0,
            aura: 0.010,
        },
        EnemyKind::Boss => KindScaling {
            max_hp: 0.010,
            damage: 0.010,
            speed: 0.004,
            projectile_speed: 0.006,
            aura: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_below_threshold_no_level() {
        let mut xp = Experience::default();
        assert_eq!(xp.gain(10.0), 0);
        assert_eq!(xp.level, 1);
        assert!((xp.current - 10.0).abs() < 1e-6);
        assert!((xp.lifetime - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_gain_crosses_multiple_levels() {
        let mut xp = Experience::default();
        // 25 + 25*1.35 = 58.75; 70 crosses two thresholds
        assert_eq!(xp.gain(70.0), 2);
        assert_eq!(xp.level, 3);
        assert!(xp.current < xp.to_next);
        assert!((xp.to_next - 25.0 * 1.35 * 1.35).abs() < 1e-3);
        assert!((xp.lifetime - 70.0).abs() < 1e-6);
    }

    #[test]
    fn test_gain_non_positive_is_noop() {
        let mut xp = Experience::default();
        xp.gain(5.0);
        let before = xp.clone();
        assert_eq!(xp.gain(0.0), 0);
        assert_eq!(xp.gain(-3.0), 0);
        assert_eq!(xp, before);
    }

    #[test]
    fn test_player_level_up_bonuses() {
        let mut s = Stats {
            hp: 40.0,
            ..Stats::default()
        };
        s.apply_level_up();
        assert!((s.max_hp - 84.0).abs() < 1e-4);
        assert!((s.hp - (40.0 + 84.0 * 0.25)).abs() < 1e-4);
        assert!((s.damage - 4.24).abs() < 1e-4);
        assert!((s.attack_cooldown - 0.693).abs() < 1e-4);
    }

    #[test]
    fn test_scaling_table_kind_specifics() {
        assert!(xp_scaling(EnemyKind::Ranged).projectile_speed > 0.0);
        assert!(xp_scaling(EnemyKind::Melee).projectile_speed == 0.0);
        assert!(xp_scaling(EnemyKind::Support).aura > 0.0);
        assert!(xp_scaling(EnemyKind::Boss).aura == 0.0);
    }
}
