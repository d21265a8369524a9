//! Between-wave reward shop
//!
//! Upgrades are data (`UpgradeEffect`) applied by a single function, and slot
//! selection goes through a weight-halving bag to reduce repeats within one
//! refresh. Prices grow linearly with the wave number.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;

use super::level::Stats;
use super::state::Player;

/// The fixed upgrade catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    Damage,
    AttackSpeed,
    MaxHp,
    MoveSpeed,
    Crit,
    Range,
    Regen,
}

/// What an upgrade does to player stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeEffect {
    DamageFlat(f32),
    /// Multiplies the attack cooldown, clamped to a floor
    AttackCooldownMult { mult: f32, floor: f32 },
    /// Raises max hp and heals by the same amount
    MaxHpFlat(f32),
    SpeedMult(f32),
    /// Additive crit chance, clamped to a cap
    CritChanceAdd { amount: f32, cap: f32 },
    RangeFlat(f32),
    RegenFlat(f32),
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 7] = [
        UpgradeId::Damage,
        UpgradeId::AttackSpeed,
        UpgradeId::MaxHp,
        UpgradeId::MoveSpeed,
        UpgradeId::Crit,
        UpgradeId::Range,
        UpgradeId::Regen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeId::Damage => "+Damage",
            UpgradeId::AttackSpeed => "+Attack Speed",
            UpgradeId::MaxHp => "+Max HP",
            UpgradeId::MoveSpeed => "+Move Speed",
            UpgradeId::Crit => "+Crit Chance",
            UpgradeId::Range => "+Range",
            UpgradeId::Regen => "+Regen",
        }
    }

    pub fn base_cost(self) -> u32 {
        match self {
            UpgradeId::Damage => 8,
            UpgradeId::AttackSpeed => 9,
            UpgradeId::MaxHp => 8,
            UpgradeId::MoveSpeed => 7,
            UpgradeId::Crit => 7,
            UpgradeId::Range => 6,
            UpgradeId::Regen => 6,
        }
    }

    pub fn effect(self) -> UpgradeEffect {
        match self {
            UpgradeId::Damage => UpgradeEffect::DamageFlat(2.0),
            UpgradeId::AttackSpeed => UpgradeEffect::AttackCooldownMult {
                mult: 0.93,
                floor: 0.35,
            },
            UpgradeId::MaxHp => UpgradeEffect::MaxHpFlat(15.0),
            UpgradeId::MoveSpeed => UpgradeEffect::SpeedMult(1.08),
            UpgradeId::Crit => UpgradeEffect::CritChanceAdd {
                amount: 0.03,
                cap: 0.7,
            },
            UpgradeId::Range => UpgradeEffect::RangeFlat(6.0),
            UpgradeId::Regen => UpgradeEffect::RegenFlat(0.05),
        }
    }

    /// Draw weight at a given wave. Offensive upgrades drift upward so later
    /// refreshes skew toward damage.
    pub fn weight(self, wave: u32) -> f32 {
        let w = wave as f32;
        match self {
            UpgradeId::Damage => 1.0 + w * 0.02,
            UpgradeId::AttackSpeed => 0.9 + w * 0.02,
            UpgradeId::MaxHp => 1.0,
            UpgradeId::MoveSpeed => 0.9,
            UpgradeId::Crit => 0.8,
            UpgradeId::Range => 0.7,
            UpgradeId::Regen => 0.7,
        }
    }
}

/// Apply one upgrade effect to the player's stats
pub fn apply_upgrade(stats: &mut Stats, effect: UpgradeEffect) {
    match effect {
        UpgradeEffect::DamageFlat(amount) => stats.damage += amount,
        UpgradeEffect::AttackCooldownMult { mult, floor } => {
            stats.attack_cooldown = (stats.attack_cooldown * mult).max(floor);
        }
        UpgradeEffect::MaxHpFlat(amount) => {
            stats.max_hp += amount;
            stats.hp = (stats.hp + amount).min(stats.max_hp);
        }
        UpgradeEffect::SpeedMult(mult) => stats.speed *= mult,
        UpgradeEffect::CritChanceAdd { amount, cap } => {
            stats.crit_chance = (stats.crit_chance + amount).min(cap);
        }
        UpgradeEffect::RangeFlat(amount) => stats.range += amount,
        UpgradeEffect::RegenFlat(amount) => stats.regen += amount,
    }
}

/// Weighted sampling bag. Each draw halves the drawn item's weight (with a
/// small floor) so a single refresh rarely repeats an item.
#[derive(Debug, Clone)]
pub struct WeightedBag {
    items: Vec<(UpgradeId, f32)>,
}

impl WeightedBag {
    pub fn new(items: Vec<(UpgradeId, f32)>) -> Self {
        Self { items }
    }

    pub fn for_wave(wave: u32) -> Self {
        Self::new(
            UpgradeId::ALL
                .iter()
                .map(|&id| (id, id.weight(wave)))
                .collect(),
        )
    }

    pub fn total_weight(&self) -> f32 {
        self.items.iter().map(|(_, w)| w).sum()
    }

    pub fn draw(&mut self, rng: &mut Pcg32) -> Option<UpgradeId> {
        let total = self.total_weight();
        if total <= 0.0 || self.items.is_empty() {
            return None;
        }
        let r = rng.random::<f32>() * total;
        let mut cum = 0.0;
        for item in self.items.iter_mut() {
            cum += item.1;
            if r <= cum {
                let id = item.0;
                item.1 = (item.1 * 0.5).max(0.1);
                return Some(id);
            }
        }
        // float roundoff can leave r just past the last cumulative bound
        let last = self.items.last_mut()?;
        let id = last.0;
        last.1 = (last.1 * 0.5).max(0.1);
        Some(id)
    }

    pub fn draw_n(&mut self, n: usize, rng: &mut Pcg32) -> Vec<UpgradeId> {
        let n = n.min(self.items.len());
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.draw(rng) {
                Some(id) => out.push(id),
                None => break,
            }
        }
        out
    }
}

/// The between-wave shop: rolled slots plus pricing and purchase rules.
#[derive(Debug, Clone, Default)]
pub struct Shop {
    pub slots: Vec<UpgradeId>,
}

impl Shop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price of an upgrade at a given wave
    pub fn cost(&self, id: UpgradeId, wave: u32, cfg: &SimConfig) -> u32 {
        let growth = cfg.shop_cost_growth_per_wave * wave.saturating_sub(1) as f32;
        (id.base_cost() as f32 + growth).ceil() as u32
    }

    pub fn roll(&mut self, wave: u32, slots: usize, rng: &mut Pcg32) {
        let mut bag = WeightedBag::for_wave(wave);
        self.slots = bag.draw_n(slots, rng);
        log::debug!("shop rolled {:?} for wave {wave}", self.slots);
    }

    /// Buy the slot at `idx` if the player can afford it. The purchased slot
    /// is removed from the refresh.
    pub fn purchase(&mut self, idx: usize, player: &mut Player, wave: u32, cfg: &SimConfig) -> bool {
        let Some(&id) = self.slots.get(idx) else {
            return false;
        };
        let cost = self.cost(id, wave, cfg);
        if player.loot < cost {
            return false;
        }
        player.loot -= cost;
        apply_upgrade(&mut player.stats, id.effect());
        self.slots.remove(idx);
        log::info!("purchased {} for {cost} loot", id.name());
        true
    }

    /// Replace the current slots for a flat loot fee
    pub fn reroll(&mut self, player: &mut Player, wave: u32, rng: &mut Pcg32, cfg: &SimConfig) -> bool {
        if player.loot < cfg.reroll_cost {
            return false;
        }
        player.loot -= cfg.reroll_cost;
        self.roll(wave, cfg.shop_slots, rng);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;

    #[test]
    fn test_cost_scales_with_wave() {
        let cfg = SimConfig::default();
        let shop = Shop::new();
        assert_eq!(shop.cost(UpgradeId::Damage, 1, &cfg), 8);
        // wave 5: ceil(8 + 1.5 * 4) = 14
        assert_eq!(shop.cost(UpgradeId::Damage, 5, &cfg), 14);
        for id in UpgradeId::ALL {
            let mut prev = 0;
            for wave in 1..=20 {
                let c = shop.cost(id, wave, &cfg);
                assert!(c >= prev);
                prev = c;
            }
        }
    }

    #[test]
    fn test_bag_draw_halves_weight() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut bag = WeightedBag::new(vec![(UpgradeId::Damage, 1.0)]);
        assert_eq!(bag.draw(&mut rng), Some(UpgradeId::Damage));
        assert!((bag.total_weight() - 0.5).abs() < 1e-6);
        // floor at 0.1
        for _ in 0..10 {
            bag.draw(&mut rng);
        }
        assert!((bag.total_weight() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_roll_fills_requested_slots() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shop = Shop::new();
        shop.roll(3, 4, &mut rng);
        assert_eq!(shop.slots.len(), 4);
    }

    #[test]
    fn test_purchase_debits_and_removes_slot() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shop = Shop::new();
        shop.roll(1, 4, &mut rng);
        let mut player = Player::new(Vec2::ZERO);
        player.loot = 100;
        let id = shop.slots[0];
        let cost = shop.cost(id, 1, &cfg);
        let before = player.stats.clone();
        assert!(shop.purchase(0, &mut player, 1, &cfg));
        assert_eq!(player.loot, 100 - cost);
        assert_eq!(shop.slots.len(), 3);
        assert_ne!(player.stats, before);
    }

    #[test]
    fn test_purchase_rejected_when_broke() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shop = Shop::new();
        shop.roll(1, 4, &mut rng);
        let mut player = Player::new(Vec2::ZERO);
        player.loot = 0;
        assert!(!shop.purchase(0, &mut player, 1, &cfg));
        assert_eq!(shop.slots.len(), 4);
    }

    #[test]
    fn test_reroll_costs_loot() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut shop = Shop::new();
        shop.roll(2, 4, &mut rng);
        let mut player = Player::new(Vec2::ZERO);
        player.loot = 3;
        assert!(!shop.reroll(&mut player, 2, &mut rng, &cfg));
        player.loot = 4;
        assert!(shop.reroll(&mut player, 2, &mut rng, &cfg));
        assert_eq!(player.loot, 0);
        assert_eq!(shop.slots.len(), 4);
    }

    #[test]
    fn test_attack_speed_effect_floors() {
        let mut stats = Stats::default();
        for _ in 0..100 {
            apply_upgrade(&mut stats, UpgradeId::AttackSpeed.effect());
        }
        assert!((stats.attack_cooldown - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_max_hp_effect_heals() {
        let mut stats = Stats::default();
        stats.hp = 10.0;
        let max = stats.max_hp;
        apply_upgrade(&mut stats, UpgradeId::MaxHp.effect());
        assert_eq!(stats.max_hp, max + 15.0);
        assert_eq!(stats.hp, 25.0);
    }

    #[test]
    fn test_crit_effect_caps() {
        let mut stats = Stats::default();
        for _ in 0..100 {
            apply_upgrade(&mut stats, UpgradeId::Crit.effect());
        }
        assert!((stats.crit_chance - 0.7).abs() < 1e-6);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bag_draws_requested_count(seed in 0u64..1000, n in 0usize..=7) {
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut bag = WeightedBag::for_wave(3);
                let drawn = bag.draw_n(n, &mut rng);
                prop_assert_eq!(drawn.len(), n);
            }

            #[test]
            fn bag_weight_never_increases(seed in 0u64..1000) {
                let mut rng = Pcg32::seed_from_u64(seed);
                let mut bag = WeightedBag::for_wave(10);
                let mut prev = bag.total_weight();
                for _ in 0..20 {
                    bag.draw(&mut rng);
                    let now = bag.total_weight();
                    prop_assert!(now <= prev + 1e-6);
                    prev = now;
                }
            }

            #[test]
            fn cost_never_decreases_across_waves(
                idx in 0usize..UpgradeId::ALL.len(),
                w1 in 1u32..50,
                delta in 0u32..50,
            ) {
                let cfg = SimConfig::default();
                let shop = Shop::new();
                let id = UpgradeId::ALL[idx];
                let early = shop.cost(id, w1, &cfg);
                let late = shop.cost(id, w1 + delta, &cfg);
                prop_assert!(late >= early);
            }
        }
    }
}
