//! Villager needs - bounded drives that feed population dynamics

use serde::{Deserialize, Serialize};

/// Bounded need levels for one villager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    /// 0.0 = fed, 1.0 = starving
    pub hunger: f32,
    /// 0.0 = miserable, 1.0 = content
    pub happiness: f32,
    /// 0.0 = dead, 1.0 = healthy
    pub health: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 0.2,
            happiness: 0.7,
            health: 1.0,
        }
    }
}

impl Needs {
    /// Advance hunger by one tick
    pub fn tick_hunger(&mut self, rate: f32) {
        self.hunger = (self.hunger + rate).min(1.0);
    }

    /// Eat one meal
    pub fn eat(&mut self, satiety: f32) {
        self.hunger = (self.hunger - satiety).max(0.0);
    }

    pub fn is_starving(&self) -> bool {
        self.hunger >= 1.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(1.0);
    }

    /// Drift happiness toward a target derived from hunger and health
    pub fn drift_happiness(&mut self, hunger_weight: f32, rate: f32) {
        let target = (1.0 - self.hunger * hunger_weight) * self.health;
        self.happiness += (target - self.happiness) * rate;
        self.happiness = self.happiness.clamp(0.0, 1.0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hunger_caps_at_one() {
        let mut needs = Needs::default();
        for _ in 0..10_000 {
            needs.tick_hunger(0.01);
        }
        assert_eq!(needs.hunger, 1.0);
        assert!(needs.is_starving());
    }

    #[test]
    fn test_eat_floors_at_zero() {
        let mut needs = Needs {
            hunger: 0.3,
            ..Default::default()
        };
        needs.eat(0.5);
        assert_eq!(needs.hunger, 0.0);
    }

    #[test]
    fn test_damage_and_heal_stay_bounded() {
        let mut needs = Needs::default();
        needs.damage(2.0);
        assert_eq!(needs.health, 0.0);
        assert!(needs.is_dead());
        needs.heal(5.0);
        assert_eq!(needs.health, 1.0);
    }

    #[test]
    fn test_happiness_drifts_down_when_starving() {
        let mut needs = Needs {
            hunger: 1.0,
            happiness: 0.9,
            health: 0.5,
        };
        for _ in 0..100 {
            needs.drift_happiness(0.6, 0.05);
        }
        // Target is (1 - 0.6) * 0.5 = 0.2
        assert!((needs.happiness - 0.2).abs() < 0.01);
    }
}
