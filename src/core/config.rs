//! Simulation configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their
//! purpose and how they interact with each other.

/// Configuration for the simulation systems
///
/// These values set gameplay pacing. Changing them will not break any
/// invariant, but it will change how a city feels to run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === WORK CYCLE ===
    /// Consecutive pathfinding failures before a villager backs off
    ///
    /// Each failure costs one tick (the villager returns to Idle and
    /// retries on the next one). After this many in a row the villager
    /// takes a cooldown instead of busy-looping against a walled-off
    /// target.
    pub path_retry_limit: u32,

    /// Ticks an exhausted villager waits before retrying its route
    pub retry_cooldown_ticks: u32,

    /// Ticks a villager waits after finding its recipe inputs missing
    ///
    /// Shorter than the path cooldown: inputs reappear as other
    /// villagers deposit, while an unreachable target usually needs the
    /// player to change the map.
    pub missing_input_cooldown_ticks: u32,

    // === NEEDS ===
    /// Hunger added per tick (0.0 = fed, 1.0 = starving)
    ///
    /// At the default (0.002), a fed villager reaches the eat threshold
    /// in about 250 ticks.
    pub hunger_per_tick: f32,

    /// Hunger level at which a villager eats from the stockpile
    pub eat_threshold: f32,

    /// Food consumed per meal
    pub food_per_meal: f32,

    /// Hunger removed by one meal
    pub meal_satiety: f32,

    /// Health lost per tick while hunger is pinned at 1.0
    ///
    /// At 0.01, starvation kills a full-health villager in 100 ticks,
    /// long enough for a food shipment to arrive.
    pub starvation_damage: f32,

    /// Health regained per tick while fed
    pub health_regen: f32,

    /// Weight of hunger in the happiness drift target
    pub happiness_hunger_weight: f32,

    /// Fraction of the gap to target happiness closed each tick
    pub happiness_drift_rate: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Work cycle
            path_retry_limit: 3,
            retry_cooldown_ticks: 10,
            missing_input_cooldown_ticks: 6,

            // Needs
            hunger_per_tick: 0.002,
            eat_threshold: 0.5,
            food_per_meal: 1.0,
            meal_satiety: 0.4,
            starvation_damage: 0.01,
            health_regen: 0.002,
            happiness_hunger_weight: 0.6,
            happiness_drift_rate: 0.05,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.path_retry_limit == 0 {
            return Err("path_retry_limit must be at least 1".into());
        }

        if !(0.0..1.0).contains(&self.eat_threshold) {
            return Err(format!(
                "eat_threshold ({}) must be within [0, 1)",
                self.eat_threshold
            ));
        }

        if self.hunger_per_tick <= 0.0 || self.starvation_damage <= 0.0 {
            return Err("need rates must be positive".into());
        }

        if self.meal_satiety <= 0.0 || self.food_per_meal <= 0.0 {
            return Err("meal values must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.happiness_drift_rate) {
            return Err(format!(
                "happiness_drift_rate ({}) must be within [0, 1]",
                self.happiness_drift_rate
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_retry_limit_rejected() {
        let config = SimulationConfig {
            path_retry_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_eat_threshold_rejected() {
        let config = SimulationConfig {
            eat_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
