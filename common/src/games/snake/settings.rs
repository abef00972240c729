use std::time::Duration;

use super::grid::Grid;
use super::types::{Obstacle, Point};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
pub const MIN_TICK_INTERVAL_MS: u64 = 50;
pub const SPEED_BOOST_REDUCTION_MS: u64 = 30;
pub const SPEED_BOOST_FLOOR_MS: u64 = 30;
pub const FOOD_SPEEDUP_MS: u64 = 2;
pub const EFFECT_DURATION_MS: u64 = 5000;
pub const SPECIAL_FOOD_TTL_MS: u64 = 5000;
pub const SPECIAL_FOOD_PROBABILITY: f64 = 0.3;
pub const FOOD_POINTS: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct TimingSettings {
    pub default_interval: Duration,
    /// Floor for food-driven acceleration.
    pub min_interval: Duration,
    pub speed_boost_reduction: Duration,
    /// Floor for the speed boost, which may go below `min_interval`.
    pub speed_boost_floor: Duration,
    pub food_speedup: Duration,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            min_interval: Duration::from_millis(MIN_TICK_INTERVAL_MS),
            speed_boost_reduction: Duration::from_millis(SPEED_BOOST_REDUCTION_MS),
            speed_boost_floor: Duration::from_millis(SPEED_BOOST_FLOOR_MS),
            food_speedup: Duration::from_millis(FOOD_SPEEDUP_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectSettings {
    pub speed_boost_duration: Duration,
    pub control_reversal_duration: Duration,
    pub special_food_probability: f64,
    pub special_food_ttl: Duration,
    pub growth_bonus_segments: usize,
    pub extra_points: u32,
    pub mega_points: u32,
    pub tail_reduction_min_length: usize,
    pub tail_reduction_segments: usize,
    pub enable_control_reversal: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            speed_boost_duration: Duration::from_millis(EFFECT_DURATION_MS),
            control_reversal_duration: Duration::from_millis(EFFECT_DURATION_MS),
            special_food_probability: SPECIAL_FOOD_PROBABILITY,
            special_food_ttl: Duration::from_millis(SPECIAL_FOOD_TTL_MS),
            growth_bonus_segments: 3,
            extra_points: 50,
            mega_points: 100,
            tail_reduction_min_length: 6,
            tail_reduction_segments: 5,
            enable_control_reversal: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub number: u32,
    pub objective: String,
    pub required_food: u32,
    pub interval: Duration,
    pub obstacles: Vec<Obstacle>,
}

impl Level {
    /// The stock three-level campaign.
    pub fn campaign() -> Vec<Level> {
        vec![
            Level {
                number: 1,
                objective: "Collect 5 food items to advance".to_string(),
                required_food: 5,
                interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
                obstacles: vec![],
            },
            Level {
                number: 2,
                objective: "Collect 8 food items while avoiding walls".to_string(),
                required_food: 8,
                interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS - 10),
                obstacles: vec![Obstacle::new(10, 5, 2, 6)],
            },
            Level {
                number: 3,
                objective: "Collect 10 food items in a maze".to_string(),
                required_food: 10,
                interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS - 20),
                obstacles: vec![Obstacle::new(5, 5, 2, 10), Obstacle::new(15, 5, 2, 10)],
            },
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameMode {
    Survival,
    Objective { levels: Vec<Level> },
}

impl GameMode {
    pub fn is_survival(&self) -> bool {
        matches!(self, GameMode::Survival)
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        match self {
            GameMode::Survival => None,
            GameMode::Objective { levels } => levels.get(index),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnakeSessionSettings {
    pub grid: Grid,
    pub start: Point,
    pub mode: GameMode,
    pub food_points: u32,
    pub timing: TimingSettings,
    pub effects: EffectSettings,
}

impl SnakeSessionSettings {
    pub fn survival() -> Self {
        Self {
            grid: Grid::new(20, 20),
            start: Point::new(10, 10),
            mode: GameMode::Survival,
            food_points: FOOD_POINTS,
            timing: TimingSettings::default(),
            effects: EffectSettings::default(),
        }
    }

    pub fn objective(levels: Vec<Level>) -> Self {
        Self {
            mode: GameMode::Objective { levels },
            ..Self::survival()
        }
    }

    /// Interval a fresh game starts at, and the one effects fall back to when cleared.
    pub fn base_interval(&self) -> Duration {
        self.mode
            .level(0)
            .map(|level| level.interval)
            .unwrap_or(self.timing.default_interval)
    }
}
