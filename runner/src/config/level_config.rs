use std::time::Duration;
use common::config::Validate;
use common::games::snake::{Grid, Level, Obstacle};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub struct ObstacleConfig {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ObstacleConfig {
    /// Whether the whole rectangle lies on `grid`.
    pub fn fits(&self, grid: &Grid) -> bool {
        let inside = |start: i32, size: i32, limit: i32| {
            start >= 0 && start.checked_add(size).is_some_and(|end| end <= limit)
        };
        inside(self.x, self.width, grid.width) && inside(self.y, self.height, grid.height)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct LevelConfig {
    pub number: u32,
    pub objective: String,
    pub required_food: u32,
    pub interval_ms: u64,
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
}

impl LevelConfig {
    pub fn to_level(&self) -> Level {
        Level {
            number: self.number,
            objective: self.objective.clone(),
            required_food: self.required_food,
            interval: Duration::from_millis(self.interval_ms),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| Obstacle::new(o.x, o.y, o.width, o.height))
                .collect(),
        }
    }
}

impl From<&Level> for LevelConfig {
    fn from(level: &Level) -> Self {
        Self {
            number: level.number,
            objective: level.objective.clone(),
            required_food: level.required_food,
            interval_ms: level.interval.as_millis() as u64,
            obstacles: level
                .obstacles
                .iter()
                .map(|o| ObstacleConfig {
                    x: o.x,
                    y: o.y,
                    width: o.width,
                    height: o.height,
                })
                .collect(),
        }
    }
}

impl Validate for LevelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.required_food == 0 {
            return Err(format!("level {}: required_food must be greater than 0", self.number));
        }
        if self.interval_ms == 0 {
            return Err(format!("level {}: interval_ms must be greater than 0", self.number));
        }
        if self.obstacles.iter().any(|o| o.width <= 0 || o.height <= 0) {
            return Err(format!("level {}: obstacles must have a positive size", self.number));
        }
        Ok(())
    }
}
