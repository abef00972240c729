use std::time::Duration;
use common::config::Validate;
use common::games::snake::TimingSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    pub default_interval_ms: u64,
    pub min_interval_ms: u64,
    pub speed_boost_reduction_ms: u64,
    pub speed_boost_floor_ms: u64,
    pub food_speedup_ms: u64,
}

impl TimingConfig {
    pub fn to_settings(&self) -> TimingSettings {
        TimingSettings {
            default_interval: Duration::from_millis(self.default_interval_ms),
            min_interval: Duration::from_millis(self.min_interval_ms),
            speed_boost_reduction: Duration::from_millis(self.speed_boost_reduction_ms),
            speed_boost_floor: Duration::from_millis(self.speed_boost_floor_ms),
            food_speedup: Duration::from_millis(self.food_speedup_ms),
        }
    }
}

impl Validate for TimingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_interval_ms == 0 {
            return Err("default_interval_ms must be greater than 0".to_string());
        }
        if self.min_interval_ms == 0 {
            return Err("min_interval_ms must be greater than 0".to_string());
        }
        if self.min_interval_ms > self.default_interval_ms {
            return Err("min_interval_ms must not exceed default_interval_ms".to_string());
        }
        if self.speed_boost_floor_ms == 0 {
            return Err("speed_boost_floor_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        let settings = TimingSettings::default();
        Self {
            default_interval_ms: settings.default_interval.as_millis() as u64,
            min_interval_ms: settings.min_interval.as_millis() as u64,
            speed_boost_reduction_ms: settings.speed_boost_reduction.as_millis() as u64,
            speed_boost_floor_ms: settings.speed_boost_floor.as_millis() as u64,
            food_speedup_ms: settings.food_speedup.as_millis() as u64,
        }
    }
}
