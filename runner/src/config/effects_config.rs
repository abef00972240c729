use std::time::Duration;
use common::config::Validate;
use common::games::snake::EffectSettings;
use serde::{Deserialize, Serialize};

const DEFAULT_FOOD_POINTS: u32 = 10;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct EffectsConfig {
    pub speed_boost_duration_ms: u64,
    pub control_reversal_duration_ms: u64,
    pub special_food_probability: f64,
    pub special_food_ttl_ms: u64,
    pub growth_bonus_segments: usize,
    pub extra_points: u32,
    pub mega_points: u32,
    pub tail_reduction_min_length: usize,
    pub tail_reduction_segments: usize,
    pub food_points: u32,
    #[serde(default)]
    pub enable_control_reversal: bool,
}

impl EffectsConfig {
    pub fn to_settings(&self) -> EffectSettings {
        EffectSettings {
            speed_boost_duration: Duration::from_millis(self.speed_boost_duration_ms),
            control_reversal_duration: Duration::from_millis(self.control_reversal_duration_ms),
            special_food_probability: self.special_food_probability,
            special_food_ttl: Duration::from_millis(self.special_food_ttl_ms),
            growth_bonus_segments: self.growth_bonus_segments,
            extra_points: self.extra_points,
            mega_points: self.mega_points,
            tail_reduction_min_length: self.tail_reduction_min_length,
            tail_reduction_segments: self.tail_reduction_segments,
            enable_control_reversal: self.enable_control_reversal,
        }
    }
}

impl Validate for EffectsConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.special_food_probability) {
            return Err("special_food_probability must be between 0 and 1".to_string());
        }
        if self.speed_boost_duration_ms == 0 || self.control_reversal_duration_ms == 0 {
            return Err("effect durations must be greater than 0".to_string());
        }
        if self.special_food_ttl_ms == 0 {
            return Err("special_food_ttl_ms must be greater than 0".to_string());
        }
        if self.tail_reduction_min_length == 0 {
            return Err("tail_reduction_min_length must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        let settings = EffectSettings::default();
        Self {
            speed_boost_duration_ms: settings.speed_boost_duration.as_millis() as u64,
            control_reversal_duration_ms: settings.control_reversal_duration.as_millis() as u64,
            special_food_probability: settings.special_food_probability,
            special_food_ttl_ms: settings.special_food_ttl.as_millis() as u64,
            growth_bonus_segments: settings.growth_bonus_segments,
            extra_points: settings.extra_points,
            mega_points: settings.mega_points,
            tail_reduction_min_length: settings.tail_reduction_min_length,
            tail_reduction_segments: settings.tail_reduction_segments,
            food_points: DEFAULT_FOOD_POINTS,
            enable_control_reversal: settings.enable_control_reversal,
        }
    }
}
