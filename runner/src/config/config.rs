use std::path::PathBuf;
use common::config::Validate;
use common::games::snake::{GameMode, Level, SnakeSessionSettings};
use serde::{Deserialize, Serialize};

use super::{
    ConfigManager, EffectsConfig, FileContentConfigProvider, GameType, GridConfig, LevelConfig,
    TimingConfig, YamlConfigSerializer,
};

const CONFIG_FILE_NAME: &str = "snake_arcade_config.yaml";

fn get_config_path() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Manager for `path`, or for the config file next to the executable.
pub fn get_config_manager(
    path: Option<PathBuf>,
) -> ConfigManager<FileContentConfigProvider, Config, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path.unwrap_or_else(get_config_path))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mode: GameType,
    pub grid: GridConfig,
    pub timing: TimingConfig,
    pub effects: EffectsConfig,
    pub levels: Vec<LevelConfig>,
}

impl Config {
    pub fn session_settings(&self, mode: GameType) -> Result<SnakeSessionSettings, String> {
        let grid = self.grid.grid().map_err(|e| e.to_string())?;
        let mode = match mode {
            GameType::Survival => GameMode::Survival,
            GameType::Objective => GameMode::Objective {
                levels: self.levels.iter().map(LevelConfig::to_level).collect(),
            },
        };
        Ok(SnakeSessionSettings {
            grid,
            start: self.grid.start(),
            mode,
            food_points: self.effects.food_points,
            timing: self.timing.to_settings(),
            effects: self.effects.to_settings(),
        })
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        self.grid.validate()?;
        self.timing.validate()?;
        self.effects.validate()?;

        if self.levels.is_empty() {
            return Err("at least one level is required".to_string());
        }
        let grid = self.grid.grid().map_err(|e| e.to_string())?;
        for level in &self.levels {
            level.validate()?;
            if let Some(obstacle) = level.obstacles.iter().find(|o| !o.fits(&grid)) {
                return Err(format!(
                    "level {}: obstacle at ({}, {}) sized {}x{} does not fit the {}x{} grid",
                    level.number, obstacle.x, obstacle.y, obstacle.width, obstacle.height,
                    grid.width, grid.height
                ));
            }
        }

        // Later levels keep the snake where it is; only the first one spawns it.
        if let Some(first) = self.levels.first()
            && first
                .to_level()
                .obstacles
                .iter()
                .any(|obstacle| obstacle.contains(self.grid.start()))
        {
            return Err(format!(
                "level {}: an obstacle covers the start cell {}",
                first.number,
                self.grid.start()
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: GameType::Survival,
            grid: GridConfig::default(),
            timing: TimingConfig::default(),
            effects: EffectsConfig::default(),
            levels: Level::campaign().iter().map(LevelConfig::from).collect(),
        }
    }
}
