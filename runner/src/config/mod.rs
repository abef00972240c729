mod config;
mod effects_config;
mod game_type;
mod grid_config;
mod level_config;
mod timing_config;

pub(crate) use common::config::{ConfigManager, FileContentConfigProvider, YamlConfigSerializer};

pub use config::get_config_manager;
pub use effects_config::EffectsConfig;
pub use game_type::GameType;
pub use grid_config::GridConfig;
pub use level_config::LevelConfig;
pub use timing_config::TimingConfig;
