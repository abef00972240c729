use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize, Clone, Copy, ValueEnum)]
pub enum GameType {
    #[default]
    Survival,
    Objective,
}
