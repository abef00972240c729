mod bot_controller;
mod effects;
mod error;
mod food;
mod game_state;
mod grid;
mod scheduler;
mod session;
mod settings;
mod snake;
mod timers;
mod types;

pub use bot_controller::BotController;
pub use effects::{EffectContext, EffectManager, EffectType};
pub use error::GameError;
pub use food::{FoodProvider, SpecialFood};
pub use game_state::{
    GameEvent, GameOverSummary, LevelProgress, SessionPhase, SnakeGameState, SnakeSnapshot,
};
pub use grid::{Grid, overlaps_obstacle};
pub use scheduler::TickScheduler;
pub use session::{AudioCue, SessionCommand, SessionReport, SnakeSession, SnakeSessionState};
pub use settings::{EffectSettings, GameMode, Level, SnakeSessionSettings, TimingSettings};
pub use snake::Snake;
pub use timers::{TimerCommand, TimerKind, TimerRegistry, TimerToken};
pub use types::{DeathReason, Direction, InputIntent, Obstacle, Point};
