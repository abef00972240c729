mod console_broadcaster;
mod snake_runner;

pub use console_broadcaster::ConsoleBroadcaster;
pub use snake_runner::run_snake_games;
