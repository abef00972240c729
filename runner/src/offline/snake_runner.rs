use tokio::sync::mpsc;
use common::log;
use common::games::snake::{SessionCommand, SessionReport, SnakeSession, SnakeSessionSettings, SnakeSessionState};

use super::ConsoleBroadcaster;

/// Plays `games` autopilot games back to back in one session. Ctrl+C ends early.
pub async fn run_snake_games(
    settings: SnakeSessionSettings,
    games: usize,
    seed: Option<u64>,
) -> Result<SessionReport, String> {
    let seed = seed.unwrap_or_else(rand::random);
    let session_state =
        SnakeSessionState::create(settings, seed, true).map_err(|e| e.to_string())?;

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let broadcaster = ConsoleBroadcaster::new(command_tx.clone(), games);

    let mut game_handle = tokio::spawn(SnakeSession::run(session_state, broadcaster, command_rx));

    tokio::select! {
        result = &mut game_handle => result.map_err(|e| e.to_string()),
        _ = tokio::signal::ctrl_c() => {
            log!("Interrupted, stopping session");
            let _ = command_tx.send(SessionCommand::Shutdown);
            game_handle.await.map_err(|e| e.to_string())
        }
    }
}
