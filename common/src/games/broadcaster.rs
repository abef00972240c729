use std::future::Future;

use crate::games::snake::{AudioCue, GameOverSummary, SnakeSnapshot};

/// Everything the session driver pushes to the outside world.
///
/// Render and audio failures are reported back as `Err` so the driver can log
/// them; they never stop the simulation.
pub trait GameBroadcaster: Send + Sync + Clone + 'static {
    fn broadcast_state(
        &self,
        snapshot: SnakeSnapshot,
    ) -> impl Future<Output = Result<(), String>> + Send;

    fn play_cue(&self, cue: AudioCue) -> impl Future<Output = Result<(), String>> + Send;

    fn broadcast_game_over(&self, summary: GameOverSummary) -> impl Future<Output = ()> + Send;
}
