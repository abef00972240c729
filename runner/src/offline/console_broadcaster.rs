use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use common::debug_log;
use common::games::GameBroadcaster;
use common::games::snake::{
    AudioCue, GameOverSummary, InputIntent, SessionCommand, SessionPhase, SnakeSnapshot,
};

/// Prints finished games and keeps the session going until enough have been played.
#[derive(Clone)]
pub struct ConsoleBroadcaster {
    commands: mpsc::UnboundedSender<SessionCommand>,
    games_total: usize,
    games_finished: Arc<AtomicUsize>,
}

impl ConsoleBroadcaster {
    pub fn new(commands: mpsc::UnboundedSender<SessionCommand>, games_total: usize) -> Self {
        Self {
            commands,
            games_total,
            games_finished: Arc::new(AtomicUsize::new(0)),
        }
    }
}

pub fn format_summary(index: usize, summary: &GameOverSummary) -> String {
    let outcome = match summary.outcome {
        SessionPhase::GameOver(reason) => format!("snake {}", reason),
        SessionPhase::Won => "all levels cleared".to_string(),
        phase => format!("{:?}", phase),
    };
    let mut line = format!(
        "Game {}: {} | score {} | length {} | {} ticks",
        index, outcome, summary.score, summary.length, summary.ticks
    );
    if let Some(level) = summary.level {
        line.push_str(&format!(" | level {}", level));
    }
    if let Some(elapsed) = summary.elapsed {
        line.push_str(&format!(" | {:.1}s", elapsed.as_secs_f64()));
    }
    line
}

pub fn format_frame(snapshot: &SnakeSnapshot) -> String {
    let mut line = format!(
        "tick {} | score {} | length {} | {}ms",
        snapshot.tick,
        snapshot.score,
        snapshot.snake.len(),
        snapshot.interval.as_millis()
    );
    if let Some(special) = snapshot.special_food {
        line.push_str(&format!(
            " | {:?} {} at {}",
            special.effect,
            special.effect.tag(),
            special.position
        ));
    }
    if snapshot.speed_boost_active {
        line.push_str(" | boost");
    }
    if snapshot.controls_reversed {
        line.push_str(" | reversed");
    }
    line
}

impl GameBroadcaster for ConsoleBroadcaster {
    async fn broadcast_state(&self, snapshot: SnakeSnapshot) -> Result<(), String> {
        debug_log!("{}", format_frame(&snapshot));
        Ok(())
    }

    async fn play_cue(&self, cue: AudioCue) -> Result<(), String> {
        debug_log!("cue {:?}", cue);
        Ok(())
    }

    async fn broadcast_game_over(&self, summary: GameOverSummary) {
        let finished = self.games_finished.fetch_add(1, Ordering::SeqCst) + 1;
        println!("{}", format_summary(finished, &summary));

        let next = if finished < self.games_total {
            SessionCommand::Input(InputIntent::Restart)
        } else {
            SessionCommand::Shutdown
        };
        let _ = self.commands.send(next);
    }
}
