use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep};

use crate::{debug_log, log};
use crate::games::{GameBroadcaster, SessionRng};
use super::bot_controller::BotController;
use super::error::GameError;
use super::game_state::{GameEvent, GameOverSummary, SessionPhase, SnakeGameState};
use super::scheduler::TickScheduler;
use super::settings::SnakeSessionSettings;
use super::timers::{TimerCommand, TimerKind, TimerToken};
use super::types::InputIntent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Input(InputIntent),
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Food,
    GameOver,
    LevelUp,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionReport {
    pub games: Vec<GameOverSummary>,
}

pub struct SnakeSessionState {
    pub game_state: SnakeGameState,
    pub rng: SessionRng,
    pub autopilot: bool,
}

impl SnakeSessionState {
    pub fn create(
        settings: SnakeSessionSettings,
        seed: u64,
        autopilot: bool,
    ) -> Result<Self, GameError> {
        let mut rng = SessionRng::new(seed);
        let game_state = SnakeGameState::new(settings, &mut rng)?;
        Ok(Self {
            game_state,
            rng,
            autopilot,
        })
    }
}

/// Owns the one live `Interval`, rebuilt whenever the scheduler's generation moves.
struct TickDriver {
    interval: Option<Interval>,
    generation: u64,
}

impl TickDriver {
    fn new() -> Self {
        Self {
            interval: None,
            generation: 0,
        }
    }

    fn sync(&mut self, scheduler: &TickScheduler) {
        if scheduler.generation() == self.generation {
            return;
        }
        self.generation = scheduler.generation();
        self.interval = scheduler.is_running().then(|| {
            let period = scheduler.interval();
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

/// Real one-shot timers. Each sleeps on its own task and reports its token.
struct TimerSet {
    handles: HashMap<TimerKind, JoinHandle<()>>,
    sender: mpsc::UnboundedSender<TimerToken>,
}

impl TimerSet {
    fn new(sender: mpsc::UnboundedSender<TimerToken>) -> Self {
        Self {
            handles: HashMap::new(),
            sender,
        }
    }

    fn apply(&mut self, commands: Vec<TimerCommand>) {
        for command in commands {
            match command {
                TimerCommand::Arm { token, after } => {
                    let sender = self.sender.clone();
                    let handle = tokio::spawn(async move {
                        sleep(after).await;
                        let _ = sender.send(token);
                    });
                    if let Some(previous) = self.handles.insert(token.kind, handle) {
                        previous.abort();
                    }
                }
                TimerCommand::Disarm { kind } => {
                    if let Some(handle) = self.handles.remove(&kind) {
                        handle.abort();
                    }
                }
            }
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}

pub struct SnakeSession;

impl SnakeSession {
    /// Drives one session until `Shutdown` arrives or the command channel closes.
    /// Restarts happen in place, so a report may hold several finished games.
    pub async fn run(
        session_state: SnakeSessionState,
        broadcaster: impl GameBroadcaster,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> SessionReport {
        let SnakeSessionState {
            mut game_state,
            mut rng,
            autopilot,
        } = session_state;

        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(timer_tx);
        let mut driver = TickDriver::new();
        let mut audio_enabled = true;
        let mut report = SessionReport::default();

        log!(
            "Session started (seed {}, autopilot {})",
            rng.seed(),
            if autopilot { "on" } else { "off" }
        );

        timers.apply(game_state.drain_timer_commands());
        driver.sync(game_state.scheduler());

        loop {
            let events = tokio::select! {
                _ = driver.tick() => {
                    let mut events = Vec::new();
                    if autopilot
                        && let Some(direction) = BotController::calculate_move(&game_state, &mut rng)
                    {
                        match game_state.set_direction(direction) {
                            Ok(started) => events.extend(started),
                            Err(e) => debug_log!("Autopilot turn rejected: {}", e),
                        }
                    }
                    match game_state.tick(&mut rng) {
                        Ok(tick_events) => events.extend(tick_events),
                        Err(e) => log!("Tick {} skipped: {}", game_state.ticks() + 1, e),
                    }
                    events
                }
                Some(token) = timer_rx.recv() => game_state.handle_timer_expired(token),
                command = commands.recv() => match command {
                    Some(SessionCommand::Input(intent)) => {
                        match game_state.handle_input(intent, &mut rng) {
                            Ok(events) => events,
                            Err(e) => {
                                debug_log!("Input {:?} ignored: {}", intent, e);
                                Vec::new()
                            }
                        }
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                },
            };

            timers.apply(game_state.drain_timer_commands());
            driver.sync(game_state.scheduler());

            for event in &events {
                if let Some(cue) = cue_for(event)
                    && audio_enabled
                    && let Err(e) = broadcaster.play_cue(cue).await
                {
                    log!("Audio playback failed, muting: {}", e);
                    audio_enabled = false;
                }
            }

            if let Err(e) = broadcaster.broadcast_state(game_state.snapshot()).await {
                log!("Render failed: {}", e);
            }

            if events
                .iter()
                .any(|event| matches!(event, GameEvent::GameOver { .. } | GameEvent::Won { .. }))
            {
                let summary = game_state.summary();
                match summary.outcome {
                    SessionPhase::Won => log!("Game won with score {}", summary.score),
                    _ => log!("Game over with score {}", summary.score),
                }
                report.games.push(summary.clone());
                broadcaster.broadcast_game_over(summary).await;
            }
        }

        log!("Session finished after {} game(s)", report.games.len());
        report
    }
}

fn cue_for(event: &GameEvent) -> Option<AudioCue> {
    match event {
        GameEvent::FoodEaten { .. } | GameEvent::SpecialFoodEaten(_) => Some(AudioCue::Food),
        GameEvent::LevelCompleted { .. } => Some(AudioCue::LevelUp),
        GameEvent::GameOver { .. } => Some(AudioCue::GameOver),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use crate::games::snake::effects::EffectType;
    use crate::games::snake::food::SpecialFood;
    use crate::games::snake::game_state::SnakeSnapshot;
    use crate::games::snake::grid::Grid;
    use crate::games::snake::settings::Level;
    use crate::games::snake::types::{DeathReason, Direction, Point};

    #[derive(Default)]
    struct Record {
        snapshots: Vec<SnakeSnapshot>,
        rendered_at: Vec<Instant>,
        cues: Vec<AudioCue>,
        summaries: Vec<GameOverSummary>,
    }

    /// Records everything and scripts the next game from the outside.
    #[derive(Clone)]
    struct RecordingBroadcaster {
        record: Arc<Mutex<Record>>,
        commands: mpsc::UnboundedSender<SessionCommand>,
        games: usize,
        audio_fails: bool,
    }

    impl RecordingBroadcaster {
        fn new(commands: mpsc::UnboundedSender<SessionCommand>, games: usize) -> Self {
            Self {
                record: Arc::new(Mutex::new(Record::default())),
                commands,
                games,
                audio_fails: false,
            }
        }
    }

    impl GameBroadcaster for RecordingBroadcaster {
        async fn broadcast_state(&self, snapshot: SnakeSnapshot) -> Result<(), String> {
            let mut record = self.record.lock().unwrap();
            record.snapshots.push(snapshot);
            record.rendered_at.push(Instant::now());
            Ok(())
        }

        async fn play_cue(&self, cue: AudioCue) -> Result<(), String> {
            self.record.lock().unwrap().cues.push(cue);
            if self.audio_fails {
                Err("no audio device".to_string())
            } else {
                Ok(())
            }
        }

        async fn broadcast_game_over(&self, summary: GameOverSummary) {
            let finished = {
                let mut record = self.record.lock().unwrap();
                record.summaries.push(summary);
                record.summaries.len()
            };
            if finished < self.games {
                let _ = self.commands.send(SessionCommand::Input(InputIntent::Restart));
                let _ = self
                    .commands
                    .send(SessionCommand::Input(InputIntent::Turn(Direction::Right)));
            } else {
                let _ = self.commands.send(SessionCommand::Shutdown);
            }
        }
    }

    /// `(gap since the previous tick, interval in force during that gap)` from tick 2 on.
    fn tick_gaps(record: &Record) -> Vec<(Duration, Duration)> {
        let mut gaps = Vec::new();
        let mut last: Option<(u64, Instant)> = None;
        let mut period = Duration::ZERO;
        for (snapshot, &at) in record.snapshots.iter().zip(&record.rendered_at) {
            let last_tick = last.map_or(0, |(tick, _)| tick);
            if snapshot.tick != last_tick {
                assert_eq!(snapshot.tick, last_tick + 1);
                if let Some((_, last_at)) = last {
                    gaps.push((at - last_at, period));
                }
                last = Some((snapshot.tick, at));
            }
            period = snapshot.interval;
        }
        gaps
    }

    fn quiet_settings() -> SnakeSessionSettings {
        let mut settings = SnakeSessionSettings::survival();
        settings.effects.special_food_probability = 0.0;
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_wall_collision() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = SnakeSessionState::create(quiet_settings(), 7, false).unwrap();
        session.game_state.set_food(Point::new(0, 0));
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let report = SnakeSession::run(session, broadcaster.clone(), rx).await;

        assert_eq!(report.games.len(), 1);
        let summary = &report.games[0];
        assert_eq!(summary.outcome, SessionPhase::GameOver(DeathReason::WallCollision));
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.elapsed, Some(Duration::from_millis(1000)));

        let record = broadcaster.record.lock().unwrap();
        assert_eq!(record.cues, vec![AudioCue::GameOver]);
        let last = record.snapshots.last().unwrap();
        assert_eq!(last.snake, vec![Point::new(20, 10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_plays_another_game() {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = SnakeSessionState::create(quiet_settings(), 3, false).unwrap();
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 2);

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let report = SnakeSession::run(session, broadcaster, rx).await;

        assert_eq!(report.games.len(), 2);
        assert!(report.games.iter().all(|game| game.outcome.is_finished()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_failure_mutes() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = SnakeSessionState::create(quiet_settings(), 7, false).unwrap();
        session.game_state.set_food(Point::new(11, 10));
        let mut broadcaster = RecordingBroadcaster::new(tx.clone(), 1);
        broadcaster.audio_fails = true;

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let report = SnakeSession::run(session, broadcaster.clone(), rx).await;

        assert!(report.games[0].score >= 10);
        assert_eq!(broadcaster.record.lock().unwrap().cues, vec![AudioCue::Food]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_special_food_expires_on_wall_clock() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = SnakeSessionState::create(quiet_settings(), 7, false).unwrap();
        session.game_state.set_special_food(SpecialFood {
            position: Point::new(2, 2),
            effect: EffectType::MegaPoints,
        });
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);

        let handle = tokio::spawn(SnakeSession::run(session, broadcaster.clone(), rx));
        sleep(Duration::from_millis(4950)).await;
        assert!(
            broadcaster
                .record
                .lock()
                .unwrap()
                .snapshots
                .last()
                .is_some_and(|snapshot| snapshot.special_food.is_some())
        );

        sleep(Duration::from_millis(100)).await;
        tx.send(SessionCommand::Shutdown).unwrap();
        let report = handle.await.unwrap();

        assert!(report.games.is_empty());
        let record = broadcaster.record.lock().unwrap();
        assert!(record.snapshots.last().unwrap().special_food.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_boost_reverts_after_duration() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut settings = quiet_settings();
        settings.grid = Grid::new(200, 20);
        let mut session = SnakeSessionState::create(settings, 7, false).unwrap();
        session.game_state.set_food(Point::new(0, 0));
        session.game_state.set_special_food(SpecialFood {
            position: Point::new(11, 10),
            effect: EffectType::SpeedBoost,
        });
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let handle = tokio::spawn(SnakeSession::run(session, broadcaster.clone(), rx));

        sleep(Duration::from_millis(1000)).await;
        let boosted = broadcaster.record.lock().unwrap().snapshots.last().map(|s| s.interval);
        assert_eq!(boosted, Some(Duration::from_millis(70)));

        sleep(Duration::from_millis(5000)).await;
        tx.send(SessionCommand::Shutdown).unwrap();
        handle.await.unwrap();

        let record = broadcaster.record.lock().unwrap();
        let last = record.snapshots.last().unwrap();
        assert_eq!(last.interval, Duration::from_millis(100));
        assert!(!last.speed_boost_active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_boost_reschedule_keeps_one_interval() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut settings = quiet_settings();
        settings.grid = Grid::new(200, 20);
        let mut session = SnakeSessionState::create(settings, 7, false).unwrap();
        session.game_state.set_food(Point::new(0, 0));
        session.game_state.set_special_food(SpecialFood {
            position: Point::new(11, 10),
            effect: EffectType::SpeedBoost,
        });
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);
        let started = Instant::now();

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let handle = tokio::spawn(SnakeSession::run(session, broadcaster.clone(), rx));
        sleep(Duration::from_millis(1005)).await;
        tx.send(SessionCommand::Shutdown).unwrap();
        handle.await.unwrap();

        let record = broadcaster.record.lock().unwrap();
        assert_eq!(record.snapshots.last().map(|s| s.tick), Some(13));
        let first_tick = record.snapshots.iter().position(|s| s.tick == 1).unwrap();
        assert_eq!(record.rendered_at[first_tick] - started, Duration::from_millis(100));
        let gaps = tick_gaps(&record);
        assert_eq!(gaps.len(), 12);
        assert!(
            gaps.iter()
                .all(|&(gap, period)| gap == period && period == Duration::from_millis(70))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_food_speedup_does_not_double_tick() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut settings = quiet_settings();
        settings.grid = Grid::new(200, 20);
        let mut session = SnakeSessionState::create(settings, 7, false).unwrap();
        session.game_state.set_food(Point::new(11, 10));
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);
        let started = Instant::now();

        tx.send(SessionCommand::Input(InputIntent::Turn(Direction::Right))).unwrap();
        let handle = tokio::spawn(SnakeSession::run(session, broadcaster.clone(), rx));
        sleep(Duration::from_millis(1005)).await;
        tx.send(SessionCommand::Shutdown).unwrap();
        handle.await.unwrap();

        let record = broadcaster.record.lock().unwrap();
        let first_tick = record.snapshots.iter().position(|s| s.tick == 1).unwrap();
        assert_eq!(record.rendered_at[first_tick] - started, Duration::from_millis(100));
        assert_eq!(record.snapshots[first_tick].interval, Duration::from_millis(98));

        let gaps = tick_gaps(&record);
        assert_eq!(gaps.first(), Some(&(Duration::from_millis(98), Duration::from_millis(98))));
        assert!(gaps.iter().all(|&(gap, period)| gap == period));
        assert!(record.snapshots.last().is_some_and(|s| s.tick >= 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_set_replaces_and_disarms() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = TimerSet::new(tx);
        let first = TimerToken { kind: TimerKind::SpeedBoost, id: 1 };
        let second = TimerToken { kind: TimerKind::SpeedBoost, id: 2 };
        let food = TimerToken { kind: TimerKind::SpecialFood, id: 3 };
        let after = Duration::from_secs(5);

        timers.apply(vec![
            TimerCommand::Arm { token: first, after },
            TimerCommand::Arm { token: second, after },
            TimerCommand::Arm { token: food, after },
            TimerCommand::Disarm { kind: TimerKind::SpecialFood },
        ]);

        assert_eq!(rx.recv().await, Some(second));
        sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autopilot_collects_food() {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = SnakeSessionSettings::objective(Level::campaign());
        let session = SnakeSessionState::create(settings, 11, true).unwrap();
        let broadcaster = RecordingBroadcaster::new(tx.clone(), 1);

        let handle = tokio::spawn(SnakeSession::run(session, broadcaster.clone(), rx));
        sleep(Duration::from_secs(30)).await;
        let _ = tx.send(SessionCommand::Shutdown);
        let report = handle.await.unwrap();

        assert!(report.games.len() <= 1);
        let record = broadcaster.record.lock().unwrap();
        assert!(record.snapshots.iter().any(|snapshot| snapshot.score > 0));
        assert!(record.snapshots.iter().all(|snapshot| snapshot.elapsed.is_none()));
    }
}
