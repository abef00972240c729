use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::{debug_log, log};
use crate::games::SessionRng;
use super::effects::{EffectContext, EffectManager, EffectType};
use super::error::GameError;
use super::food::{FoodProvider, SpecialFood};
use super::grid::overlaps_obstacle;
use super::scheduler::TickScheduler;
use super::settings::{GameMode, SnakeSessionSettings};
use super::snake::Snake;
use super::timers::{TimerCommand, TimerKind, TimerRegistry, TimerToken};
use super::types::{DeathReason, Direction, InputIntent, Obstacle, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the first turn; ticks do nothing.
    Idle,
    Running,
    /// Transient, only observable from inside a tick.
    LevelComplete,
    GameOver(DeathReason),
    Won,
}

impl SessionPhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::GameOver(_) | SessionPhase::Won)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    FoodEaten { position: Point, score: u32 },
    SpecialFoodSpawned(SpecialFood),
    SpecialFoodEaten(SpecialFood),
    SpecialFoodExpired,
    EffectExpired(EffectType),
    LevelCompleted { number: u32 },
    LevelStarted { number: u32 },
    GameOver { reason: DeathReason, score: u32 },
    Won { score: u32 },
    Restarted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelProgress {
    pub number: u32,
    pub objective: String,
    pub food_collected: u32,
    pub required_food: u32,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeSnapshot {
    pub tick: u64,
    pub phase: SessionPhase,
    pub snake: Vec<Point>,
    pub direction: Option<Direction>,
    pub food: Point,
    pub special_food: Option<SpecialFood>,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub level: Option<LevelProgress>,
    pub interval: Duration,
    pub speed_boost_active: bool,
    pub controls_reversed: bool,
    pub elapsed: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameOverSummary {
    pub outcome: SessionPhase,
    pub score: u32,
    pub level: Option<u32>,
    pub length: usize,
    pub ticks: u64,
    pub elapsed: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct SnakeGameState {
    /// Shared so tick checkpoints only copy the per-game fields.
    settings: Arc<SnakeSessionSettings>,
    snake: Snake,
    direction: Option<Direction>,
    pending_direction: Option<Direction>,
    food: Point,
    special_food: Option<SpecialFood>,
    score: u32,
    phase: SessionPhase,
    level_index: usize,
    food_collected: u32,
    effects: EffectManager,
    timers: TimerRegistry,
    scheduler: TickScheduler,
    tick: u64,
    started_at: Option<Instant>,
    finished_after: Option<Duration>,
}

impl SnakeGameState {
    pub fn new(settings: SnakeSessionSettings, rng: &mut SessionRng) -> Result<Self, GameError> {
        let base_interval = settings.base_interval();
        let mut scheduler = TickScheduler::new(base_interval);
        scheduler.start(base_interval);

        let mut state = Self {
            snake: Snake::new(settings.start),
            settings: Arc::new(settings),
            direction: None,
            pending_direction: None,
            food: Point::new(0, 0),
            special_food: None,
            score: 0,
            phase: SessionPhase::Idle,
            level_index: 0,
            food_collected: 0,
            effects: EffectManager::new(),
            timers: TimerRegistry::new(),
            scheduler,
            tick: 0,
            started_at: None,
            finished_after: None,
        };
        state.food = state.place_food(rng)?;
        Ok(state)
    }

    pub fn settings(&self) -> &SnakeSessionSettings {
        &self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn food(&self) -> Point {
        self.food
    }

    pub fn special_food(&self) -> Option<SpecialFood> {
        self.special_food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn food_collected(&self) -> u32 {
        self.food_collected
    }

    pub fn controls_reversed(&self) -> bool {
        self.effects.controls_reversed()
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.settings
            .mode
            .level(self.level_index)
            .map(|level| level.obstacles.as_slice())
            .unwrap_or(&[])
    }

    pub fn drain_timer_commands(&mut self) -> Vec<TimerCommand> {
        self.timers.drain_commands()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        if !self.settings.mode.is_survival() {
            return None;
        }
        self.finished_after
            .or_else(|| self.started_at.map(|started| started.elapsed()))
    }

    pub fn handle_input(
        &mut self,
        intent: InputIntent,
        rng: &mut SessionRng,
    ) -> Result<Vec<GameEvent>, GameError> {
        match intent {
            InputIntent::Turn(direction) => self.set_direction(direction),
            InputIntent::Restart => self.restart(rng),
        }
    }

    /// Queues a turn for the next tick. Under control reversal the request is
    /// flipped first; the result may not point straight back along the current
    /// movement.
    pub fn set_direction(&mut self, requested: Direction) -> Result<Vec<GameEvent>, GameError> {
        if !matches!(self.phase, SessionPhase::Idle | SessionPhase::Running) {
            return Err(GameError::InputIgnored { phase: self.phase });
        }

        let direction = if self.effects.controls_reversed() {
            requested.opposite()
        } else {
            requested
        };

        if let Some(current) = self.direction
            && direction.is_opposite(&current)
        {
            return Err(GameError::ReverseDirection {
                current,
                requested: direction,
            });
        }

        self.pending_direction = Some(direction);

        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Running;
            self.started_at = Some(Instant::now());
            return Ok(vec![GameEvent::Started]);
        }
        Ok(Vec::new())
    }

    /// Advances the simulation by one step. A failing step leaves the state untouched.
    pub fn tick(&mut self, rng: &mut SessionRng) -> Result<Vec<GameEvent>, GameError> {
        self.transaction(|state| state.step(rng))
    }

    /// Applies a timer expiry. Tokens that are no longer live are ignored.
    pub fn handle_timer_expired(&mut self, token: TimerToken) -> Vec<GameEvent> {
        if !self.timers.fire(token) {
            debug_log!("Ignoring stale timer {:?}", token);
            return Vec::new();
        }

        match token.kind {
            TimerKind::SpecialFood => match self.special_food.take() {
                Some(_) => vec![GameEvent::SpecialFoodExpired],
                None => Vec::new(),
            },
            kind => self
                .effects
                .expire(kind, &mut self.scheduler)
                .map(GameEvent::EffectExpired)
                .into_iter()
                .collect(),
        }
    }

    /// Full reset back to `Idle`. Only allowed once the game is over or won.
    pub fn restart(&mut self, rng: &mut SessionRng) -> Result<Vec<GameEvent>, GameError> {
        if !self.phase.is_finished() {
            return Err(GameError::InputIgnored { phase: self.phase });
        }

        self.transaction(|state| {
            let base_interval = state.settings.base_interval();
            state.timers.disarm_all();
            state
                .effects
                .clear_all_effects(&mut state.scheduler, &mut state.timers, base_interval);

            state.snake = Snake::new(state.settings.start);
            state.direction = None;
            state.pending_direction = None;
            state.special_food = None;
            state.score = 0;
            state.level_index = 0;
            state.food_collected = 0;
            state.tick = 0;
            state.started_at = None;
            state.finished_after = None;
            state.food = state.place_food(rng)?;
            state.scheduler.start(base_interval);
            state.phase = SessionPhase::Idle;

            log!("Game restarted");
            Ok(vec![GameEvent::Restarted])
        })
    }

    pub fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            tick: self.tick,
            phase: self.phase,
            snake: self.snake.segments().copied().collect(),
            direction: self.direction,
            food: self.food,
            special_food: self.special_food,
            obstacles: self.obstacles().to_vec(),
            score: self.score,
            level: self.level_progress(),
            interval: self.scheduler.interval(),
            speed_boost_active: self.effects.speed_boost_active(),
            controls_reversed: self.effects.controls_reversed(),
            elapsed: self.elapsed(),
        }
    }

    pub fn summary(&self) -> GameOverSummary {
        GameOverSummary {
            outcome: self.phase,
            score: self.score,
            level: self.level_progress().map(|level| level.number),
            length: self.snake.len(),
            ticks: self.tick,
            elapsed: self.elapsed(),
        }
    }

    fn level_progress(&self) -> Option<LevelProgress> {
        self.settings
            .mode
            .level(self.level_index)
            .map(|level| LevelProgress {
                number: level.number,
                objective: level.objective.clone(),
                food_collected: self.food_collected,
                required_food: level.required_food,
            })
    }

    fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let checkpoint = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = checkpoint;
        }
        result
    }

    fn step(&mut self, rng: &mut SessionRng) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != SessionPhase::Running {
            return Ok(Vec::new());
        }

        if let Some(direction) = self.pending_direction.take() {
            self.direction = Some(direction);
        }
        let Some(direction) = self.direction else {
            return Ok(Vec::new());
        };

        self.tick += 1;
        let mut events = Vec::new();

        // Collisions are judged before the tail moves, so the cell the tail
        // is about to leave still counts.
        let new_head = self.snake.next_head(direction);

        if let Some(reason) = self.collision_at(new_head) {
            self.snake.grow_or_shrink(new_head, false);
            log!(
                "Game over at {}: snake {}. Score: {}",
                new_head,
                reason,
                self.score
            );
            self.finish(SessionPhase::GameOver(reason));
            events.push(GameEvent::GameOver {
                reason,
                score: self.score,
            });
            return Ok(events);
        }

        let special = self.special_food.filter(|s| s.position == new_head);
        let ate_food = new_head == self.food;
        self.snake.grow_or_shrink(new_head, ate_food || special.is_some());

        if ate_food {
            self.eat_food(new_head, rng, &mut events)?;
        } else if let Some(special) = special {
            self.eat_special_food(special, &mut events);
        }

        Ok(events)
    }

    fn collision_at(&self, head: Point) -> Option<DeathReason> {
        if !self.settings.grid.in_bounds(head) {
            Some(DeathReason::WallCollision)
        } else if self.snake.contains(head) {
            Some(DeathReason::SelfCollision)
        } else if overlaps_obstacle(head, self.obstacles()) {
            Some(DeathReason::ObstacleCollision)
        } else {
            None
        }
    }

    fn eat_food(
        &mut self,
        position: Point,
        rng: &mut SessionRng,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        self.score += self.settings.food_points;
        debug_log!("Ate food at {}. Score: {}", position, self.score);
        events.push(GameEvent::FoodEaten {
            position,
            score: self.score,
        });

        match &self.settings.mode {
            GameMode::Survival => {
                self.food = self.place_food(rng)?;
                self.respawn_special_food(rng, events);

                let timing = &self.settings.timing;
                let faster = self
                    .scheduler
                    .interval()
                    .saturating_sub(timing.food_speedup)
                    .max(timing.min_interval);
                self.scheduler.reschedule(faster);
            }
            GameMode::Objective { levels } => {
                self.food_collected += 1;
                let required = levels
                    .get(self.level_index)
                    .map(|level| level.required_food)
                    .unwrap_or(u32::MAX);
                if self.food_collected >= required {
                    self.complete_level(rng, events)?;
                } else {
                    self.food = self.place_food(rng)?;
                }
            }
        }
        Ok(())
    }

    fn eat_special_food(&mut self, special: SpecialFood, events: &mut Vec<GameEvent>) {
        self.special_food = None;
        self.timers.disarm(TimerKind::SpecialFood);
        debug_log!("Ate special food {:?} at {}", special.effect, special.position);
        events.push(GameEvent::SpecialFoodEaten(special));

        let ctx = EffectContext {
            snake: &mut self.snake,
            score: &mut self.score,
            scheduler: &mut self.scheduler,
            timers: &mut self.timers,
        };
        self.effects.apply_effect(special.effect, ctx, &self.settings);
    }

    /// Any special food on the field is replaced by a fresh roll.
    fn respawn_special_food(&mut self, rng: &mut SessionRng, events: &mut Vec<GameEvent>) {
        self.timers.disarm(TimerKind::SpecialFood);
        self.special_food = None;

        let effects = &self.settings.effects;
        let pool = EffectType::spawn_pool(effects);
        let snake = &self.snake;
        let food = self.food;
        let spawned = FoodProvider::maybe_spawn_special_food(
            rng,
            effects.special_food_probability,
            &pool,
            &self.settings.grid,
            |p| p == food || snake.contains(p),
            self.obstacles(),
        );

        if let Some(special) = spawned {
            self.timers
                .arm(TimerKind::SpecialFood, self.settings.effects.special_food_ttl);
            self.special_food = Some(special);
            debug_log!("Special food {:?} spawned at {}", special.effect, special.position);
            events.push(GameEvent::SpecialFoodSpawned(special));
        }
    }

    fn complete_level(
        &mut self,
        rng: &mut SessionRng,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        self.phase = SessionPhase::LevelComplete;
        let finished = self.level_progress().map(|level| level.number).unwrap_or_default();
        events.push(GameEvent::LevelCompleted { number: finished });

        let next_index = self.level_index + 1;
        let Some(next) = self.settings.mode.level(next_index) else {
            log!("Final level {} complete. Score: {}", finished, self.score);
            self.finish(SessionPhase::Won);
            events.push(GameEvent::Won { score: self.score });
            return Ok(());
        };

        let (number, interval) = (next.number, next.interval);
        self.level_index = next_index;
        self.food_collected = 0;
        self.scheduler.reschedule(interval);
        self.food = self.place_food(rng)?;
        self.phase = SessionPhase::Running;

        log!("Level {} complete, starting level {}", finished, number);
        events.push(GameEvent::LevelStarted { number });
        Ok(())
    }

    /// Terminal transition: no effect, timer or tick survives it.
    fn finish(&mut self, outcome: SessionPhase) {
        self.phase = outcome;
        let base_interval = self.settings.base_interval();
        self.effects
            .clear_all_effects(&mut self.scheduler, &mut self.timers, base_interval);
        self.timers.disarm(TimerKind::SpecialFood);
        self.special_food = None;
        self.scheduler.stop();
        self.finished_after = self.started_at.map(|started| started.elapsed());
    }

    fn place_food(&self, rng: &mut SessionRng) -> Result<Point, GameError> {
        let snake = &self.snake;
        FoodProvider::place_standard_food(
            rng,
            &self.settings.grid,
            |p| snake.contains(p),
            self.obstacles(),
        )
    }

    #[cfg(test)]
    pub(crate) fn set_snake(&mut self, segments: &[(i32, i32)]) {
        self.snake = Snake::from_segments(
            segments.iter().map(|&(x, y)| Point::new(x, y)),
            self.settings.start,
        );
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, food: Point) {
        self.food = food;
    }

    #[cfg(test)]
    pub(crate) fn set_special_food(&mut self, special: SpecialFood) {
        self.timers
            .arm(TimerKind::SpecialFood, self.settings.effects.special_food_ttl);
        self.special_food = Some(special);
    }

    #[cfg(test)]
    pub(crate) fn start_moving(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.pending_direction = None;
        self.phase = SessionPhase::Running;
        self.started_at = Some(Instant::now());
    }
}
