use std::time::Duration;

use crate::debug_log;
use super::scheduler::TickScheduler;
use super::settings::{EffectSettings, SnakeSessionSettings};
use super::snake::Snake;
use super::timers::{TimerKind, TimerRegistry};

/// Power-ups carried by special food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectType {
    SpeedBoost,
    GrowthBonus,
    ExtraPoints,
    MegaPoints,
    TailReduction,
    ControlReversal,
}

impl EffectType {
    pub const STANDARD: [EffectType; 5] = [
        EffectType::SpeedBoost,
        EffectType::GrowthBonus,
        EffectType::ExtraPoints,
        EffectType::MegaPoints,
        EffectType::TailReduction,
    ];

    /// Effects special food may carry. Selection from the pool is uniform.
    pub fn spawn_pool(settings: &EffectSettings) -> Vec<EffectType> {
        let mut pool = Self::STANDARD.to_vec();
        if settings.enable_control_reversal {
            pool.push(EffectType::ControlReversal);
        }
        pool
    }

    /// Colour the renderer uses for the special food.
    pub fn tag(self) -> &'static str {
        match self {
            EffectType::SpeedBoost => "#f1c40f",
            EffectType::GrowthBonus => "#9b59b6",
            EffectType::ExtraPoints => "#e67e22",
            EffectType::MegaPoints => "#e74c3c",
            EffectType::TailReduction => "#3498db",
            EffectType::ControlReversal => "#c0392b",
        }
    }

    /// Listed spawn weight. Kept as table data; spawning picks uniformly.
    pub fn probability(self) -> f64 {
        match self {
            EffectType::SpeedBoost => 0.2,
            EffectType::GrowthBonus => 0.3,
            EffectType::ExtraPoints => 0.3,
            EffectType::MegaPoints => 0.2,
            EffectType::TailReduction => 0.2,
            EffectType::ControlReversal => 0.1,
        }
    }

    /// Zero for instant effects.
    pub fn duration(self, settings: &EffectSettings) -> Duration {
        match self {
            EffectType::SpeedBoost => settings.speed_boost_duration,
            EffectType::ControlReversal => settings.control_reversal_duration,
            _ => Duration::ZERO,
        }
    }

    pub fn timer_kind(self) -> Option<TimerKind> {
        match self {
            EffectType::SpeedBoost => Some(TimerKind::SpeedBoost),
            EffectType::ControlReversal => Some(TimerKind::ControlReversal),
            _ => None,
        }
    }

    pub fn is_timed(self) -> bool {
        self.timer_kind().is_some()
    }
}

/// Everything an effect may touch, borrowed from the game state for one call.
pub struct EffectContext<'a> {
    pub snake: &'a mut Snake,
    pub score: &'a mut u32,
    pub scheduler: &'a mut TickScheduler,
    pub timers: &'a mut TimerRegistry,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectManager {
    speed_restore: Option<Duration>,
    controls_reversed: bool,
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls_reversed(&self) -> bool {
        self.controls_reversed
    }

    pub fn speed_boost_active(&self) -> bool {
        self.speed_restore.is_some()
    }

    pub fn apply_effect(
        &mut self,
        effect: EffectType,
        ctx: EffectContext<'_>,
        settings: &SnakeSessionSettings,
    ) {
        let effects = &settings.effects;
        match effect {
            EffectType::SpeedBoost => {
                // Each boost snapshots whatever interval is current, so chained
                // boosts restore to the previous boosted value.
                let original = ctx.scheduler.interval();
                let boosted = original
                    .saturating_sub(settings.timing.speed_boost_reduction)
                    .max(settings.timing.speed_boost_floor);
                ctx.scheduler.reschedule(boosted);
                ctx.timers.arm(TimerKind::SpeedBoost, effects.speed_boost_duration);
                self.speed_restore = Some(original);
                debug_log!(
                    "Speed boost: {}ms -> {}ms",
                    original.as_millis(),
                    boosted.as_millis()
                );
            }
            EffectType::GrowthBonus => ctx.snake.apply_growth_bonus(effects.growth_bonus_segments),
            EffectType::ExtraPoints => *ctx.score += effects.extra_points,
            EffectType::MegaPoints => *ctx.score += effects.mega_points,
            EffectType::TailReduction => ctx.snake.apply_tail_reduction(
                effects.tail_reduction_min_length,
                effects.tail_reduction_segments,
            ),
            EffectType::ControlReversal => {
                self.controls_reversed = true;
                ctx.timers
                    .arm(TimerKind::ControlReversal, effects.control_reversal_duration);
            }
        }
    }

    /// Reverts the timed effect of `kind`. The caller has already validated the token.
    pub fn expire(&mut self, kind: TimerKind, scheduler: &mut TickScheduler) -> Option<EffectType> {
        match kind {
            TimerKind::SpeedBoost => {
                let restore = self.speed_restore.take()?;
                scheduler.reschedule(restore);
                Some(EffectType::SpeedBoost)
            }
            TimerKind::ControlReversal => {
                let was_reversed = std::mem::replace(&mut self.controls_reversed, false);
                was_reversed.then_some(EffectType::ControlReversal)
            }
            TimerKind::SpecialFood => None,
        }
    }

    pub fn clear_all_effects(
        &mut self,
        scheduler: &mut TickScheduler,
        timers: &mut TimerRegistry,
        default_interval: Duration,
    ) {
        timers.disarm(TimerKind::SpeedBoost);
        timers.disarm(TimerKind::ControlReversal);
        self.speed_restore = None;
        self.controls_reversed = false;
        scheduler.reschedule(default_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::snake::timers::TimerCommand;
    use crate::games::snake::types::Point;

    struct Fixture {
        manager: EffectManager,
        snake: Snake,
        score: u32,
        scheduler: TickScheduler,
        timers: TimerRegistry,
        settings: SnakeSessionSettings,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = SnakeSessionSettings::survival();
            let mut scheduler = TickScheduler::new(settings.timing.default_interval);
            scheduler.start(settings.timing.default_interval);
            Self {
                manager: EffectManager::new(),
                snake: Snake::new(Point::new(10, 10)),
                score: 0,
                scheduler,
                timers: TimerRegistry::new(),
                settings,
            }
        }

        fn apply(&mut self, effect: EffectType) {
            let ctx = EffectContext {
                snake: &mut self.snake,
                score: &mut self.score,
                scheduler: &mut self.scheduler,
                timers: &mut self.timers,
            };
            self.manager.apply_effect(effect, ctx, &self.settings);
        }

        fn expire(&mut self, kind: TimerKind) -> bool {
            let Some(token) = self.timers.live_token(kind) else {
                return false;
            };
            if !self.timers.fire(token) {
                return false;
            }
            self.manager.expire(kind, &mut self.scheduler).is_some()
        }
    }

    #[test]
    fn test_speed_boost_lowers_then_restores() {
        let mut f = Fixture::new();
        f.apply(EffectType::SpeedBoost);
        assert_eq!(f.scheduler.interval(), Duration::from_millis(70));
        assert!(f.manager.speed_boost_active());

        assert!(f.expire(TimerKind::SpeedBoost));
        assert_eq!(f.scheduler.interval(), Duration::from_millis(100));
        assert!(!f.manager.speed_boost_active());
    }

    #[test]
    fn test_speed_boost_respects_floor() {
        let mut f = Fixture::new();
        f.scheduler.reschedule(Duration::from_millis(50));
        f.apply(EffectType::SpeedBoost);
        assert_eq!(f.scheduler.interval(), Duration::from_millis(30));
    }

    #[test]
    fn test_chained_boost_restores_last_snapshot() {
        let mut f = Fixture::new();
        f.apply(EffectType::SpeedBoost);
        let first = f.timers.live_token(TimerKind::SpeedBoost).unwrap();
        f.apply(EffectType::SpeedBoost);
        assert_eq!(f.scheduler.interval(), Duration::from_millis(40));

        assert!(!f.timers.fire(first));
        assert!(f.expire(TimerKind::SpeedBoost));
        assert_eq!(f.scheduler.interval(), Duration::from_millis(70));
    }

    #[test]
    fn test_instant_effects() {
        let mut f = Fixture::new();
        f.apply(EffectType::ExtraPoints);
        assert_eq!(f.score, 50);
        f.apply(EffectType::MegaPoints);
        assert_eq!(f.score, 150);
        f.apply(EffectType::GrowthBonus);
        assert_eq!(f.snake.len(), 4);
        assert!(f.timers.drain_commands().is_empty());
    }

    #[test]
    fn test_tail_reduction_needs_long_snake() {
        let mut f = Fixture::new();
        f.apply(EffectType::GrowthBonus);
        f.apply(EffectType::TailReduction);
        assert_eq!(f.snake.len(), 4);

        f.apply(EffectType::GrowthBonus);
        assert_eq!(f.snake.len(), 7);
        f.apply(EffectType::TailReduction);
        assert_eq!(f.snake.len(), 2);
    }

    #[test]
    fn test_control_reversal_times_out() {
        let mut f = Fixture::new();
        f.apply(EffectType::ControlReversal);
        assert!(f.manager.controls_reversed());
        assert!(f.expire(TimerKind::ControlReversal));
        assert!(!f.manager.controls_reversed());
    }

    #[test]
    fn test_clear_all_effects_resets_and_neutralizes_timers() {
        let mut f = Fixture::new();
        f.apply(EffectType::SpeedBoost);
        f.apply(EffectType::ControlReversal);
        let boost = f.timers.live_token(TimerKind::SpeedBoost).unwrap();
        let reversal = f.timers.live_token(TimerKind::ControlReversal).unwrap();
        f.timers.drain_commands();

        f.manager
            .clear_all_effects(&mut f.scheduler, &mut f.timers, Duration::from_millis(100));

        assert_eq!(f.scheduler.interval(), Duration::from_millis(100));
        assert!(!f.manager.controls_reversed());
        assert!(!f.timers.fire(boost));
        assert!(!f.timers.fire(reversal));
        assert!(f
            .timers
            .drain_commands()
            .contains(&TimerCommand::Disarm { kind: TimerKind::SpeedBoost }));
    }

    #[test]
    fn test_spawn_pool() {
        let mut settings = EffectSettings::default();
        assert_eq!(EffectType::spawn_pool(&settings).len(), 5);
        settings.enable_control_reversal = true;
        assert!(EffectType::spawn_pool(&settings).contains(&EffectType::ControlReversal));
        assert_eq!(EffectType::SpeedBoost.duration(&settings), Duration::from_secs(5));
        assert_eq!(EffectType::MegaPoints.duration(&settings), Duration::ZERO);
        assert!(EffectType::SpeedBoost.is_timed());
        assert!(!EffectType::TailReduction.is_timed());

        let all: Vec<EffectType> = EffectType::spawn_pool(&settings);
        let tags: std::collections::HashSet<&str> = all.iter().map(|e| e.tag()).collect();
        assert_eq!(tags.len(), all.len());
        assert!(all.iter().all(|e| e.tag().starts_with('#')));
        assert!(all.iter().all(|e| e.probability() > 0.0 && e.probability() <= 1.0));
        assert_eq!(EffectType::ControlReversal.probability(), 0.1);
    }
}
