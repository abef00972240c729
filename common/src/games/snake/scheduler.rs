use std::time::Duration;

/// Shortest period handed to the driver; a zero period would spin.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Desired state of the session's single repeating tick.
///
/// Every `start`, `reschedule` and `stop` bumps `generation`; the async driver
/// rebuilds its interval whenever the generation it last saw is out of date,
/// which drops any tick that was already in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickScheduler {
    interval: Duration,
    running: bool,
    generation: u64,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_PERIOD),
            running: false,
            generation: 0,
        }
    }

    pub fn start(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_PERIOD);
        self.running = true;
        self.generation += 1;
    }

    /// Stop-then-start at `interval`.
    pub fn reschedule(&mut self, interval: Duration) {
        self.start(interval);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.generation += 1;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
