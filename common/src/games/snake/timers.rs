use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    SpeedBoost,
    ControlReversal,
    SpecialFood,
}

/// Identifies one armed one-shot timer. Ids are never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub id: u64,
}

/// What the async driver has to do with its real timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    Arm { token: TimerToken, after: Duration },
    Disarm { kind: TimerKind },
}

/// Bookkeeping side of the one-shot timers: at most one live token per kind.
///
/// Expiry arrives later as a plain [`TimerToken`] message; [`TimerRegistry::fire`]
/// only accepts the token that is still live, so superseded or cleared timers
/// can never touch the game state even if their message was already queued.
#[derive(Clone, Debug, Default)]
pub struct TimerRegistry {
    next_id: u64,
    live: HashMap<TimerKind, TimerToken>,
    outbox: Vec<TimerCommand>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer of `kind`, replacing any live timer of the same kind.
    pub fn arm(&mut self, kind: TimerKind, after: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken {
            kind,
            id: self.next_id,
        };
        self.live.insert(kind, token);
        self.outbox.push(TimerCommand::Arm { token, after });
        token
    }

    pub fn disarm(&mut self, kind: TimerKind) -> bool {
        let was_live = self.live.remove(&kind).is_some();
        if was_live {
            self.outbox.push(TimerCommand::Disarm { kind });
        }
        was_live
    }

    pub fn disarm_all(&mut self) {
        let mut kinds: Vec<TimerKind> = self.live.keys().copied().collect();
        kinds.sort_by_key(|kind| *kind as u8);
        for kind in kinds {
            self.disarm(kind);
        }
    }

    /// Consumes an expiry. Returns `false` for stale tokens.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.live.get(&token.kind) == Some(&token) {
            self.live.remove(&token.kind);
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.live.contains_key(&kind)
    }

    pub fn live_token(&self, kind: TimerKind) -> Option<TimerToken> {
        self.live.get(&kind).copied()
    }

    pub fn drain_commands(&mut self) -> Vec<TimerCommand> {
        std::mem::take(&mut self.outbox)
    }
}
