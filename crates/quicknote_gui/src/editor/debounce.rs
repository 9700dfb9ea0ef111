//! Resettable one-shot timers polled from the frame loop.

use std::time::{Duration, Instant};

/// Handle of one scheduled firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken {
    id: u64,
    deadline: Instant,
}

impl TimerToken {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Trailing-edge debouncer: each `schedule` supersedes the pending token,
/// so only the last call in a burst fires.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    next_id: u64,
    pending: Option<TimerToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending timer with one firing `delay` after `now`.
    pub fn schedule(&mut self, now: Instant) -> TimerToken {
        self.next_id = self.next_id.wrapping_add(1);
        let token = TimerToken {
            id: self.next_id,
            deadline: now + self.delay,
        };
        self.pending = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Fire the pending timer once its deadline has passed.
    ///
    /// # Returns
    /// The fired token, or `None` when nothing is due.
    pub fn poll(&mut self, now: Instant) -> Option<TimerToken> {
        let token = self.pending?;
        if now < token.deadline {
            return None;
        }
        self.pending = None;
        Some(token)
    }

    /// Time until the pending deadline, for repaint scheduling.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|token| token.deadline.saturating_duration_since(now))
    }
}
