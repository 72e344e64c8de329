//! Reconnect scheduling
//!
//! At most one reconnect is pending at a time. Overlapping close and error signals for the
//! same failure find the in-progress flag set and schedule nothing.

use std::time::Duration;

use tokio::time::Instant;

use super::BackoffPolicy;

#[derive(Debug, Clone)]
pub struct ReconnectController {
    policy: BackoffPolicy,
    /// Consecutive attempts since the last successful Ready/Resumed
    attempts: u32,
    in_progress: bool,
    deadline: Option<Instant>,
    current_delay: Option<Duration>,
    last_close: Option<u16>,
}

impl ReconnectController {
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            in_progress: false,
            deadline: None,
            current_delay: None,
            last_close: None,
        }
    }

    /// Schedule one reconnect attempt after the backoff delay.
    ///
    /// Returns the delay, or `None` when an attempt is already scheduled or running.
    pub fn schedule(&mut self, now: Instant, close_code: Option<u16>) -> Option<Duration> {
        self.last_close = close_code;
        if self.in_progress {
            tracing::debug!(attempt = self.attempts, "Reconnect already in progress");
            return None;
        }

        let delay = self.policy.delay_for(self.attempts);
        self.attempts = self.attempts.saturating_add(1);
        self.in_progress = true;
        self.deadline = Some(now + delay);
        self.current_delay = Some(delay);
        Some(delay)
    }

    /// When the scheduled attempt is due
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Claim the scheduled attempt if it is due. Clears the in-progress flag so a failure of
    /// the new connection can schedule the next attempt.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.in_progress = false;
                true
            }
            _ => false,
        }
    }

    /// Drop any scheduled attempt without touching the backoff
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            tracing::debug!(attempt = self.attempts, "Scheduled reconnect cancelled");
        }
        self.in_progress = false;
    }

    /// Back to baseline after a successful Ready/Resumed
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_delay = None;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_progress
    }

    #[must_use]
    pub fn current_delay(&self) -> Option<Duration> {
        self.current_delay
    }

    #[must_use]
    pub fn last_close(&self) -> Option<u16> {
        self.last_close
    }
}
