//! Heartbeat scheduling
//!
//! The scheduler holds one deadline instead of spawned timers. The event loop sleeps until
//! `deadline()` and calls `on_tick`; dropping the scheduler (with its connection) cancels
//! everything, so a tick can never reach a newer connection.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Outcome of a due heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatTick {
    /// Send a heartbeat now
    Send,
    /// The previous heartbeat was never acknowledged
    TimedOut,
}

#[derive(Debug, Clone, Default)]
pub struct HeartbeatScheduler {
    interval: Option<Duration>,
    next_at: Option<Instant>,
    /// `true` once the last heartbeat was acknowledged (or before the first one)
    acked: bool,
}

impl HeartbeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the cadence with a random initial delay in `[0, interval)`
    pub fn arm(&mut self, interval: Duration, now: Instant) {
        let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        let jitter = if millis == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..millis))
        };
        self.arm_with_jitter(interval, jitter, now);
    }

    /// Start the cadence with an explicit initial delay (clamped below `interval`)
    pub fn arm_with_jitter(&mut self, interval: Duration, jitter: Duration, now: Instant) {
        let first = if jitter < interval {
            jitter
        } else {
            interval.saturating_sub(Duration::from_millis(1))
        };
        self.interval = Some(interval);
        self.next_at = Some(now + first);
        self.acked = true;
    }

    pub fn disarm(&mut self) {
        self.interval = None;
        self.next_at = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.next_at.is_some()
    }

    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// When the next tick is due
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.next_at
    }

    /// HeartbeatAck received
    pub fn ack(&mut self) {
        self.acked = true;
    }

    #[must_use]
    pub fn is_acked(&self) -> bool {
        self.acked
    }

    /// Advance the cadence if a tick is due at `now`.
    ///
    /// The next deadline is the previous deadline plus the interval, not `now` plus the
    /// interval, so late wake-ups do not stretch the cadence. A timeout disarms the
    /// scheduler.
    pub fn on_tick(&mut self, now: Instant) -> Option<HeartbeatTick> {
        let interval = self.interval?;
        let deadline = self.next_at?;
        if now < deadline {
            return None;
        }

        if !self.acked {
            self.disarm();
            return Some(HeartbeatTick::TimedOut);
        }

        self.acked = false;
        self.next_at = Some(deadline + interval);
        Some(HeartbeatTick::Send)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(30_000);

    #[test]
    fn test_jitter_within_interval() {
        let now = Instant::now();
        for _ in 0..100 {
            let mut heartbeat = HeartbeatScheduler::new();
            heartbeat.arm(INTERVAL, now);
            let first = heartbeat.deadline().unwrap() - now;
            assert!(first < INTERVAL, "initial delay {first:?}");
        }
    }

    #[test]
    fn test_jitter_clamped() {
        let now = Instant::now();
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat.arm_with_jitter(INTERVAL, INTERVAL * 2, now);
        assert!(heartbeat.deadline().unwrap() - now < INTERVAL);
    }

    #[test]
    fn test_cadence_is_exact() {
        let start = Instant::now();
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat.arm_with_jitter(INTERVAL, Duration::from_millis(1_234), start);

        let first = heartbeat.deadline().unwrap();
        assert_eq!(heartbeat.on_tick(first), Some(HeartbeatTick::Send));
        heartbeat.ack();

        let second = heartbeat.deadline().unwrap();
        assert_eq!(second - first, INTERVAL);

        // Waking late does not shift the following deadline
        let late = second + Duration::from_millis(250);
        assert_eq!(heartbeat.on_tick(late), Some(HeartbeatTick::Send));
        assert_eq!(heartbeat.deadline().unwrap() - second, INTERVAL);
    }

    #[test]
    fn test_not_due_yet() {
        let now = Instant::now();
        let mut heartbeat = HeartbeatScheduler::new();
        assert_eq!(heartbeat.on_tick(now), None);

        heartbeat.arm_with_jitter(INTERVAL, Duration::from_millis(500), now);
        assert_eq!(heartbeat.on_tick(now), None);
    }

    #[test]
    fn test_missing_ack_times_out() {
        let now = Instant::now();
        let mut heartbeat = HeartbeatScheduler::new();
        heartbeat.arm_with_jitter(INTERVAL, Duration::ZERO, now);

        assert_eq!(heartbeat.on_tick(now), Some(HeartbeatTick::Send));
        assert!(!heartbeat.is_acked());

        let next = heartbeat.deadline().unwrap();
        assert_eq!(heartbeat.on_tick(next), Some(HeartbeatTick::TimedOut));
        assert!(!heartbeat.is_armed());
        assert_eq!(heartbeat.on_tick(next + INTERVAL), None);
    }
}
