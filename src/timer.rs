//! Clock and timer primitives.
//!
//! Timers do not run anything on their own. They record when they are next
//! due against an injected [`Clock`], and the owner polls them from a single
//! scheduling thread. This keeps every callback serial and lets tests drive
//! elapsed time with a [`VirtualClock`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`] using `Instant`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced [`Clock`] for tests and simulations.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Mutex<Duration>,
}

impl VirtualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Moves virtual time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Jumps virtual time to `to`. Never moves backwards.
    pub fn set(&self, to: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if to > *now {
            *now = to;
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shortest interval a timer accepts; zero would fire forever.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A periodic timer with an enabled flag.
///
/// `start` on a running timer and `stop` on a stopped timer are no-ops.
/// Changing the interval of a running timer does not move its pending
/// deadline; the new interval applies from the next (re)start.
pub struct Timer {
    name: &'static str,
    interval: Duration,
    next_due: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Timer {
    pub fn new(name: &'static str, interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            interval: interval.max(MIN_INTERVAL),
            next_due: None,
            clock,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Deadline of the next firing, if running.
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    pub fn start(&mut self) {
        if self.next_due.is_some() {
            return;
        }
        let due = self.clock.now() + self.interval;
        self.next_due = Some(due);
        tracing::debug!(timer = self.name, due_ms = due.as_millis() as u64, "Timer started");
    }

    pub fn stop(&mut self) {
        if self.next_due.take().is_some() {
            tracing::debug!(timer = self.name, "Timer stopped");
        }
    }

    /// Returns the deadline if the timer is running and due at `now`.
    pub fn due_at(&self, now: Duration) -> Option<Duration> {
        self.next_due.filter(|due| *due <= now)
    }

    /// Consumes one firing, re-arming for the following period.
    ///
    /// Returns `false` if the timer was not due. A timer that has fallen more
    /// than one interval behind is re-armed from `now` instead of bursting.
    pub fn fire(&mut self, now: Duration) -> bool {
        let Some(due) = self.due_at(now) else {
            return false;
        };
        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });
        tracing::trace!(timer = self.name, "Timer fired");
        true
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("next_due", &self.next_due)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(clock: &Arc<VirtualClock>, secs: u64) -> Timer {
        Timer::new("test", Duration::from_secs(secs), clock.clone())
    }

    #[test]
    fn test_start_is_idempotent() {
        let clock = VirtualClock::new();
        let mut t = timer(&clock, 60);
        t.start();
        clock.advance(Duration::from_secs(30));
        t.start();
        assert_eq!(t.next_due(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_stop_is_immediate_and_idempotent() {
        let clock = VirtualClock::new();
        let mut t = timer(&clock, 10);
        t.start();
        clock.advance(Duration::from_secs(10));
        t.stop();
        t.stop();
        assert!(!t.is_running());
        assert!(!t.fire(clock.now()));
    }

    #[test]
    fn test_periodic_fire_rearms() {
        let clock = VirtualClock::new();
        let mut t = timer(&clock, 10);
        t.start();

        clock.advance(Duration::from_secs(9));
        assert!(!t.fire(clock.now()));

        clock.advance(Duration::from_secs(1));
        assert!(t.fire(clock.now()));
        assert!(!t.fire(clock.now()));
        assert_eq!(t.next_due(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_interval_change_applies_on_restart() {
        let clock = VirtualClock::new();
        let mut t = timer(&clock, 10);
        t.start();
        t.set_interval(Duration::from_secs(30));
        assert_eq!(t.next_due(), Some(Duration::from_secs(10)));

        t.stop();
        t.start();
        assert_eq!(t.next_due(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_late_timer_does_not_burst() {
        let clock = VirtualClock::new();
        let mut t = timer(&clock, 10);
        t.start();
        clock.advance(Duration::from_secs(45));
        assert!(t.fire(clock.now()));
        assert!(!t.fire(clock.now()));
        assert_eq!(t.next_due(), Some(Duration::from_secs(55)));
    }

    #[test]
    fn test_virtual_clock_never_goes_back() {
        let clock = VirtualClock::new();
        clock.set(Duration::from_secs(5));
        clock.set(Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(5));
    }
}
