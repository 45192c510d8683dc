//! Debounced render scheduling.
//!
//! The scheduler never runs a timer of its own. The host loop calls
//! [`DebounceScheduler::poll`] with the current time and gets the pending
//! content back once the quiet period has elapsed without another change.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Source of the current time, swappable in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handle to one armed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceToken(u64);

#[derive(Debug)]
struct Pending {
    token: DebounceToken,
    content: String,
    deadline: Instant,
}

/// Coalesces bursts of change notifications into a single render trigger.
#[derive(Debug)]
pub struct DebounceScheduler {
    quiet: Duration,
    pending: Option<Pending>,
    next_token: u64,
}

impl DebounceScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            next_token: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Arm a new deadline for `content`, replacing any pending one.
    pub fn notify(&mut self, content: impl Into<String>, now: Instant) -> DebounceToken {
        let token = DebounceToken(self.next_token);
        self.next_token += 1;
        if let Some(prev) = self.pending.take() {
            tracing::trace!(target: "berrypad::debounce", token = prev.token.0, "rearmed");
        }
        self.pending = Some(Pending {
            token,
            content: content.into(),
            deadline: now + self.quiet,
        });
        token
    }

    /// Take the pending content if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let ready = self.pending.as_ref()?.deadline <= now;
        if !ready {
            return None;
        }
        let pending = self.pending.take()?;
        tracing::trace!(target: "berrypad::debounce", token = pending.token.0, "fired");
        Some(pending.content)
    }

    /// Drop the pending deadline, if any. Returns whether one was dropped.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                tracing::trace!(target: "berrypad::debounce", token = pending.token.0, "cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `token` is the live deadline.
    pub fn is_live(&self, token: DebounceToken) -> bool {
        self.pending.as_ref().is_some_and(|p| p.token == token)
    }

    /// Time left before the pending deadline, for sizing the host's poll wait.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_coalesces_to_last_content() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::from_millis(50);
        let mut renders = Vec::new();

        for content in ["a", "ab", "abc"] {
            scheduler.notify(content, clock.now());
            clock.advance(Duration::from_millis(10));
            renders.extend(scheduler.poll(clock.now()));
        }
        assert!(renders.is_empty());

        clock.advance(Duration::from_millis(50));
        renders.extend(scheduler.poll(clock.now()));
        renders.extend(scheduler.poll(clock.now()));
        assert_eq!(renders, vec!["abc".to_string()]);
    }

    #[test]
    fn test_fires_exactly_at_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::from_millis(50);
        scheduler.notify("x", clock.now());
        clock.advance(Duration::from_millis(49));
        assert_eq!(scheduler.poll(clock.now()), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(scheduler.poll(clock.now()).as_deref(), Some("x"));
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_new_token_replaces_old() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::from_millis(50);
        let first = scheduler.notify("a", clock.now());
        let second = scheduler.notify("b", clock.now());
        assert_ne!(first, second);
        assert!(!scheduler.is_live(first));
        assert!(scheduler.is_live(second));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::from_millis(50);
        scheduler.notify("a", clock.now());
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.poll(clock.now()), None);
    }

    #[test]
    fn test_time_until_ready() {
        let clock = ManualClock::new();
        let mut scheduler = DebounceScheduler::from_millis(50);
        assert_eq!(scheduler.time_until_ready(clock.now()), None);
        scheduler.notify("a", clock.now());
        clock.advance(Duration::from_millis(20));
        assert_eq!(
            scheduler.time_until_ready(clock.now()),
            Some(Duration::from_millis(30))
        );
        clock.advance(Duration::from_millis(100));
        assert_eq!(scheduler.time_until_ready(clock.now()), Some(Duration::ZERO));
    }
}
