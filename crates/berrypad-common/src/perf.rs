//! Performance timing utilities for instrumentation.

use web_time::Instant;

/// Get the current high-resolution timestamp in milliseconds since first use.
pub fn now() -> f64 {
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_secs_f64() * 1000.0
}

/// A guard that logs elapsed time when dropped.
///
/// Useful for timing blocks of code without closures.
pub struct TimingGuard {
    label: &'static str,
    start: f64,
}

impl TimingGuard {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: now(),
        }
    }

    /// Milliseconds since the guard was created.
    pub fn elapsed_ms(&self) -> f64 {
        now() - self.start
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        tracing::debug!(target: "berrypad::perf", elapsed_ms = self.elapsed_ms(), "{}", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }

    #[test]
    fn test_guard_elapsed_is_non_negative() {
        let guard = TimingGuard::new("noop");
        assert!(guard.elapsed_ms() >= 0.0);
    }
}
