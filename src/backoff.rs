//! Backoff policy: the delay schedule between bulk retry attempts.
//!
//! A `BackoffPolicy` is an immutable description; per-run retry state lives
//! only in the `DelayCursor` it hands out. One cursor is drawn per
//! orchestration run and never shared, so two concurrent runs against the
//! same policy cannot disturb each other's schedule.

use std::time::Duration;

/// Immutable delay schedule. `delays()` yields a fresh cursor per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Never wait, never retry: the cursor is exhausted from the start.
    None,
    /// Exactly `max_retries` waits of the same length.
    Constant { delay: Duration, max_retries: u32 },
    /// Waits double from `first_delay` up to `max_delay`, for `max_retries` draws.
    Exponential {
        first_delay: Duration,
        max_delay: Duration,
        max_retries: u32,
    },
}

impl BackoffPolicy {
    pub fn no_backoff() -> Self {
        BackoffPolicy::None
    }

    pub fn constant(delay: Duration, max_retries: u32) -> Self {
        BackoffPolicy::Constant { delay, max_retries }
    }

    pub fn exponential(first_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        BackoffPolicy::Exponential {
            first_delay,
            max_delay,
            max_retries,
        }
    }

    /// Fresh stateful cursor for one orchestration run.
    pub fn delays(&self) -> DelayCursor {
        DelayCursor {
            policy: *self,
            drawn: 0,
        }
    }
}

/// Forward-only sequence of wait durations drawn during one run.
///
/// `next()` returns `Some(delay)` while another attempt is permitted and
/// `None` once the schedule is exhausted; there is no rewinding.
#[derive(Debug)]
pub struct DelayCursor {
    policy: BackoffPolicy,
    drawn: u32,
}

impl Iterator for DelayCursor {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        match self.policy {
            BackoffPolicy::None => None,
            BackoffPolicy::Constant { delay, max_retries } => {
                if self.drawn >= max_retries {
                    return None;
                }
                self.drawn += 1;
                Some(delay)
            }
            BackoffPolicy::Exponential {
                first_delay,
                max_delay,
                max_retries,
            } => {
                if self.drawn >= max_retries {
                    return None;
                }
                // first * 2^n, shift clamped so the factor cannot overflow.
                let factor = 1u32 << self.drawn.min(16);
                self.drawn += 1;
                Some(first_delay.saturating_mul(factor).min(max_delay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backoff_is_exhausted_immediately() {
        let mut cursor = BackoffPolicy::no_backoff().delays();
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn constant_yields_exactly_max_retries_equal_delays() {
        let delay = Duration::from_millis(10);
        let policy = BackoffPolicy::constant(delay, 3);
        let drawn: Vec<Duration> = policy.delays().collect();
        assert_eq!(drawn, vec![delay, delay, delay]);
    }

    #[test]
    fn exponential_grows_and_is_capped() {
        let policy = BackoffPolicy::exponential(
            Duration::from_millis(50),
            Duration::from_millis(300),
            6,
        );
        let drawn: Vec<u64> = policy.delays().map(|d| d.as_millis() as u64).collect();
        assert_eq!(drawn, vec![50, 100, 200, 300, 300, 300]);
    }

    #[test]
    fn cursors_do_not_share_state() {
        let policy = BackoffPolicy::constant(Duration::from_millis(1), 2);
        let mut a = policy.delays();
        let mut b = policy.delays();
        assert!(a.next().is_some());
        assert!(a.next().is_some());
        assert_eq!(a.next(), None);
        // b starts fresh even though a is exhausted
        assert!(b.next().is_some());
        assert!(b.next().is_some());
        assert_eq!(b.next(), None);
    }
}
