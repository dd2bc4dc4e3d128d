//! Admission control over a concurrency ceiling and a rolling rate window
//!
//! Every admission consumes one concurrency slot and appends its timestamp to
//! the admission log. A slot is returned by [`AdmissionController::release`];
//! a log entry is only ever returned by time passing, so a failed job still
//! counts against the rate.
//!
//! # Rolling window
//!
//! ```text
//! Rate limit: 3 per 1000ms
//! - t=0:    A, B, C admitted        log = [0, 0, 0]
//! - t=400:  D refused, retry in 600 log = [0, 0, 0]
//! - t=1000: D admitted              log = [1000]
//! ```

use std::{
    collections::VecDeque,
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};

use tokio::time::Instant;

use crate::config::{DispatchConfig, MIN_RECHECK_DELAY, RATE_WINDOW};

/// Why a job could not be admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Every concurrency slot is taken; a release will free one.
    Concurrency,
    /// The rate window is full; budget frees up after `retry_after`.
    Rate { retry_after: Duration },
}

/// Owner of the concurrency and rate accounting for one dispatcher
#[derive(Debug)]
pub struct AdmissionController {
    max_concurrency: Option<NonZeroUsize>,
    max_rate: Option<NonZeroU32>,
    window: Duration,
    in_flight: usize,
    /// Admission instants, oldest first
    log: VecDeque<Instant>,
}

impl AdmissionController {
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_window(config, RATE_WINDOW)
    }

    pub(crate) fn with_window(config: DispatchConfig, window: Duration) -> Self {
        let capacity = config
            .max_rate
            .map_or(0, |rate| usize::try_from(rate.get()).unwrap_or(0));

        Self {
            max_concurrency: config.max_concurrency,
            max_rate: config.max_rate,
            window,
            in_flight: 0,
            log: VecDeque::with_capacity(capacity),
        }
    }

    /// Drop every log entry that has left the window ending at `now`.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.log.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.log.pop_front();
            } else {
                break;
            }
        }
    }

    fn concurrency_exhausted(&self) -> bool {
        self.max_concurrency
            .is_some_and(|max| self.in_flight >= max.get())
    }

    fn rate_exhausted(&self) -> bool {
        self.max_rate
            .is_some_and(|max| self.log.len() >= usize::try_from(max.get()).unwrap_or(usize::MAX))
    }

    /// Time until the oldest logged admission leaves the window.
    fn retry_after(&self, now: Instant) -> Duration {
        self.log
            .front()
            .map_or(MIN_RECHECK_DELAY, |&oldest| {
                (oldest + self.window).saturating_duration_since(now)
            })
            .max(MIN_RECHECK_DELAY)
    }

    /// Try to admit one job at `now`.
    ///
    /// On success a concurrency slot is held until [`Self::release`] and
    /// `now` is recorded against the rate.
    ///
    /// # Errors
    ///
    /// Returns the [`Refusal`] naming the limit that is currently exhausted.
    /// The concurrency limit is checked first.
    pub fn try_admit(&mut self, now: Instant) -> Result<(), Refusal> {
        self.prune(now);

        if self.concurrency_exhausted() {
            return Err(Refusal::Concurrency);
        }

        if self.rate_exhausted() {
            return Err(Refusal::Rate {
                retry_after: self.retry_after(now),
            });
        }

        self.log.push_back(now);
        self.in_flight += 1;

        Ok(())
    }

    /// Return the concurrency slot held by a finished job.
    pub const fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Number of jobs admitted and not yet released
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of admissions still inside the window ending at `now`
    pub fn admissions_in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.log.len()
    }

    pub const fn max_concurrency(&self) -> Option<NonZeroUsize> {
        self.max_concurrency
    }

    pub const fn max_rate(&self) -> Option<NonZeroU32> {
        self.max_rate
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_unbounded_always_admits() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded());
        let now = Instant::now();

        for _ in 0..1000 {
            assert!(controller.try_admit(now).is_ok());
        }
        assert_eq!(controller.in_flight(), 1000);
    }

    #[test]
    fn test_concurrency_ceiling() {
        let mut controller =
            AdmissionController::new(DispatchConfig::unbounded().with_max_concurrency(2));
        let now = Instant::now();

        assert!(controller.try_admit(now).is_ok());
        assert!(controller.try_admit(now).is_ok());
        assert_eq!(controller.try_admit(now), Err(Refusal::Concurrency));
        assert_eq!(controller.in_flight(), 2);

        controller.release();
        assert_eq!(controller.in_flight(), 1);
        assert!(controller.try_admit(now).is_ok());
        assert_eq!(controller.in_flight(), 2);
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded());
        controller.release();
        assert_eq!(controller.in_flight(), 0);
    }

    #[test]
    fn test_rate_ceiling_and_retry_after() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded().with_max_rate(3));
        let start = Instant::now();

        for _ in 0..3 {
            assert!(controller.try_admit(start).is_ok());
        }

        let later = start + ms(400);
        assert_eq!(
            controller.try_admit(later),
            Err(Refusal::Rate {
                retry_after: ms(600)
            })
        );
        // Refusal does not consume a slot or a log entry
        assert_eq!(controller.in_flight(), 3);
        assert_eq!(controller.admissions_in_window(later), 3);
    }

    #[test]
    fn test_rate_window_frees_exactly_at_boundary() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded().with_max_rate(1));
        let start = Instant::now();

        assert!(controller.try_admit(start).is_ok());
        controller.release();

        assert!(matches!(
            controller.try_admit(start + ms(999)),
            Err(Refusal::Rate { .. })
        ));
        assert!(controller.try_admit(start + RATE_WINDOW).is_ok());
    }

    #[test]
    fn test_retry_after_is_clamped() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded().with_max_rate(1));
        let start = Instant::now();

        assert!(controller.try_admit(start).is_ok());
        assert_eq!(
            controller.try_admit(start + ms(995)),
            Err(Refusal::Rate {
                retry_after: MIN_RECHECK_DELAY
            })
        );
    }

    #[test]
    fn test_concurrency_checked_before_rate() {
        let mut controller = AdmissionController::new(
            DispatchConfig::unbounded()
                .with_max_concurrency(1)
                .with_max_rate(1),
        );
        let now = Instant::now();

        assert!(controller.try_admit(now).is_ok());
        assert_eq!(controller.try_admit(now), Err(Refusal::Concurrency));
    }

    #[test]
    fn test_failed_job_still_counts_against_rate() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded().with_max_rate(2));
        let now = Instant::now();

        assert!(controller.try_admit(now).is_ok());
        controller.release();
        assert!(controller.try_admit(now).is_ok());
        controller.release();

        assert_eq!(controller.in_flight(), 0);
        assert!(matches!(
            controller.try_admit(now),
            Err(Refusal::Rate { .. })
        ));
    }

    #[test]
    fn test_log_never_exceeds_rate() {
        let mut controller = AdmissionController::new(DispatchConfig::unbounded().with_max_rate(5));
        let start = Instant::now();

        for step in 0..200 {
            let now = start + ms(step * 37);
            let _ = controller.try_admit(now);
            controller.release();
            assert!(controller.admissions_in_window(now) <= 5);
        }
    }

    #[test]
    fn test_custom_window() {
        let mut controller =
            AdmissionController::with_window(DispatchConfig::unbounded().with_max_rate(1), ms(100));
        let start = Instant::now();

        assert!(controller.try_admit(start).is_ok());
        assert_eq!(
            controller.try_admit(start + ms(50)),
            Err(Refusal::Rate {
                retry_after: ms(50)
            })
        );
        assert!(controller.try_admit(start + ms(100)).is_ok());
    }
}
