//! Admission limits for a dispatcher
//!
//! Both limits are optional; an absent limit never refuses a job.
//!
//! ```text
//! (
//!     max_concurrency: Some(5),
//!     max_rate: Some(14),
//! )
//! ```

use std::{
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Length of the rolling window that `max_rate` is counted over.
pub const RATE_WINDOW: Duration = Duration::from_millis(1000);

/// Shortest delay ever used when scheduling a rate recheck.
pub const MIN_RECHECK_DELAY: Duration = Duration::from_millis(20);

/// Limits enforced by the admission controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of jobs executing at the same time
    ///
    /// Default: unbounded
    #[serde(default)]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Maximum number of admissions per [`RATE_WINDOW`]
    ///
    /// Default: unbounded
    #[serde(default)]
    pub max_rate: Option<NonZeroU32>,
}

impl DispatchConfig {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_concurrency: None,
            max_rate: None,
        }
    }

    /// Limit the number of simultaneously executing jobs.
    ///
    /// A value of zero removes the limit.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = NonZeroUsize::new(max_concurrency);
        self
    }

    /// Limit the number of admissions per second.
    ///
    /// A value of zero removes the limit.
    #[must_use]
    pub const fn with_max_rate(mut self, max_rate: u32) -> Self {
        self.max_rate = NonZeroU32::new(max_rate);
        self
    }
}
