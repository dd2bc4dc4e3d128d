//! Errors surfaced to the submitter of a job

use thiserror::Error;

/// Outcome of a job that did not produce an output
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    /// The executor ran the job and reported this error.
    #[error(transparent)]
    Job(E),

    /// The job was dropped before producing a result, either because the
    /// executor panicked or because the dispatcher was dropped while the job
    /// was still queued.
    #[error("Job abandoned before completion")]
    Abandoned,
}

impl<E> DispatchError<E> {
    /// Returns `true` if the job never produced a result.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }

    /// The executor's error, if the job ran to completion.
    #[must_use]
    pub fn into_job_error(self) -> Option<E> {
        match self {
            Self::Job(error) => Some(error),
            Self::Abandoned => None,
        }
    }
}
