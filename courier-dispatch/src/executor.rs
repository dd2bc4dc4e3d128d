use async_trait::async_trait;

/// Performs the work for one admitted job
///
/// The dispatcher calls [`Executor::execute`] on its own spawned task once
/// the job has been admitted, and forwards the result unchanged to whoever
/// submitted the job. Failures are never retried by the dispatcher.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// The payload submitted by callers
    type Job: Send + 'static;

    /// What a successful execution produces
    type Output: Send + 'static;

    /// What a failed execution produces
    type Error: Send + 'static;

    async fn execute(&self, job: Self::Job) -> Result<Self::Output, Self::Error>;
}
