//! Single outstanding delayed recheck

use std::{future::Future, time::Duration};

use tokio::{runtime::Handle, task::JoinHandle};

/// Owned handle to at most one pending delayed task
///
/// Re-arming aborts the previous task before the new one is spawned, so two
/// rechecks are never pending at once. Dropping the timer aborts whatever is
/// still pending.
///
/// Each arming gets a generation. An aborted task that was already running
/// cannot be stopped, so the task reports its generation to [`fired`] and a
/// stale report leaves the newer recheck in place.
///
/// [`fired`]: RecheckTimer::fired
#[derive(Debug, Default)]
pub struct RecheckTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl RecheckTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handle: None,
            generation: 0,
        }
    }

    /// Cancel any pending recheck and run the task built by `task` on
    /// `runtime` after `delay`.
    ///
    /// `task` receives the generation of this arming, which the task hands
    /// back to [`fired`](Self::fired). The same generation is returned.
    pub fn rearm<F, Fut>(&mut self, runtime: &Handle, delay: Duration, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let generation = self.generation;
        let task = task(generation);
        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));

        generation
    }

    /// Forget the handle of the recheck armed as `generation`.
    ///
    /// Returns `false`, leaving the timer untouched, if the recheck has since
    /// been cancelled or re-armed.
    pub fn fired(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }

        self.handle = None;
        true
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RecheckTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
