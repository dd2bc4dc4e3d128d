//! Submission, execution and redrive of admission-controlled jobs
//!
//! ```text
//! submit ──> pending queue ──> redrive ──try_admit──> spawn execute
//!                 ^                │                      │
//!                 │           rate refusal                │ result to submitter
//!                 │                v                      v
//!                 └──────── recheck timer           release + redrive
//! ```
//!
//! Every job passes through the pending queue, so a job can never be
//! admitted ahead of one submitted before it. When nothing is queued the
//! job is admitted (or refused) within the same call to `submit`.

use std::{
    fmt,
    num::{NonZeroU32, NonZeroUsize},
    sync::Arc,
    time::Duration,
};

use courier_common::{admission, internal};
use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::Notify, time::Instant};

use crate::{
    admission::{AdmissionController, Refusal},
    completion::{Completion, Reply},
    config::DispatchConfig,
    executor::Executor,
    queue::PendingQueue,
    timer::RecheckTimer,
};

/// A submitted job together with where its result goes
struct Job<E: Executor> {
    payload: E::Job,
    reply: Reply<E::Output, E::Error>,
}

struct State<E: Executor> {
    admission: AdmissionController,
    pending: PendingQueue<Job<E>>,
    recheck: RecheckTimer,
}

impl<E: Executor> State<E> {
    fn is_idle(&self) -> bool {
        self.admission.in_flight() == 0 && self.pending.is_empty()
    }
}

struct Shared<E: Executor> {
    executor: Arc<E>,
    state: Mutex<State<E>>,
    idle: Notify,
}

/// Point-in-time view of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Jobs admitted and not yet finished
    pub in_flight: usize,
    /// Jobs waiting for admission
    pub queued: usize,
    /// Admissions counted against the current rate window
    pub admissions_in_window: usize,
    pub max_concurrency: Option<NonZeroUsize>,
    pub max_rate: Option<NonZeroU32>,
    /// Whether a rate recheck is scheduled
    pub recheck_armed: bool,
}

/// Runs jobs on an [`Executor`] within a concurrency and rate limit
///
/// Cloning a dispatcher yields another handle to the same queue and limits.
/// Separately constructed dispatchers share nothing.
pub struct Dispatcher<E: Executor> {
    shared: Arc<Shared<E>>,
}

impl<E: Executor> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: Executor> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<E: Executor> Dispatcher<E> {
    #[must_use]
    pub fn new(config: DispatchConfig, executor: E) -> Self {
        Self::with_shared_executor(config, Arc::new(executor))
    }

    #[must_use]
    pub fn with_shared_executor(config: DispatchConfig, executor: Arc<E>) -> Self {
        internal!(
            level = DEBUG,
            max_concurrency = ?config.max_concurrency,
            max_rate = ?config.max_rate,
            "Dispatcher created"
        );

        Self {
            shared: Arc::new(Shared {
                executor,
                state: Mutex::new(State {
                    admission: AdmissionController::new(config),
                    pending: PendingQueue::new(),
                    recheck: RecheckTimer::new(),
                }),
                idle: Notify::new(),
            }),
        }
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.shared.executor
    }

    /// Submit a job for execution.
    ///
    /// The job starts immediately if both limits allow it, otherwise it waits
    /// behind every job submitted before it. The returned [`Completion`]
    /// resolves exactly once with the executor's result.
    ///
    /// Jobs are spawned onto the current tokio runtime; a job submitted from
    /// outside a runtime stays queued until a later redrive happens inside
    /// one.
    pub fn submit(&self, job: E::Job) -> Completion<E::Output, E::Error> {
        let (reply, completion) = Completion::channel();

        let mut state = self.shared.state.lock();
        state.pending.push_back(
            Job {
                payload: job,
                reply,
            },
            Instant::now(),
        );
        self.shared.redrive(&mut state);
        drop(state);

        completion
    }

    pub fn stats(&self) -> DispatchStats {
        let mut state = self.shared.state.lock();
        let admissions_in_window = state.admission.admissions_in_window(Instant::now());

        DispatchStats {
            in_flight: state.admission.in_flight(),
            queued: state.pending.len(),
            admissions_in_window,
            max_concurrency: state.admission.max_concurrency(),
            max_rate: state.admission.max_rate(),
            recheck_armed: state.recheck.is_armed(),
        }
    }

    /// Returns `true` if nothing is executing or queued.
    pub fn is_idle(&self) -> bool {
        self.shared.state.lock().is_idle()
    }

    /// Wait until nothing is executing or queued.
    pub async fn idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }

            notified.await;
        }
    }
}

impl<E: Executor> Shared<E> {
    /// Admit queued jobs, in order, until the queue is empty or a limit
    /// refuses the head.
    fn redrive(self: &Arc<Self>, state: &mut State<E>) {
        let Ok(runtime) = Handle::try_current() else {
            admission!(
                level = WARN,
                queued = state.pending.len(),
                "No runtime available, leaving jobs queued"
            );
            return;
        };

        let now = Instant::now();

        while !state.pending.is_empty() {
            match state.admission.try_admit(now) {
                Ok(()) => {
                    let Some(queued) = state.pending.pop_front() else {
                        break;
                    };

                    admission!(
                        in_flight = state.admission.in_flight(),
                        queued = state.pending.len(),
                        waited = ?now.saturating_duration_since(queued.enqueued_at),
                        "Job admitted"
                    );
                    self.launch(&runtime, queued.item);
                }
                Err(Refusal::Concurrency) => {
                    admission!(
                        level = DEBUG,
                        queued = state.pending.len(),
                        "Concurrency limit reached, waiting for a release"
                    );
                    break;
                }
                Err(Refusal::Rate { retry_after }) => {
                    admission!(
                        level = DEBUG,
                        queued = state.pending.len(),
                        retry_after = ?retry_after,
                        "Rate limit reached, scheduling recheck"
                    );
                    self.schedule_recheck(&runtime, state, retry_after);
                    break;
                }
            }
        }

        // A recheck is only outstanding while jobs wait on the rate limit
        if state.pending.is_empty() {
            state.recheck.cancel();
        }
    }

    fn schedule_recheck(self: &Arc<Self>, runtime: &Handle, state: &mut State<E>, delay: Duration) {
        let shared = Arc::downgrade(self);

        state.recheck.rearm(runtime, delay, move |generation| async move {
            // Only re-evaluate if some handle still owns the dispatcher
            let Some(shared) = shared.upgrade() else {
                return;
            };

            let mut state = shared.state.lock();
            if state.recheck.fired(generation) {
                shared.redrive(&mut state);
            } else {
                internal!(generation, "Superseded recheck ignored");
            }
        });
    }

    fn launch(self: &Arc<Self>, runtime: &Handle, job: Job<E>) {
        let shared = Arc::clone(self);

        runtime.spawn(async move {
            // Releases the slot when this task ends, even by panic
            let slot = Slot { shared };
            let Job { payload, reply } = job;

            let outcome = slot.shared.executor.execute(payload).await;
            if reply.send(outcome).is_err() {
                internal!("Submitter dropped its completion before the job finished");
            }

            drop(slot);
        });
    }

    fn release(self: &Arc<Self>) {
        let mut state = self.state.lock();
        state.admission.release();
        self.redrive(&mut state);
        let idle = state.is_idle();
        drop(state);

        if idle {
            self.idle.notify_waiters();
        }
    }
}

/// A held concurrency slot
struct Slot<E: Executor> {
    shared: Arc<Shared<E>>,
}

impl<E: Executor> Drop for Slot<E> {
    fn drop(&mut self) {
        self.shared.release();
    }
}
