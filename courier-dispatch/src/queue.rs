//! Pending jobs awaiting admission

use std::collections::VecDeque;

use tokio::time::Instant;

/// A job waiting in the [`PendingQueue`]
#[derive(Debug)]
pub struct Queued<T> {
    pub item: T,
    /// When the job entered the queue
    pub enqueued_at: Instant,
}

/// Strict FIFO of jobs refused admission
///
/// Jobs leave in exactly the order they arrived; nothing is ever reordered
/// or skipped.
#[derive(Debug)]
pub struct PendingQueue<T> {
    jobs: VecDeque<Queued<T>>,
}

impl<T> Default for PendingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingQueue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Append a job at the tail.
    pub fn push_back(&mut self, item: T, enqueued_at: Instant) {
        self.jobs.push_back(Queued { item, enqueued_at });
    }

    pub fn pop_front(&mut self) -> Option<Queued<T>> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
