#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use courier_dispatch::Executor;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("job {0} failed")]
pub struct JobFailed(pub u32);

/// Records when each job started and holds it for a fixed time
pub struct Recorder {
    hold: Duration,
    failing: HashSet<u32>,
    panicking: HashSet<u32>,
    starts: Mutex<Vec<(u32, Instant)>>,
    running: AtomicUsize,
    peak: AtomicUsize,
    finished: AtomicUsize,
}

impl Recorder {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            starts: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, job: u32) -> Self {
        self.failing.insert(job);
        self
    }

    pub fn panicking(mut self, job: u32) -> Self {
        self.panicking.insert(job);
        self
    }

    pub fn starts(&self) -> Vec<(u32, Instant)> {
        self.starts.lock().clone()
    }

    pub fn order(&self) -> Vec<u32> {
        self.starts.lock().iter().map(|(job, _)| *job).collect()
    }

    pub fn start_of(&self, job: u32) -> Instant {
        self.starts
            .lock()
            .iter()
            .find(|(id, _)| *id == job)
            .map(|(_, at)| *at)
            .expect("job never started")
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for Recorder {
    type Job = u32;
    type Output = u32;
    type Error = JobFailed;

    async fn execute(&self, job: u32) -> Result<u32, JobFailed> {
        self.starts.lock().push((job, Instant::now()));
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        tokio::time::sleep(self.hold).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);

        assert!(!self.panicking.contains(&job), "job {job} panicked");

        if self.failing.contains(&job) {
            Err(JobFailed(job))
        } else {
            Ok(job)
        }
    }
}
