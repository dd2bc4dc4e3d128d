//! Admission-controlled job dispatch
//!
//! This crate decides, for every submitted job, whether it may run now:
//! - A concurrency ceiling bounds how many jobs execute at once
//! - A rate ceiling bounds admissions per rolling one second window
//! - Refused jobs wait in a FIFO queue that is redriven whenever a job
//!   finishes or the rate window frees budget

pub mod admission;
mod completion;
pub mod config;
mod dispatcher;
mod error;
mod executor;
pub mod queue;
pub mod timer;

pub use admission::{AdmissionController, Refusal};
pub use completion::Completion;
pub use config::{DispatchConfig, MIN_RECHECK_DELAY, RATE_WINDOW};
pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::DispatchError;
pub use executor::Executor;
pub use queue::PendingQueue;
pub use timer::RecheckTimer;
