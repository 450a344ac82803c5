//! Asynchronous batched soft-deletion pipeline.
//!
//! Request handlers hand deletions to [`BatchDeleter::enqueue`] and answer
//! their client straight away. The marking itself happens later, in batches,
//! on background tasks:
//!
//! ```text
//! enqueue ──> intake ──> distributor ──┬─> lane 0 ──┐
//!                                      ├─> lane 1 ──┼──> aggregator ──> accumulator ──> UrlRepository
//!                                      └─> lane N ──┘
//! ```
//!
//! - [`task`] - [`DeletionTask`] and per-flush grouping by user
//! - [`fan_out`] - round-robin distributor over a fixed set of lanes
//! - [`fan_in`] - merges lanes back into a single stream
//! - [`accumulator`] - buffers tasks and flushes on size or interval
//! - [`deleter`] - public handle: enqueue, runtime settings, shutdown
//!
//! Deletions are best effort. A storage failure for one user's group is
//! logged and dropped without retry, and pending tasks are lost if the
//! process dies before they are flushed.

pub mod accumulator;
pub mod deleter;
pub mod fan_in;
pub mod fan_out;
pub mod task;

pub use accumulator::{AccumulatorState, BatchAccumulator, FlushTrigger};
pub use deleter::BatchDeleter;
pub use task::{DeletionTask, UserGroupedIds};

use std::time::Duration;

/// Default number of worker lanes.
pub const DEFAULT_WORKERS: usize = 5;
/// Default capacity of the intake queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;
/// Default capacity of each worker lane.
pub const DEFAULT_LANE_CAPACITY: usize = 100;
/// Default number of tasks that triggers a flush.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Default time between interval flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(2);
/// Default bound on a single storage call during a flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors returned by the deletion pipeline to its callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleterError {
    #[error("deletion queue is closed")]
    Closed,

    #[error("invalid deletion task: {0}")]
    InvalidTask(&'static str),

    #[error("invalid deleter setting: {0}")]
    InvalidSetting(&'static str),
}

/// Construction-time settings of a [`BatchDeleter`].
///
/// `workers`, `queue_capacity`, `lane_capacity` and `flush_timeout` are fixed
/// for the pipeline's lifetime. `batch_size` and `flush_interval` are only
/// initial values and can be changed later through the deleter's setters.
#[derive(Debug, Clone)]
pub struct DeleterConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub lane_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub flush_timeout: Duration,
}

impl Default for DeleterConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            lane_capacity: DEFAULT_LANE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl DeleterConfig {
    /// Checks that every count and duration is positive.
    ///
    /// # Errors
    ///
    /// Returns [`DeleterError::InvalidSetting`] naming the first offending field.
    pub fn validate(&self) -> Result<(), DeleterError> {
        if self.workers == 0 {
            return Err(DeleterError::InvalidSetting("worker count must be positive"));
        }
        if self.queue_capacity == 0 {
            return Err(DeleterError::InvalidSetting("queue capacity must be positive"));
        }
        if self.lane_capacity == 0 {
            return Err(DeleterError::InvalidSetting("lane capacity must be positive"));
        }
        if self.batch_size == 0 {
            return Err(DeleterError::InvalidSetting("batch size must be positive"));
        }
        if self.flush_interval.is_zero() {
            return Err(DeleterError::InvalidSetting("flush interval must be positive"));
        }
        if self.flush_timeout.is_zero() {
            return Err(DeleterError::InvalidSetting("flush timeout must be positive"));
        }
        Ok(())
    }
}

/// Flush thresholds shared between the deleter handle and the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushSettings {
    pub batch_size: usize,
    pub flush_interval: Duration,
}
