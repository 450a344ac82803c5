//! Batch accumulator: buffers deletion tasks and flushes them to storage.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::{DeletionTask, FlushSettings, UserGroupedIds};
use crate::domain::repositories::UrlRepository;

/// Lifecycle of the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Buffer empty, waiting for tasks or the next tick.
    Idle,
    /// Buffer holds at least one task, below the batch size.
    Accumulating,
    /// Applying a batch to storage.
    Flushing,
    /// Input ended and the last batch was flushed. Terminal.
    Drained,
}

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    Size,
    Interval,
    Shutdown,
}

impl FlushTrigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Interval => "interval",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub trigger: FlushTrigger,
    pub tasks: usize,
    pub users: usize,
    pub failed_users: usize,
}

/// Single consumer of the merged deletion stream.
///
/// The accumulator is the only owner of the batch buffer, so no locking is
/// involved. It flushes when the buffer reaches the batch size, when the
/// flush interval ticks with a non-empty buffer, and once more when its
/// input ends.
pub struct BatchAccumulator {
    repository: Arc<dyn UrlRepository>,
    settings: watch::Receiver<FlushSettings>,
    flush_timeout: Duration,
    buffer: Vec<DeletionTask>,
    state: AccumulatorState,
}

impl BatchAccumulator {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        settings: watch::Receiver<FlushSettings>,
        flush_timeout: Duration,
    ) -> Self {
        let capacity = settings.borrow().batch_size;
        Self {
            repository,
            settings,
            flush_timeout,
            buffer: Vec::with_capacity(capacity),
            state: AccumulatorState::Idle,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Consumes `input` until it closes, then flushes what is left.
    pub async fn run(mut self, mut input: mpsc::Receiver<DeletionTask>) {
        let mut current = *self.settings.borrow_and_update();
        let mut ticker = new_ticker(current.flush_interval);
        let mut settings_open = true;

        info!(
            batch_size = current.batch_size,
            flush_interval_ms = current.flush_interval.as_millis() as u64,
            flush_timeout_ms = self.flush_timeout.as_millis() as u64,
            "Deletion accumulator started"
        );

        loop {
            tokio::select! {
                task = input.recv() => match task {
                    Some(task) => {
                        if self.push(task).await.is_some() {
                            ticker = new_ticker(current.flush_interval);
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    if !self.buffer.is_empty() {
                        self.flush(FlushTrigger::Interval).await;
                    }
                }
                changed = self.settings.changed(), if settings_open => {
                    if changed.is_err() {
                        settings_open = false;
                        continue;
                    }
                    let updated = *self.settings.borrow_and_update();
                    if updated.flush_interval != current.flush_interval {
                        ticker = new_ticker(updated.flush_interval);
                    }
                    current = updated;
                    debug!(
                        batch_size = current.batch_size,
                        flush_interval_ms = current.flush_interval.as_millis() as u64,
                        "Deletion flush settings updated"
                    );
                    if self.buffer.len() >= current.batch_size {
                        self.flush(FlushTrigger::Size).await;
                        ticker = new_ticker(current.flush_interval);
                    }
                }
            }
        }

        self.drain().await;
    }

    /// Buffers a task, flushing if the batch size is reached.
    ///
    /// Returns the flush report when the task triggered a flush.
    pub async fn push(&mut self, task: DeletionTask) -> Option<FlushReport> {
        self.buffer.push(task);
        self.state = AccumulatorState::Accumulating;

        let batch_size = self.settings.borrow().batch_size;
        if self.buffer.len() >= batch_size {
            Some(self.flush(FlushTrigger::Size).await)
        } else {
            None
        }
    }

    /// Flushes any remaining tasks and enters the terminal state.
    pub async fn drain(&mut self) -> Option<FlushReport> {
        let report = if self.buffer.is_empty() {
            None
        } else {
            Some(self.flush(FlushTrigger::Shutdown).await)
        };
        self.state = AccumulatorState::Drained;
        info!(
            final_flush = report.is_some(),
            "Deletion accumulator drained"
        );
        report
    }

    /// Applies the buffered tasks to storage, one call per user.
    ///
    /// A failed or timed out call is logged and does not stop the remaining
    /// users. The buffer is emptied regardless of the outcome.
    pub async fn flush(&mut self, trigger: FlushTrigger) -> FlushReport {
        self.state = AccumulatorState::Flushing;

        let batch = std::mem::take(&mut self.buffer);
        let tasks = batch.len();
        let groups = UserGroupedIds::from_tasks(batch);
        let mut failed_users = 0;

        for (user_id, short_ids) in groups.iter() {
            let call = self.repository.mark_urls_deleted(user_id, short_ids);
            match tokio::time::timeout(self.flush_timeout, call).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failed_users += 1;
                    error!(
                        user_id,
                        ids = ?short_ids,
                        error = %e,
                        "Failed to mark URLs deleted"
                    );
                }
                Err(_) => {
                    failed_users += 1;
                    error!(
                        user_id,
                        ids = ?short_ids,
                        timeout_ms = self.flush_timeout.as_millis() as u64,
                        "Timed out marking URLs deleted"
                    );
                }
            }
        }

        metrics::counter!("deletion_flushes_total", "trigger" => trigger.as_str()).increment(1);
        metrics::counter!("deletion_tasks_flushed_total").increment(tasks as u64);
        if failed_users > 0 {
            metrics::counter!("deletion_failed_groups_total").increment(failed_users as u64);
        }

        debug!(
            trigger = trigger.as_str(),
            tasks,
            users = groups.len(),
            failed_users,
            "Flushed deletion batch"
        );

        self.state = AccumulatorState::Idle;
        FlushReport {
            trigger,
            tasks,
            users: groups.len(),
            failed_users,
        }
    }
}

/// Stand-in deadline for periods too long to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Interval whose first tick is one full period away.
///
/// Periods that overflow [`Instant`] never tick; size and shutdown flushes
/// still apply.
fn new_ticker(period: Duration) -> Interval {
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now + FAR_FUTURE);
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
