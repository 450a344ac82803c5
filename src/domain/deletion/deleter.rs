//! Public handle of the deletion pipeline.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::accumulator::BatchAccumulator;
use super::fan_out::Distributor;
use super::{DeleterConfig, DeleterError, DeletionTask, FlushSettings, fan_in};
use crate::domain::repositories::UrlRepository;

/// Entry point for asynchronous soft-deletion.
///
/// [`spawn`](Self::spawn) starts the pipeline stages on the current tokio
/// runtime. Handlers call [`enqueue`](Self::enqueue); the server calls
/// [`close`](Self::close) on shutdown so accepted tasks get a final flush.
///
/// # Example
///
/// ```ignore
/// let deleter = BatchDeleter::spawn(repository, DeleterConfig::default())?;
/// deleter.enqueue("user-1", vec!["Ab3dE9xZ".to_string()]).await?;
/// deleter.close().await;
/// ```
pub struct BatchDeleter {
    intake: Mutex<Option<mpsc::Sender<DeletionTask>>>,
    settings: watch::Sender<FlushSettings>,
    shutdown: CancellationToken,
    stages: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    workers: usize,
}

impl BatchDeleter {
    /// Builds the pipeline and spawns its stages.
    ///
    /// # Errors
    ///
    /// Returns [`DeleterError::InvalidSetting`] if `config` fails validation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        repository: Arc<dyn UrlRepository>,
        config: DeleterConfig,
    ) -> Result<Self, DeleterError> {
        config.validate()?;

        let shutdown = CancellationToken::new();
        let (intake_tx, intake_rx) = mpsc::channel(config.queue_capacity);
        let (settings_tx, settings_rx) = watch::channel(FlushSettings {
            batch_size: config.batch_size,
            flush_interval: config.flush_interval,
        });

        let (lane_txs, lane_rxs): (Vec<_>, Vec<_>) = (0..config.workers)
            .map(|_| mpsc::channel(config.lane_capacity))
            .unzip();

        let mut stages = Vec::with_capacity(config.workers + 2);
        stages.push(tokio::spawn(
            Distributor::new(lane_txs).run(intake_rx, shutdown.clone()),
        ));

        let (merged_rx, forwarders) = fan_in::merge(lane_rxs, config.lane_capacity);
        stages.extend(forwarders);

        let accumulator = BatchAccumulator::new(repository, settings_rx, config.flush_timeout);
        stages.push(tokio::spawn(accumulator.run(merged_rx)));

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Batch deleter started"
        );

        Ok(Self {
            intake: Mutex::new(Some(intake_tx)),
            settings: settings_tx,
            shutdown,
            stages: tokio::sync::Mutex::new(stages),
            workers: config.workers,
        })
    }

    /// Queues a deletion of `short_ids` on behalf of `user_id`.
    ///
    /// Waits while the intake queue is full. Returns as soon as the task is
    /// queued; the deletion itself happens on a later flush.
    ///
    /// # Errors
    ///
    /// - [`DeleterError::InvalidTask`] if `user_id` or `short_ids` is empty
    /// - [`DeleterError::Closed`] if the deleter is closed, including while
    ///   this call was waiting for queue space
    pub async fn enqueue(
        &self,
        user_id: impl Into<String>,
        short_ids: Vec<String>,
    ) -> Result<(), DeleterError> {
        let task = DeletionTask::new(user_id.into(), short_ids)?;

        let intake = self
            .intake
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DeleterError::Closed)?;

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(DeleterError::Closed),
            sent = intake.send(task) => sent.map_err(|_| DeleterError::Closed),
        }
    }

    /// Changes the number of tasks that triggers a flush.
    ///
    /// # Errors
    ///
    /// Returns [`DeleterError::InvalidSetting`] if `size` is zero.
    pub fn set_batch_size(&self, size: usize) -> Result<(), DeleterError> {
        if size == 0 {
            return Err(DeleterError::InvalidSetting("batch size must be positive"));
        }
        self.settings.send_modify(|s| s.batch_size = size);
        Ok(())
    }

    /// Changes the time between interval flushes. Restarts the interval timer.
    ///
    /// # Errors
    ///
    /// Returns [`DeleterError::InvalidSetting`] if `interval` is zero.
    pub fn set_flush_interval(&self, interval: Duration) -> Result<(), DeleterError> {
        if interval.is_zero() {
            return Err(DeleterError::InvalidSetting("flush interval must be positive"));
        }
        self.settings.send_modify(|s| s.flush_interval = interval);
        Ok(())
    }

    pub fn batch_size(&self) -> usize {
        self.settings.borrow().batch_size
    }

    pub fn flush_interval(&self) -> Duration {
        self.settings.borrow().flush_interval
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stops intake and waits for the pipeline to drain.
    ///
    /// Tasks already accepted travel through the lanes and are applied by a
    /// final flush before this returns. Safe to call more than once; later
    /// calls wait for the first one to finish.
    pub async fn close(&self) {
        self.shutdown.cancel();
        self.intake
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let mut stages = self.stages.lock().await;
        if stages.is_empty() {
            return;
        }

        info!("Closing batch deleter");
        for stage in stages.drain(..) {
            if let Err(e) = stage.await {
                error!(error = %e, "Deletion pipeline stage failed");
            }
        }
        info!("Batch deleter drained");
    }
}

impl Drop for BatchDeleter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;

    fn quiet_repo() -> Arc<dyn UrlRepository> {
        let mut repo = MockUrlRepository::new();
        repo.expect_mark_urls_deleted().returning(|_, _| Ok(()));
        Arc::new(repo)
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_config() {
        let config = DeleterConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            BatchDeleter::spawn(quiet_repo(), config),
            Err(DeleterError::InvalidSetting(_))
        ));
    }

    #[tokio::test]
    async fn test_setters_validate_and_apply() {
        let deleter = BatchDeleter::spawn(quiet_repo(), DeleterConfig::default()).unwrap();

        assert_eq!(deleter.batch_size(), 100);
        assert!(deleter.set_batch_size(0).is_err());
        deleter.set_batch_size(7).unwrap();
        assert_eq!(deleter.batch_size(), 7);

        assert!(deleter.set_flush_interval(Duration::ZERO).is_err());
        deleter
            .set_flush_interval(Duration::from_millis(250))
            .unwrap();
        assert_eq!(deleter.flush_interval(), Duration::from_millis(250));

        deleter.close().await;
    }

    #[tokio::test]
    async fn test_enqueue_rejects_empty_input() {
        let deleter = BatchDeleter::spawn(quiet_repo(), DeleterConfig::default()).unwrap();

        assert!(matches!(
            deleter.enqueue("", vec!["a".to_string()]).await,
            Err(DeleterError::InvalidTask(_))
        ));
        assert!(matches!(
            deleter.enqueue("u1", vec![]).await,
            Err(DeleterError::InvalidTask(_))
        ));

        deleter.close().await;
    }

    #[tokio::test]
    async fn test_enqueue_after_close_fails() {
        let deleter = BatchDeleter::spawn(quiet_repo(), DeleterConfig::default()).unwrap();
        deleter.close().await;

        assert!(deleter.is_closed());
        assert_eq!(
            deleter.enqueue("u1", vec!["a".to_string()]).await,
            Err(DeleterError::Closed)
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let deleter = BatchDeleter::spawn(quiet_repo(), DeleterConfig::default()).unwrap();
        deleter.close().await;
        deleter.close().await;
        assert!(deleter.is_closed());
    }
}
