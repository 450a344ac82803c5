//! Round-robin distribution of intake tasks over worker lanes.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::DeletionTask;

/// Spreads tasks over a fixed set of lanes in intake order.
///
/// Lane `k` receives tasks `k`, `k + N`, `k + 2N`, ... where `N` is the lane
/// count. Lane choice ignores task content, so two tasks of the same user
/// can travel through different lanes.
pub struct Distributor {
    lanes: Vec<mpsc::Sender<DeletionTask>>,
    next: usize,
}

impl Distributor {
    pub fn new(lanes: Vec<mpsc::Sender<DeletionTask>>) -> Self {
        Self { lanes, next: 0 }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Drains `intake` into the lanes until shutdown or end of input.
    ///
    /// On shutdown the intake is closed to new sends, but tasks already
    /// accepted are still distributed. Lanes are closed when this returns.
    pub async fn run(
        mut self,
        mut intake: mpsc::Receiver<DeletionTask>,
        shutdown: CancellationToken,
    ) {
        loop {
            let task = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                task = intake.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            };
            self.dispatch(task).await;
        }

        intake.close();
        let mut drained = 0usize;
        while let Some(task) = intake.recv().await {
            self.dispatch(task).await;
            drained += 1;
        }

        debug!(drained, lanes = self.lane_count(), "Distributor stopped, closing lanes");
    }

    /// Sends a task to the next lane, waiting while that lane is full.
    async fn dispatch(&mut self, task: DeletionTask) {
        let lane = self.next;
        self.next = (self.next + 1) % self.lanes.len();

        if let Err(mpsc::error::SendError(task)) = self.lanes[lane].send(task).await {
            error!(
                lane,
                user_id = task.user_id(),
                ids = ?task.short_ids(),
                "Worker lane closed, dropping deletion task"
            );
        }
    }
}
