//! Merging of worker lanes into the accumulator's single input.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::DeletionTask;

/// Spawns one forwarder per lane, all feeding a shared output channel.
///
/// Each forwarder ends when its lane closes. The returned receiver yields
/// `None` only after every forwarder has ended, because each one holds a
/// clone of the output sender. Tasks from different lanes interleave in
/// arrival order.
pub fn merge(
    lanes: Vec<mpsc::Receiver<DeletionTask>>,
    capacity: usize,
) -> (mpsc::Receiver<DeletionTask>, Vec<JoinHandle<()>>) {
    let (output, merged) = mpsc::channel(capacity);

    let forwarders = lanes
        .into_iter()
        .map(|lane| tokio::spawn(forward(lane, output.clone())))
        .collect();

    (merged, forwarders)
}

async fn forward(mut lane: mpsc::Receiver<DeletionTask>, output: mpsc::Sender<DeletionTask>) {
    while let Some(task) = lane.recv().await {
        if output.send(task).await.is_err() {
            // Accumulator is gone; nothing downstream can use the task.
            tracing::warn!("Deletion aggregator output closed, stopping lane forwarder");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(user: &str, id: &str) -> DeletionTask {
        DeletionTask::new(user.to_string(), vec![id.to_string()]).unwrap()
    }

    #[tokio::test]
    async fn test_merge_delivers_every_task() {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..3).map(|_| mpsc::channel(8)).unzip();
        let (mut merged, forwarders) = merge(receivers, 4);
        assert_eq!(forwarders.len(), 3);

        for (lane, tx) in senders.iter().enumerate() {
            for n in 0..3 {
                tx.send(task("u1", &format!("l{lane}-{n}"))).await.unwrap();
            }
        }
        drop(senders);

        let mut received = Vec::new();
        while let Some(task) = merged.recv().await {
            received.push(task.short_ids()[0].clone());
        }

        assert_eq!(received.len(), 9);
        for lane in 0..3 {
            let from_lane: Vec<_> = received
                .iter()
                .filter(|id| id.starts_with(&format!("l{lane}-")))
                .cloned()
                .collect();
            // Per-lane FIFO survives the merge.
            assert_eq!(
                from_lane,
                [format!("l{lane}-0"), format!("l{lane}-1"), format!("l{lane}-2")]
            );
        }

        for handle in forwarders {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_output_stays_open_until_last_lane_closes() {
        let (tx_a, rx_a) = mpsc::channel(8);
        let (tx_b, rx_b) = mpsc::channel(8);
        let (mut merged, _forwarders) = merge(vec![rx_a, rx_b], 4);

        drop(tx_a);
        tx_b.send(task("u1", "late")).await.unwrap();

        let received = merged.recv().await.unwrap();
        assert_eq!(received.short_ids(), ["late"]);

        drop(tx_b);
        assert!(merged.recv().await.is_none());
    }
}
