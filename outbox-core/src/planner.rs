//! Batch planning for a sync pass.
//!
//! A pass takes the dispatchable queue prefix and partitions it into chunks
//! sized by the current quality tier. Chunks are processed strictly in
//! order, and actions within a chunk strictly in order - no intra-chunk
//! parallelism. This bounds worst-case load on the remote service and keeps
//! the ordering guarantee trivial to verify.

use outbox_types::{ConnectionQuality, PendingAction};

/// The chunked dispatch plan for one sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Quality-sized chunks, in dispatch order.
    pub chunks: Vec<Vec<PendingAction>>,
    /// Total number of actions across all chunks.
    pub total: usize,
}

impl BatchPlan {
    /// Partition `actions` (already in queue order, flagged actions already
    /// excluded) into chunks of the tier's batch size.
    pub fn build(actions: &[PendingAction], quality: ConnectionQuality) -> Self {
        let size = quality.batch_size();
        let chunks: Vec<Vec<PendingAction>> =
            actions.chunks(size).map(|c| c.to_vec()).collect();
        Self {
            total: actions.len(),
            chunks,
        }
    }

    /// Whether there is nothing to dispatch.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbox_types::{ActionType, Priority};

    fn make_actions(n: usize) -> Vec<PendingAction> {
        (0..n)
            .map(|i| {
                PendingAction::new(ActionType::CreateReminder, vec![], Priority::Normal, i as u64)
            })
            .collect()
    }

    #[test]
    fn empty_queue_empty_plan() {
        let plan = BatchPlan::build(&[], ConnectionQuality::Excellent);
        assert!(plan.is_empty());
        assert!(plan.chunks.is_empty());
    }

    #[test]
    fn chunk_sizes_bounded_by_tier() {
        let actions = make_actions(12);
        let plan = BatchPlan::build(&actions, ConnectionQuality::Good);

        assert_eq!(plan.total, 12);
        assert_eq!(plan.chunks.len(), 3); // 5 + 5 + 2
        assert!(plan.chunks.iter().all(|c| c.len() <= 5));
        assert_eq!(plan.chunks[2].len(), 2);
    }

    #[test]
    fn poor_quality_dispatches_one_at_a_time() {
        let actions = make_actions(3);
        let plan = BatchPlan::build(&actions, ConnectionQuality::Poor);

        assert_eq!(plan.chunks.len(), 3);
        assert!(plan.chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn plan_preserves_queue_order() {
        let actions = make_actions(7);
        let plan = BatchPlan::build(&actions, ConnectionQuality::Fair);

        let flattened: Vec<_> = plan.chunks.iter().flatten().map(|a| a.id).collect();
        let expected: Vec<_> = actions.iter().map(|a| a.id).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn excellent_tier_fits_ten_per_chunk() {
        let actions = make_actions(10);
        let plan = BatchPlan::build(&actions, ConnectionQuality::Excellent);
        assert_eq!(plan.chunks.len(), 1);
    }
}
