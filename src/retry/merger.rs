//! Order-preserving accumulation of item outcomes across attempts.

use std::time::Duration;

use crate::batch::{BatchResponse, ItemResult};

/// Slot-addressed accumulator sized to the original batch.
///
/// Each attempt's response covers only that attempt's sub-batch;
/// `record` maps attempt positions back to original slots and overwrites
/// exactly those, leaving earlier outcomes in all other slots intact.
pub(crate) struct ResponseMerger {
    slots: Vec<Option<ItemResult>>,
    took: Duration,
}

impl ResponseMerger {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| None).collect(),
            took: Duration::ZERO,
        }
    }

    /// Folds one attempt in. `origin[i]` is the original slot of the i-th
    /// item in the attempt's request; `response` must cover that request.
    pub fn record(&mut self, origin: &[usize], response: &BatchResponse) {
        for (position, item) in response.items().iter().enumerate() {
            let slot = origin[position];
            self.slots[slot] = Some(ItemResult::new(slot, item.outcome.clone()));
        }
        self.took += response.took();
    }

    /// Emits the full-length response, slots 0..N-1 in order.
    pub fn finalize(self) -> BatchResponse {
        let items = self
            .slots
            .into_iter()
            .map(|entry| entry.expect("every slot settled by a recorded attempt"))
            .collect();
        BatchResponse::new(items, self.took)
    }
}
