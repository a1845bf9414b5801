//! Per-item outcomes for a submitted batch.
//!
//! A `BatchResponse` always covers exactly the request it answers: one
//! `ItemResult` per submitted op, in submission order. Item failures are
//! data in the response, not errors; see `retry::ExecutorError` for the
//! case where no per-item outcome exists at all.

use std::time::Duration;

use crate::retry::ItemError;

/// Acknowledgement for a successfully applied write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteAck {
    /// Key of the document the store acknowledged.
    pub key: String,
}

impl WriteAck {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Outcome of one item within a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Ok(WriteAck),
    Failed(ItemError),
}

impl ItemOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }

    /// The failure cause, if this item failed.
    pub fn error(&self) -> Option<&ItemError> {
        match self {
            ItemOutcome::Failed(e) => Some(e),
            ItemOutcome::Ok(_) => None,
        }
    }
}

/// An item outcome pinned to its slot (position) in the answered request.
///
/// For a response produced by an executor the slot is the position within
/// the request that executor saw; in the final merged response slots are
/// positions in the caller's original batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub slot: usize,
    pub outcome: ItemOutcome,
}

impl ItemResult {
    pub fn new(slot: usize, outcome: ItemOutcome) -> Self {
        Self { slot, outcome }
    }
}

/// Ordered per-item outcomes for one batch, plus how long the store took.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    items: Vec<ItemResult>,
    took: Duration,
}

impl BatchResponse {
    pub fn new(items: Vec<ItemResult>, took: Duration) -> Self {
        Self { items, took }
    }

    pub fn items(&self) -> &[ItemResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Store-reported time for this batch. On a merged response this is the
    /// sum across all attempts.
    pub fn took(&self) -> Duration {
        self.took
    }

    /// True when any item in this response failed.
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| item.outcome.is_failed())
    }

    /// The failed items, in slot order.
    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.items.iter().filter(|item| item.outcome.is_failed())
    }
}
