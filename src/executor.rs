//! Bulk executor interface: the store transport this crate drives but does
//! not implement.
//!
//! An executor answers one bulk request with one outcome per submitted op,
//! in submission order (response slots are positions within the request it
//! answers). When no per-item outcome is known it returns `ExecutorError`
//! instead; the retry loop treats that as fatal for the run.

use async_trait::async_trait;

use crate::batch::{BatchRequest, BatchResponse};
use crate::retry::ExecutorError;

/// Blocking transport for one bulk request.
pub trait BulkExecutor {
    /// Executes the batch, blocking until every item settles or the batch
    /// as a whole is rejected. `response.len()` must equal `request.len()`.
    fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError>;
}

/// Non-blocking transport for one bulk request.
///
/// The returned future resolves exactly once, with either a full-coverage
/// response or an executor-level error.
#[async_trait]
pub trait AsyncBulkExecutor: Send + Sync {
    async fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError>;
}
