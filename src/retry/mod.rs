//! Partial-retry orchestration for bulk writes.
//!
//! This module encapsulates failure classification (rejections, throttling,
//! timeouts vs. terminal causes) and the attempt/wait/retry loop that
//! resubmits only the failed-and-retryable items of a batch, so that callers
//! and the processor share a consistent policy.

mod classify;
mod error;
mod merger;
mod run;

pub use classify::{classify_status, transient};
pub use error::{ErrorKind, ExecutorError, ItemError};
pub use run::Retry;
