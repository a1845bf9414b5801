//! Failure types for retry classification.
//!
//! Two tiers: `ItemError` is a per-item failure carried as data inside a
//! response; `ExecutorError` means the store produced no per-item outcome
//! at all and the run cannot continue.

use std::fmt;

/// High-level classification of a per-item write failure.
///
/// This intentionally stays generic; executor implementations map their
/// transport's status codes or exceptions into these kinds (see
/// `classify_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The node's write queue was full and the item was turned away.
    Rejected,
    /// Server asked us to slow down.
    Throttled,
    /// The store did not acknowledge the item in time.
    Timeout,
    /// Version conflict; retrying the same write cannot change the outcome.
    Conflict,
    /// Malformed operation (bad key, oversized document). Never retried.
    Invalid,
    /// Server-side failure while applying the item.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Rejected => "rejected",
            ErrorKind::Throttled => "throttled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Failure cause attached to a single item in a batch response.
/// Carried so the retry decider can classify before the caller sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ItemError {}

/// The executor could not produce a response for the submitted batch.
///
/// Fatal to the current orchestration run: with no per-item outcome the
/// orchestrator cannot tell which items were applied, so nothing is
/// resubmitted and the error is propagated as-is.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The transport failed before any per-item outcome was known.
    #[error("transport: {0}")]
    Transport(String),
    /// The executor answered with the wrong number of items for the request.
    #[error("bulk response covered {got} items for a {want}-item request")]
    ItemCountMismatch { want: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_error_displays_kind_and_message() {
        let e = ItemError::new(ErrorKind::Rejected, "write queue full");
        assert_eq!(e.to_string(), "rejected: write queue full");
    }

    #[test]
    fn executor_error_messages() {
        let e = ExecutorError::Transport("connection reset".into());
        assert_eq!(e.to_string(), "transport: connection reset");
        let e = ExecutorError::ItemCountMismatch { want: 5, got: 3 };
        assert_eq!(
            e.to_string(),
            "bulk response covered 3 items for a 5-item request"
        );
    }
}
