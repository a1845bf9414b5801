//! Batch request model: ordered write operations submitted to the store together.
//!
//! A `BatchRequest` keeps its ops in submission order; the retry layer
//! identifies items by their position (slot) in that order, so the length
//! of a request is fixed for the lifetime of one orchestration run.

mod response;

pub use response::{BatchResponse, ItemOutcome, ItemResult, WriteAck};

/// One write operation against the store, addressed by document key.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace the document at `key`.
    Put { key: String, doc: serde_json::Value },
    /// Remove the document at `key`.
    Delete { key: String },
}

impl WriteOp {
    pub fn put(key: impl Into<String>, doc: serde_json::Value) -> Self {
        WriteOp::Put {
            key: key.into(),
            doc,
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        WriteOp::Delete { key: key.into() }
    }

    /// Document key this op addresses.
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } => key,
            WriteOp::Delete { key } => key,
        }
    }

    /// Approximate wire size in bytes, used for flush-threshold decisions.
    /// Estimated from the key and the serialized document length.
    pub fn payload_bytes(&self) -> usize {
        match self {
            WriteOp::Put { key, doc } => key.len() + doc.to_string().len(),
            WriteOp::Delete { key } => key.len(),
        }
    }
}

/// An ordered sequence of write operations submitted as one bulk call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRequest {
    ops: Vec<WriteOp>,
}

impl BatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<WriteOp>) -> Self {
        Self { ops }
    }

    /// Appends an op; its slot is the position it lands in.
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total approximate payload size of all ops.
    pub fn payload_bytes(&self) -> usize {
        self.ops.iter().map(WriteOp::payload_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ops_keep_submission_order() {
        let mut request = BatchRequest::new();
        request.push(WriteOp::put("a", json!({"v": 1})));
        request.push(WriteOp::delete("b"));
        request.push(WriteOp::put("c", json!({"v": 3})));
        assert_eq!(request.len(), 3);
        let keys: Vec<&str> = request.ops().iter().map(WriteOp::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn payload_bytes_counts_key_and_doc() {
        let op = WriteOp::put("k", json!({"a": 1}));
        // 1 byte key + serialized `{"a":1}`
        assert_eq!(op.payload_bytes(), 1 + 7);
        assert_eq!(WriteOp::delete("key").payload_bytes(), 3);
    }
}
