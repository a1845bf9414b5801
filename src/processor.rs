//! Bulk processor: collects writes and flushes them through the retry loop.
//!
//! Callers hand the processor individual ops; it buffers them in insertion
//! order and flushes the buffer as one batch when an action-count or
//! payload-size threshold is reached, on an explicit `flush`, and on
//! `close`. Every flush goes through the configured `Retry`, so item
//! failures are retried per the backoff schedule before the outcome is
//! reported. Flushes are sequential; a processor has at most one batch in
//! flight.

use std::sync::Arc;

use crate::batch::{BatchRequest, BatchResponse, WriteOp};
use crate::executor::AsyncBulkExecutor;
use crate::retry::{ExecutorError, Retry};

/// Observer invoked after every flush with the request and its outcome.
pub type FlushListener =
    Box<dyn Fn(&BatchRequest, &Result<BatchResponse, ExecutorError>) + Send + Sync>;

pub struct BulkProcessor<E> {
    executor: Arc<E>,
    retry: Retry,
    max_actions: usize,
    max_payload_bytes: usize,
    listener: Option<FlushListener>,
    buffer: Vec<WriteOp>,
    buffered_bytes: usize,
}

pub struct BulkProcessorBuilder<E> {
    executor: Arc<E>,
    retry: Retry,
    max_actions: usize,
    max_payload_bytes: usize,
    listener: Option<FlushListener>,
}

impl<E: AsyncBulkExecutor> BulkProcessor<E> {
    /// Defaults: 1000 actions, 5 MiB payload, transient failures retried
    /// with exponential backoff (50 ms, 8 retries).
    pub fn builder(executor: Arc<E>) -> BulkProcessorBuilder<E> {
        let cfg = crate::config::RebulkConfig::default();
        BulkProcessorBuilder {
            executor,
            retry: Retry::on_transient().with_policy(cfg.backoff_policy()),
            max_actions: cfg.max_actions,
            max_payload_bytes: cfg.max_payload_bytes,
            listener: None,
        }
    }

    /// Buffers one op, flushing when the buffer reaches either threshold.
    /// Returns the flushed batch's response when a flush ran.
    pub async fn add(&mut self, op: WriteOp) -> Result<Option<BatchResponse>, ExecutorError> {
        self.buffered_bytes += op.payload_bytes();
        self.buffer.push(op);
        if self.buffer.len() >= self.max_actions || self.buffered_bytes >= self.max_payload_bytes {
            return self.flush().await;
        }
        Ok(None)
    }

    /// Flushes the buffered ops as one batch through the retry loop.
    /// Returns `None` when the buffer was empty.
    pub async fn flush(&mut self) -> Result<Option<BatchResponse>, ExecutorError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let request = BatchRequest::from_ops(std::mem::take(&mut self.buffer));
        self.buffered_bytes = 0;
        tracing::debug!(actions = request.len(), "flushing buffered bulk request");

        let result = self.retry.run(self.executor.as_ref(), &request).await;
        if let Some(listener) = &self.listener {
            listener(&request, &result);
        }
        result.map(Some)
    }

    /// Flushes any remainder and consumes the processor.
    pub async fn close(mut self) -> Result<Option<BatchResponse>, ExecutorError> {
        self.flush().await
    }

    /// Ops currently buffered and not yet flushed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl<E: AsyncBulkExecutor> BulkProcessorBuilder<E> {
    /// Replaces the default retry setup (decider and backoff schedule).
    pub fn retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Flush once this many ops are buffered.
    pub fn max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions.max(1);
        self
    }

    /// Flush once the buffered payload estimate reaches this many bytes.
    pub fn max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes.max(1);
        self
    }

    /// Observes every flushed request and its outcome.
    pub fn listener(
        mut self,
        listener: impl Fn(&BatchRequest, &Result<BatchResponse, ExecutorError>) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn build(self) -> BulkProcessor<E> {
        BulkProcessor {
            executor: self.executor,
            retry: self.retry,
            max_actions: self.max_actions,
            max_payload_bytes: self.max_payload_bytes,
            listener: self.listener,
            buffer: Vec::new(),
            buffered_bytes: 0,
        }
    }
}
