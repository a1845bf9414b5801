//! Attempt/wait/retry loop: resubmit only the failed-and-retryable items.
//!
//! Each run folds every attempt's response into a slot-addressed merger and
//! carries forward the original slots of the items still failing, so the
//! final response always covers the caller's batch exactly once per item.
//! Items that already succeeded are never resubmitted; items whose failure
//! the decider rejects are frozen on the spot.

use std::sync::Arc;

use crate::backoff::BackoffPolicy;
use crate::batch::{BatchRequest, BatchResponse, ItemOutcome};
use crate::executor::{AsyncBulkExecutor, BulkExecutor};

use super::classify;
use super::error::{ErrorKind, ExecutorError, ItemError};
use super::merger::ResponseMerger;

/// Retry orchestrator: a decider for which item failures to resubmit plus a
/// backoff policy for how long to wait between attempts.
///
/// Cheap to clone and reusable across runs; all per-run state (delay cursor,
/// accumulator, pending sub-batch) is created per call.
#[derive(Clone)]
pub struct Retry {
    policy: BackoffPolicy,
    decider: Arc<dyn Fn(&ItemError) -> bool + Send + Sync>,
}

impl Retry {
    /// Retry items whose failure cause matches `kind`; freeze everything else.
    pub fn on(kind: ErrorKind) -> Self {
        Self::retryable_when(move |err: &ItemError| err.kind == kind)
    }

    /// Retry anything the default classification deems transient.
    pub fn on_transient() -> Self {
        Self::retryable_when(classify::transient)
    }

    /// Retry items the predicate accepts. The default policy is
    /// `BackoffPolicy::no_backoff()`, i.e. no retries until `with_policy`
    /// installs a schedule.
    pub fn retryable_when(decider: impl Fn(&ItemError) -> bool + Send + Sync + 'static) -> Self {
        Self {
            policy: BackoffPolicy::no_backoff(),
            decider: Arc::new(decider),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the batch to completion on the calling thread, blocking during
    /// each backoff wait. Returns the merged full-length response; item
    /// failures that survive the schedule are data in that response, not an
    /// `Err`.
    pub fn run_sync<E: BulkExecutor>(
        &self,
        executor: &E,
        request: &BatchRequest,
    ) -> Result<BatchResponse, ExecutorError> {
        let mut state = RunState::new(self, request);
        loop {
            let response = executor.execute(state.pending())?;
            match state.fold(response)? {
                Step::Done => return Ok(state.finalize()),
                Step::Wait(delay) => std::thread::sleep(delay),
            }
        }
    }

    /// Async rendition of `run_sync`: backoff waits are awaited on the
    /// runtime's timer instead of blocking a thread. Attempts still form one
    /// strictly sequential chain.
    pub async fn run<E: AsyncBulkExecutor>(
        &self,
        executor: &E,
        request: &BatchRequest,
    ) -> Result<BatchResponse, ExecutorError> {
        let mut state = RunState::new(self, request);
        loop {
            let response = executor.execute(state.pending()).await?;
            match state.fold(response)? {
                Step::Done => return Ok(state.finalize()),
                Step::Wait(delay) => tokio::time::sleep(delay).await,
            }
        }
    }

    /// Spawns the run onto the async runtime and returns immediately.
    /// `on_complete` fires exactly once with the final result, on the
    /// runtime thread that finishes the last attempt. A response that still
    /// reports item failures is delivered as `Ok`; only executor-level
    /// failures take the `Err` path.
    pub fn run_detached<E, F>(&self, executor: Arc<E>, request: BatchRequest, on_complete: F)
    where
        E: AsyncBulkExecutor + 'static,
        F: FnOnce(Result<BatchResponse, ExecutorError>) + Send + 'static,
    {
        let retry = self.clone();
        tokio::spawn(async move {
            let result = retry.run(executor.as_ref(), &request).await;
            on_complete(result);
        });
    }
}

/// What the loop does after folding one attempt.
enum Step {
    Done,
    Wait(std::time::Duration),
}

/// Per-run state shared by the sync and async loops.
struct RunState<'a> {
    retry: &'a Retry,
    original: &'a BatchRequest,
    cursor: crate::backoff::DelayCursor,
    merger: ResponseMerger,
    /// Original slot of each item in the pending sub-batch.
    origin: Vec<usize>,
    /// `None` on attempt 1 (the original request is submitted as-is).
    sub_batch: Option<BatchRequest>,
    attempt: u32,
}

impl<'a> RunState<'a> {
    fn new(retry: &'a Retry, original: &'a BatchRequest) -> Self {
        Self {
            retry,
            original,
            cursor: retry.policy.delays(),
            merger: ResponseMerger::new(original.len()),
            origin: (0..original.len()).collect(),
            sub_batch: None,
            attempt: 1,
        }
    }

    fn pending(&self) -> &BatchRequest {
        self.sub_batch.as_ref().unwrap_or(self.original)
    }

    /// Consumes the run and emits the merged full-length response.
    fn finalize(self) -> BatchResponse {
        self.merger.finalize()
    }

    /// Folds one attempt's response into the merger and decides the next
    /// step: finalize, or wait and resubmit the retryable failures.
    fn fold(&mut self, response: BatchResponse) -> Result<Step, ExecutorError> {
        let pending_len = self.pending().len();
        if response.len() != pending_len {
            return Err(ExecutorError::ItemCountMismatch {
                want: pending_len,
                got: response.len(),
            });
        }

        self.merger.record(&self.origin, &response);

        let mut retry_slots = Vec::new();
        for (position, item) in response.items().iter().enumerate() {
            if let ItemOutcome::Failed(err) = &item.outcome {
                if (self.retry.decider)(err) {
                    retry_slots.push(self.origin[position]);
                }
            }
        }

        if retry_slots.is_empty() {
            return Ok(Step::Done);
        }

        match self.cursor.next() {
            None => {
                tracing::warn!(
                    attempts = self.attempt,
                    still_failing = retry_slots.len(),
                    "backoff exhausted with items still failing"
                );
                Ok(Step::Done)
            }
            Some(delay) => {
                tracing::debug!(
                    attempt = self.attempt,
                    failed = retry_slots.len(),
                    delay_ms = delay.as_millis() as u64,
                    "backing off before resubmitting failed items"
                );
                let ops = retry_slots
                    .iter()
                    .map(|&slot| self.original.ops()[slot].clone())
                    .collect();
                self.sub_batch = Some(BatchRequest::from_ops(ops));
                self.origin = retry_slots;
                self.attempt += 1;
                Ok(Step::Wait(delay))
            }
        }
    }
}
