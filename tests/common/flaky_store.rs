//! Deterministic store doubles for integration tests.
//!
//! `FlakyStore` fails its first `calls_to_fail` invocations: on a failing
//! call at least one item is guaranteed to fail retryably and the rest fail
//! or succeed per a seeded generator, so every scenario is reproducible.
//! After the failing calls are spent, every call fully succeeds.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rebulk::batch::{BatchRequest, BatchResponse, ItemOutcome, ItemResult, WriteAck};
use rebulk::executor::{AsyncBulkExecutor, BulkExecutor};
use rebulk::retry::{ErrorKind, ExecutorError, ItemError};

/// Small seeded generator so failure patterns never depend on ambient
/// randomness.
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn coin(&mut self) -> bool {
        self.next_u32() % 2 == 0
    }
}

struct FlakyState {
    calls_to_fail: u32,
    rng: Lcg,
}

pub struct FlakyStore {
    state: Mutex<FlakyState>,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn new(calls_to_fail: u32, seed: u64) -> Self {
        Self {
            state: Mutex::new(FlakyState {
                calls_to_fail,
                rng: Lcg(seed),
            }),
            calls: AtomicU32::new(0),
        }
    }

    /// Total invocations so far, across both calling modes.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let should_fail = state.calls_to_fail > 0;
        if should_fail {
            state.calls_to_fail -= 1;
        }

        // On a failing call, one slot fails reliably; the rest are seeded.
        let pinned_slot = state.rng.next_u32() as usize % request.len();
        let items = request
            .ops()
            .iter()
            .enumerate()
            .map(|(slot, op)| {
                if should_fail && (slot == pinned_slot || state.rng.coin()) {
                    ItemResult::new(
                        slot,
                        ItemOutcome::Failed(ItemError::new(
                            ErrorKind::Rejected,
                            "write queue full",
                        )),
                    )
                } else {
                    ItemResult::new(slot, ItemOutcome::Ok(WriteAck::new(op.key())))
                }
            })
            .collect();
        Ok(BatchResponse::new(items, Duration::from_millis(3)))
    }
}

impl BulkExecutor for FlakyStore {
    fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        self.respond(request)
    }
}

#[async_trait]
impl AsyncBulkExecutor for FlakyStore {
    async fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        self.respond(request)
    }
}

/// Fails every item retryably on its first call, then loses the transport
/// entirely on the second. Exercises the executor-level failure path.
pub struct TransportDropStore {
    calls: AtomicU32,
}

impl TransportDropStore {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call > 0 {
            return Err(ExecutorError::Transport("connection reset by peer".into()));
        }
        let items = request
            .ops()
            .iter()
            .enumerate()
            .map(|(slot, _)| {
                ItemResult::new(
                    slot,
                    ItemOutcome::Failed(ItemError::new(ErrorKind::Rejected, "write queue full")),
                )
            })
            .collect();
        Ok(BatchResponse::new(items, Duration::from_millis(3)))
    }
}

impl BulkExecutor for TransportDropStore {
    fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        self.respond(request)
    }
}

#[async_trait]
impl AsyncBulkExecutor for TransportDropStore {
    async fn execute(&self, request: &BatchRequest) -> Result<BatchResponse, ExecutorError> {
        self.respond(request)
    }
}
