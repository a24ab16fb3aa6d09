//! Per-stage admission control and the task-group stage runner

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::ProbeError;

/// Counting gate that caps in-flight work for one stage
///
/// The slot is held by the returned permit and released when it is dropped,
/// which also happens while a panicking task unwinds.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    stage: &'static str,
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    pub fn new(stage: &'static str, capacity: usize) -> Self {
        Self {
            stage,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Wait until fewer than `capacity` units are active, then admit one.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        Arc::clone(&self.semaphore).acquire_owned().await
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// What a stage produced: the successes in submission order, plus a tally
/// of failures by [`ProbeError::kind`]
#[derive(Debug, Clone)]
pub struct StageReport<T> {
    pub stage: &'static str,
    pub submitted: usize,
    pub succeeded: Vec<T>,
    pub failures: BTreeMap<&'static str, usize>,
}

impl<T> StageReport<T> {
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// Same tallies, different payload
    pub fn map<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> StageReport<U> {
        StageReport {
            stage: self.stage,
            submitted: self.submitted,
            succeeded: f(self.succeeded),
            failures: self.failures,
        }
    }
}

/// Spawn one task per item, gated by `limiter`, and wait for all of them.
///
/// Every item is launched eagerly. A failing or panicking task never
/// cancels its siblings; it only shows up in [`StageReport::failures`].
pub async fn run_stage<I, T, F, Fut>(limiter: &ConcurrencyLimiter, items: I, op: F) -> StageReport<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, ProbeError>> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let limiter = limiter.clone();
            let work = op(item);
            tokio::spawn(async move {
                let Ok(_permit) = limiter.acquire().await else {
                    return Err(ProbeError::LimiterClosed);
                };
                work.await
            })
        })
        .collect();

    let submitted = handles.len();
    let mut succeeded = Vec::with_capacity(submitted);
    let mut failures = BTreeMap::new();

    for joined in futures::future::join_all(handles).await {
        match joined.unwrap_or(Err(ProbeError::Panicked)) {
            Ok(value) => succeeded.push(value),
            Err(e) => {
                debug!(stage = limiter.stage(), error = %e, "Work item dropped");
                *failures.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }

    StageReport {
        stage: limiter.stage(),
        submitted,
        succeeded,
        failures,
    }
}
