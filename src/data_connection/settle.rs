/*!
 * Joining independent fallible operations.
 *
 * A batch request fans out into several store operations that succeed or
 * fail on their own. `SettleLatch` is the bookkeeping for one such fan-out:
 * one flag per operation, an accumulator for successful results, and a
 * single transition to the fired state once every operation has settled.
 * `settle_all` drives a set of futures concurrently and feeds their
 * outcomes into a latch.
 */

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::fmt::Display;

/// Lifecycle of a latch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    /// Some operations have not settled yet
    Pending,
    /// Every operation settled and the results were handed out
    Fired,
}

/// Count-down latch over a fixed number of independent operations
#[derive(Debug)]
pub struct SettleLatch<T> {
    /// One flag per operation, set when that operation settles
    settled: Vec<bool>,
    /// Number of operations that have not settled yet
    outstanding: usize,
    /// Successful results in settlement order
    results: Vec<T>,
    /// Number of operations that settled with a failure
    failures: usize,
    state: LatchState,
}

impl<T> SettleLatch<T> {
    /// Create a latch expecting `slots` operations
    pub fn new(slots: usize) -> Self {
        Self {
            settled: vec![false; slots],
            outstanding: slots,
            results: Vec::new(),
            failures: 0,
            state: LatchState::Pending,
        }
    }

    /// Current state
    pub fn state(&self) -> LatchState {
        self.state
    }

    /// Number of operations that settled with a failure so far
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Record a successful operation and its results
    ///
    /// Returns the accumulated results if this was the last outstanding
    /// operation. Records for an unknown or already settled slot, or after
    /// the latch fired, are ignored.
    pub fn record_success<I>(&mut self, slot: usize, items: I) -> Option<Vec<T>>
    where
        I: IntoIterator<Item = T>,
    {
        if !self.mark_settled(slot) {
            return None;
        }
        self.results.extend(items);
        self.try_fire()
    }

    /// Record a failed operation; it contributes nothing to the results
    pub fn record_failure(&mut self, slot: usize, error: &dyn Display) -> Option<Vec<T>> {
        if !self.mark_settled(slot) {
            return None;
        }
        self.failures += 1;
        debug!("Operation {} settled with failure: {}", slot, error);
        self.try_fire()
    }

    /// Fire if nothing is outstanding and the latch has not fired yet
    ///
    /// A latch created with zero slots fires on the first call.
    pub fn try_fire(&mut self) -> Option<Vec<T>> {
        if self.state == LatchState::Pending && self.outstanding == 0 {
            self.state = LatchState::Fired;
            return Some(std::mem::take(&mut self.results));
        }
        None
    }

    fn mark_settled(&mut self, slot: usize) -> bool {
        if self.state == LatchState::Fired {
            warn!("Ignoring settlement of operation {} after completion", slot);
            return false;
        }
        match self.settled.get_mut(slot) {
            Some(flag) if !*flag => {
                *flag = true;
                self.outstanding -= 1;
                true
            }
            Some(_) => {
                warn!("Ignoring repeated settlement of operation {}", slot);
                false
            }
            None => {
                warn!("Ignoring settlement of unknown operation {}", slot);
                false
            }
        }
    }
}

/// A boxed operation producing zero or more results
pub type SettleOp<'a, T, E> = BoxFuture<'a, Result<Vec<T>, E>>;

/// Run every operation concurrently and collect the successful results
///
/// Resolves once all operations have settled, in settlement order. Failed
/// operations contribute nothing; their errors are only recorded.
pub async fn settle_all<'a, T, E, I>(ops: I) -> Vec<T>
where
    I: IntoIterator<Item = SettleOp<'a, T, E>>,
    T: Send + 'a,
    E: Display + Send + 'a,
{
    let mut pending: FuturesUnordered<_> = ops
        .into_iter()
        .enumerate()
        .map(|(slot, op)| async move { (slot, op.await) })
        .collect();

    let mut latch = SettleLatch::new(pending.len());
    if let Some(results) = latch.try_fire() {
        return results;
    }

    while let Some((slot, outcome)) = pending.next().await {
        let fired = match outcome {
            Ok(items) => latch.record_success(slot, items),
            Err(e) => latch.record_failure(slot, &e),
        };
        if let Some(results) = fired {
            return results;
        }
    }

    // Every slot is settled exactly once above, so the latch has fired.
    Vec::new()
}
