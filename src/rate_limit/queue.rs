//! FIFO bounded-concurrency request queue.

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Read-only snapshot of queue occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests waiting for a concurrency slot.
    pub pending: usize,
    /// Requests currently in flight.
    pub active: usize,
}

/// Bounds the number of simultaneous in-flight requests and paces the
/// start of new ones, to avoid hammering the remote API.
///
/// Wraps a `tokio::sync::Semaphore`, whose permit queue is FIFO-fair:
/// requests start in the order they were submitted. Completion order is
/// not guaranteed - a request with a faster response can finish before
/// one submitted earlier.
///
/// When a request completes while others are still waiting, its slot is
/// held for `batch_delay` before release, acting as a cadence brake on
/// starting new work. The delay never holds up the completed caller's
/// result; the deferred release runs on a background task.
///
/// The queue never retries and never swallows errors (retries happen
/// inside the submitted future), and it has no awareness of cancellation:
/// a cancelled request holds its slot until its future settles.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use open5e_client::rate_limit::RequestQueue;
///
/// let queue = RequestQueue::new(5, Duration::from_millis(100));
/// assert_eq!(queue.limit(), 5);
/// assert_eq!(queue.active(), 0);
/// ```
#[derive(Clone)]
pub struct RequestQueue {
    semaphore: Arc<Semaphore>,
    limit: usize,
    batch_delay: Duration,
    pending: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

/// Counter increment undone on drop, so occupancy stays accurate even
/// when a caller drops the `run` future mid-flight (`timeout`, `select!`).
struct CounterGuard {
    counter: Arc<AtomicUsize>,
}

impl CounterGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for CounterGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestQueue {
    /// Creates a new queue with the given concurrency limit and batch delay.
    pub fn new(limit: usize, batch_delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            batch_delay,
            pending: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Runs a future once a concurrency slot is available.
    ///
    /// Waits FIFO for a slot, runs the future to completion, and returns
    /// its output unchanged (success or failure). Dropping the returned
    /// future before completion releases both the slot and the occupancy
    /// counters.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let waiting = CounterGuard::new(&self.pending);
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("queue semaphore closed");
        drop(waiting);
        let running = CounterGuard::new(&self.active);
        tracing::trace!(active = self.active(), pending = self.pending(), "queue dispatch");

        let output = fut.await;

        drop(running);

        // Cadence brake: when more work is queued, hold the slot for the
        // batch delay before freeing it. Deferred to a task so the
        // finished caller gets its result immediately.
        if !self.batch_delay.is_zero() && self.pending.load(Ordering::SeqCst) > 0 {
            let delay = self.batch_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                drop(permit);
            });
        } else {
            drop(permit);
        }

        output
    }

    /// Returns the configured concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of requests waiting for a slot.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns the number of requests currently running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of queue occupancy.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.pending(),
            active: self.active(),
        }
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let queue = RequestQueue::new(5, Duration::ZERO);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let queue = queue.clone();
                let running = running.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    queue
                        .run(async {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            running.fetch_sub(1, Ordering::SeqCst);
                        })
                        .await;
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 5);
        assert_eq!(queue.active(), 0);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_error_passes_through_and_frees_slot() {
        let queue = RequestQueue::new(1, Duration::ZERO);

        let result: Result<(), &str> = queue.run(async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));

        // Slot must be free again
        let ok: Result<u32, &str> = queue.run(async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_dropped_future_releases_active_count() {
        let queue = RequestQueue::new(1, Duration::ZERO);

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            queue.run(tokio::time::sleep(Duration::from_secs(60))),
        )
        .await;
        assert!(result.is_err());

        assert_eq!(queue.active(), 0);
        assert_eq!(queue.pending(), 0);
        // And the slot is free for the next caller
        assert_eq!(queue.run(async { 7 }).await, 7);
    }

    #[tokio::test]
    async fn test_dropped_waiter_releases_pending_count() {
        let queue = RequestQueue::new(1, Duration::ZERO);

        let holder = {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue
                    .run(tokio::time::sleep(Duration::from_millis(100)))
                    .await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Times out while still waiting for the held slot
        let waiter = tokio::time::timeout(Duration::from_millis(20), queue.run(async {})).await;
        assert!(waiter.is_err());
        assert_eq!(queue.pending(), 0);

        holder.await.unwrap();
        assert_eq!(queue.active(), 0);
    }

    #[tokio::test]
    async fn test_stats_snapshot() {
        let queue = RequestQueue::new(2, Duration::ZERO);
        let stats = queue.stats();
        assert_eq!(stats, QueueStats { pending: 0, active: 0 });
    }

    #[tokio::test]
    async fn test_fifo_dispatch_order() {
        let queue = RequestQueue::new(1, Duration::ZERO);
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut tasks = Vec::new();
        for i in 0..5u32 {
            let queue = queue.clone();
            let order = order.clone();
            tasks.push(tokio::spawn(async move {
                queue
                    .run(async {
                        order.lock().await.push(i);
                    })
                    .await;
            }));
            // Yield so each spawn reaches the semaphore before the next
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().await, vec![0, 1, 2, 3, 4]);
    }
}
