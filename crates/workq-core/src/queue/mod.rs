//! Concurrent FIFO queue abstraction for the worker pool
//!
//! Three interchangeable implementations with different synchronization
//! strategies:
//! - `BlockingQueue` - read/write-lock guarded, correctness baseline
//! - `ListQueue` - lock-free linked list over a node arena, unbounded
//! - `RingQueue` - lock-free sequence-numbered ring, bounded
//!
//! All variants guarantee: a value popped by one consumer is never observed
//! by another, and nothing is popped that was not pushed exactly once.

mod blocking;
mod list;
mod ring;

pub use blocking::BlockingQueue;
pub use list::ListQueue;
pub use ring::RingQueue;

use core::fmt;
use std::str::FromStr;

use crate::error::{PoolError, PoolResult};

/// Trait for the pool's shared task queue
///
/// All implementations must be thread-safe (Send + Sync). Pushing and
/// popping may race freely from any number of threads.
pub trait WorkQueue<T>: Send + Sync {
    /// Insert a value at the tail
    ///
    /// Unbounded variants always succeed; the bounded ring hands the value
    /// back inside `QueueFull` when at capacity. Waking consumers is the
    /// caller's responsibility, not the queue's.
    fn push(&self, value: T) -> Result<(), QueueFull<T>>;

    /// Remove and return the head value, or `None` if the queue is empty at
    /// the instant of the check
    fn pop(&self) -> Option<T>;

    /// Number of queued values
    ///
    /// Exact at rest; under concurrent activity the list variant's count is
    /// advisory and converges once in-flight operations finish.
    fn len(&self) -> usize;

    /// Check if the queue is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error returned when pushing to a bounded queue at capacity
///
/// Carries the rejected value back to the caller.
pub struct QueueFull<T>(pub T);

impl<T> fmt::Debug for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueueFull(..)")
    }
}

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

/// Queue implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// `BlockingQueue` - locked VecDeque
    Blocking,

    /// `ListQueue` - lock-free linked list, unbounded
    LockFreeList,

    /// `RingQueue` - lock-free circular buffer, bounded
    LockFreeRing,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueueKind::Blocking => "blocking",
            QueueKind::LockFreeList => "list",
            QueueKind::LockFreeRing => "ring",
        };
        f.write_str(s)
    }
}

impl FromStr for QueueKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blocking" | "mutex" => Ok(QueueKind::Blocking),
            "list" | "lockfree-list" => Ok(QueueKind::LockFreeList),
            "ring" | "lockfree-ring" => Ok(QueueKind::LockFreeRing),
            _ => Err(()),
        }
    }
}

/// Create a boxed queue of the selected kind
///
/// `ring_capacity` is only consulted for the ring variant and must be
/// positive there.
pub fn new_work_queue<T: Send + 'static>(
    kind: QueueKind,
    ring_capacity: usize,
) -> PoolResult<Box<dyn WorkQueue<T>>> {
    match kind {
        QueueKind::Blocking => Ok(Box::new(BlockingQueue::new())),
        QueueKind::LockFreeList => Ok(Box::new(ListQueue::new())),
        QueueKind::LockFreeRing => {
            if ring_capacity == 0 {
                return Err(PoolError::InvalidRingCapacity(ring_capacity));
            }
            Ok(Box::new(RingQueue::new(ring_capacity)?))
        }
    }
}

#[cfg(test)]
pub(crate) mod contract_tests {
    //! Shared contract checks run against every variant from its own test
    //! module.

    use super::WorkQueue;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    /// Values pushed by one thread come back in push order
    pub fn check_fifo_single_thread<Q: WorkQueue<u64>>(queue: &Q) {
        for i in 0..100u64 {
            queue.push(i).unwrap();
        }
        assert_eq!(queue.len(), 100);

        for i in 0..100u64 {
            assert_eq!(queue.pop(), Some(i));
        }
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    /// T producers x N tagged values: the popped multiset equals the pushed
    /// multiset exactly - no loss, no duplication
    pub fn check_exactly_once<Q>(queue: Arc<Q>, producers: u64, per_producer: u64)
    where
        Q: WorkQueue<u64> + 'static,
    {
        use std::sync::atomic::{AtomicBool, Ordering};

        let consumers = producers;
        let total = producers * per_producer;
        let producers_done = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::new();
        for p in 0..producers {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for j in 0..per_producer {
                    // Tag with the producer id so duplicates are detectable
                    let value = p * per_producer + j;
                    while queue.push(value).is_err() {
                        thread::yield_now();
                    }
                }
            }));
        }

        let mut consumer_handles = Vec::new();
        for _ in 0..consumers {
            let queue = Arc::clone(&queue);
            let producers_done = Arc::clone(&producers_done);
            consumer_handles.push(thread::spawn(move || {
                let mut seen = Vec::new();
                loop {
                    match queue.pop() {
                        Some(v) => seen.push(v),
                        None => {
                            if producers_done.load(Ordering::Acquire) && queue.is_empty() {
                                break;
                            }
                            thread::yield_now();
                        }
                    }
                }
                seen
            }));
        }

        for h in handles {
            h.join().unwrap();
        }
        producers_done.store(true, Ordering::Release);

        let mut counts: HashMap<u64, u64> = HashMap::new();
        for h in consumer_handles {
            for v in h.join().unwrap() {
                *counts.entry(v).or_default() += 1;
            }
        }
        // Racy consumers can all observe empty just before the last values
        // commit; whatever is left is still part of the multiset
        while let Some(v) = queue.pop() {
            *counts.entry(v).or_default() += 1;
        }

        assert_eq!(counts.len() as u64, total, "missing values");
        for (value, count) in counts {
            assert_eq!(count, 1, "value {} delivered {} times", value, count);
        }
        assert_eq!(queue.len(), 0);
    }

    /// After all operations quiesce, len() is exactly pushes minus pops
    pub fn check_len_at_rest<Q>(queue: Arc<Q>)
    where
        Q: WorkQueue<u64> + 'static,
    {
        let mut handles = Vec::new();
        for t in 0..4u64 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for j in 0..500 {
                    queue.push(t * 500 + j).unwrap();
                }
                // Each thread pops back half of what it pushed
                for _ in 0..250 {
                    while queue.pop().is_none() {
                        thread::yield_now();
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // 4 threads x (500 pushed - 250 popped)
        assert_eq!(queue.len(), 1000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("blocking".parse(), Ok(QueueKind::Blocking));
        assert_eq!("list".parse(), Ok(QueueKind::LockFreeList));
        assert_eq!("ring".parse(), Ok(QueueKind::LockFreeRing));
        assert_eq!("RING".parse(), Ok(QueueKind::LockFreeRing));
        assert!("bogus".parse::<QueueKind>().is_err());
    }

    #[test]
    fn test_factory_rejects_zero_ring_capacity() {
        let res = new_work_queue::<u64>(QueueKind::LockFreeRing, 0);
        assert!(matches!(res, Err(PoolError::InvalidRingCapacity(0))));
    }

    #[test]
    fn test_factory_builds_each_kind() {
        for kind in [QueueKind::Blocking, QueueKind::LockFreeList, QueueKind::LockFreeRing] {
            let q = new_work_queue::<u64>(kind, 16).unwrap();
            q.push(1).unwrap();
            assert_eq!(q.pop(), Some(1));
        }
    }
}
