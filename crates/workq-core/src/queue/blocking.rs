//! Lock-guarded FIFO queue
//!
//! The correctness baseline: every mutation holds the exclusive side of a
//! read/write lock, so all operations are totally ordered and FIFO delivery
//! is trivial. Size queries take the shared side and may proceed in parallel
//! with each other.

use std::collections::VecDeque;
use std::sync::RwLock;

use super::{QueueFull, WorkQueue};

/// FIFO queue guarded by a read/write lock
pub struct BlockingQueue<T> {
    inner: RwLock<VecDeque<T>>,
}

impl<T> BlockingQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(VecDeque::new()),
        }
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// The RwLock serializes all access to the inner `VecDeque<T>`: writers take
// the exclusive side and readers only observe the length, so no `&T` ever
// crosses a thread boundary. This mirrors the `Send`/`Sync` declarations on
// the lock-free `ListQueue`/`RingQueue` and only requires `T: Send`.
unsafe impl<T: Send> Send for BlockingQueue<T> {}
unsafe impl<T: Send> Sync for BlockingQueue<T> {}

impl<T: Send> WorkQueue<T> for BlockingQueue<T> {
    fn push(&self, value: T) -> Result<(), QueueFull<T>> {
        self.inner.write().unwrap().push_back(value);
        Ok(())
    }

    fn pop(&self) -> Option<T> {
        self.inner.write().unwrap().pop_front()
    }

    fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::contract_tests;
    use std::sync::Arc;

    #[test]
    fn test_push_pop_basic() {
        let q = BlockingQueue::new();
        q.push(1u64).unwrap();
        q.push(2).unwrap();
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_never_full() {
        let q = BlockingQueue::new();
        for i in 0..10_000u64 {
            q.push(i).unwrap();
        }
        assert_eq!(q.len(), 10_000);
    }

    #[test]
    fn test_fifo_single_thread() {
        contract_tests::check_fifo_single_thread(&BlockingQueue::new());
    }

    #[test]
    fn test_exactly_once_under_contention() {
        contract_tests::check_exactly_once(Arc::new(BlockingQueue::new()), 8, 2000);
    }

    #[test]
    fn test_len_at_rest() {
        contract_tests::check_len_at_rest(Arc::new(BlockingQueue::new()));
    }
}
