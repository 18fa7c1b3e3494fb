//! Lock-free bounded ring queue
//!
//! Fixed-capacity MPMC queue over a circular slot array. Two monotonically
//! increasing 64-bit cursors (enqueue, dequeue) are advanced by CAS; each
//! slot carries a sequence number encoding its lifecycle phase:
//!
//! - `seq == cursor`        : ready for the producer whose turn it is
//! - `seq == cursor + 1`    : ready for the consumer whose turn it is
//! - anything else          : a neighbor lap is still in progress
//!
//! Distinct producers and consumers work on distinct slots concurrently;
//! only the cursor CAS itself is contended. Pushing at capacity fails fast
//! instead of blocking, and cursors are wide enough that wrap-around cannot
//! alias live slots within any realistic queue lifetime.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{PoolError, PoolResult};

use super::{QueueFull, WorkQueue};

/// Cache-line padding to keep the two cursors off each other's line
#[repr(align(64))]
struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    const fn new(value: T) -> Self {
        CachePadded { value }
    }
}

struct Slot<T> {
    sequence: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Bounded lock-free MPMC ring queue
pub struct RingQueue<T> {
    slots: Box<[Slot<T>]>,
    capacity: u64,
    enqueue_pos: CachePadded<AtomicU64>,
    dequeue_pos: CachePadded<AtomicU64>,
}

// Safety: a slot's value cell is only written by the producer that owns the
// slot's current sequence phase and only read by the matching consumer;
// phase transfer goes through Release/Acquire on the sequence number.
unsafe impl<T: Send> Send for RingQueue<T> {}
unsafe impl<T: Send> Sync for RingQueue<T> {}

impl<T> RingQueue<T> {
    /// Create a queue holding at most `capacity` elements
    ///
    /// Zero capacity is a reported configuration error, not a panic.
    pub fn new(capacity: usize) -> PoolResult<Self> {
        if capacity == 0 {
            return Err(PoolError::InvalidRingCapacity(capacity));
        }

        let slots: Box<[Slot<T>]> = (0..capacity as u64)
            .map(|i| Slot {
                sequence: AtomicU64::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect();

        Ok(Self {
            slots,
            capacity: capacity as u64,
            enqueue_pos: CachePadded::new(AtomicU64::new(0)),
            dequeue_pos: CachePadded::new(AtomicU64::new(0)),
        })
    }

    /// Fixed capacity set at construction
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    #[inline]
    fn slot(&self, pos: u64) -> &Slot<T> {
        &self.slots[(pos % self.capacity) as usize]
    }
}

impl<T: Send> WorkQueue<T> for RingQueue<T> {
    fn push(&self, value: T) -> Result<(), QueueFull<T>> {
        let mut pos = self.enqueue_pos.value.load(Ordering::Relaxed);
        loop {
            let slot = self.slot(pos);
            let seq = slot.sequence.load(Ordering::Acquire);

            if seq == pos {
                // Slot is writable for this cursor value; claim the cursor
                match self.enqueue_pos.value.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Safety: winning the CAS while seq == pos grants
                        // exclusive write access to this slot for this lap
                        unsafe {
                            (*slot.value.get()).write(value);
                        }
                        slot.sequence.store(pos + 1, Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => pos = current,
                }
            } else if seq < pos {
                // The slot still holds the value from a full lap ago:
                // enqueue cursor minus dequeue cursor == capacity. Fail fast.
                return Err(QueueFull(value));
            } else {
                // A rival producer claimed this cursor value; move on
                pos = self.enqueue_pos.value.load(Ordering::Relaxed);
            }
        }
    }

    fn pop(&self) -> Option<T> {
        let mut pos = self.dequeue_pos.value.load(Ordering::Relaxed);
        loop {
            let slot = self.slot(pos);
            let seq = slot.sequence.load(Ordering::Acquire);

            if seq == pos + 1 {
                // Slot holds a committed value for this cursor; claim it
                match self.dequeue_pos.value.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Safety: winning the CAS while seq == pos + 1 grants
                        // exclusive read access to the committed value
                        let value = unsafe { (*slot.value.get()).assume_init_read() };
                        // Mark the slot writable for the producer one lap ahead
                        slot.sequence.store(pos + self.capacity, Ordering::Release);
                        return Some(value);
                    }
                    Err(current) => pos = current,
                }
            } else if seq <= pos {
                // No committed element at this cursor
                return None;
            } else {
                // A rival consumer claimed this cursor value; move on
                pos = self.dequeue_pos.value.load(Ordering::Relaxed);
            }
        }
    }

    fn len(&self) -> usize {
        let tail = self.enqueue_pos.value.load(Ordering::Relaxed);
        let head = self.dequeue_pos.value.load(Ordering::Relaxed);
        tail.saturating_sub(head).min(self.capacity) as usize
    }
}

impl<T> Drop for RingQueue<T> {
    fn drop(&mut self) {
        // Drop values committed but never popped
        let tail = self.enqueue_pos.value.load(Ordering::Relaxed);
        let mut pos = self.dequeue_pos.value.load(Ordering::Relaxed);
        while pos != tail {
            let slot = self.slot(pos);
            // Safety: slots in [dequeue, enqueue) hold initialized values
            unsafe {
                (*slot.value.get()).assume_init_drop();
            }
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::contract_tests;
    use std::sync::Arc;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            RingQueue::<u64>::new(0),
            Err(PoolError::InvalidRingCapacity(0))
        ));
    }

    #[test]
    fn test_push_pop_basic() {
        let q = RingQueue::new(8).unwrap();
        for i in 1..=5u64 {
            q.push(i).unwrap();
        }
        assert_eq!(q.len(), 5);
        for i in 1..=5u64 {
            assert_eq!(q.pop(), Some(i));
        }
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_capacity_enforced() {
        let q = RingQueue::new(4).unwrap();
        for i in 0..4u64 {
            q.push(i).unwrap();
        }

        // The (C+1)-th push without a pop must fail and return the value
        let err = q.push(99).unwrap_err();
        assert_eq!(err.0, 99);
        assert_eq!(q.len(), 4);

        // One pop makes room for exactly one push
        assert_eq!(q.pop(), Some(0));
        q.push(99).unwrap();
        assert!(q.push(100).is_err());
    }

    #[test]
    fn test_wraparound_preserves_fifo() {
        let q = RingQueue::new(3).unwrap();
        // Cycle the ring several laps
        for lap in 0..10u64 {
            for i in 0..3 {
                q.push(lap * 3 + i).unwrap();
            }
            for i in 0..3 {
                assert_eq!(q.pop(), Some(lap * 3 + i));
            }
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_non_power_of_two_capacity() {
        let q = RingQueue::new(7).unwrap();
        assert_eq!(q.capacity(), 7);
        for i in 0..7u64 {
            q.push(i).unwrap();
        }
        assert!(q.push(7).is_err());
        for i in 0..7u64 {
            assert_eq!(q.pop(), Some(i));
        }
    }

    #[test]
    fn test_fifo_single_thread() {
        let q = RingQueue::new(128).unwrap();
        contract_tests::check_fifo_single_thread(&q);
    }

    #[test]
    fn test_exactly_once_under_contention() {
        // Capacity below the total forces producers through the full/retry
        // path as well
        let q = Arc::new(RingQueue::new(512).unwrap());
        contract_tests::check_exactly_once(q, 8, 2000);
    }

    #[test]
    fn test_len_at_rest() {
        contract_tests::check_len_at_rest(Arc::new(RingQueue::new(4096).unwrap()));
    }

    #[test]
    fn test_drop_releases_committed_values() {
        let q = RingQueue::new(16).unwrap();
        let value = Arc::new(0u64);
        for _ in 0..10 {
            q.push(Arc::clone(&value)).unwrap();
        }
        q.pop();
        drop(q);
        assert_eq!(Arc::strong_count(&value), 1);
    }
}
