//! Lock-free linked-list FIFO queue
//!
//! Unbounded MPMC queue built from a singly linked list of arena-indexed
//! nodes. `head` and `tail` are atomic node indices; a thread gains
//! momentary exclusive ownership of an end by swapping the `NONE` marker
//! into it, and releases ownership by storing a valid index back. Pushes
//! therefore mutually exclude other pushes, and pops other pops, while a
//! push and a pop proceed concurrently. This matches the original protocol
//! deliberately - it is not a fully lock-free MPMC design, and must not be
//! "upgraded" into one.
//!
//! A sentinel node sits at the head at all times. The head node's payload is
//! always spent; an element is poppable exactly when the head's `next` link
//! is set, so the live count is advisory under concurrent activity.
//!
//! Nodes live in a chunked arena addressed by `u32` index, with a LIFO free
//! stack for retired nodes. Chunk pointers are published once and never
//! move, so node access takes no lock.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicI64, AtomicPtr, AtomicU32, Ordering};

use crate::qerror;
use crate::spinlock::SpinLock;

use super::{QueueFull, WorkQueue};

/// Sentinel index: "no node" in a next link, "momentarily owned" in an end slot
const NONE: u32 = u32::MAX;

/// Nodes per arena chunk
const CHUNK_SIZE: usize = 4096;

/// Maximum chunks; caps LIVE (undrained) nodes at ~4M. Retired nodes
/// recycle through the free stack, so total throughput is unbounded.
const MAX_CHUNKS: usize = 1024;

/// Ownership-acquisition retries before declaring structural corruption.
/// An end slot is held only for a handful of instructions; billions of
/// failed swaps mean the releasing store can never happen.
const OWNERSHIP_SPIN_FATAL: u64 = 1 << 32;

struct Node<T> {
    value: UnsafeCell<Option<T>>,
    next: AtomicU32,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            value: UnsafeCell::new(None),
            next: AtomicU32::new(NONE),
        }
    }
}

/// Chunked node arena with a LIFO free stack
///
/// Chunk slots are append-only: once a chunk pointer is published it never
/// changes, so `node()` needs no lock. Growth and the free stack take the
/// spinlock; both are short and already serialized by the queue's ownership
/// protocol in practice.
struct Arena<T> {
    chunks: [AtomicPtr<Node<T>>; MAX_CHUNKS],
    free_stack: SpinLock<Vec<u32>>,
    next_fresh: AtomicU32,
    grow: SpinLock<()>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self {
            chunks: [const { AtomicPtr::new(core::ptr::null_mut()) }; MAX_CHUNKS],
            free_stack: SpinLock::new(Vec::new()),
            next_fresh: AtomicU32::new(0),
            grow: SpinLock::new(()),
        }
    }

    /// Allocate a node index, preferring recently freed nodes
    fn alloc(&self) -> u32 {
        if let Some(idx) = self.free_stack.lock().pop() {
            return idx;
        }

        loop {
            let fresh = self.next_fresh.load(Ordering::Acquire);
            if fresh as usize >= MAX_CHUNKS * CHUNK_SIZE {
                qerror!("list queue node arena exhausted ({} live nodes)", fresh);
                panic!("list queue node arena exhausted");
            }
            self.ensure_chunk(fresh as usize / CHUNK_SIZE);

            match self.next_fresh.compare_exchange_weak(
                fresh,
                fresh + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return fresh,
                Err(_) => continue, // Another thread claimed it, retry
            }
        }
    }

    /// Return a node to the free stack for reuse
    fn free(&self, idx: u32) {
        self.free_stack.lock().push(idx);
    }

    #[inline]
    fn node(&self, idx: u32) -> &Node<T> {
        let chunk = idx as usize / CHUNK_SIZE;
        let offset = idx as usize % CHUNK_SIZE;
        let base = self.chunks[chunk].load(Ordering::Acquire);
        debug_assert!(!base.is_null(), "node index {} in unallocated chunk", idx);
        // Safety: published chunk pointers are valid for the arena's lifetime
        // and never move; offset < CHUNK_SIZE.
        unsafe { &*base.add(offset) }
    }

    fn ensure_chunk(&self, chunk: usize) {
        if !self.chunks[chunk].load(Ordering::Acquire).is_null() {
            return;
        }
        let _guard = self.grow.lock();
        if !self.chunks[chunk].load(Ordering::Acquire).is_null() {
            return; // Lost the race, chunk exists now
        }
        let nodes: Box<[Node<T>]> = (0..CHUNK_SIZE).map(|_| Node::new()).collect();
        self.chunks[chunk].store(Box::into_raw(nodes) as *mut Node<T>, Ordering::Release);
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        for chunk in &self.chunks {
            let ptr = chunk.load(Ordering::Relaxed);
            if ptr.is_null() {
                continue;
            }
            // Safety: pointer came from Box::into_raw of a CHUNK_SIZE slice;
            // dropping the box also drops any still-queued payloads.
            unsafe {
                drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                    ptr, CHUNK_SIZE,
                )));
            }
        }
    }
}

/// Unbounded lock-free linked-list queue
pub struct ListQueue<T> {
    arena: Arena<T>,
    head: AtomicU32,
    tail: AtomicU32,
    /// Advisory live count; may transiently disagree with the poppable count
    /// while operations are in flight, converges at rest
    count: AtomicI64,
}

// Safety: payload cells are only touched by the thread holding the relevant
// end's exclusive ownership, and publication goes through Release/Acquire on
// the next links.
unsafe impl<T: Send> Send for ListQueue<T> {}
unsafe impl<T: Send> Sync for ListQueue<T> {}

impl<T> ListQueue<T> {
    /// Create an empty queue (allocates the permanent sentinel node)
    pub fn new() -> Self {
        let arena = Arena::new();
        let sentinel = arena.alloc();
        Self {
            arena,
            head: AtomicU32::new(sentinel),
            tail: AtomicU32::new(sentinel),
            count: AtomicI64::new(0),
        }
    }

    /// Gain momentary exclusive ownership of `head` or `tail` by swapping in
    /// the `NONE` marker; retries while another thread holds it
    ///
    /// Never failing to observe a valid index is a structural invariant; a
    /// retry loop that exhausts the bound is a logic bug, surfaced loudly
    /// rather than retried forever.
    fn acquire_end(&self, end: &AtomicU32, name: &str) -> u32 {
        let mut spins: u64 = 0;
        loop {
            let cur = end.swap(NONE, Ordering::AcqRel);
            if cur != NONE {
                return cur;
            }
            spins += 1;
            if spins >= OWNERSHIP_SPIN_FATAL {
                qerror!("list queue {} slot never released after {} attempts", name, spins);
                panic!("list queue {} ownership never released", name);
            }
            if spins % 64 == 0 {
                std::thread::yield_now();
            } else {
                core::hint::spin_loop();
            }
        }
    }

    #[cfg(test)]
    fn fresh_nodes_allocated(&self) -> u32 {
        self.arena.next_fresh.load(Ordering::Relaxed)
    }
}

impl<T> Default for ListQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> WorkQueue<T> for ListQueue<T> {
    fn push(&self, value: T) -> Result<(), QueueFull<T>> {
        let tail_idx = self.acquire_end(&self.tail, "tail");

        let new_idx = self.arena.alloc();
        let new_node = self.arena.node(new_idx);
        // Safety: the node is fresh or retired, unreachable from the list;
        // we are its only writer until it is linked below.
        unsafe {
            *new_node.value.get() = Some(value);
        }
        new_node.next.store(NONE, Ordering::Relaxed);

        // Publish: link behind the owned tail, then release ownership by
        // storing the new tail index
        self.arena.node(tail_idx).next.store(new_idx, Ordering::Release);
        self.tail.store(new_idx, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn pop(&self) -> Option<T> {
        let head_idx = self.acquire_end(&self.head, "head");

        let next_idx = self.arena.node(head_idx).next.load(Ordering::Acquire);
        if next_idx == NONE {
            // Empty: hand ownership back untouched
            self.head.store(head_idx, Ordering::Release);
            return None;
        }

        // The next node's payload becomes ours; that node is the new
        // sentinel and the old head retires to the free stack
        let value = unsafe { (*self.arena.node(next_idx).value.get()).take() };
        debug_assert!(value.is_some(), "head's next node carried no payload");

        self.count.fetch_sub(1, Ordering::Relaxed);
        self.head.store(next_idx, Ordering::Release);
        self.arena.free(head_idx);
        value
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed).max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::contract_tests;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_pop_basic() {
        let q = ListQueue::new();
        assert_eq!(q.pop(), None::<u64>);

        q.push(10u64).unwrap();
        q.push(20).unwrap();
        q.push(30).unwrap();
        assert_eq!(q.len(), 3);

        assert_eq!(q.pop(), Some(10));
        assert_eq!(q.pop(), Some(20));
        assert_eq!(q.pop(), Some(30));
        assert_eq!(q.pop(), None);
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn test_empty_pop_keeps_queue_usable() {
        let q = ListQueue::new();
        for _ in 0..10 {
            assert_eq!(q.pop(), None::<u64>);
        }
        q.push(1u64).unwrap();
        assert_eq!(q.pop(), Some(1));
    }

    #[test]
    fn test_fifo_single_thread() {
        contract_tests::check_fifo_single_thread(&ListQueue::new());
    }

    #[test]
    fn test_exactly_once_under_contention() {
        contract_tests::check_exactly_once(Arc::new(ListQueue::new()), 8, 2000);
    }

    #[test]
    fn test_len_at_rest() {
        contract_tests::check_len_at_rest(Arc::new(ListQueue::new()));
    }

    #[test]
    fn test_retired_nodes_recycle() {
        let q = ListQueue::new();
        for i in 0..10_000u64 {
            q.push(i).unwrap();
            assert_eq!(q.pop(), Some(i));
        }
        // Each pop retires a node to the free stack, so the arena should
        // never need more than a couple of fresh nodes
        assert!(q.fresh_nodes_allocated() < 8);
    }

    #[test]
    fn test_drop_releases_queued_values() {
        let q = ListQueue::new();
        let value = Arc::new(0u64);
        for _ in 0..100 {
            q.push(Arc::clone(&value)).unwrap();
        }
        drop(q);
        // All queued clones dropped with the arena
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_concurrent_producers_only() {
        let q = Arc::new(ListQueue::new());
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let q = Arc::clone(&q);
            handles.push(thread::spawn(move || {
                for j in 0..1000 {
                    q.push(t * 1000 + j).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(q.len(), 8000);
        let mut seen: Vec<u64> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(seen.len(), 8000);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 8000);
    }
}
