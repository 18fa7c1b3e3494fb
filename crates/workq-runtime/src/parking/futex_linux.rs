//! Linux futex-based worker parking
//!
//! Uses the futex syscall for efficient sleep/wake with minimal overhead.
//!
//! Futex word semantics:
//! - 0 = no wake pending
//! - 1 = wake pending (a parker consumes it instead of sleeping)
//!
//! When a worker parks:
//! 1. Increment parked count
//! 2. Consume a pending wake if one is set, otherwise FUTEX_WAIT while the
//!    word is 0
//! 3. Decrement parked count on return
//!
//! When waking:
//! 1. Set the futex word to 1 (so a racing parker cannot sleep through it)
//! 2. FUTEX_WAKE 1 or all waiters

use super::WorkerParking;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Linux futex-based parking
pub struct FutexParking {
    /// Futex word: 0 = sleep, 1 = wake pending
    futex: AtomicU32,

    /// Count of parked workers (lets wakers skip the syscall)
    parked: AtomicUsize,
}

impl FutexParking {
    /// Create a new futex parking instance
    pub fn new() -> Self {
        Self {
            futex: AtomicU32::new(0),
            parked: AtomicUsize::new(0),
        }
    }

    fn futex_wait(&self, timeout: Option<Duration>) -> i64 {
        let timespec = timeout.map(|d| libc::timespec {
            tv_sec: d.as_secs() as libc::time_t,
            tv_nsec: d.subsec_nanos() as libc::c_long,
        });

        let timespec_ptr = match &timespec {
            Some(ts) => ts as *const libc::timespec,
            None => std::ptr::null(),
        };

        // FUTEX_WAIT: sleep while futex == 0
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.futex.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                0u32,
                timespec_ptr,
                std::ptr::null::<u32>(),
                0u32,
            ) as i64
        }
    }

    fn futex_wake(&self, count: i32) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.futex.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                count,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl Default for FutexParking {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerParking for FutexParking {
    fn park(&self, timeout: Option<Duration>) -> bool {
        self.parked.fetch_add(1, Ordering::SeqCst);

        // Consume a pending wake instead of sleeping
        if self.futex.swap(0, Ordering::AcqRel) != 0 {
            self.parked.fetch_sub(1, Ordering::SeqCst);
            return true;
        }

        let result = self.futex_wait(timeout);

        self.parked.fetch_sub(1, Ordering::SeqCst);

        // Consume the wake word so the next parker sleeps normally
        let pending = self.futex.swap(0, Ordering::AcqRel) != 0;

        if result == 0 {
            true // Woken by FUTEX_WAKE
        } else {
            // ETIMEDOUT = timeout, EAGAIN = word changed before sleeping
            // (a wake raced in), EINTR = signal
            pending
        }
    }

    fn wake_one(&self) {
        // Set the wake word first so a parker racing past its empty-queue
        // check cannot sleep through this signal
        self.futex.store(1, Ordering::Release);

        if self.parked.load(Ordering::Acquire) > 0 {
            self.futex_wake(1);
        }
    }

    fn wake_all(&self) {
        self.futex.store(1, Ordering::Release);

        if self.parked.load(Ordering::Acquire) > 0 {
            self.futex_wake(i32::MAX);
        }
    }

    fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}
