//! Fallback parking using std::sync::Condvar
//!
//! Used on platforms without futex support. Less efficient but portable.

use super::WorkerParking;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Condvar-based parking (fallback)
pub struct CondvarParking {
    /// bool = wake_pending
    mutex: Mutex<bool>,

    condvar: Condvar,

    /// Count of parked workers
    parked: AtomicUsize,
}

impl CondvarParking {
    /// Create a new condvar parking instance
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(false),
            condvar: Condvar::new(),
            parked: AtomicUsize::new(0),
        }
    }
}

impl Default for CondvarParking {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerParking for CondvarParking {
    fn park(&self, timeout: Option<Duration>) -> bool {
        self.parked.fetch_add(1, Ordering::SeqCst);

        let mut guard = self.mutex.lock().unwrap();

        // Consume a pending wake instead of sleeping
        if *guard {
            *guard = false;
            self.parked.fetch_sub(1, Ordering::SeqCst);
            return true;
        }

        let woken = match timeout {
            Some(t) => {
                let (g, timeout_result) = self.condvar.wait_timeout(guard, t).unwrap();
                guard = g;
                !timeout_result.timed_out()
            }
            None => {
                guard = self.condvar.wait(guard).unwrap();
                true
            }
        };

        // Consume the wake flag if set
        let pending = *guard;
        *guard = false;

        self.parked.fetch_sub(1, Ordering::SeqCst);
        woken || pending
    }

    fn wake_one(&self) {
        {
            let mut guard = self.mutex.lock().unwrap();
            *guard = true;
        }
        if self.parked.load(Ordering::Acquire) > 0 {
            self.condvar.notify_one();
        }
    }

    fn wake_all(&self) {
        {
            let mut guard = self.mutex.lock().unwrap();
            *guard = true;
        }
        if self.parked.load(Ordering::Acquire) > 0 {
            self.condvar.notify_all();
        }
    }

    fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}
