//! Worker parking mechanism
//!
//! Efficient sleep/wake for idle workers. Submitters wake one worker per
//! push; shutdown wakes everyone. Platform-specific implementations use the
//! most efficient primitive available.

use std::time::Duration;

/// Platform-specific worker parking mechanism
///
/// Workers call `park()` when the queue is empty. Wake sources (submit,
/// shutdown) call `wake_one()` or `wake_all()`.
pub trait WorkerParking: Send + Sync {
    /// Park the current worker until signaled or timeout
    ///
    /// Returns `true` if woken by a signal, `false` on timeout or a spurious
    /// wakeup. Workers must re-check their predicate (queue non-empty or
    /// shutdown flagged) after returning, regardless of the return value.
    fn park(&self, timeout: Option<Duration>) -> bool;

    /// Wake one parked worker
    ///
    /// If no worker is parked the signal is remembered as pending, so a
    /// worker racing into `park` does not sleep through it.
    fn wake_one(&self);

    /// Wake all parked workers (shutdown)
    fn wake_all(&self);

    /// Number of currently parked workers (hint, may be stale)
    fn parked_count(&self) -> usize;
}

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexParking as PlatformParking;
    } else {
        mod fallback;
        pub use fallback::CondvarParking as PlatformParking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_park_timeout() {
        let parking = PlatformParking::new();
        let start = std::time::Instant::now();
        parking.park(Some(Duration::from_millis(50)));
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(40)); // Allow some slack
    }

    #[test]
    fn test_wake_one() {
        let parking = Arc::new(PlatformParking::new());
        let parking2 = Arc::clone(&parking);

        let handle = thread::spawn(move || parking2.park(Some(Duration::from_secs(10))));

        // Give thread time to park
        thread::sleep(Duration::from_millis(50));
        parking.wake_one();

        // Should complete quickly
        let woken = handle.join().unwrap();
        assert!(woken);
    }

    #[test]
    fn test_pending_wake_consumed_without_sleep() {
        let parking = PlatformParking::new();
        parking.wake_one();

        // The pending signal should satisfy the next park immediately
        let start = std::time::Instant::now();
        let woken = parking.park(Some(Duration::from_secs(5)));
        assert!(woken);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wake_all() {
        let parking = Arc::new(PlatformParking::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let parking = Arc::clone(&parking);
            handles.push(thread::spawn(move || {
                parking.park(Some(Duration::from_secs(10)));
            }));
        }

        thread::sleep(Duration::from_millis(50));
        parking.wake_all();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(parking.parked_count(), 0);
    }
}
