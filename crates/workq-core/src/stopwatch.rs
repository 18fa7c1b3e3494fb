//! Monotonic elapsed-time stopwatch
//!
//! Read-only benchmarking collaborator for the cmd tools; the pool and the
//! queues never consult it.

use std::time::{Duration, Instant};

/// Stopwatch measuring elapsed time since it was started
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Elapsed time as a `Duration`
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Reset the start point to now
    pub fn restart(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_elapsed_advances() {
        let sw = Stopwatch::start();
        thread::sleep(Duration::from_millis(10));
        assert!(sw.elapsed_ms() >= 5.0);
        assert!(sw.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_restart_resets() {
        let mut sw = Stopwatch::start();
        thread::sleep(Duration::from_millis(10));
        sw.restart();
        assert!(sw.elapsed_ms() < 10.0);
    }
}
