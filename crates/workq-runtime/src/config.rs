//! Pool configuration
//!
//! Compile-time defaults with runtime environment overrides, applied in
//! priority order (highest wins): builder methods, environment variables,
//! library defaults.
//!
//! # Example
//!
//! ```rust,ignore
//! use workq_runtime::config::PoolConfig;
//! use workq_core::QueueKind;
//!
//! // Defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or customize programmatically
//! let config = PoolConfig::from_env()
//!     .num_workers(8)
//!     .queue(QueueKind::LockFreeRing)
//!     .ring_capacity(4096);
//! ```

use std::time::Duration;

use workq_core::env::{env_get, env_get_bool, env_get_opt};
use workq_core::error::{PoolError, PoolResult};
use workq_core::queue::QueueKind;

/// Default ring capacity when the ring variant is selected
pub const DEFAULT_RING_CAPACITY: usize = 65536;

/// Spins before an idle worker parks
pub const DEFAULT_IDLE_SPINS: u32 = 10;

/// Worker park timeout in milliseconds
pub const DEFAULT_PARK_TIMEOUT_MS: u64 = 100;

/// Worker pool configuration with builder pattern
///
/// Use `from_env()` to start from defaults with any environment variable
/// overrides applied.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads
    pub num_workers: usize,
    /// Which queue implementation backs the pool
    pub queue: QueueKind,
    /// Capacity for the ring variant (ignored by the others)
    pub ring_capacity: usize,
    /// Spins before an idle worker parks
    pub idle_spins: u32,
    /// Worker park timeout
    pub park_timeout: Duration,
    /// Enable debug logging of worker lifecycle events
    pub debug_logging: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from library defaults with environment overrides
    ///
    /// Environment variables (all optional):
    /// - `WQ_NUM_WORKERS` - Number of worker threads
    /// - `WQ_QUEUE` - Queue variant: `blocking`, `list`, or `ring`
    /// - `WQ_RING_CAPACITY` - Ring variant capacity
    /// - `WQ_IDLE_SPINS` - Spins before a worker parks
    /// - `WQ_PARK_TIMEOUT_MS` - Worker park timeout in milliseconds
    /// - `WQ_DEBUG` - Enable debug logging (0/1)
    pub fn from_env() -> Self {
        let default_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            num_workers: env_get("WQ_NUM_WORKERS", default_workers),
            queue: env_get_opt::<String>("WQ_QUEUE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(QueueKind::Blocking),
            ring_capacity: env_get("WQ_RING_CAPACITY", DEFAULT_RING_CAPACITY),
            idle_spins: env_get("WQ_IDLE_SPINS", DEFAULT_IDLE_SPINS),
            park_timeout: Duration::from_millis(env_get(
                "WQ_PARK_TIMEOUT_MS",
                DEFAULT_PARK_TIMEOUT_MS,
            )),
            debug_logging: env_get_bool("WQ_DEBUG", false),
        }
    }

    /// Set the number of worker threads
    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Select the queue implementation
    pub fn queue(mut self, kind: QueueKind) -> Self {
        self.queue = kind;
        self
    }

    /// Set the ring variant's capacity
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }

    /// Set the idle spin budget before parking
    pub fn idle_spins(mut self, spins: u32) -> Self {
        self.idle_spins = spins;
        self
    }

    /// Set the worker park timeout
    pub fn park_timeout(mut self, timeout: Duration) -> Self {
        self.park_timeout = timeout;
        self
    }

    /// Enable or disable worker lifecycle debug logging
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Check the configuration for construction-time errors
    pub fn validate(&self) -> PoolResult<()> {
        if self.num_workers == 0 {
            return Err(PoolError::InvalidWorkerCount(self.num_workers));
        }
        if self.queue == QueueKind::LockFreeRing && self.ring_capacity == 0 {
            return Err(PoolError::InvalidRingCapacity(self.ring_capacity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = PoolConfig::from_env()
            .num_workers(3)
            .queue(QueueKind::LockFreeRing)
            .ring_capacity(128)
            .idle_spins(5)
            .park_timeout(Duration::from_millis(10));

        assert_eq!(config.num_workers, 3);
        assert_eq!(config.queue, QueueKind::LockFreeRing);
        assert_eq!(config.ring_capacity, 128);
        assert_eq!(config.idle_spins, 5);
        assert_eq!(config.park_timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = PoolConfig::from_env().num_workers(0);
        assert_eq!(config.validate(), Err(PoolError::InvalidWorkerCount(0)));
    }

    #[test]
    fn test_validate_rejects_zero_ring_capacity() {
        let config = PoolConfig::from_env()
            .queue(QueueKind::LockFreeRing)
            .ring_capacity(0);
        assert_eq!(config.validate(), Err(PoolError::InvalidRingCapacity(0)));
    }

    #[test]
    fn test_zero_ring_capacity_ignored_for_other_queues() {
        let config = PoolConfig::from_env()
            .num_workers(2)
            .queue(QueueKind::Blocking)
            .ring_capacity(0);
        assert!(config.validate().is_ok());
    }
}
