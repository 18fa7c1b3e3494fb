//! # workq-runtime
//!
//! Worker threads, parking and configuration for the workq pool.
//!
//! `workq-core` defines the queues and the result channel; this crate puts
//! OS threads behind them. The only platform-specific code is the parking
//! primitive (Linux futex, `Condvar` elsewhere).
//!
//! ## Modules
//!
//! - `pool` - the `WorkerPool` and its worker loop
//! - `config` - env-driven pool configuration
//! - `parking` - worker sleep/wake primitive

pub mod config;
pub mod parking;
pub mod pool;

// Re-exports for convenience
pub use config::PoolConfig;
pub use parking::{PlatformParking, WorkerParking};
pub use pool::WorkerPool;
