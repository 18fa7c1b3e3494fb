//! # workq - queue-pluggable worker pool
//!
//! A fixed-size pool of worker threads pulling tasks from a shared
//! concurrent queue, with the queue implementation chosen at construction:
//!
//! - **blocking** - read/write-lock guarded FIFO, the correctness baseline
//! - **list** - lock-free singly linked list over a node arena, unbounded
//! - **ring** - lock-free sequence-numbered circular buffer, bounded
//!
//! Submitting a closure returns a [`TaskHandle`] that observes completion
//! and carries the result - or the failure, if the closure panicked. A
//! worker is never killed by a task.
//!
//! ## Quick Start
//!
//! ```no_run
//! use workq::{PoolConfig, QueueKind, WorkerPool};
//!
//! fn main() -> Result<(), workq::PoolError> {
//!     let mut pool = WorkerPool::new(
//!         PoolConfig::from_env()
//!             .num_workers(4)
//!             .queue(QueueKind::LockFreeList),
//!     )?;
//!     pool.init()?;
//!
//!     let handle = pool.submit(|| 5 * 6)?;
//!     assert_eq!(handle.result(), Ok(30));
//!
//!     pool.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       User Code                             │
//! │            submit(), TaskHandle::result()                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkerPool                             │
//! │      package task → push → wake one parked worker           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │  Worker   │      │  Worker   │      │  Worker   │
//!    │  Thread   │      │  Thread   │      │  Thread   │
//!    └───────────┘      └───────────┘      └───────────┘
//!          │                   │                   │
//!          └───────────────────┼───────────────────┘
//!                              ▼
//!    ┌─────────────────────────────────────────────────────────┐
//!    │            WorkQueue (blocking | list | ring)           │
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Shutdown joins every worker; tasks still queued at that point are
//! abandoned and their handles resolve to [`TaskError::Abandoned`]. Await
//! the handles you care about before shutting down.

// Re-export core types
pub use workq_core::{
    new_work_queue, package, promise, BlockingQueue, ListQueue, PoolError, PoolResult, PoolState,
    Promise, QueueFull, QueueKind, RandInt, RingQueue, Stopwatch, Task, TaskError, TaskHandle,
    TaskResult, WorkQueue,
};

// Re-export qprint macros for debug logging
pub use workq_core::{qdebug, qerror, qinfo, qprintln, qtrace, qwarn};
pub use workq_core::qprint::{
    init as init_logging, set_flush_enabled, set_log_level, LogLevel,
};

// Re-export env utilities
pub use workq_core::{env_get, env_get_bool, env_get_opt};

// Re-export runtime types
pub use workq_runtime::{PlatformParking, PoolConfig, WorkerParking, WorkerPool};
