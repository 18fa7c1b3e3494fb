//! # workq-core
//!
//! Core types for the workq worker pool - platform agnostic.
//!
//! The engineering weight of this crate is in `queue`: three interchangeable
//! concurrent FIFO implementations behind one `WorkQueue` trait, plus the
//! promise/handle result channel that carries a task's outcome back to its
//! submitter. Worker threads, parking, and configuration live in
//! `workq-runtime`.
//!
//! ## Modules
//!
//! - `queue` - `WorkQueue` trait and the blocking / lock-free-list /
//!   lock-free-ring implementations
//! - `promise` - single-write single-read result channel
//! - `task` - boxed task type and closure packaging
//! - `error` - pool and task error types
//! - `state` - pool lifecycle enum
//! - `spinlock` - internal spinlock primitive
//! - `qprint` - kernel-style debug printing macros
//! - `env` - environment variable utilities
//! - `stopwatch` - elapsed-time collaborator for benchmarks
//! - `randint` - random integers for test scaffolding

#![allow(dead_code)]

pub mod env;
pub mod error;
pub mod promise;
pub mod qprint;
pub mod queue;
pub mod randint;
pub mod spinlock;
pub mod state;
pub mod stopwatch;
pub mod task;

// Re-exports for convenience
pub use env::{env_get, env_get_bool, env_get_opt};
pub use error::{PoolError, PoolResult, TaskError, TaskResult};
pub use promise::{promise, Promise, TaskHandle};
pub use queue::{
    new_work_queue, BlockingQueue, ListQueue, QueueFull, QueueKind, RingQueue, WorkQueue,
};
pub use spinlock::SpinLock;
pub use state::PoolState;
pub use stopwatch::Stopwatch;
pub use randint::RandInt;
pub use task::{package, Task};
