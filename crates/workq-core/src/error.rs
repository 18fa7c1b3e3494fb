//! Error types for the worker pool and its queues

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors reported by pool construction and lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Pool was configured with zero worker threads
    InvalidWorkerCount(usize),

    /// Ring queue was configured with zero capacity
    InvalidRingCapacity(usize),

    /// `init` called on a pool that already spawned its workers
    AlreadyInitialized,

    /// Operation requires a running pool (submit before `init`, or after
    /// shutdown has begun)
    NotRunning,

    /// `shutdown` called on a pool that already stopped
    AlreadyStopped,

    /// The bounded queue rejected the task (ring variant at capacity)
    QueueFull,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidWorkerCount(n) => {
                write!(f, "invalid worker count: {}", n)
            }
            PoolError::InvalidRingCapacity(c) => {
                write!(f, "invalid ring capacity: {}", c)
            }
            PoolError::AlreadyInitialized => write!(f, "pool already initialized"),
            PoolError::NotRunning => write!(f, "pool is not running"),
            PoolError::AlreadyStopped => write!(f, "pool already stopped"),
            PoolError::QueueFull => write!(f, "task queue is full"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type for a submitted task's outcome
pub type TaskResult<T> = Result<T, TaskError>;

/// Failure outcome delivered through a task's result channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task panicked while executing; carries the panic message
    Panicked(String),

    /// The task was dropped without running (pool shut down before a worker
    /// popped it)
    Abandoned,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Panicked(msg) => write!(f, "task panicked: {}", msg),
            TaskError::Abandoned => write!(f, "task abandoned before execution"),
        }
    }
}

impl std::error::Error for TaskError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display() {
        let e = PoolError::InvalidWorkerCount(0);
        assert_eq!(format!("{}", e), "invalid worker count: 0");

        let e = PoolError::QueueFull;
        assert_eq!(format!("{}", e), "task queue is full");
    }

    #[test]
    fn test_task_error_display() {
        let e = TaskError::Panicked("boom".to_string());
        assert_eq!(format!("{}", e), "task panicked: boom");

        let e = TaskError::Abandoned;
        assert_eq!(format!("{}", e), "task abandoned before execution");
    }
}
