//! Pool lifecycle state

use core::fmt;

/// Lifecycle state of a worker pool
///
/// Transitions are monotonic: `Created → Initialized → Running →
/// ShuttingDown → Stopped`. There is no reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolState {
    /// Constructed, configuration fixed, no threads spawned yet
    Created = 0,

    /// Worker threads are being spawned
    Initialized = 1,

    /// Workers are live; `submit` is valid
    Running = 2,

    /// Shutdown requested; workers draining and exiting
    ShuttingDown = 3,

    /// Every worker joined; the pool is inert
    Stopped = 4,
}

impl PoolState {
    /// Check whether `submit` is allowed in this state
    #[inline]
    pub const fn accepts_tasks(&self) -> bool {
        matches!(self, PoolState::Running)
    }

    /// Check whether the pool has reached its final state
    #[inline]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, PoolState::Stopped)
    }
}

impl From<u8> for PoolState {
    fn from(v: u8) -> Self {
        match v {
            0 => PoolState::Created,
            1 => PoolState::Initialized,
            2 => PoolState::Running,
            3 => PoolState::ShuttingDown,
            _ => PoolState::Stopped,
        }
    }
}

impl From<PoolState> for u8 {
    fn from(state: PoolState) -> u8 {
        state as u8
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolState::Created => "created",
            PoolState::Initialized => "initialized",
            PoolState::Running => "running",
            PoolState::ShuttingDown => "shutting-down",
            PoolState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        for state in [
            PoolState::Created,
            PoolState::Initialized,
            PoolState::Running,
            PoolState::ShuttingDown,
            PoolState::Stopped,
        ] {
            let raw: u8 = state.into();
            assert_eq!(PoolState::from(raw), state);
        }
    }

    #[test]
    fn test_accepts_tasks() {
        assert!(PoolState::Running.accepts_tasks());
        assert!(!PoolState::Created.accepts_tasks());
        assert!(!PoolState::ShuttingDown.accepts_tasks());
        assert!(!PoolState::Stopped.accepts_tasks());
    }
}
