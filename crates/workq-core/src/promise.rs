//! Single-write, single-read result channel
//!
//! Bridges a worker thread and the submitting thread. The writer half
//! (`Promise`) is consumed by `complete`, so the outcome can be written at
//! most once; the reader half (`TaskHandle`) is not `Clone`, so there is
//! exactly one reader. Dropping an uncompleted `Promise` delivers
//! `TaskError::Abandoned` instead of leaving the reader waiting forever.

use std::sync::{Arc, Condvar, Mutex};

use crate::error::{TaskError, TaskResult};

/// Create a connected writer/reader pair
pub fn promise<T>() -> (Promise<T>, TaskHandle<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State::Pending),
        cond: Condvar::new(),
    });

    (
        Promise {
            shared: Arc::clone(&shared),
            delivered: false,
        },
        TaskHandle { shared },
    )
}

enum State<T> {
    /// No outcome written yet
    Pending,

    /// Outcome written, readable any number of times
    Done(TaskResult<T>),

    /// Outcome moved out by `into_result` (unobservable: the only handle
    /// was consumed to get here)
    Taken,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    cond: Condvar,
}

/// Writer half of the result channel, held by the executing worker
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
    delivered: bool,
}

impl<T> Promise<T> {
    /// Publish the task's outcome and wake the reader
    ///
    /// Consuming `self` makes a second write impossible.
    pub fn complete(mut self, outcome: TaskResult<T>) {
        self.deliver(outcome);
    }

    fn deliver(&mut self, outcome: TaskResult<T>) {
        let mut state = self.shared.state.lock().unwrap();
        if matches!(*state, State::Pending) {
            *state = State::Done(outcome);
            self.shared.cond.notify_all();
        }
        self.delivered = true;
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        // Broken promise: the task never ran (e.g. abandoned in the queue at
        // shutdown). The reader gets an error outcome, not a hang.
        if !self.delivered {
            self.deliver(Err(TaskError::Abandoned));
        }
    }
}

/// Reader half of the result channel, returned by `submit`
///
/// Single reader by construction: not `Clone`.
pub struct TaskHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> TaskHandle<T> {
    /// Block until the outcome has been written
    ///
    /// Re-checks the predicate after every wake, so spurious condvar wakeups
    /// are harmless.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while matches!(*state, State::Pending) {
            state = self.shared.cond.wait(state).unwrap();
        }
    }

    /// Non-blocking check for a written outcome
    pub fn is_ready(&self) -> bool {
        !matches!(*self.shared.state.lock().unwrap(), State::Pending)
    }

    /// Block until the outcome is available, then return a copy of it
    ///
    /// Idempotent: calling this any number of times yields the same outcome.
    pub fn result(&self) -> TaskResult<T>
    where
        T: Clone,
    {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            match &*state {
                State::Pending => {
                    state = self.shared.cond.wait(state).unwrap();
                }
                State::Done(outcome) => return outcome.clone(),
                State::Taken => unreachable!("outcome taken while a handle still exists"),
            }
        }
    }

    /// Non-blocking read: `None` while pending, the outcome once written
    pub fn try_result(&self) -> Option<TaskResult<T>>
    where
        T: Clone,
    {
        match &*self.shared.state.lock().unwrap() {
            State::Pending => None,
            State::Done(outcome) => Some(outcome.clone()),
            State::Taken => unreachable!("outcome taken while a handle still exists"),
        }
    }

    /// Block until the outcome is available and move it out
    ///
    /// For payloads that are not `Clone`. Consumes the handle, so a second
    /// read is impossible by construction.
    pub fn into_result(self) -> TaskResult<T> {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            match *state {
                State::Pending => {
                    state = self.shared.cond.wait(state).unwrap();
                }
                _ => break,
            }
        }
        match std::mem::replace(&mut *state, State::Taken) {
            State::Done(outcome) => outcome,
            _ => unreachable!("into_result past the pending wait"),
        }
    }
}
