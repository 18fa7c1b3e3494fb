//! Worker pool
//!
//! A fixed set of OS threads pulling boxed tasks from one shared queue.
//! Lifecycle: `new` validates configuration and builds the queue, `init`
//! spawns the workers, `submit` packages a closure and wakes one worker,
//! `shutdown` flags, wakes everyone and joins.
//!
//! Tasks still queued when shutdown lands are not guaranteed to run; their
//! handles resolve to `TaskError::Abandoned` when the queue drops them, so a
//! waiting submitter never hangs. Callers that need every result must await
//! their handles before requesting shutdown.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use workq_core::error::{PoolError, PoolResult};
use workq_core::promise::{promise, TaskHandle};
use workq_core::qdebug;
use workq_core::qprint;
use workq_core::queue::{new_work_queue, WorkQueue};
use workq_core::state::PoolState;
use workq_core::task::{package, Task};

use crate::config::PoolConfig;
use crate::parking::{PlatformParking, WorkerParking};

/// State shared between the pool handle and its workers
///
/// Workers capture only this struct - no back-reference to the pool, so
/// there is no ownership cycle.
struct PoolShared {
    /// The task queue, selected at construction
    queue: Box<dyn WorkQueue<Task>>,
    /// Wakeup signal shared by all workers and submitters
    parking: PlatformParking,
    /// Monotonic shutdown flag; never reset
    shutdown: AtomicBool,
    /// Current `PoolState`
    state: AtomicU8,
    /// Workers whose thread is still running
    live_workers: AtomicUsize,
    /// Idle spin budget before a worker parks
    idle_spins: u32,
    /// Park timeout; bounds the lost-wakeup window
    park_timeout: Duration,
    /// Log worker lifecycle events
    debug: bool,
}

/// Fixed-size worker pool over a pluggable task queue
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
    num_workers: usize,
}

impl WorkerPool {
    /// Create a pool from the given configuration
    ///
    /// Fails on malformed configuration (zero workers, zero ring capacity).
    /// No threads are spawned until `init`.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        qprint::init();

        let queue = new_work_queue::<Task>(config.queue, config.ring_capacity)?;

        Ok(Self {
            shared: Arc::new(PoolShared {
                queue,
                parking: PlatformParking::new(),
                shutdown: AtomicBool::new(false),
                state: AtomicU8::new(PoolState::Created as u8),
                live_workers: AtomicUsize::new(0),
                idle_spins: config.idle_spins,
                park_timeout: config.park_timeout,
                debug: config.debug_logging,
            }),
            handles: Vec::with_capacity(config.num_workers),
            num_workers: config.num_workers,
        })
    }

    /// Spawn the worker threads and start accepting tasks
    pub fn init(&mut self) -> PoolResult<()> {
        self.shared
            .state
            .compare_exchange(
                PoolState::Created as u8,
                PoolState::Initialized as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| PoolError::AlreadyInitialized)?;

        for worker_id in 0..self.num_workers {
            let shared = Arc::clone(&self.shared);
            // init owns the increment; each worker decrements itself on exit
            self.shared.live_workers.fetch_add(1, Ordering::SeqCst);
            let handle = thread::Builder::new()
                .name(format!("workq-worker-{}", worker_id))
                .spawn(move || worker_loop(shared, worker_id))
                .expect("failed to spawn worker thread");
            self.handles.push(handle);
        }

        self.shared
            .state
            .store(PoolState::Running as u8, Ordering::Release);
        Ok(())
    }

    /// Submit a closure for asynchronous execution
    ///
    /// Returns a handle that observes completion and carries the result or
    /// failure. Valid only while the pool is running; the bounded ring
    /// variant surfaces capacity exhaustion as `PoolError::QueueFull`.
    pub fn submit<F, R>(&self, f: F) -> PoolResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if !self.state().accepts_tasks() {
            return Err(PoolError::NotRunning);
        }

        let (tx, rx) = promise();
        let task = package(f, tx);
        self.shared
            .queue
            .push(task)
            .map_err(|_| PoolError::QueueFull)?;

        // One worker is enough; waking all would stampede the queue
        self.shared.parking.wake_one();
        Ok(rx)
    }

    /// Signal shutdown, wake every worker and join them all
    ///
    /// Queued tasks that no worker pops before observing the flag are
    /// dropped (their handles resolve to `TaskError::Abandoned`).
    pub fn shutdown(&mut self) -> PoolResult<()> {
        self.shared
            .state
            .compare_exchange(
                PoolState::Running as u8,
                PoolState::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|current| match PoolState::from(current) {
                PoolState::Created | PoolState::Initialized => PoolError::NotRunning,
                _ => PoolError::AlreadyStopped,
            })?;

        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.parking.wake_all();

        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }

        // Drop whatever the workers left behind so abandoned handles resolve
        // now instead of at pool teardown
        while self.shared.queue.pop().is_some() {}

        self.shared
            .state
            .store(PoolState::Stopped as u8, Ordering::Release);
        if self.shared.debug {
            qdebug!("pool stopped");
        }
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        self.shared.state.load(Ordering::Acquire).into()
    }

    /// Number of worker threads that are currently alive
    pub fn active_workers(&self) -> usize {
        self.shared.live_workers.load(Ordering::Acquire)
    }

    /// Configured worker count
    pub fn total_workers(&self) -> usize {
        self.num_workers
    }

    /// Tasks queued but not yet popped (advisory under concurrency)
    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Best-effort shutdown so worker threads are never leaked; a pool
        // that was shut down explicitly has no handles left to join.
        if !self.handles.is_empty() {
            self.shared.shutdown.store(true, Ordering::SeqCst);
            self.shared.parking.wake_all();
            for handle in self.handles.drain(..) {
                let _ = handle.join();
            }
            while self.shared.queue.pop().is_some() {}
            self.shared
                .state
                .store(PoolState::Stopped as u8, Ordering::Release);
        }
    }
}

/// Worker thread main loop
///
/// Exits when the shutdown flag is set and the queue is observed empty. A
/// worker that loses a pop race simply loops; after `idle_spins` fruitless
/// attempts it parks with a timeout and re-checks the predicate on every
/// wake, so spurious wakeups and lost wakeups are both benign.
fn worker_loop(shared: Arc<PoolShared>, worker_id: usize) {
    qprint::set_worker_id(worker_id as u32);

    if shared.debug {
        qdebug!("started");
    }

    let mut idle_spins: u32 = 0;

    loop {
        if shared.shutdown.load(Ordering::Acquire) && shared.queue.is_empty() {
            break;
        }

        match shared.queue.pop() {
            Some(task) => {
                idle_spins = 0;
                // Execute outside any lock; the task's own wrapper captures
                // panics and routes them into its result channel
                task();
            }
            None => {
                if shared.shutdown.load(Ordering::Acquire) {
                    break;
                }
                if idle_spins < shared.idle_spins {
                    // Quick spin first (catch fast push→pop cycles)
                    idle_spins += 1;
                    for _ in 0..32 {
                        std::hint::spin_loop();
                    }
                    thread::yield_now();
                } else {
                    shared.parking.park(Some(shared.park_timeout));
                    idle_spins = 0; // Reset after park
                }
            }
        }
    }

    if shared.debug {
        qdebug!("shutdown signaled, exiting");
    }
    shared.live_workers.fetch_sub(1, Ordering::SeqCst);
    qprint::clear_worker_id();
}
