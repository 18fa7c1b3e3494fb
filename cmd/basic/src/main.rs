//! Basic workq usage demo
//!
//! Submits a batch of multiplications to a 3-worker pool, awaits the
//! results, and shuts down.

use std::thread;
use std::time::Duration;

use workq::{PoolConfig, QueueKind, Stopwatch, WorkerPool};

fn simulate_hard_computation() {
    thread::sleep(Duration::from_millis(1));
}

fn multiply(a: i32, b: i32) -> i32 {
    simulate_hard_computation();
    a * b
}

fn main() {
    println!("=== workq basic demo ===\n");

    let queue: QueueKind = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(QueueKind::Blocking);

    let watch = Stopwatch::start();

    let mut pool =
        WorkerPool::new(PoolConfig::from_env().num_workers(3).queue(queue))
            .expect("pool construction");
    pool.init().expect("pool init");

    println!("Pool: 3 workers, {} queue", queue);

    // Fire off a grid of multiplications
    let mut handles = Vec::new();
    for i in 1..=3 {
        for j in 1..=10 {
            handles.push(pool.submit(move || multiply(i, j)).expect("submit"));
        }
    }

    // Await one specific product
    let last = pool.submit(|| multiply(5, 6)).expect("submit");
    println!("Last operation result is equals to {}", last.result().unwrap());

    // Await the rest so shutdown abandons nothing
    for handle in handles {
        handle.result().unwrap();
    }

    pool.shutdown().expect("shutdown");

    println!("Elapsed time: {:.1} ms", watch.elapsed_ms());
    println!("\n=== demo complete ===");
}
