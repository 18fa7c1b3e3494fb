//! Stress test - exactly-once delivery under contention
//!
//! Drives a selectable queue variant with T producer and T consumer threads
//! pushing thread-tagged values, then verifies the popped multiset equals
//! the pushed multiset. Finishes with a pool soak of 10k submissions using
//! randomized payloads.
//!
//! Usage: stress [blocking|list|ring] [threads] [per-thread]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use workq::{
    new_work_queue, PoolConfig, QueueKind, RandInt, Stopwatch, WorkQueue, WorkerPool,
};

fn main() {
    println!("=== workq stress test ===\n");

    let mut args = std::env::args().skip(1);
    let kind: QueueKind = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(QueueKind::LockFreeList);
    let threads: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(16);
    let per_thread: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10_000);

    queue_stress(kind, threads, per_thread);
    pool_soak(kind);

    println!("\n=== stress test complete ===");
}

/// T producers, T consumers, every value delivered exactly once
fn queue_stress(kind: QueueKind, threads: u64, per_thread: u64) {
    let total = threads * per_thread;
    println!(
        "Queue stress: {} queue, {} producers x {} values ({} total)",
        kind, threads, per_thread, total
    );

    // Ring capacity sized to the full load so producers never stall
    let queue: Arc<dyn WorkQueue<u64>> =
        Arc::from(new_work_queue(kind, total as usize).expect("queue construction"));
    let producers_done = Arc::new(AtomicBool::new(false));
    let watch = Stopwatch::start();

    let mut producer_handles = Vec::new();
    for t in 0..threads {
        let queue = Arc::clone(&queue);
        producer_handles.push(thread::spawn(move || {
            for j in 0..per_thread {
                let value = t * per_thread + j;
                while queue.push(value).is_err() {
                    thread::yield_now();
                }
            }
        }));
    }

    let mut consumer_handles = Vec::new();
    for _ in 0..threads {
        let queue = Arc::clone(&queue);
        let producers_done = Arc::clone(&producers_done);
        consumer_handles.push(thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match queue.pop() {
                    Some(v) => seen.push(v),
                    None => {
                        if producers_done.load(Ordering::Acquire) && queue.is_empty() {
                            break;
                        }
                        thread::yield_now();
                    }
                }
            }
            seen
        }));
    }

    for h in producer_handles {
        h.join().unwrap();
    }
    producers_done.store(true, Ordering::Release);

    let mut counts: HashMap<u64, u64> = HashMap::new();
    for h in consumer_handles {
        for v in h.join().unwrap() {
            *counts.entry(v).or_default() += 1;
        }
    }
    while let Some(v) = queue.pop() {
        *counts.entry(v).or_default() += 1;
    }

    let mut duplicates = 0u64;
    for count in counts.values() {
        if *count != 1 {
            duplicates += count - 1;
        }
    }
    let missing = total - counts.len() as u64;

    println!("  Elapsed:     {:.1} ms", watch.elapsed_ms());
    println!("  Delivered:   {}", counts.len());
    println!("  Missing:     {}", missing);
    println!("  Duplicates:  {}", duplicates);
    println!("  Queue len:   {} (expect 0)", queue.len());

    assert_eq!(missing, 0, "values lost under contention");
    assert_eq!(duplicates, 0, "values delivered twice");
    println!("  OK\n");
}

/// Submit a pile of randomized multiplications and verify every product
fn pool_soak(kind: QueueKind) {
    const TASKS: usize = 10_000;

    println!("Pool soak: {} queue, {} tasks", kind, TASKS);

    let mut pool = WorkerPool::new(
        PoolConfig::from_env()
            .num_workers(16)
            .queue(kind)
            .ring_capacity(TASKS),
    )
    .expect("pool construction");
    pool.init().expect("pool init");

    let mut rng = RandInt::new(1, 1000);
    let watch = Stopwatch::start();

    let mut expected = Vec::with_capacity(TASKS);
    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let a = rng.next();
        let b = rng.next();
        expected.push(a * b);
        handles.push(pool.submit(move || a * b).expect("submit"));
    }

    for (handle, want) in handles.into_iter().zip(expected) {
        assert_eq!(handle.result(), Ok(want));
    }

    pool.shutdown().expect("shutdown");
    assert_eq!(pool.active_workers(), 0);

    println!("  Elapsed:     {:.1} ms", watch.elapsed_ms());
    println!(
        "  Throughput:  {:.0} tasks/sec",
        TASKS as f64 / watch.elapsed().as_secs_f64()
    );
    println!("  OK");
}
