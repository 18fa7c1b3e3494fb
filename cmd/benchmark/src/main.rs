//! Benchmark suite for workq
//!
//! Measures queue throughput (single-threaded and 4x4 MPMC) for the three
//! variants, with crossbeam-queue as the ecosystem baseline, then the
//! pool's submit/await round-trip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_queue::{ArrayQueue, SegQueue};
use workq::{
    new_work_queue, PoolConfig, QueueKind, Stopwatch, WorkQueue, WorkerPool,
};

const SINGLE_OPS: u64 = 1_000_000;
const MPMC_THREADS: u64 = 4;
const MPMC_PER_THREAD: u64 = 250_000;

fn main() {
    println!("=== workq benchmarks ===\n");

    bench_single_thread();
    bench_mpmc();
    bench_pool();

    println!("\n=== benchmarks complete ===");
}

fn report(name: &str, ops: u64, ms: f64) {
    println!(
        "  {:<24} {:>10.1} ms  {:>12.0} ops/sec",
        name,
        ms,
        ops as f64 / (ms / 1000.0)
    );
}

/// Alternating push/pop on one thread
fn bench_single_thread() {
    println!("Benchmark: single-thread push/pop ({} pairs)", SINGLE_OPS);
    println!("{}", "-".repeat(60));

    for kind in [
        QueueKind::Blocking,
        QueueKind::LockFreeList,
        QueueKind::LockFreeRing,
    ] {
        let queue = new_work_queue::<u64>(kind, 1024).unwrap();
        let watch = Stopwatch::start();
        for i in 0..SINGLE_OPS {
            queue.push(i).unwrap();
            queue.pop();
        }
        report(&format!("workq {}", kind), SINGLE_OPS * 2, watch.elapsed_ms());
    }

    // Ecosystem baselines
    let baseline = ArrayQueue::new(1024);
    let watch = Stopwatch::start();
    for i in 0..SINGLE_OPS {
        let _ = baseline.push(i);
        baseline.pop();
    }
    report("crossbeam ArrayQueue", SINGLE_OPS * 2, watch.elapsed_ms());

    let baseline = SegQueue::new();
    let watch = Stopwatch::start();
    for i in 0..SINGLE_OPS {
        baseline.push(i);
        baseline.pop();
    }
    report("crossbeam SegQueue", SINGLE_OPS * 2, watch.elapsed_ms());
    println!();
}

fn run_mpmc<Q: WorkQueue<u64> + 'static>(queue: Arc<Q>) -> f64 {
    let done = Arc::new(AtomicBool::new(false));
    let watch = Stopwatch::start();

    let mut handles = Vec::new();
    for t in 0..MPMC_THREADS {
        let queue = Arc::clone(&queue);
        handles.push(thread::spawn(move || {
            for j in 0..MPMC_PER_THREAD {
                while queue.push(t * MPMC_PER_THREAD + j).is_err() {
                    thread::yield_now();
                }
            }
        }));
    }
    for _ in 0..MPMC_THREADS {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        handles.push(thread::spawn(move || {
            loop {
                match queue.pop() {
                    Some(_) => {}
                    None => {
                        if done.load(Ordering::Acquire) && queue.is_empty() {
                            break;
                        }
                        thread::yield_now();
                    }
                }
            }
        }));
    }

    // Producers finish first; consumers drain and exit
    for h in handles.drain(..MPMC_THREADS as usize) {
        h.join().unwrap();
    }
    done.store(true, Ordering::Release);
    for h in handles {
        h.join().unwrap();
    }

    watch.elapsed_ms()
}

/// 4 producers vs 4 consumers
fn bench_mpmc() {
    let total = MPMC_THREADS * MPMC_PER_THREAD;
    println!(
        "Benchmark: {}x{} MPMC ({} values)",
        MPMC_THREADS, MPMC_THREADS, total
    );
    println!("{}", "-".repeat(60));

    let ms = run_mpmc(Arc::new(workq::BlockingQueue::new()));
    report("workq blocking", total, ms);

    let ms = run_mpmc(Arc::new(workq::ListQueue::new()));
    report("workq list", total, ms);

    let ms = run_mpmc(Arc::new(workq::RingQueue::new(65536).unwrap()));
    report("workq ring", total, ms);
    println!();
}

/// Submit/await round-trips through the pool
fn bench_pool() {
    const TASKS: usize = 100_000;

    println!("Benchmark: pool submit/await ({} tasks)", TASKS);
    println!("{}", "-".repeat(60));

    for kind in [
        QueueKind::Blocking,
        QueueKind::LockFreeList,
        QueueKind::LockFreeRing,
    ] {
        let mut pool = WorkerPool::new(
            PoolConfig::from_env()
                .num_workers(4)
                .queue(kind)
                .ring_capacity(TASKS),
        )
        .unwrap();
        pool.init().unwrap();

        let watch = Stopwatch::start();
        let handles: Vec<_> = (0..TASKS)
            .map(|i| pool.submit(move || i as u64 * 2).unwrap())
            .collect();
        for handle in handles {
            handle.result().unwrap();
        }
        report(&format!("pool {}", kind), TASKS as u64, watch.elapsed_ms());

        pool.shutdown().unwrap();
    }
}
