//! Concurrent access tests for the state lock
//!
//! Each thread opens its own lock handle, which is how separate processes
//! see the lock, and performs an unguarded read-modify-write inside it.

use ah_fs::{Error, LockConfig, StateLayout, StateLock, with_lock};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn concurrent_read_modify_write_loses_no_updates() {
    let dir = tempdir().unwrap();
    let layout = Arc::new(StateLayout::new(dir.path()));
    let counter = dir.path().join("counter");
    fs::write(&counter, "0").unwrap();

    let num_threads = 8;
    let increments = 25;
    let barrier = Arc::new(Barrier::new(num_threads));
    let config = LockConfig::with_timeout(Duration::from_secs(20));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let layout = Arc::clone(&layout);
            let barrier = Arc::clone(&barrier);
            let counter = counter.clone();

            thread::spawn(move || {
                barrier.wait();
                for _ in 0..increments {
                    with_lock(&layout, &config, || -> Result<(), Error> {
                        let value: u32 = fs::read_to_string(&counter).unwrap().parse().unwrap();
                        thread::yield_now();
                        fs::write(&counter, (value + 1).to_string()).unwrap();
                        Ok(())
                    })
                    .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    let total: usize = fs::read_to_string(&counter).unwrap().parse().unwrap();
    assert_eq!(total, num_threads * increments);
}

#[test]
fn lock_is_released_for_the_next_waiter() {
    let dir = tempdir().unwrap();
    let layout = StateLayout::new(dir.path());
    let lock = StateLock::new(&layout, LockConfig::with_timeout(Duration::from_secs(5)));

    let guard = lock.acquire().unwrap();
    let waiter_layout = layout.clone();
    let waiter = thread::spawn(move || {
        StateLock::new(&waiter_layout, LockConfig::with_timeout(Duration::from_secs(5)))
            .acquire()
            .map(|_| ())
    });

    thread::sleep(Duration::from_millis(100));
    drop(guard);

    waiter.join().unwrap().expect("waiter should acquire after release");
}

#[test]
fn lock_timeout_is_respected() {
    let dir = tempdir().unwrap();
    let layout = StateLayout::new(dir.path());
    let holder = StateLock::new(&layout, LockConfig::default());
    let _held = holder.acquire().unwrap();

    let impatient = StateLock::new(
        &layout,
        LockConfig {
            timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(10),
        },
    );
    let result = impatient.acquire();

    assert!(
        matches!(result, Err(Error::LockFailed { .. })),
        "acquire should fail while the lock is held"
    );
}
