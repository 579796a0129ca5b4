//! Threading reference: spawn/join, names, detached threads, locks, a
//! reentrant lock, an event flag, a counting semaphore, a cancellable timer,
//! and thread-local storage.
//!
//! std ships `Mutex`, `Condvar`, `Barrier` and `thread_local!`. The reentrant
//! lock comes from `parking_lot` and the counting semaphore from
//! `tokio::sync`; the event flag is a `Mutex` + `Condvar` pair.
//!
//! Run with: cargo run --bin reference_threading

use colored::Colorize;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use futures::executor::block_on;
use parking_lot::ReentrantMutex;
use rayon::prelude::*;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

// =============================================================================
// Milestone 1: Spawn, join, names
// =============================================================================

pub fn spawn_and_join() -> thread::Result<String> {
    let handle = thread::spawn(|| "Worker is running.".to_string());
    handle.join()
}

pub fn spawn_named(name: &str) -> std::io::Result<Option<String>> {
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(|| thread::current().name().map(str::to_string))?;
    Ok(handle.join().unwrap_or(None))
}

/// A thread nobody joins. It is torn down when `main` returns, the same as
/// a daemon thread.
pub fn spawn_detached(counter: Arc<AtomicUsize>) {
    thread::spawn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
}

// =============================================================================
// Milestone 2: Mutex
// =============================================================================

pub fn shared_counter(threads: usize, increments: usize) -> usize {
    let counter = Arc::new(Mutex::new(0usize));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..increments {
                    // Guard is dropped at the end of each iteration.
                    let mut value = counter.lock().unwrap_or_else(PoisonError::into_inner);
                    *value += 1;
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
    let total = *counter.lock().unwrap_or_else(PoisonError::into_inner);
    total
}

// =============================================================================
// Milestone 3: Reentrant lock
// =============================================================================

/// Locks `lock` `depth` times on the current thread without deadlocking and
/// returns how many nested guards were held at the innermost level.
pub fn nested_locking(lock: &ReentrantMutex<RefCell<usize>>, depth: usize) -> usize {
    if depth == 0 {
        return *lock.lock().borrow();
    }
    let guard = lock.lock();
    *guard.borrow_mut() += 1;
    let innermost = nested_locking(lock, depth - 1);
    *guard.borrow_mut() -= 1;
    innermost
}

// =============================================================================
// Milestone 4: Event flag
// =============================================================================

#[derive(Default)]
pub struct Event {
    flag: Mutex<bool>,
    changed: Condvar,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the flag and wakes every waiter.
    pub fn set(&self) {
        *self.flag() = true;
        self.changed.notify_all();
    }

    pub fn clear(&self) {
        *self.flag() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.flag()
    }

    pub fn wait(&self) {
        let guard = self.flag();
        let _guard = self
            .changed
            .wait_while(guard, |set| !*set)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Returns whether the flag was set before the timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |set| !*set)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// =============================================================================
// Milestone 5: Counting semaphore
// =============================================================================

/// Runs `workers` threads through a semaphore of `limit` permits and returns
/// the highest number of threads seen inside the guarded section at once.
pub fn limited_access(workers: usize, limit: usize, hold: Duration) -> usize {
    let semaphore = Arc::new(Semaphore::new(limit));
    let inside = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let (semaphore, inside, peak) =
                (Arc::clone(&semaphore), Arc::clone(&inside), Arc::clone(&peak));
            thread::spawn(move || {
                let Ok(_permit) = block_on(semaphore.acquire()) else {
                    return;
                };
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(hold);
                inside.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
    peak.load(Ordering::SeqCst)
}

// =============================================================================
// Milestone 6: Cancellable timer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

pub struct Timer {
    state: Arc<Mutex<TimerState>>,
    cancel_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    /// Runs `action` on a background thread once `delay` has elapsed.
    pub fn start<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(Mutex::new(TimerState::Pending));
        let (cancel_tx, cancel_rx) = channel::bounded::<()>(1);

        let worker_state = Arc::clone(&state);
        let handle = thread::spawn(move || {
            let deadline = Instant::now() + delay;
            match cancel_rx.recv_timeout(delay) {
                Ok(()) => return,
                // Dropping the Timer handle does not cancel it.
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()))
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            let mut state = worker_state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != TimerState::Pending {
                return;
            }
            *state = TimerState::Fired;
            drop(state);
            action();
        });

        Self {
            state,
            cancel_tx,
            handle: Some(handle),
        }
    }

    /// Returns `true` when the action was prevented, `false` when it already ran.
    pub fn cancel(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != TimerState::Pending {
            return false;
        }
        *state = TimerState::Cancelled;
        let _ = self.cancel_tx.try_send(());
        true
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// =============================================================================
// Milestone 7: Thread-local storage
// =============================================================================

thread_local! {
    static THREAD_DATA: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub fn thread_local_names(count: usize) -> Vec<String> {
    let handles: Vec<_> = (0..count)
        .map(|i| {
            thread::Builder::new()
                .name(format!("Thread-{}", i + 1))
                .spawn(|| {
                    THREAD_DATA.with(|data| {
                        *data.borrow_mut() = thread::current().name().map(str::to_string);
                    });
                    THREAD_DATA.with(|data| data.borrow().clone().unwrap_or_default())
                })
        })
        .filter_map(Result::ok)
        .collect();

    handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .collect()
}

// =============================================================================
// Milestone 8: Scoped threads and data parallelism
// =============================================================================

/// Scoped threads borrow `data` without `Arc`; all join before the scope ends.
pub fn scoped_sum_and_product(data: &[i64]) -> (i64, i64) {
    thread::scope(|s| {
        let sum = s.spawn(|| data.iter().sum::<i64>());
        let product = s.spawn(|| data.iter().product::<i64>());
        (sum.join().unwrap_or(0), product.join().unwrap_or(0))
    })
}

pub fn parallel_sum_of_squares(data: &[i64]) -> i64 {
    data.par_iter().map(|x| x * x).sum()
}

fn main() {
    println!("{}", "=== spawn / join ===".bold());
    println!("  {:?}", spawn_and_join());
    println!("  named: {:?}", spawn_named("CustomThread").ok().flatten());
    println!("  current: {:?}", thread::current().name());
    println!("  cpus: {}", num_cpus::get());

    let detached = Arc::new(AtomicUsize::new(0));
    spawn_detached(Arc::clone(&detached));

    println!("\n{}", "=== Mutex ===".bold());
    println!("  counter: {}", shared_counter(4, 1000));

    println!("\n{}", "=== reentrant lock ===".bold());
    let rlock = ReentrantMutex::new(RefCell::new(0));
    println!("  depth while nested: {}", nested_locking(&rlock, 3));
    println!("  locked after release: {}", rlock.is_locked());

    println!("\n{}", "=== Event ===".bold());
    let event = Arc::new(Event::new());
    let waiter = {
        let event = Arc::clone(&event);
        thread::spawn(move || {
            println!("  Waiting for event...");
            event.wait();
            println!("  Event triggered!");
        })
    };
    thread::sleep(Duration::from_millis(100));
    event.set();
    let _ = waiter.join();
    event.clear();
    println!("  is_set after clear: {}", event.is_set());

    println!("\n{}", "=== Semaphore ===".bold());
    println!(
        "  peak concurrency with 2 permits: {}",
        limited_access(5, 2, Duration::from_millis(50))
    );

    println!("\n{}", "=== Timer ===".bold());
    let timer = Timer::start(Duration::from_secs(5), || println!("  Action executed after delay."));
    println!("  cancelled: {}", timer.cancel());
    timer.join();

    println!("\n{}", "=== thread_local! ===".bold());
    for name in thread_local_names(3) {
        println!("  Thread-local data: {}", name);
    }

    println!("\n{}", "=== scoped / rayon ===".bold());
    println!("  {:?}", scoped_sum_and_product(&[1, 2, 3, 4, 5]));
    println!("  {}", parallel_sum_of_squares(&[1, 2, 3, 4, 5]));

    println!("\n=== Key Points ===");
    println!("1. Always join threads whose results matter; detached threads die with main");
    println!("2. MutexGuard releases the lock when dropped");
    println!("3. Condvar waits must re-check their condition");
    println!("4. A reentrant mutex lets its owner re-lock; other threads still block");
    println!("5. Semaphore permits are released when the permit is dropped");
    println!("6. Prefer scoped threads for borrowing stack data");
}

// =============================================================================
// Tests
// =============================================================================
