use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::{Condvar, Mutex};
use crate::pool::worker::{PoolConfig, PoolWorker};

/// Outcome of a submit; a rejected job comes back to the caller so it can
/// be disposed of (the acceptor resets rejected connections).
pub enum SubmitResult<J> {
    Accepted,
    Rejected(J),
}

impl<J> SubmitResult<J> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitResult::Accepted)
    }
}

/// Accounting treated as a unit: dequeue and busy-increment move together
/// under this lock, so the "all workers busy" test in submit stays honest.
struct Counts {
    live: usize,
    busy: usize,
    /// Jobs sent but not yet claimed by a worker.
    queued: usize,
}

struct Shared<J> {
    counts: Mutex<Counts>,
    /// Signaled when a worker goes idle or capacity reappears.
    idle: Condvar,
    workers: Mutex<HashMap<usize, JoinHandle<()>>>,
    jobs_rx: Receiver<J>,
    shutdown: AtomicBool,
}

/// Dynamically-sized worker-thread pool over a FIFO task queue.
///
/// Holds between `min_threads` and `max_threads` workers. The minimum set
/// is created by the constructor and waits for work indefinitely; workers
/// grown past the minimum wait with a timeout and remove themselves once
/// it expires. Dropping the pool disconnects the queue and joins every
/// remaining worker; per-worker self-removal is suppressed during that
/// bulk teardown.
pub struct ThreadPool<W: PoolWorker> {
    shared: Arc<Shared<W::Job>>,
    /// Taken (and thereby disconnected) on drop.
    jobs_tx: Mutex<Option<Sender<W::Job>>>,
    prototype: W,
    config: PoolConfig,
    next_id: AtomicUsize,
}

impl<W: PoolWorker> ThreadPool<W> {
    pub fn new(prototype: W, config: PoolConfig) -> Self {
        let (jobs_tx, jobs_rx) = unbounded();
        let shared = Arc::new(Shared {
            counts: Mutex::new(Counts {
                live: 0,
                busy: 0,
                queued: 0,
            }),
            idle: Condvar::new(),
            workers: Mutex::new(HashMap::new()),
            jobs_rx,
            shutdown: AtomicBool::new(false),
        });

        let pool = ThreadPool {
            shared,
            jobs_tx: Mutex::new(Some(jobs_tx)),
            prototype,
            config,
            next_id: AtomicUsize::new(0),
        };

        {
            let mut counts = pool.shared.counts.lock();
            counts.live = pool.config.min_threads;
        }
        for _ in 0..pool.config.min_threads {
            pool.spawn_worker(false);
        }
        pool
    }

    /// Hand a job to the pool.
    ///
    /// Enqueues when a worker is idle; grows a new worker when none is and
    /// the pool is below `max_threads`; otherwise blocks for capacity if
    /// asked to, or hands the job straight back.
    pub fn submit(&self, job: W::Job, blocking: bool) -> SubmitResult<W::Job> {
        let mut counts = self.shared.counts.lock();
        loop {
            if self.shared.shutdown.load(Ordering::SeqCst) {
                return SubmitResult::Rejected(job);
            }

            let idle = counts.live.saturating_sub(counts.busy);
            if counts.queued < idle {
                counts.queued += 1;
                drop(counts);
                return self.send(job);
            }

            if counts.live < self.config.max_threads {
                counts.live += 1;
                let extra = counts.live > self.config.min_threads;
                drop(counts);
                self.spawn_worker(extra);
                // The fresh worker counts as idle; re-run the check so the
                // job goes through the same enqueue-and-signal path.
                counts = self.shared.counts.lock();
                continue;
            }

            if !blocking {
                return SubmitResult::Rejected(job);
            }
            self.shared.idle.wait(&mut counts);
        }
    }

    fn send(&self, job: W::Job) -> SubmitResult<W::Job> {
        let tx = self.jobs_tx.lock();
        let job = match tx.as_ref() {
            Some(tx) => match tx.send(job) {
                Ok(()) => return SubmitResult::Accepted,
                Err(err) => err.0,
            },
            // The sender is only gone once teardown has started.
            None => job,
        };
        self.shared.counts.lock().queued -= 1;
        SubmitResult::Rejected(job)
    }

    fn spawn_worker(&self, extra: bool) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut worker = self.prototype.clone();
        let shared = Arc::clone(&self.shared);
        let min_threads = self.config.min_threads;
        let idle_timeout = self.config.idle_timeout;

        let handle = thread::spawn(move || {
            loop {
                let job = if extra {
                    match shared.jobs_rx.recv_timeout(idle_timeout) {
                        Ok(job) => job,
                        Err(RecvTimeoutError::Disconnected) => return,
                        Err(RecvTimeoutError::Timeout) => {
                            // Bulk teardown owns the worker set; never
                            // self-remove while it runs.
                            if shared.shutdown.load(Ordering::SeqCst) {
                                return;
                            }
                            // Re-validate under the lock: the set may have
                            // shrunk to the floor while this worker slept.
                            let mut counts = shared.counts.lock();
                            if counts.live > min_threads {
                                counts.live -= 1;
                                drop(counts);
                                shared.idle.notify_all();
                                shared.workers.lock().remove(&id);
                                return;
                            }
                            continue;
                        }
                    }
                } else {
                    match shared.jobs_rx.recv() {
                        Ok(job) => job,
                        Err(_) => return,
                    }
                };

                {
                    let mut counts = shared.counts.lock();
                    counts.queued -= 1;
                    counts.busy += 1;
                }
                worker.run(job);
                {
                    let mut counts = shared.counts.lock();
                    counts.busy -= 1;
                }
                shared.idle.notify_all();
            }
        });

        self.shared.workers.lock().insert(id, handle);
    }

    /// Live worker count, including busy ones.
    pub fn live_workers(&self) -> usize {
        self.shared.counts.lock().live
    }

    pub fn busy_workers(&self) -> usize {
        self.shared.counts.lock().busy
    }
}

impl<W: PoolWorker> Drop for ThreadPool<W> {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        // Disconnect the queue; idle workers see it and exit.
        self.jobs_tx.lock().take();
        self.shared.idle.notify_all();

        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.shared.workers.lock();
            workers.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[derive(Clone)]
    struct CountingWorker {
        done: Arc<AtomicU32>,
    }

    impl PoolWorker for CountingWorker {
        type Job = Duration;

        fn run(&mut self, job: Duration) {
            thread::sleep(job);
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn runs_submitted_jobs() {
        let done = Arc::new(AtomicU32::new(0));
        let pool = ThreadPool::new(
            CountingWorker { done: done.clone() },
            PoolConfig::new(1, 2, Duration::from_millis(50)),
        );
        for _ in 0..4 {
            assert!(pool.submit(Duration::from_millis(1), true).is_accepted());
        }
        drop(pool); // joins workers
        assert_eq!(done.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn constructor_builds_the_minimum_set() {
        let done = Arc::new(AtomicU32::new(0));
        let pool = ThreadPool::new(
            CountingWorker { done },
            PoolConfig::new(3, 5, Duration::from_secs(5)),
        );
        assert_eq!(pool.live_workers(), 3);
    }
}
