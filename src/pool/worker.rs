use std::time::Duration;

/// Per-task behavior for a pool worker.
///
/// The pool is handed one prototype; every worker thread it ever creates
/// runs a clone of that prototype, including the initial minimum set built
/// synchronously by the constructor.
pub trait PoolWorker: Send + Clone + 'static {
    type Job: Send + 'static;

    fn run(&mut self, job: Self::Job);
}

/// Pool sizing and shrink behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_threads: usize,
    pub max_threads: usize,
    /// How long a worker above the minimum waits idle before removing
    /// itself from the pool.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            min_threads: 2,
            max_threads: num_cpus::get().max(2),
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolConfig {
    pub fn new(min_threads: usize, max_threads: usize, idle_timeout: Duration) -> Self {
        PoolConfig {
            min_threads: min_threads.max(1),
            max_threads: max_threads.max(min_threads.max(1)),
            idle_timeout,
        }
    }
}
