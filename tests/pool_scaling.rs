use std::thread;
use std::time::{Duration, Instant};
use skald::pool::{PoolConfig, PoolWorker, SubmitResult, ThreadPool};

#[derive(Clone)]
struct SleepWorker;

impl PoolWorker for SleepWorker {
    type Job = Duration;

    fn run(&mut self, job: Duration) {
        thread::sleep(job);
    }
}

#[test]
fn pool_grows_to_max_and_shrinks_back_to_min() {
    let pool = ThreadPool::new(
        SleepWorker,
        PoolConfig::new(2, 4, Duration::from_millis(100)),
    );
    assert_eq!(pool.live_workers(), 2);

    let mut rejected = 0;
    for _ in 0..12 {
        if !pool.submit(Duration::from_millis(400), false).is_accepted() {
            rejected += 1;
        }
        assert!(pool.live_workers() <= 4, "pool grew past its maximum");
    }
    // Saturation was reached, so growth stopped at the cap.
    assert!(rejected > 0);
    assert_eq!(pool.live_workers(), 4);

    // Once the work drains and the idle timeout passes, the extra workers
    // remove themselves down to the minimum.
    let deadline = Instant::now() + Duration::from_secs(5);
    while pool.live_workers() > 2 {
        assert!(Instant::now() < deadline, "pool never shrank back");
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(pool.live_workers(), 2);
}

#[test]
fn saturated_pool_rejects_without_blocking() {
    let pool = ThreadPool::new(
        SleepWorker,
        PoolConfig::new(1, 1, Duration::from_secs(5)),
    );
    assert!(pool.submit(Duration::from_millis(500), false).is_accepted());

    let start = Instant::now();
    let result = pool.submit(Duration::from_millis(500), false);
    assert!(start.elapsed() < Duration::from_millis(100));
    match result {
        SubmitResult::Rejected(job) => assert_eq!(job, Duration::from_millis(500)),
        SubmitResult::Accepted => panic!("saturated pool accepted a job"),
    }
}
