pub mod pool;
pub mod worker;

pub use pool::{SubmitResult, ThreadPool};
pub use worker::{PoolConfig, PoolWorker};
