//! Request throttling and retry configuration.

mod queue;
mod retry;

pub use queue::QueueStats;
pub use queue::RequestQueue;
pub use retry::RetryConfig;
