// 每日限流
// 每个用户每个自然日一条计数记录

pub mod clock;
pub mod limiter;
pub mod memory_store;
pub mod pg_store;
pub mod redis_store;
pub mod store;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{RateLimitOutcome, RateLimiter};
pub use memory_store::MemoryRateLimitStore;
pub use pg_store::PgRateLimitStore;
pub use redis_store::RedisRateLimitStore;
pub use store::{RateLimitRecord, RateLimitStore, StoreError};
pub use window::Window;
