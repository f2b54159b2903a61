mod handler;

pub use handler::{RateLimitStatusResponse, rate_limit_status, test_rate_limit};
