mod handler;
pub(crate) mod model;

pub use handler::log_activity;
