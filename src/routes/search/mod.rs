mod generator;
mod handler;

pub use generator::{GeneratedAcronym, generate_acronyms};
pub use handler::search;
