mod handler;
pub(crate) mod model;

pub use handler::{create_acronym, delete_acronym, list_acronyms, trending_acronyms};
pub use model::Acronym;
