mod handler;
mod model;
pub mod stats;

pub use handler::{create_entry, delete_entry, get_summary, list_entries};
pub use model::ProgressEntry;
