mod handler;
mod model;

pub use handler::{create_exercise, get_exercise, list_exercises};
pub use model::Exercise;
