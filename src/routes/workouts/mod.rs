mod handler;
mod model;

pub use handler::{create_workout, delete_workout, get_workout, list_workouts, update_workout};
pub use model::{Workout, WorkoutDetail};
