mod handler;
mod model;

pub use handler::{get_goals, update_goals};
pub use model::{FitnessGoal, GOAL_VOCABULARY, validate_goals};
