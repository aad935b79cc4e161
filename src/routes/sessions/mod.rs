mod handler;
mod model;

pub use handler::{get_session, list_sessions, save_session};
pub use model::{
    SessionDetail, SessionExercise, SessionExerciseDetail, SessionSet, WorkoutSession,
};
