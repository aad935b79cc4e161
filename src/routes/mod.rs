pub mod admin;
pub mod auth;
pub mod exercises;
pub mod goals;
pub mod progress;
pub mod sessions;
pub mod spotify;
pub mod users;
pub mod workouts;
