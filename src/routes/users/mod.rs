mod handler;
mod model;

pub use handler::{complete_onboarding, update_profile};
pub use model::{USER_COLUMNS, User, UserInfo};
