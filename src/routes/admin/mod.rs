mod handler;
mod model;

pub use handler::{admin_setup, delete_user, get_user_detail, list_users, update_user};
