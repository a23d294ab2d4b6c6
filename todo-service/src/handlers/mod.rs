pub mod health;
pub mod home;
pub mod todos;

pub use health::{health_check, metrics_endpoint};
pub use home::home;
pub use todos::{create_todo, delete_todo, list_todos, update_todo};
