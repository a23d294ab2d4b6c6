pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoTodoStore;
pub use memory::InMemoryTodoStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{DeleteOutcome, InsertOutcome, StoreError, TodoStore, UpdateOutcome};
