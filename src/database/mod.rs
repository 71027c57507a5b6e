pub mod delete;
pub mod pool;
pub mod schema;

pub use delete::{delete_by_id, Deletable, DeletionPolicy};
pub use pool::Database;
