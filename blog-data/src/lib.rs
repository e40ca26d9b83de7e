pub mod entity;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod repository;
pub mod store;

pub use entity::Entity;
pub use error::DataError;
pub use memory::InMemoryStore;
pub use mongo::{MongoConnector, MongoStore};
pub use query::Query;
pub use repository::Repository;
pub use store::DocumentStore;

pub use mongodb::bson;
