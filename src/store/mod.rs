//! Persistence layer: the key-value store that stands in for browser
//! local storage.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, keys};
