//! Storage Module
//!
//! Key-value table abstraction shared by the task store and the cache layer.
//! Every row is a JSON document addressed by a single string `id`.

#[cfg(feature = "aws")]
mod dynamodb;
mod memory;
mod table;

#[cfg(feature = "aws")]
pub use dynamodb::DynamoDbTable;
pub use memory::InMemoryTable;
pub use table::{KvTable, TableError};
