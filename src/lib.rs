//! Taskhub - A task tracking backend
//!
//! Task records in a key-value table, a TTL cache sharing that table,
//! pre-signed attachment URLs and a cached view of an external users API.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod external;
pub mod models;
pub mod objects;
pub mod startup;
pub mod storage;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
