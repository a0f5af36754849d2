//! External Data Module
//!
//! Read-only access to a remote users collection, memoized by the cache layer.

mod gateway;
mod model;
mod source;

pub use gateway::{ExternalGateway, USERS_CACHE_KEY};
pub use model::User;
pub use source::{HttpRemoteSource, RemoteError, RemoteSource};
