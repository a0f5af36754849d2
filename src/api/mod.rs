//! API Module
//!
//! HTTP handlers and routing for the task service REST API.
//!
//! # Endpoints
//! - `/tasks` and `/tasks/:id` - Task CRUD
//! - `/tasks/upload`, `/tasks/:id/attachment` - Attachment URLs
//! - `/users`, `/users/:id` - External users, cached
//! - `/cache/stats` - Cache counters
//! - `/health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
