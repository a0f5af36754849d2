//! API Routes
//!
//! Configures the Axum router with all task service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    attachment_handler, create_task_handler, delete_task_handler, get_task_handler,
    get_user_handler, health_handler, list_tasks_handler, list_users_handler, not_found_handler,
    stats_handler, update_task_handler, upload_url_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /tasks` - Create a task, optionally with an upload target
/// - `GET /tasks` - List all tasks
/// - `GET /tasks/:id` - Fetch one task
/// - `PUT /tasks/:id` - Patch a task
/// - `DELETE /tasks/:id` - Delete a task and its attachment
/// - `POST /tasks/upload` - Mint a standalone upload target
/// - `GET /tasks/:id/attachment` - Download URL for a task's attachment
/// - `GET /users` - Cached external users collection
/// - `GET /users/:id` - One external user
/// - `GET /cache/stats` - Cache counters
/// - `GET /health` - Health check endpoint
///
/// Any other path answers 404 with the error envelope.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks", post(create_task_handler).get(list_tasks_handler))
        .route("/tasks/upload", post(upload_url_handler))
        .route(
            "/tasks/:id",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/:id/attachment", get(attachment_handler))
        .route("/users", get(list_users_handler))
        .route("/users/:id", get(get_user_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
