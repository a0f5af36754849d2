//! API Handlers
//!
//! HTTP request handlers for each task service endpoint. Handlers validate
//! input, call the core, and turn "absent" results into 404s.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    Json,
};

use crate::cache::CacheLayer;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::external::{ExternalGateway, RemoteSource, User};
use crate::models::{
    ApiResponse, CreateTaskRequest, DeleteData, DownloadData, HealthResponse, StatsResponse,
    UpdateTaskRequest, UploadRequest,
};
use crate::objects::{InMemoryObjectStore, ObjectGateway, ObjectLocation, ObjectStore, LOCAL_ENDPOINT};
use crate::storage::{InMemoryTable, KvTable};
use crate::tasks::{Task, TaskService, TaskStore, TaskWithUpload, UploadTicket};

/// Application state shared across all handlers.
///
/// Every collaborator is built once at startup and shared by clone.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: ExternalGateway,
    pub cache: CacheLayer,
}

impl AppState {
    /// Wires the components on top of the given backends.
    pub fn new(
        config: &Config,
        table: Arc<dyn KvTable>,
        objects: Arc<dyn ObjectStore>,
        source: Arc<dyn RemoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let location = ObjectLocation {
            bucket: config.bucket_name.clone(),
            region: config.aws_region.clone(),
        };
        let store = TaskStore::new(table.clone(), clock.clone());
        let gateway = ObjectGateway::new(objects, location, clock.clone());
        let cache = CacheLayer::new(table, clock);

        Self {
            tasks: TaskService::new(store, gateway),
            users: ExternalGateway::new(source, cache.clone(), config.api_cache_ttl),
            cache,
        }
    }

    /// Wires the components on process-local table and object store.
    pub fn in_memory(config: &Config, source: Arc<dyn RemoteSource>, clock: Arc<dyn Clock>) -> Self {
        let objects = Arc::new(InMemoryObjectStore::new(
            LOCAL_ENDPOINT,
            config.bucket_name.clone(),
            clock.clone(),
        ));
        Self::new(config, Arc::new(InMemoryTable::new()), objects, source, clock)
    }
}

fn task_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Task with ID {} not found", id))
}

fn validated(error: Option<String>) -> Result<()> {
    match error {
        Some(msg) => Err(AppError::Validation(msg)),
        None => Ok(()),
    }
}

/// Handler for POST /tasks
pub async fn create_task_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaskWithUpload>>)> {
    let Json(req) = payload?;
    validated(req.validate())?;

    let upload_type = req.upload_type().map(str::to_string);
    let created = state
        .tasks
        .create(req.into_new_task(), upload_type.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// Handler for GET /tasks
pub async fn list_tasks_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Task>>>> {
    let tasks = state.tasks.list().await?;
    Ok(Json(ApiResponse::list(tasks)))
}

/// Handler for GET /tasks/:id
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = state
        .tasks
        .get_by_id(&id)
        .await?
        .ok_or_else(|| task_not_found(&id))?;
    Ok(Json(ApiResponse::ok(task)))
}

/// Handler for PUT /tasks/:id
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TaskWithUpload>>> {
    let Json(req) = payload?;
    validated(req.validate())?;

    let upload_type = req.upload_type().map(str::to_string);
    let updated = state
        .tasks
        .update(&id, req.into_patch(), upload_type.as_deref())
        .await?
        .ok_or_else(|| task_not_found(&id))?;

    Ok(Json(ApiResponse::ok(updated)))
}

/// Handler for DELETE /tasks/:id
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteData>>> {
    let outcome = state.tasks.delete(&id).await?;
    if !outcome.removed {
        return Err(task_not_found(&id));
    }

    let data = DeleteData {
        attachment: outcome.attachment,
    };
    Ok(Json(
        ApiResponse::ok(data).with_message(format!("Task with ID {} deleted successfully", id)),
    ))
}

/// Handler for POST /tasks/upload
pub async fn upload_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UploadTicket>>> {
    let Json(req) = payload?;
    validated(req.validate())?;

    let file_type = req.file_type.unwrap_or_default();
    let ticket = state.tasks.upload_ticket(&file_type).await?;
    Ok(Json(ApiResponse::ok(ticket)))
}

/// Handler for GET /tasks/:id/attachment
pub async fn attachment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DownloadData>>> {
    let download_url = state
        .tasks
        .download_url(&id)
        .await?
        .ok_or_else(|| task_not_found(&id))?;
    Ok(Json(ApiResponse::ok(DownloadData { download_url })))
}

/// Handler for GET /users
pub async fn list_users_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = state.users.list_all().await?;
    Ok(Json(ApiResponse::list(users)))
}

/// Handler for GET /users/:id
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>> {
    let id: u64 = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID, must be a number".to_string()))?;

    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::RemoteNotFound(format!("User with ID {} not found", id)))?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for unmatched routes
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("Resource not found - {}", uri))
}
