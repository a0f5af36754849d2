//! Request and Response models for the task service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreateTaskRequest, UpdateTaskRequest, UploadRequest};
pub use responses::{ApiResponse, DeleteData, DownloadData, HealthResponse, StatsResponse};
