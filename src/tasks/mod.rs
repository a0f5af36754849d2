//! Tasks Module
//!
//! The task entity, its store, and the service that ties tasks to their
//! attachments.

mod model;
mod service;
mod store;

pub use model::{NewTask, Task, TaskPatch, TaskStatus};
pub use service::{AttachmentCleanup, DeleteOutcome, TaskService, TaskWithUpload, UploadTicket};
pub use store::TaskStore;
