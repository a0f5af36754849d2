//! Task Service Module
//!
//! Combines the task store with the object gateway: upload targets are minted
//! before a task is written, and attachments are cleaned up after a task is
//! deleted.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::objects::{ObjectGateway, UploadTarget};
use crate::tasks::{NewTask, Task, TaskPatch, TaskStore};

// == Result Types ==
/// A written task plus the upload target minted for it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithUpload {
    pub task: Task,
    #[serde(flatten)]
    pub upload: Option<UploadTarget>,
}

/// Outcome of the attachment cleanup that follows a task deletion.
///
/// A failure here never undoes or blocks the deletion itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "kebab-case")]
pub enum AttachmentCleanup {
    /// The task had no attachment
    NotNeeded,
    /// The object with this key was deleted
    Deleted(String),
    /// Deletion failed and was ignored
    Failed(String),
}

/// Result of [`TaskService::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: bool,
    pub attachment: AttachmentCleanup,
}

/// Standalone upload target with the public URL the object will have.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    #[serde(flatten)]
    pub target: UploadTarget,
    pub file_url: String,
}

// == Task Service ==
#[derive(Clone)]
pub struct TaskService {
    store: TaskStore,
    objects: ObjectGateway,
}

impl TaskService {
    pub fn new(store: TaskStore, objects: ObjectGateway) -> Self {
        Self { store, objects }
    }

    // == Create ==
    /// Creates a task, first minting an upload target when `upload_type`
    /// is given and recording its public URL as `file_url`.
    pub async fn create(&self, mut data: NewTask, upload_type: Option<&str>) -> Result<TaskWithUpload> {
        let upload = self.mint(upload_type).await?;
        if let Some(target) = &upload {
            data.file_url = Some(self.objects.public_url(&target.file_key));
        }

        let task = self.store.create(data).await?;
        Ok(TaskWithUpload { task, upload })
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        self.store.get_by_id(id).await
    }

    // == Update ==
    /// Applies `patch`, with the same upload handling as [`Self::create`].
    ///
    /// Returns `None` if the task does not exist. An upload target may
    /// already have been minted by then; it is simply never used.
    pub async fn update(
        &self,
        id: &str,
        mut patch: TaskPatch,
        upload_type: Option<&str>,
    ) -> Result<Option<TaskWithUpload>> {
        let upload = self.mint(upload_type).await?;
        if let Some(target) = &upload {
            patch.file_url = Some(self.objects.public_url(&target.file_key));
        }

        let task = self.store.update(id, patch).await?;
        Ok(task.map(|task| TaskWithUpload { task, upload }))
    }

    // == Delete ==
    /// Deletes a task, then makes one attempt to delete its attachment.
    ///
    /// Cleanup only runs once the row is gone. Attachments outside this
    /// service's bucket are never touched.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let Some(task) = self.store.get_by_id(id).await? else {
            return Ok(DeleteOutcome {
                removed: false,
                attachment: AttachmentCleanup::NotNeeded,
            });
        };

        let removed = self.store.delete(id).await?;
        if !removed {
            return Ok(DeleteOutcome {
                removed,
                attachment: AttachmentCleanup::NotNeeded,
            });
        }

        let attachment = match task.file_url.as_deref() {
            Some(file_url) if self.objects.owns(file_url) => {
                match self.objects.delete(file_url).await {
                    Ok(key) => AttachmentCleanup::Deleted(key),
                    Err(e) => {
                        warn!("Failed to delete file for task {}: {}", id, e);
                        AttachmentCleanup::Failed(e.to_string())
                    }
                }
            }
            Some(file_url) => {
                debug!(id, file_url, "attachment is not in our bucket, left alone");
                AttachmentCleanup::NotNeeded
            }
            None => AttachmentCleanup::NotNeeded,
        };

        info!(id, ?attachment, "task deleted");
        Ok(DeleteOutcome { removed, attachment })
    }

    // == Upload Ticket ==
    /// Mints an upload target not yet tied to any task.
    pub async fn upload_ticket(&self, content_type: &str) -> Result<UploadTicket> {
        let target = self.objects.generate_upload_target(content_type).await?;
        let file_url = self.objects.public_url(&target.file_key);
        Ok(UploadTicket { target, file_url })
    }

    // == Download Target ==
    /// Read URL for the task's attachment. `None` if the task is absent.
    pub async fn download_url(&self, id: &str) -> Result<Option<String>> {
        let Some(task) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };
        let file_url = task
            .file_url
            .ok_or_else(|| AppError::NotFound(format!("Task with ID {} has no attachment", id)))?;

        let key = crate::objects::key_from(&file_url)?;
        let url = self.objects.generate_download_target(key).await?;
        Ok(Some(url))
    }

    async fn mint(&self, upload_type: Option<&str>) -> Result<Option<UploadTarget>> {
        match upload_type {
            Some(content_type) => Ok(Some(self.objects.generate_upload_target(content_type).await?)),
            None => Ok(None),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::objects::{InMemoryObjectStore, ObjectLocation, ObjectStore, ObjectStoreError};
    use crate::storage::{InMemoryTable, KvTable, TableError};
    use crate::tasks::TaskStatus;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn location() -> ObjectLocation {
        ObjectLocation {
            bucket: "task-attachments".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    fn service_with(objects: Arc<dyn ObjectStore>) -> TaskService {
        service_on(Arc::new(InMemoryTable::new()), objects)
    }

    fn service_on(table: Arc<dyn KvTable>, objects: Arc<dyn ObjectStore>) -> TaskService {
        let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
        let store = TaskStore::new(table, clock.clone());
        TaskService::new(store, ObjectGateway::new(objects, location(), clock))
    }

    /// Table that reads and writes normally but cannot delete rows.
    #[derive(Default)]
    struct UndeletableTable {
        inner: InMemoryTable,
    }

    #[async_trait]
    impl KvTable for UndeletableTable {
        async fn get(&self, id: &str) -> std::result::Result<Option<Value>, TableError> {
            self.inner.get(id).await
        }

        async fn put(&self, id: &str, item: Value) -> std::result::Result<(), TableError> {
            self.inner.put(id, item).await
        }

        async fn scan(&self) -> std::result::Result<Vec<(String, Value)>, TableError> {
            self.inner.scan().await
        }

        async fn delete(&self, id: &str) -> std::result::Result<bool, TableError> {
            Err(TableError::backend(id, "throttled"))
        }
    }

    fn memory_service() -> (TaskService, Arc<InMemoryObjectStore>) {
        let objects = Arc::new(InMemoryObjectStore::new(
            "http://localhost:4566",
            "task-attachments",
            Arc::new(ManualClock::default()),
        ));
        (service_with(objects.clone()), objects)
    }

    /// Presigns fine, refuses every deletion, counts deletion attempts.
    #[derive(Default)]
    struct RefusingDeletes {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for RefusingDeletes {
        async fn presign_put(
            &self,
            key: &str,
            _content_type: &str,
            _expires_in: Duration,
        ) -> std::result::Result<String, ObjectStoreError> {
            Ok(format!("https://upload.test/{}", key))
        }

        async fn presign_get(
            &self,
            key: &str,
            _expires_in: Duration,
        ) -> std::result::Result<String, ObjectStoreError> {
            Ok(format!("https://download.test/{}", key))
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), ObjectStoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(ObjectStoreError::Provider("access denied".into()))
        }
    }

    /// Refuses to presign anything.
    struct NoPresign;

    #[async_trait]
    impl ObjectStore for NoPresign {
        async fn presign_put(
            &self,
            _key: &str,
            _content_type: &str,
            _expires_in: Duration,
        ) -> std::result::Result<String, ObjectStoreError> {
            Err(ObjectStoreError::Provider("expired credentials".into()))
        }

        async fn presign_get(
            &self,
            _key: &str,
            _expires_in: Duration,
        ) -> std::result::Result<String, ObjectStoreError> {
            Err(ObjectStoreError::Provider("expired credentials".into()))
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), ObjectStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_without_upload() {
        let (service, _) = memory_service();

        let created = service.create(NewTask::new("a", "b"), None).await.unwrap();
        assert!(created.upload.is_none());
        assert!(created.task.file_url.is_none());
    }

    #[tokio::test]
    async fn test_create_with_upload_embeds_public_url() {
        let (service, _) = memory_service();

        let created = service
            .create(NewTask::new("a", "b"), Some("image/png"))
            .await
            .unwrap();

        let upload = created.upload.unwrap();
        assert_eq!(
            created.task.file_url.as_deref(),
            Some(format!("https://task-attachments.s3.us-east-1.amazonaws.com/{}", upload.file_key).as_str())
        );
        assert!(upload.upload_url.contains(&upload.file_key));
    }

    #[tokio::test]
    async fn test_create_presign_failure_writes_nothing() {
        let service = service_with(Arc::new(NoPresign));

        let result = service.create(NewTask::new("a", "b"), Some("image/png")).await;

        assert!(matches!(result, Err(AppError::ObjectStorage(_))));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_upload_replaces_file_url() {
        let (service, _) = memory_service();
        let created = service
            .create(NewTask::new("a", "b"), Some("image/png"))
            .await
            .unwrap();

        let updated = service
            .update(&created.task.id, TaskPatch::default(), Some("application/pdf"))
            .await
            .unwrap()
            .unwrap();

        assert_ne!(updated.task.file_url, created.task.file_url);
        assert!(updated
            .task
            .file_url
            .unwrap()
            .ends_with(&updated.upload.unwrap().file_key));
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let (service, _) = memory_service();
        let result = service
            .update("missing", TaskPatch::status(TaskStatus::Completed), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_attachment() {
        let (service, objects) = memory_service();
        let created = service
            .create(NewTask::new("a", "b"), Some("image/png"))
            .await
            .unwrap();
        let key = created.upload.unwrap().file_key;

        let outcome = service.delete(&created.task.id).await.unwrap();

        assert!(outcome.removed);
        assert_eq!(outcome.attachment, AttachmentCleanup::Deleted(key.clone()));
        assert_eq!(objects.deleted_keys().await, vec![key]);
    }

    #[tokio::test]
    async fn test_delete_without_attachment() {
        let (service, objects) = memory_service();
        let created = service.create(NewTask::new("a", "b"), None).await.unwrap();

        let outcome = service.delete(&created.task.id).await.unwrap();

        assert!(outcome.removed);
        assert_eq!(outcome.attachment, AttachmentCleanup::NotNeeded);
        assert!(objects.deleted_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_survives_attachment_failure() {
        let objects = Arc::new(RefusingDeletes::default());
        let service = service_with(objects.clone());
        let created = service
            .create(NewTask::new("a", "b"), Some("text/plain"))
            .await
            .unwrap();

        let outcome = service.delete(&created.task.id).await.unwrap();

        assert!(outcome.removed);
        assert!(matches!(outcome.attachment, AttachmentCleanup::Failed(_)));
        assert_eq!(objects.attempts.load(Ordering::SeqCst), 1);
        assert!(service.get_by_id(&created.task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_row_delete_keeps_attachment() {
        let objects = Arc::new(InMemoryObjectStore::new(
            "http://localhost:4566",
            "task-attachments",
            Arc::new(ManualClock::default()),
        ));
        let service = service_on(Arc::new(UndeletableTable::default()), objects.clone());
        let created = service
            .create(NewTask::new("a", "b"), Some("image/png"))
            .await
            .unwrap();

        let result = service.delete(&created.task.id).await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        let still_there = service.get_by_id(&created.task.id).await.unwrap().unwrap();
        assert_eq!(still_there.file_url, created.task.file_url);
        assert!(objects.deleted_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_ignores_foreign_file_url() {
        let (service, objects) = memory_service();
        let victim = service
            .create(NewTask::new("victim", "b"), Some("image/png"))
            .await
            .unwrap();
        let victim_key = victim.upload.unwrap().file_key;

        let mut attacker = NewTask::new("attacker", "b");
        attacker.file_url = Some(format!("https://evil.example.com/{}", victim_key));
        let attacker = service.create(attacker, None).await.unwrap();

        let outcome = service.delete(&attacker.task.id).await.unwrap();

        assert!(outcome.removed);
        assert_eq!(outcome.attachment, AttachmentCleanup::NotNeeded);
        assert!(objects.deleted_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let (service, objects) = memory_service();

        let outcome = service.delete("missing").await.unwrap();

        assert!(!outcome.removed);
        assert!(objects.deleted_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_ticket() {
        let (service, _) = memory_service();
        let ticket = service.upload_ticket("image/jpeg").await.unwrap();

        assert!(ticket.file_url.ends_with(&ticket.target.file_key));
        let json = serde_json::to_value(&ticket).unwrap();
        assert!(json.get("uploadUrl").is_some());
        assert!(json.get("fileKey").is_some());
        assert!(json.get("fileUrl").is_some());
    }

    #[tokio::test]
    async fn test_download_url() {
        let (service, _) = memory_service();
        let with_file = service
            .create(NewTask::new("a", "b"), Some("image/png"))
            .await
            .unwrap();
        let without_file = service.create(NewTask::new("c", "d"), None).await.unwrap();

        let url = service.download_url(&with_file.task.id).await.unwrap().unwrap();
        assert!(url.contains(&with_file.upload.unwrap().file_key));
        assert!(url.contains("X-Method=GET"));

        assert!(matches!(
            service.download_url(&without_file.task.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.download_url("missing").await.unwrap(), None);
    }

    #[test]
    fn test_cleanup_serialization() {
        let json = serde_json::to_value(AttachmentCleanup::Failed("denied".into())).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["detail"], "denied");

        let json = serde_json::to_value(AttachmentCleanup::NotNeeded).unwrap();
        assert_eq!(json["outcome"], "not-needed");
    }
}
