//! Task Store Module
//!
//! CRUD over task rows in the shared key-value table.

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::cache::CACHE_KEY_PREFIX;
use crate::clock::Clock;
use crate::error::Result;
use crate::storage::{KvTable, TableError};
use crate::tasks::{NewTask, Task, TaskPatch};

// == Task Store ==
/// Durable CRUD for tasks.
///
/// Updates use read-modify-write: the stored record is merged with the patch
/// in memory and the whole row is overwritten. There is no version check, so
/// concurrent writers resolve last-write-wins.
#[derive(Clone)]
pub struct TaskStore {
    table: Arc<dyn KvTable>,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    // == Constructor ==
    pub fn new(table: Arc<dyn KvTable>, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    // == Create ==
    /// Persists a new task with a fresh id and `created_at == updated_at`.
    pub async fn create(&self, data: NewTask) -> Result<Task> {
        let now = self.clock.now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: data.title,
            description: data.description,
            status: data.status.unwrap_or_default(),
            file_url: data.file_url,
            created_at: now,
            updated_at: now,
        };

        self.write(&task).await.inspect_err(|e| {
            error!("Error creating task in storage: {}", e);
        })?;
        debug!(id = %task.id, "task created");
        Ok(task)
    }

    // == List ==
    /// Returns every stored task in unspecified order.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let rows = self.table.scan().await.inspect_err(|e| {
            error!("Error fetching tasks from storage: {}", e);
        })?;

        let tasks = rows
            .into_iter()
            .filter(|(id, _)| !id.starts_with(CACHE_KEY_PREFIX))
            .map(|(id, row)| decode(&id, row))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    // == Get By Id ==
    /// Returns the task, or `None` if no task has that id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        if id.starts_with(CACHE_KEY_PREFIX) {
            return Ok(None);
        }

        let row = self.table.get(id).await.inspect_err(|e| {
            error!("Error fetching task with ID {} from storage: {}", id, e);
        })?;

        match row {
            Some(row) => Ok(Some(decode(id, row)?)),
            None => Ok(None),
        }
    }

    // == Update ==
    /// Merges `patch` into the stored task and overwrites it.
    ///
    /// Returns `None` if the task does not exist. `updated_at` always moves
    /// forward, even when the clock has not.
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let Some(mut task) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        let updated_at = if now > task.updated_at {
            now
        } else {
            task.updated_at + Duration::milliseconds(1)
        };

        task.apply(patch);
        task.updated_at = updated_at;

        self.write(&task).await.inspect_err(|e| {
            error!("Error updating task with ID {} in storage: {}", id, e);
        })?;
        debug!(id, "task updated");
        Ok(Some(task))
    }

    // == Delete ==
    /// Removes the task. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let removed = self.table.delete(id).await.inspect_err(|e| {
            error!("Error deleting task with ID {} from storage: {}", id, e);
        })?;
        debug!(id, removed, "task deleted");
        Ok(removed)
    }

    async fn write(&self, task: &Task) -> Result<()> {
        let row = serde_json::to_value(task).map_err(|e| TableError::malformed(&task.id, e))?;
        self.table.put(&task.id, row).await?;
        Ok(())
    }
}

fn decode(id: &str, row: Value) -> std::result::Result<Task, TableError> {
    serde_json::from_value(row).map_err(|e| TableError::malformed(id, e))
}
