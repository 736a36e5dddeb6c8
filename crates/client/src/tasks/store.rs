//! Task store
//!
//! In-memory cache of the current session's tasks, reconciled with backend
//! responses. No optimistic mutation: the local list only changes after the
//! server has confirmed an operation, and a fetch always replaces the whole
//! collection.

use tokio::sync::RwLock;
use tracing::warn;

use td_core::task::{CreateTaskData, Task, TaskFilter, UpdateTaskData};

use crate::error::ClientError;
use crate::tasks::api::TaskApi;
use crate::Result;

#[derive(Debug, Default)]
struct TaskState {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

/// Task state container scoped to the authenticated session's token
///
/// Operations take the bearer token explicitly; the store does not reach
/// into the session store. Concurrent calls are not serialized: the last
/// response to arrive wins.
pub struct TaskStore {
    api: TaskApi,
    state: RwLock<TaskState>,
}

impl TaskStore {
    pub fn new(api: TaskApi) -> Self {
        Self {
            api,
            state: RwLock::new(TaskState::default()),
        }
    }

    /// Snapshot of the cached collection
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    /// Local read of a single cached entry
    pub async fn get(&self, id: &str) -> Option<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Reset the error field without touching the collection
    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Replace the whole collection with the server's list
    ///
    /// Read-only refresh: a failure is recorded in the error field but not
    /// propagated, since fetches are typically issued from passive triggers.
    pub async fn fetch_tasks(&self, token: &str, filter: Option<&TaskFilter>) {
        self.begin().await;
        match self.api.list(token, filter).await {
            Ok(tasks) => {
                let mut state = self.state.write().await;
                state.tasks = tasks;
                state.loading = false;
            }
            Err(err) => {
                warn!("Failed to fetch tasks: {}", err);
                self.record_failure(err).await;
            }
        }
    }

    /// Create a task and prepend the server's representation
    ///
    /// An empty title is rejected before any network call.
    pub async fn create_task(&self, token: &str, data: &CreateTaskData) -> Result<Task> {
        if data.title.trim().is_empty() {
            let err = ClientError::InvalidInput("Task title is required".to_string());
            return Err(self.record_failure(err).await);
        }

        self.begin().await;
        match self.api.create(token, data).await {
            Ok(task) => {
                let mut state = self.state.write().await;
                state.tasks.insert(0, task.clone());
                state.loading = false;
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err).await),
        }
    }

    /// Send a partial update and adopt the server's returned representation
    pub async fn update_task(
        &self,
        token: &str,
        id: &str,
        updates: &UpdateTaskData,
    ) -> Result<Task> {
        self.begin().await;
        let result = self.api.update(token, id, updates).await;
        self.finish_replacement(result).await
    }

    /// Delete server-side, then drop the matching local entry
    pub async fn delete_task(&self, token: &str, id: &str) -> Result<()> {
        self.begin().await;
        match self.api.delete(token, id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.tasks.retain(|task| task.id != id);
                state.loading = false;
                Ok(())
            }
            Err(err) => Err(self.record_failure(err).await),
        }
    }

    /// `PATCH /tasks/{id}/complete`
    pub async fn mark_completed(&self, token: &str, id: &str) -> Result<Task> {
        self.begin().await;
        let result = self.api.complete(token, id).await;
        self.finish_replacement(result).await
    }

    /// `PATCH /tasks/{id}/pending`
    pub async fn mark_pending(&self, token: &str, id: &str) -> Result<Task> {
        self.begin().await;
        let result = self.api.pending(token, id).await;
        self.finish_replacement(result).await
    }

    /// `PATCH /tasks/{id}/in-progress`
    pub async fn mark_in_progress(&self, token: &str, id: &str) -> Result<Task> {
        self.begin().await;
        let result = self.api.in_progress(token, id).await;
        self.finish_replacement(result).await
    }

    /// `PATCH /tasks/{id}/archive`
    pub async fn archive_task(&self, token: &str, id: &str) -> Result<Task> {
        self.begin().await;
        let result = self.api.archive(token, id).await;
        self.finish_replacement(result).await
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn record_failure(&self, err: ClientError) -> ClientError {
        let mut state = self.state.write().await;
        state.loading = false;
        state.error = Some(err.to_string());
        err
    }

    /// Swap the matching cached entry for the server's representation
    async fn finish_replacement(&self, result: Result<Task>) -> Result<Task> {
        match result {
            Ok(task) => {
                let mut state = self.state.write().await;
                if let Some(existing) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = task.clone();
                }
                state.loading = false;
                Ok(task)
            }
            Err(err) => Err(self.record_failure(err).await),
        }
    }
}
