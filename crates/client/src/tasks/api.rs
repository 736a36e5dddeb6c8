//! Typed wrapper over the `/tasks` endpoints
//!
//! Status transitions are distinct PATCH endpoints on the backend and are
//! mirrored one-to-one here rather than funneled through a generic update.

use reqwest::Method;

use td_core::task::{CreateTaskData, Task, TaskFilter, UpdateTaskData};
use td_core::wire::{ApiResponse, TaskPayload, TasksPayload};

use crate::http::ApiClient;
use crate::Result;

#[derive(Debug, Clone)]
pub struct TaskApi {
    client: ApiClient,
}

fn task_path(id: &str) -> String {
    format!("/tasks/{}", urlencoding::encode(id))
}

impl TaskApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /tasks`
    pub async fn list(&self, token: &str, filter: Option<&TaskFilter>) -> Result<Vec<Task>> {
        let mut builder = self.client.request(Method::GET, "/tasks", Some(token));
        if let Some(filter) = filter {
            let pairs = filter.query_pairs();
            if !pairs.is_empty() {
                builder = builder.query(&pairs);
            }
        }
        let response: ApiResponse<TasksPayload> = self.client.send(builder).await?;
        Ok(response.data.tasks)
    }

    /// `GET /tasks/{id}`
    pub async fn get(&self, token: &str, id: &str) -> Result<Task> {
        let response: ApiResponse<TaskPayload> = self
            .client
            .send(self.client.request(Method::GET, &task_path(id), Some(token)))
            .await?;
        Ok(response.data.task)
    }

    /// `POST /tasks`
    pub async fn create(&self, token: &str, data: &CreateTaskData) -> Result<Task> {
        let response: ApiResponse<TaskPayload> = self
            .client
            .send(
                self.client
                    .request(Method::POST, "/tasks", Some(token))
                    .json(data),
            )
            .await?;
        Ok(response.data.task)
    }

    /// `PUT /tasks/{id}`
    pub async fn update(&self, token: &str, id: &str, updates: &UpdateTaskData) -> Result<Task> {
        let response: ApiResponse<TaskPayload> = self
            .client
            .send(
                self.client
                    .request(Method::PUT, &task_path(id), Some(token))
                    .json(updates),
            )
            .await?;
        Ok(response.data.task)
    }

    /// `DELETE /tasks/{id}`
    pub async fn delete(&self, token: &str, id: &str) -> Result<()> {
        self.client
            .send_empty(
                self.client
                    .request(Method::DELETE, &task_path(id), Some(token)),
            )
            .await
    }

    /// `PATCH /tasks/{id}/complete`
    pub async fn complete(&self, token: &str, id: &str) -> Result<Task> {
        self.transition(token, id, "complete").await
    }

    /// `PATCH /tasks/{id}/pending`
    pub async fn pending(&self, token: &str, id: &str) -> Result<Task> {
        self.transition(token, id, "pending").await
    }

    /// `PATCH /tasks/{id}/in-progress`
    pub async fn in_progress(&self, token: &str, id: &str) -> Result<Task> {
        self.transition(token, id, "in-progress").await
    }

    /// `PATCH /tasks/{id}/archive`
    pub async fn archive(&self, token: &str, id: &str) -> Result<Task> {
        self.transition(token, id, "archive").await
    }

    async fn transition(&self, token: &str, id: &str, action: &str) -> Result<Task> {
        let path = format!("{}/{}", task_path(id), action);
        let response: ApiResponse<TaskPayload> = self
            .client
            .send(self.client.request(Method::PATCH, &path, Some(token)))
            .await?;
        Ok(response.data.task)
    }
}
