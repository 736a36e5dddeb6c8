//! Response envelope used by the backend
//!
//! Most endpoints wrap their payload in `{ "success": bool, "data": ... }`.

use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::task::Task;

/// Generic `{ success, data }` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

/// Inner payload of `GET /tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksPayload {
    pub tasks: Vec<Task>,
}

/// Inner payload of single-task endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task: Task,
}

/// Inner payload of `GET /auth/profile`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}
