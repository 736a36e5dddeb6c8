//! Task model module

mod model;

pub use model::{CreateTaskData, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTaskData};
