//! Application services for task lifecycle and board placement.

mod board;
mod config;
mod error;
mod requests;

pub use board::TaskBoardService;
pub use config::TaskServiceConfig;
pub use error::{TaskServiceError, TaskServiceResult};
pub use requests::{Caller, CreateTaskRequest, ReorderTaskRequest, TaskFilter, UpdateTaskRequest};
