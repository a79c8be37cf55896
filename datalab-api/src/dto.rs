use datalab_core::{Record, TaskFilter, TaskKind, TaskState};
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_start() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitTaskRequest {
    #[validate(length(min = 1, max = 64))]
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
    /// Launch the work right away instead of leaving the task pending.
    #[serde(default = "default_start")]
    pub start: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct ListTasksQuery {
    pub state: Option<TaskState>,
    pub kind: Option<TaskKind>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

impl From<ListTasksQuery> for TaskFilter {
    fn from(query: ListTasksQuery) -> Self {
        TaskFilter {
            state: query.state,
            kind: query.kind,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len();
        Self { data, total }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub data: Vec<Record>,
    pub total: usize,
}

// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
