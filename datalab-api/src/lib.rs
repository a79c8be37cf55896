pub mod dto;
pub mod error;
pub mod handlers;

pub use dto::*;
pub use error::*;

use axum::{
    routing::{get, post},
    Router,
};
use datalab_core::RecordSource;
use datalab_workflow::{TaskRegistry, TaskRunner, WorkFactory};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: TaskRegistry,
    pub runner: TaskRunner,
    pub factory: WorkFactory,
    pub records: Arc<dyn RecordSource>,
}

impl AppState {
    pub fn new(
        registry: TaskRegistry,
        runner: TaskRunner,
        factory: WorkFactory,
        records: Arc<dyn RecordSource>,
    ) -> Self {
        Self {
            registry,
            runner,
            factory,
            records,
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/tasks",
            post(handlers::tasks::submit).get(handlers::tasks::list),
        )
        .route("/tasks/:id", get(handlers::tasks::get))
        .route("/tasks/:id/start", post(handlers::tasks::start))
        .route("/tasks/:id/cancel", post(handlers::tasks::cancel))
        .route("/search", get(handlers::search::search))
        .with_state(state)
}
