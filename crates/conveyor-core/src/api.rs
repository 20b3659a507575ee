//! HTTP control-plane: list, submit and inspect tasks.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{ConveyorError, JobName, Parameters, Profile, Status, Tags, Task, TaskId};
use crate::queue::{Queue, TaskFilter};
use crate::runtime::JobRegistry;
use crate::view::TaskView;

/// Shared state for the control-plane routes.
#[derive(Clone)]
pub struct ApiState {
    pub queue: Arc<dyn Queue>,
    pub registry: Arc<JobRegistry>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    profile: Option<Profile>,
    status: Option<Status>,
    tag: Option<String>,
}

/// POST /tasks body.
#[derive(Debug, Deserialize)]
struct SubmitTask {
    profile: Option<Profile>,
    job: JobName,
    #[serde(default)]
    parameters: Parameters,
    #[serde(default)]
    tags: Tags,
}

fn error_body(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message.into() }))
}

/// GET /tasks
async fn list_tasks(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let filter = TaskFilter {
        profile: query.profile,
        status: query.status,
        tag: query.tag,
    };

    match state.queue.list(&filter).await {
        Ok(tasks) => {
            let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
            Json(views).into_response()
        }
        Err(e) => {
            error!(error = %e, "task listing failed");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// POST /tasks
///
/// Validates the job name against the registry before accepting: a task
/// this deployment could never execute is rejected up front.
async fn submit_task(
    State(state): State<ApiState>,
    Json(body): Json<SubmitTask>,
) -> impl IntoResponse {
    if !state.registry.contains(&body.job) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            error_body(format!("no job registered for name={}", body.job)),
        )
            .into_response();
    }

    let task = Task::new(
        body.profile.unwrap_or_default(),
        body.job,
        body.parameters,
        body.tags,
    );
    let view = TaskView::from(&task);

    match state.queue.enqueue(task).await {
        Ok(()) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => {
            error!(error = %e, "enqueue failed");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// GET /task/{identifier}
async fn show_task(
    State(state): State<ApiState>,
    Path(identifier): Path<String>,
) -> impl IntoResponse {
    let Ok(id) = identifier.parse::<TaskId>() else {
        return (
            StatusCode::BAD_REQUEST,
            error_body(format!("malformed task identifier: {identifier}")),
        )
            .into_response();
    };

    match state.queue.find(id).await {
        Ok(task) => Json(TaskView::from(&task)).into_response(),
        Err(e @ ConveyorError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, error_body(e.to_string())).into_response()
        }
        Err(e) => {
            error!(task = %id, error = %e, "task lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// GET /stats
async fn stats(State(state): State<ApiState>) -> impl IntoResponse {
    match state.queue.counts().await {
        Ok(counts) => Json(counts).into_response(),
        Err(e) => {
            error!(error = %e, "stats collection failed");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// Build the control-plane router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(submit_task))
        .route("/task/{identifier}", get(show_task))
        .route("/stats", get(stats))
        .with_state(state)
}

/// Bind and serve the control-plane until the process exits.
pub async fn serve(addr: std::net::SocketAddr, state: ApiState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control-plane listening");
    axum::serve(listener, api_routes(state)).await
}
