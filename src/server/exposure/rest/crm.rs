//! Workflow endpoints: dashboard, pipeline, task views and activity timeline

use crate::core::error::{CrmError, EntityError, ValidationError};
use crate::crm::activities::{self, DEFAULT_RECENT_LIMIT};
use crate::crm::pipeline::{self, PipelineStage};
use crate::crm::tasks::{self, TaskCounts, TaskView};
use crate::crm::DashboardMetrics;
use crate::entities::{Activity, Deal, DealStage, Task};
use crate::server::host::ServerHost;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/deals/pipeline", get(deal_pipeline))
        .route("/deals/{id}/stage", put(update_deal_stage))
        .route("/tasks/view/{view}", get(task_view))
        .route("/tasks/counts", get(task_counts))
        .route("/tasks/{id}/toggle", post(toggle_task))
        .route("/activities/recent", get(recent_activities))
        .route("/contacts/{id}/activities", get(contact_activities))
        .with_state(host)
}

#[derive(Debug, Deserialize)]
pub struct StageChange {
    pub stage: DealStage,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

/// GET /dashboard
async fn dashboard(
    State(host): State<Arc<ServerHost>>,
) -> Result<Json<DashboardMetrics>, CrmError> {
    let metrics = DashboardMetrics::load(
        host.contacts.as_ref(),
        host.deals.as_ref(),
        host.tasks.as_ref(),
    )
    .await?;
    Ok(Json(metrics))
}

/// GET /deals/pipeline
async fn deal_pipeline(
    State(host): State<Arc<ServerHost>>,
) -> Result<Json<Vec<PipelineStage>>, CrmError> {
    Ok(Json(pipeline::pipeline(host.deals.as_ref()).await?))
}

/// PUT /deals/{id}/stage
async fn update_deal_stage(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
    Json(change): Json<StageChange>,
) -> Result<Json<Deal>, CrmError> {
    Ok(Json(
        pipeline::update_stage(host.deals.as_ref(), id, change.stage).await?,
    ))
}

/// GET /tasks/view/{view}
async fn task_view(
    State(host): State<Arc<ServerHost>>,
    Path(view): Path<String>,
) -> Result<Json<Vec<Task>>, CrmError> {
    let view: TaskView = view
        .parse()
        .map_err(|message| ValidationError::FieldError {
            field: "view".to_string(),
            message,
        })?;
    let all = host.tasks.list().await?;
    Ok(Json(view.apply(&all, &host.evaluator())))
}

/// GET /tasks/counts
async fn task_counts(State(host): State<Arc<ServerHost>>) -> Result<Json<TaskCounts>, CrmError> {
    let all = host.tasks.list().await?;
    Ok(Json(TaskCounts::compute(&all, &host.evaluator())))
}

/// POST /tasks/{id}/toggle
async fn toggle_task(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, CrmError> {
    Ok(Json(tasks::toggle_complete(host.tasks.as_ref(), id).await?))
}

/// GET /activities/recent?limit=
async fn recent_activities(
    State(host): State<Arc<ServerHost>>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<Activity>>, CrmError> {
    let all = host.activities.list().await?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(activities::recent(&all, limit)))
}

/// GET /contacts/{id}/activities
async fn contact_activities(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Activity>>, CrmError> {
    if host.contacts.get(id).await?.is_none() {
        return Err(EntityError::not_found("contact", id).into());
    }
    let all = host.activities.list().await?;
    Ok(Json(activities::by_contact(&all, id)))
}
