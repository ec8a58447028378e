//! Saved-filter endpoints
//!
//! Filters are checked against the target entity's schema before they are
//! saved, so a stored filter never names an unknown field or an operator
//! outside its field's category.

use crate::core::condition::{EntityKind, FilterSpec, SavedFilter};
use crate::core::entity::Data;
use crate::core::error::{CrmError, FilterError};
use crate::entities::{Contact, Deal};
use crate::server::host::{FilterResults, ServerHost};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route("/filters", get(list_filters).post(create_filter))
        .route(
            "/filters/{id}",
            get(get_filter).put(update_filter).delete(delete_filter),
        )
        .route("/filters/{id}/results", get(filter_results))
        .with_state(host)
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterListParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterResultsResponse {
    pub filter: SavedFilter,
    pub data: FilterResults,
    pub total: usize,
}

fn check_against_schema(spec: &FilterSpec) -> Result<(), CrmError> {
    match spec.kind {
        EntityKind::Contacts => Contact::schema().validate_spec(spec)?,
        EntityKind::Deals => Deal::schema().validate_spec(spec)?,
    }
    Ok(())
}

/// GET /filters?type=contacts|deals
async fn list_filters(
    State(host): State<Arc<ServerHost>>,
    Query(params): Query<FilterListParams>,
) -> Result<Json<Vec<SavedFilter>>, CrmError> {
    let filters = match params.kind.as_deref().filter(|kind| !kind.is_empty()) {
        Some(kind) => {
            let kind: EntityKind = kind.parse().map_err(|_| FilterError::UnknownType {
                kind: kind.to_string(),
            })?;
            host.saved_filters.list(kind).await?
        }
        None => host.saved_filters.list_all().await?,
    };
    Ok(Json(filters))
}

/// POST /filters
async fn create_filter(
    State(host): State<Arc<ServerHost>>,
    Json(spec): Json<FilterSpec>,
) -> Result<(StatusCode, Json<SavedFilter>), CrmError> {
    check_against_schema(&spec)?;
    let saved = host.saved_filters.create(spec).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /filters/{id}
async fn get_filter(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
) -> Result<Json<SavedFilter>, CrmError> {
    Ok(Json(host.saved_filters.get(id).await?))
}

/// PUT /filters/{id}
async fn update_filter(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
    Json(spec): Json<FilterSpec>,
) -> Result<Json<SavedFilter>, CrmError> {
    check_against_schema(&spec)?;
    Ok(Json(host.saved_filters.update(id, spec).await?))
}

/// DELETE /filters/{id}
async fn delete_filter(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, CrmError> {
    host.saved_filters.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /filters/{id}/results
async fn filter_results(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<u64>,
) -> Result<Json<FilterResultsResponse>, CrmError> {
    let filter = host.saved_filters.get(id).await?;
    let data = host.apply_filter(&filter.spec()).await?;
    Ok(Json(FilterResultsResponse {
        total: data.len(),
        filter,
        data,
    }))
}
