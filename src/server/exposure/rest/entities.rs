//! Generic CRUD, filter and schema handlers for `Data` entities

use crate::config::QueryConfig;
use crate::core::condition::{Condition, valid_conditions};
use crate::core::error::{CrmError, EntityError, ValidationError};
use crate::core::evaluator::{CompiledFilter, Evaluator};
use crate::core::query::{PaginatedResponse, QueryParams};
use crate::core::schema::FieldDescription;
use crate::core::{Data, DataService};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Per-entity router state
pub struct EntityState<T: Data> {
    pub service: Arc<dyn DataService<T>>,
    pub query: QueryConfig,
}

impl<T: Data> EntityState<T> {
    pub fn new(service: Arc<dyn DataService<T>>, query: QueryConfig) -> Self {
        Self { service, query }
    }
}

impl<T: Data> Clone for EntityState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            query: self.query.clone(),
        }
    }
}

/// Body of `POST /{plural}/filter`
#[derive(Debug, Deserialize)]
pub struct ConditionsRequest {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub resource: &'static str,
    pub fields: Vec<FieldDescription>,
}

/// GET /{plural}
pub async fn list_records<T: Data>(
    State(state): State<EntityState<T>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<PaginatedResponse<T>>, CrmError> {
    let search = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let mut records = match search {
        Some(query) => state.service.search(query).await?,
        None => state.service.list().await?,
    };

    let conditions = params.conditions()?;
    if !conditions.is_empty() {
        records = CompiledFilter::<T>::compile(&conditions)
            .apply(&records, &Evaluator::at_current_time());
    }

    if let Some(sort) = params.sort_spec() {
        sort.apply(&mut records);
    }

    let limit = params.limit(state.query.default_limit, state.query.max_limit);
    Ok(Json(PaginatedResponse::paginate(records, params.page(), limit)))
}

/// POST /{plural}
pub async fn create_record<T: Data>(
    State(state): State<EntityState<T>>,
    Json(entity): Json<T>,
) -> Result<(StatusCode, Json<T>), CrmError> {
    let created = state.service.create(entity).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /{plural}/{id}
pub async fn get_record<T: Data>(
    State(state): State<EntityState<T>>,
    Path(id): Path<u64>,
) -> Result<Json<T>, CrmError> {
    let record = state
        .service
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id))?;
    Ok(Json(record))
}

/// PUT /{plural}/{id}
///
/// The body is merged over the stored record, so partial updates work.
pub async fn update_record<T: Data>(
    State(state): State<EntityState<T>>,
    Path(id): Path<u64>,
    Json(patch): Json<Value>,
) -> Result<Json<T>, CrmError> {
    let existing = state
        .service
        .get(id)
        .await?
        .ok_or_else(|| EntityError::not_found(T::resource_name_singular(), id))?;

    let merged = merge_patch(&existing, patch)?;
    let updated = state.service.update(id, merged).await?;
    Ok(Json(updated))
}

/// DELETE /{plural}/{id}
pub async fn delete_record<T: Data>(
    State(state): State<EntityState<T>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, CrmError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /{plural}/filter
pub async fn filter_records<T: Data>(
    State(state): State<EntityState<T>>,
    Json(request): Json<ConditionsRequest>,
) -> Result<Json<FilterResponse<T>>, CrmError> {
    let conditions = valid_conditions(&request.conditions);
    if conditions.len() < request.conditions.len() {
        tracing::warn!(
            entity = T::resource_name(),
            dropped = request.conditions.len() - conditions.len(),
            "Dropped invalid conditions"
        );
    }

    let records = state.service.list().await?;
    let data =
        CompiledFilter::<T>::compile(&conditions).apply(&records, &Evaluator::at_current_time());
    Ok(Json(FilterResponse {
        total: data.len(),
        data,
    }))
}

/// GET /schemas/{plural}
pub async fn describe_schema<T: Data>() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        resource: T::resource_name(),
        fields: T::schema().describe(),
    })
}

/// Overlay the top-level keys of `patch` on the JSON form of `existing`
fn merge_patch<T: Data>(existing: &T, patch: Value) -> Result<T, CrmError> {
    let Value::Object(changes) = patch else {
        return Err(ValidationError::InvalidJson {
            message: "request body must be a JSON object".to_string(),
        }
        .into());
    };

    let mut current =
        serde_json::to_value(existing).map_err(|e| CrmError::Internal(e.to_string()))?;
    if let Value::Object(fields) = &mut current {
        fields.extend(changes);
    }

    serde_json::from_value(current).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Contact, ContactStatus};
    use serde_json::json;

    #[test]
    fn test_merge_patch_keeps_untouched_fields() {
        let mut contact = Contact::new("Ann", "ann@acme.com").with_company("Acme");
        contact.id = 3;

        let patch = json!({"status": "qualified", "phone": "555-0100"});
        let merged = merge_patch(&contact, patch).unwrap();
        assert_eq!(merged.company, "Acme");
        assert_eq!(merged.status, ContactStatus::Qualified);
        assert_eq!(merged.phone, "555-0100");
    }

    #[test]
    fn test_merge_patch_rejects_non_objects_and_bad_values() {
        let contact = Contact::new("Ann", "ann@acme.com");
        assert!(merge_patch(&contact, json!([1, 2])).is_err());
        assert!(merge_patch(&contact, json!({"status": "archived"})).is_err());
    }
}
