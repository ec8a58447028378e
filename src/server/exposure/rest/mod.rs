//! REST API exposure
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.

pub mod crm;
pub mod entities;
pub mod filters;

use super::super::host::ServerHost;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - Entity CRUD, filter and schema routes
    /// - Saved-filter routes
    /// - Workflow routes (dashboard, pipeline, tasks, activities)
    /// - Custom routes
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let entity_routes = host.entity_registry().build_routes();

        let mut app = Self::health_routes()
            .merge(crm::routes(host.clone()))
            .merge(entity_routes)
            .merge(filters::routes(host.clone()));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app = app.layer(TraceLayer::new_for_http());
        if host.config.server.cors {
            app = app.layer(CorsLayer::permissive());
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "pipeline-crm"
        }))
    }
}
