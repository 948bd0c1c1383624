//! HTTP API server for the logistics network.
//!
//! Exposes shipments, distribution centers and transport routes as REST
//! resources, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use event_store::{EventStore, InMemoryEventStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;
use routes::{centers, shipments, transport};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // shipments
        .route(
            "/shipments",
            post(shipments::create::<S>).get(shipments::list::<S>),
        )
        .route("/shipments/{code}", get(shipments::get::<S>))
        .route(
            "/shipments/{code}/status",
            post(shipments::update_status::<S>),
        )
        .route(
            "/shipments/{code}/priority/increase",
            post(shipments::increase_priority::<S>),
        )
        .route(
            "/shipments/{code}/priority/decrease",
            post(shipments::decrease_priority::<S>),
        )
        .route("/shipments/{code}/events", get(shipments::events::<S>))
        // centers
        .route("/centers", post(centers::create::<S>).get(centers::list::<S>))
        .route("/centers/{id}", get(centers::get::<S>))
        .route("/centers/{id}/shipments", get(centers::shipments::<S>))
        .route("/centers/{id}/receive", post(centers::receive::<S>))
        .route("/centers/{id}/dispatch", post(centers::dispatch::<S>))
        .route("/centers/{id}/events", get(centers::events::<S>))
        // routes
        .route("/routes", post(transport::create::<S>).get(transport::list::<S>))
        .route("/routes/{id}", get(transport::get::<S>))
        .route("/routes/{id}/shipments", post(transport::assign::<S>))
        .route(
            "/routes/{id}/shipments/{code}",
            delete(transport::remove_shipment::<S>),
        )
        .route("/routes/{id}/dispatch", post(transport::dispatch::<S>))
        .route("/routes/{id}/complete", post(transport::complete::<S>))
        .route("/routes/{id}/events", get(transport::events::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory repositories and journal.
pub fn create_default_state() -> Arc<AppState<InMemoryEventStore>> {
    Arc::new(AppState::new(InMemoryEventStore::new()))
}
