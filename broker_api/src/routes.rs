//! Route table for the broker API.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::ApiState;

/// Build the broker router. The caller owns the returned router and decides
/// where to serve it.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/v2/catalog", get(handlers::get_catalog))
        .route(
            "/v2/service_instances/:instance_id",
            get(handlers::get_service_instance)
                .put(handlers::create_service_instance)
                .delete(handlers::remove_service_instance),
        )
        .route(
            "/v2/service_instances/:instance_id/service_bindings/:binding_id",
            put(handlers::bind).delete(handlers::unbind),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
