//! API request handlers.
//!
//! Each handler decodes its input, makes exactly one provisioner call and
//! renders the outcome. Request bodies are decoded from raw bytes so that a
//! missing `Content-Type` header is not itself an error. Extractor rejections
//! and decode failures use the same error envelope as provisioner failures.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use broker_shared_types::{BindingRequest, CreateServiceInstanceRequest};

use crate::error::{ApiResult, BrokerError};
use crate::state::ApiState;

type PathResult<T> = Result<Path<T>, PathRejection>;
type BodyResult = Result<Bytes, BytesRejection>;

/// Unwrap path segments, answering with the error envelope when axum
/// rejects them (e.g. invalid UTF-8 after percent-decoding).
fn path_params<T>(state: &ApiState, path: PathResult<T>) -> ApiResult<T> {
    path.map(|Path(params)| params)
        .map_err(|rejection| state.reject(BrokerError::BadRequest(rejection.body_text())))
}

fn decode_body<T: DeserializeOwned>(state: &ApiState, body: BodyResult) -> ApiResult<T> {
    let body =
        body.map_err(|rejection| state.reject(BrokerError::BadRequest(rejection.body_text())))?;
    serde_json::from_slice(&body).map_err(|e| state.reject(e))
}

// ============================================================================
// Catalog Handlers
// ============================================================================

/// Get the service catalog.
pub async fn get_catalog(State(state): State<ApiState>) -> ApiResult<impl IntoResponse> {
    info!("Getting service broker catalog");

    let catalog = state
        .provisioner
        .catalog()
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(catalog))
}

// ============================================================================
// Instance Handlers
// ============================================================================

/// Get a service instance by ID.
pub async fn get_service_instance(
    State(state): State<ApiState>,
    path: PathResult<String>,
) -> ApiResult<impl IntoResponse> {
    let instance_id = path_params(&state, path)?;
    info!("Getting service instance {}", instance_id);

    let instance = state
        .provisioner
        .get_service_instance(&instance_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(instance))
}

/// Create a service instance.
pub async fn create_service_instance(
    State(state): State<ApiState>,
    path: PathResult<String>,
    body: BodyResult,
) -> ApiResult<impl IntoResponse> {
    let instance_id = path_params(&state, path)?;
    info!("Creating service instance {}", instance_id);

    // An absent parameter bag has already been defaulted to `{}` by decoding.
    let request: CreateServiceInstanceRequest = decode_body(&state, body)?;
    debug!(
        service_id = %request.service_id,
        plan_id = %request.plan_id,
        parameters = request.parameters.len(),
        "Decoded create request for {}",
        instance_id
    );

    let response = state
        .provisioner
        .create_service_instance(&instance_id, request)
        .await
        .map_err(|e| state.reject(e))?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Remove a service instance.
pub async fn remove_service_instance(
    State(state): State<ApiState>,
    path: PathResult<String>,
) -> ApiResult<impl IntoResponse> {
    let instance_id = path_params(&state, path)?;
    info!("Removing service instance {}", instance_id);

    let response = state
        .provisioner
        .remove_service_instance(&instance_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(response))
}

// ============================================================================
// Binding Handlers
// ============================================================================

/// Create a binding for a service instance.
pub async fn bind(
    State(state): State<ApiState>,
    path: PathResult<(String, String)>,
    body: BodyResult,
) -> ApiResult<impl IntoResponse> {
    let (instance_id, binding_id) = path_params(&state, path)?;
    info!("Bind binding_id={}, instance_id={}", binding_id, instance_id);

    let mut request: BindingRequest = decode_body(&state, body)?;
    request.inject_instance_id(&instance_id);

    let response = state
        .provisioner
        .bind(&instance_id, &binding_id, request)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(response))
}

/// Remove a binding from a service instance.
pub async fn unbind(
    State(state): State<ApiState>,
    path: PathResult<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let (instance_id, binding_id) = path_params(&state, path)?;
    info!("Unbind binding_id={}, instance_id={}", binding_id, instance_id);

    state
        .provisioner
        .unbind(&instance_id, &binding_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(serde_json::json!({})))
}
