//! API error envelope.
//!
//! Every failure a handler can hit is a [`BrokerError`]. It is rendered as an
//! [`ErrorResponse`] body with the status chosen by the configured
//! [`ErrorStatusPolicy`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use provisioner_interface::ProvisionerError;

use crate::config::ErrorStatusPolicy;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Failed to decode request body: {0}")]
    BodyDecode(#[from] serde_json::Error),

    /// The request was rejected before its body could be decoded, e.g. an
    /// undecodable path segment or a body over the size limit.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Provisioner(#[from] ProvisionerError),
}

impl BrokerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BodyDecode(_) => "body_decode_error",
            Self::BadRequest(_) => "bad_request",
            Self::Provisioner(err) => err.kind(),
        }
    }

    pub fn status(&self, policy: ErrorStatusPolicy) -> StatusCode {
        match policy {
            ErrorStatusPolicy::Uniform => StatusCode::BAD_REQUEST,
            ErrorStatusPolicy::ByKind => match self {
                Self::BodyDecode(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
                Self::Provisioner(ProvisionerError::NotFound { .. }) => StatusCode::NOT_FOUND,
                Self::Provisioner(ProvisionerError::Conflict(_)) => StatusCode::CONFLICT,
                Self::Provisioner(ProvisionerError::Validation(_)) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                Self::Provisioner(ProvisionerError::Unimplemented(_)) => {
                    StatusCode::NOT_IMPLEMENTED
                }
                Self::Provisioner(ProvisionerError::Backend(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// A [`BrokerError`] paired with the status it will be sent with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: BrokerError,
}

impl ApiError {
    pub fn new(error: impl Into<BrokerError>, policy: ErrorStatusPolicy) -> Self {
        let error = error.into();
        Self {
            status: error.status(policy),
            error,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn error(&self) -> &BrokerError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error.kind().to_string(),
            message: self.error.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> BrokerError {
        ProvisionerError::instance_not_found("abc").into()
    }

    #[test]
    fn test_uniform_policy_is_always_bad_request() {
        let errors = [
            not_found(),
            ProvisionerError::Conflict("dup".into()).into(),
            ProvisionerError::Backend("backend down".into()).into(),
            ProvisionerError::Unimplemented("get_service_instance").into(),
        ];

        for err in errors {
            assert_eq!(err.status(ErrorStatusPolicy::Uniform), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_by_kind_policy() {
        let policy = ErrorStatusPolicy::ByKind;
        assert_eq!(not_found().status(policy), StatusCode::NOT_FOUND);
        assert_eq!(
            BrokerError::from(ProvisionerError::Conflict("dup".into())).status(policy),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BrokerError::from(ProvisionerError::Validation("plan".into())).status(policy),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            BrokerError::from(ProvisionerError::Backend("down".into())).status(policy),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(BrokerError::from(decode).status(policy), StatusCode::BAD_REQUEST);
        assert_eq!(
            BrokerError::BadRequest("length limit exceeded".into()).status(policy),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_message_is_preserved() {
        let err = ApiError::new(
            ProvisionerError::Backend("backend down".into()),
            ErrorStatusPolicy::Uniform,
        );
        assert_eq!(err.error().kind(), "provisioner_error");
        assert_eq!(err.error().to_string(), "Provisioner error: backend down");
    }
}
