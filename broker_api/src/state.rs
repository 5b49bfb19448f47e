//! API server state.

use std::sync::Arc;

use tracing::warn;

use provisioner_interface::Provisioner;

use crate::config::ErrorStatusPolicy;
use crate::error::{ApiError, BrokerError};

/// Shared state for the API server.
///
/// Holds no mutable data: every request gets a clone and forwards exactly one
/// call to the provisioner.
#[derive(Clone)]
pub struct ApiState {
    /// Backing implementation of the broker operations.
    pub provisioner: Arc<dyn Provisioner>,
    /// Status code policy for error responses.
    pub error_policy: ErrorStatusPolicy,
}

impl ApiState {
    /// Create new API state with the uniform error policy.
    pub fn new(provisioner: Arc<dyn Provisioner>) -> Self {
        Self::with_error_policy(provisioner, ErrorStatusPolicy::Uniform)
    }

    pub fn with_error_policy(
        provisioner: Arc<dyn Provisioner>,
        error_policy: ErrorStatusPolicy,
    ) -> Self {
        Self {
            provisioner,
            error_policy,
        }
    }

    /// Turn a failure into the response error for this server's policy.
    pub fn reject(&self, error: impl Into<BrokerError>) -> ApiError {
        let error = ApiError::new(error, self.error_policy);
        warn!(
            status = %error.status(),
            kind = error.error().kind(),
            "Request failed: {}",
            error.error()
        );
        error
    }
}
