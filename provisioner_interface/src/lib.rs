//! The provisioner contract the broker dispatcher is written against.
//!
//! A provisioner owns all instance and binding state. The dispatcher only
//! holds an `Arc<dyn Provisioner>` and forwards one call per request.

use async_trait::async_trait;

use broker_shared_types::{
    BindingRequest, Catalog, CreateServiceBindingResponse, CreateServiceInstanceRequest,
    CreateServiceInstanceResponse, DeleteServiceInstanceResponse, ServiceInstance,
};

/// Errors a provisioner can report back to the dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProvisionerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provisioner error: {0}")]
    Backend(String),

    #[error("Operation not implemented: {0}")]
    Unimplemented(&'static str),
}

impl ProvisionerError {
    pub fn instance_not_found(instance_id: &str) -> Self {
        Self::NotFound {
            kind: "Service instance",
            id: instance_id.to_string(),
        }
    }

    pub fn binding_not_found(binding_id: &str) -> Self {
        Self::NotFound {
            kind: "Service binding",
            id: binding_id.to_string(),
        }
    }

    /// Stable machine-readable category, used as the `error` field of response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_error",
            Self::Backend(_) => "provisioner_error",
            Self::Unimplemented(_) => "unimplemented",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionerError>;

/// Backing implementation of the broker lifecycle operations.
///
/// Implementations are shared across all in-flight requests and must be safe
/// to call concurrently with distinct arguments. Concurrent calls with the
/// same arguments may resolve in any order but must leave internal state
/// consistent. Work that blocks a thread belongs on
/// `tokio::task::spawn_blocking`, not on the async workers.
#[async_trait]
pub trait Provisioner: Send + Sync + 'static {
    /// List the services and plans this provisioner offers.
    async fn catalog(&self) -> Result<Catalog>;

    /// Fetch a provisioned instance.
    async fn get_service_instance(&self, instance_id: &str) -> Result<ServiceInstance>;

    /// Provision a new instance. `request.parameters` is never absent; the
    /// dispatcher substitutes an empty bag when the caller omits it.
    async fn create_service_instance(
        &self,
        instance_id: &str,
        request: CreateServiceInstanceRequest,
    ) -> Result<CreateServiceInstanceResponse>;

    /// Deprovision an instance. Removing an unknown instance is an error.
    async fn remove_service_instance(&self, instance_id: &str)
        -> Result<DeleteServiceInstanceResponse>;

    /// Create a binding. `request.parameters` always carries the owning
    /// instance id under `instanceId`.
    async fn bind(
        &self,
        instance_id: &str,
        binding_id: &str,
        request: BindingRequest,
    ) -> Result<CreateServiceBindingResponse>;

    /// Remove a binding. Removing an unknown binding is an error.
    async fn unbind(&self, instance_id: &str, binding_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EmptyProvisioner;

    #[async_trait]
    impl Provisioner for EmptyProvisioner {
        async fn catalog(&self) -> Result<Catalog> {
            Ok(Catalog::default())
        }

        async fn get_service_instance(&self, instance_id: &str) -> Result<ServiceInstance> {
            Err(ProvisionerError::instance_not_found(instance_id))
        }

        async fn create_service_instance(
            &self,
            _instance_id: &str,
            _request: CreateServiceInstanceRequest,
        ) -> Result<CreateServiceInstanceResponse> {
            Err(ProvisionerError::Unimplemented("create_service_instance"))
        }

        async fn remove_service_instance(
            &self,
            instance_id: &str,
        ) -> Result<DeleteServiceInstanceResponse> {
            Err(ProvisionerError::instance_not_found(instance_id))
        }

        async fn bind(
            &self,
            instance_id: &str,
            _binding_id: &str,
            _request: BindingRequest,
        ) -> Result<CreateServiceBindingResponse> {
            Err(ProvisionerError::instance_not_found(instance_id))
        }

        async fn unbind(&self, _instance_id: &str, binding_id: &str) -> Result<()> {
            Err(ProvisionerError::binding_not_found(binding_id))
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let provisioner: Arc<dyn Provisioner> = Arc::new(EmptyProvisioner);

        assert!(provisioner.catalog().await.unwrap().services.is_empty());

        let err = provisioner.get_service_instance("abc").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "Service instance not found: abc");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProvisionerError::Conflict("dup".into()).kind(), "conflict");
        assert_eq!(ProvisionerError::Validation("bad plan".into()).kind(), "validation_error");
        assert_eq!(ProvisionerError::Backend("backend down".into()).kind(), "provisioner_error");
        assert_eq!(ProvisionerError::Unimplemented("bind").kind(), "unimplemented");
        assert_eq!(
            ProvisionerError::binding_not_found("b1").to_string(),
            "Service binding not found: b1"
        );
    }
}
