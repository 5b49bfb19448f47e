//! User-provided service provisioner.
//!
//! Offers a single bindable service whose instances simply remember a set of
//! credentials. The credentials come from the `credentials` parameter at
//! provision time (either a JSON object or a string holding one) and are
//! returned verbatim by every bind against that instance. They are kept out
//! of the instance descriptor, so fetching an instance never echoes them.
//!
//! All state lives in process memory behind one `RwLock`, so instance and
//! binding bookkeeping always change together.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use broker_shared_types::{
    BindingRequest, Catalog, CreateServiceBindingResponse, CreateServiceInstanceRequest,
    CreateServiceInstanceResponse, Credential, DeleteServiceInstanceResponse, Parameters, Service,
    ServiceInstance, ServicePlan,
};
use provisioner_interface::{Provisioner, ProvisionerError, Result};

pub const USER_PROVIDED_SERVICE_ID: &str = "4f6e6cf6-ffdd-425f-a2c7-3c9258ad2468";
pub const DEFAULT_PLAN_ID: &str = "86064792-7ea2-467b-af93-ac9694d96d52";

const CREDENTIALS_PARAMETER: &str = "credentials";

/// A provisioned instance plus the bindings issued against it.
#[derive(Debug, Clone)]
struct InstanceRecord {
    descriptor: ServiceInstance,
    credential: Credential,
    bindings: HashSet<String>,
}

impl InstanceRecord {
    /// Whether a re-provision asks for exactly what is already stored.
    fn matches(
        &self,
        request: &CreateServiceInstanceRequest,
        parameters: &Parameters,
        credential: &Credential,
    ) -> bool {
        self.descriptor.service_id == request.service_id
            && self.descriptor.plan_id == request.plan_id
            && &self.descriptor.parameters == parameters
            && &self.credential == credential
    }
}

/// In-memory user-provided service provisioner.
pub struct UserProvidedProvisioner {
    catalog: Catalog,
    instances: RwLock<HashMap<String, InstanceRecord>>,
}

impl UserProvidedProvisioner {
    pub fn new() -> Self {
        Self {
            catalog: user_provided_catalog(),
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Number of currently provisioned instances.
    pub async fn instance_count(&self) -> usize {
        self.instances.read().await.len()
    }

    fn validate_plan(&self, service_id: &str, plan_id: &str) -> Result<()> {
        let service = self
            .catalog
            .service(service_id)
            .ok_or_else(|| ProvisionerError::Validation(format!("unknown service_id: {service_id}")))?;

        if service.plan(plan_id).is_none() {
            return Err(ProvisionerError::Validation(format!(
                "unknown plan_id {plan_id} for service {service_id}"
            )));
        }

        Ok(())
    }
}

impl Default for UserProvidedProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

fn user_provided_catalog() -> Catalog {
    Catalog {
        services: vec![Service {
            name: "user-provided-service".to_string(),
            id: USER_PROVIDED_SERVICE_ID.to_string(),
            description: "A user provided service".to_string(),
            bindable: true,
            plans: vec![ServicePlan {
                name: "default".to_string(),
                id: DEFAULT_PLAN_ID.to_string(),
                description: "Credentials supplied by the user at provision time".to_string(),
                free: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fn default_credential() -> Credential {
    Credential::from([
        ("special-key-1".to_string(), "special-value-1".into()),
        ("special-key-2".to_string(), "special-value-2".into()),
    ])
}

/// Provision parameters minus the credentials.
fn descriptor_parameters(parameters: &Parameters) -> Parameters {
    parameters
        .iter()
        .filter(|(key, _)| key.as_str() != CREDENTIALS_PARAMETER)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Extract the credentials to hand out on bind from the provision parameters.
fn credential_from_parameters(parameters: &Parameters) -> Result<Credential> {
    let Some(value) = parameters.get(CREDENTIALS_PARAMETER) else {
        return Ok(default_credential());
    };

    let parsed = match value {
        serde_json::Value::String(raw) => serde_json::from_str::<Credential>(raw),
        other => serde_json::from_value::<Credential>(other.clone()),
    };

    parsed.map_err(|e| {
        ProvisionerError::Validation(format!("credentials must be a JSON object: {e}"))
    })
}

#[async_trait]
impl Provisioner for UserProvidedProvisioner {
    async fn catalog(&self) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }

    async fn get_service_instance(&self, instance_id: &str) -> Result<ServiceInstance> {
        self.instances
            .read()
            .await
            .get(instance_id)
            .map(|record| record.descriptor.clone())
            .ok_or_else(|| ProvisionerError::instance_not_found(instance_id))
    }

    async fn create_service_instance(
        &self,
        instance_id: &str,
        request: CreateServiceInstanceRequest,
    ) -> Result<CreateServiceInstanceResponse> {
        self.validate_plan(&request.service_id, &request.plan_id)?;
        let credential = credential_from_parameters(&request.parameters)?;
        let parameters = descriptor_parameters(&request.parameters);

        let mut instances = self.instances.write().await;

        if let Some(existing) = instances.get(instance_id) {
            if existing.matches(&request, &parameters, &credential) {
                debug!("Instance {} already provisioned with identical request", instance_id);
                return Ok(CreateServiceInstanceResponse::default());
            }
            warn!("Rejecting conflicting re-provision of instance {}", instance_id);
            return Err(ProvisionerError::Conflict(format!(
                "service instance {instance_id} already exists with a different definition"
            )));
        }

        let descriptor = ServiceInstance {
            instance_id: instance_id.to_string(),
            service_id: request.service_id,
            plan_id: request.plan_id,
            parameters,
            created_at: Utc::now(),
        };

        instances.insert(
            instance_id.to_string(),
            InstanceRecord {
                descriptor,
                credential,
                bindings: HashSet::new(),
            },
        );

        info!("Provisioned user-provided instance {}", instance_id);
        Ok(CreateServiceInstanceResponse::default())
    }

    async fn remove_service_instance(
        &self,
        instance_id: &str,
    ) -> Result<DeleteServiceInstanceResponse> {
        let record = self
            .instances
            .write()
            .await
            .remove(instance_id)
            .ok_or_else(|| ProvisionerError::instance_not_found(instance_id))?;

        if !record.bindings.is_empty() {
            warn!(
                "Removed instance {} with {} outstanding binding(s)",
                instance_id,
                record.bindings.len()
            );
        }

        info!("Deprovisioned user-provided instance {}", instance_id);
        Ok(DeleteServiceInstanceResponse::default())
    }

    async fn bind(
        &self,
        instance_id: &str,
        binding_id: &str,
        request: BindingRequest,
    ) -> Result<CreateServiceBindingResponse> {
        let mut instances = self.instances.write().await;
        let record = instances
            .get_mut(instance_id)
            .ok_or_else(|| ProvisionerError::instance_not_found(instance_id))?;

        if record.descriptor.service_id != request.service_id
            || record.descriptor.plan_id != request.plan_id
        {
            return Err(ProvisionerError::Validation(format!(
                "binding for service {} plan {} does not match instance {instance_id} \
                 (service {}, plan {})",
                request.service_id,
                request.plan_id,
                record.descriptor.service_id,
                record.descriptor.plan_id
            )));
        }

        if !record.bindings.insert(binding_id.to_string()) {
            return Err(ProvisionerError::Conflict(format!(
                "service binding {binding_id} already exists for instance {instance_id}"
            )));
        }

        info!("Bound {} to instance {}", binding_id, instance_id);
        Ok(CreateServiceBindingResponse {
            credentials: record.credential.clone(),
            ..Default::default()
        })
    }

    async fn unbind(&self, instance_id: &str, binding_id: &str) -> Result<()> {
        let mut instances = self.instances.write().await;
        let record = instances
            .get_mut(instance_id)
            .ok_or_else(|| ProvisionerError::instance_not_found(instance_id))?;

        if !record.bindings.remove(binding_id) {
            return Err(ProvisionerError::binding_not_found(binding_id));
        }

        info!("Unbound {} from instance {}", binding_id, instance_id);
        Ok(())
    }
}
