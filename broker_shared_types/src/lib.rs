//! Wire records shared between the broker dispatcher and provisioners.
//!
//! These types mirror the service broker resource model: a catalog of
//! services and plans, instance create/delete records and binding records.
//! Optional fields are skipped on output so provisioners only emit what
//! they actually populate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Open-ended key/value bag passed from the caller through to a provisioner.
pub type Parameters = HashMap<String, serde_json::Value>;

/// Credentials handed back by a binding.
pub type Credential = HashMap<String, serde_json::Value>;

/// Parameter key the dispatcher injects into every binding request.
pub const INSTANCE_ID_PARAMETER: &str = "instanceId";

/// Decodes a parameter bag, treating both an absent field and `null` as empty.
fn nullable_parameters<'de, D>(deserializer: D) -> Result<Parameters, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Parameters>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Catalog
// ============================================================================

/// The services and plans a provisioner offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
}

/// A service offered in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default)]
    pub bindable: bool,
    #[serde(default)]
    pub plan_updateable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub plans: Vec<ServicePlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub name: String,
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Catalog {
    /// Look up a service by id.
    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }
}

impl Service {
    /// Look up one of this service's plans by id.
    pub fn plan(&self, plan_id: &str) -> Option<&ServicePlan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }
}

// ============================================================================
// Instances
// ============================================================================

/// Request body for `PUT /v2/service_instances/{instance_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceRequest {
    /// Missing ids decode as empty; the provisioner decides whether they are valid.
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub plan_id: String,
    /// Never absent once decoded: a missing or `null` bag becomes `{}`.
    #[serde(default, deserialize_with = "nullable_parameters")]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<String>,
    #[serde(default)]
    pub accepts_incomplete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Provisioner-specific fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteServiceInstanceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Descriptor returned when fetching a provisioned instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub instance_id: String,
    pub service_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub parameters: Parameters,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Bindings
// ============================================================================

/// Request body for `PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingRequest {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(default, deserialize_with = "nullable_parameters")]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_resource: Option<serde_json::Value>,
}

impl BindingRequest {
    /// Set the owning instance id in the parameter bag, replacing any value the
    /// caller supplied under the same key.
    pub fn inject_instance_id(&mut self, instance_id: &str) {
        self.parameters.insert(
            INSTANCE_ID_PARAMETER.to_string(),
            serde_json::Value::String(instance_id.to_string()),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceBindingResponse {
    #[serde(default)]
    pub credentials: Credential,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
