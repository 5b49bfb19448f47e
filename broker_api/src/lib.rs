// Service Broker API Library
//
// This library provides the HTTP dispatcher for the service broker. It maps
// the catalog, instance and binding routes onto a `Provisioner` and renders
// every result or error as JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::{BrokerConfig, ErrorStatusPolicy, LogFormat};
pub use error::{ApiError, ApiResult, BrokerError, ErrorResponse};
pub use routes::create_router;
pub use server::{BrokerServer, ServerError};
pub use state::ApiState;
