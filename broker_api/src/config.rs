//! Broker server configuration.

use clap::{Parser, ValueEnum};

/// How error responses are assigned an HTTP status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ErrorStatusPolicy {
    /// Every error responds `400 Bad Request`.
    #[default]
    Uniform,
    /// Each error category gets its own status (404, 409, 422, 500, 501).
    ByKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Command-line and environment configuration for the broker binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "service-broker")]
#[command(version)]
#[command(about = "Service broker provisioning API", long_about = None)]
pub struct BrokerConfig {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "BROKER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8005, env = "BROKER_PORT")]
    pub port: u16,

    /// Status code policy for error responses
    #[arg(long, value_enum, default_value_t = ErrorStatusPolicy::Uniform, env = "BROKER_ERROR_STATUS")]
    pub error_status: ErrorStatusPolicy,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "BROKER_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl BrokerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8005,
            error_status: ErrorStatusPolicy::Uniform,
            log_format: LogFormat::Pretty,
        }
    }
}
