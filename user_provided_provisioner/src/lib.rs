//! Provisioner implementations for the service broker.
//!
//! This crate provides implementations of the `Provisioner` trait:
//! - `UserProvidedProvisioner`: an in-memory "user-provided service" that
//!   hands out caller-supplied credentials on bind.

pub mod user_provided;

// Re-export common types
pub use provisioner_interface::{Provisioner, ProvisionerError};

pub use user_provided::{
    UserProvidedProvisioner, DEFAULT_PLAN_ID, USER_PROVIDED_SERVICE_ID,
};
