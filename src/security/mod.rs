//! Credential handling for the generation capability.

pub mod credentials;

pub use credentials::{ApiCredentials, SecretString};
