//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive
//! values. The credential is resolved once, at construction time:
//! absence is a construction-time failure, never a per-call one.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{ExtractError, Result};

/// A secret string that won't be logged or displayed.
///
/// Uses `secrecy::SecretBox` to ensure API keys are never accidentally
/// exposed in logs, debug output, or error messages.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// API credentials for a generation backend.
#[derive(Clone)]
pub struct ApiCredentials {
    /// API key (secret)
    pub api_key: SecretString,
}

impl ApiCredentials {
    /// Create credentials from a known key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
        }
    }

    /// Resolve the credential from an environment variable.
    ///
    /// An unset variable is `AuthMissing`; a set-but-blank one is
    /// `AuthInvalid`. Both are fatal and never retried.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if value.trim().is_empty() => Err(ExtractError::AuthInvalid {
                reason: format!("{var} is set but blank"),
            }),
            Ok(value) => Ok(Self::new(value)),
            Err(_) => Err(ExtractError::AuthMissing {
                var: var.to_string(),
            }),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_secret_not_in_debug() {
        let secret = SecretString::new("sk-super-secret-key");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("sk-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_secret_not_in_display() {
        let secret = SecretString::new("sk-super-secret-key");
        let display = format!("{}", secret);
        assert!(!display.contains("sk-super"));
        assert!(display.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let secret = SecretString::new("sk-super-secret-key");
        assert_eq!(secret.expose(), "sk-super-secret-key");
    }

    #[test]
    fn test_from_env_missing() {
        let err = ApiCredentials::from_env("STRUCTEX_TEST_UNSET_KEY").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthMissing);
    }

    #[test]
    fn test_from_env_blank_is_invalid() {
        std::env::set_var("STRUCTEX_TEST_BLANK_KEY", "   ");
        let err = ApiCredentials::from_env("STRUCTEX_TEST_BLANK_KEY").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthInvalid);
        std::env::remove_var("STRUCTEX_TEST_BLANK_KEY");
    }

    #[test]
    fn test_from_env_present() {
        std::env::set_var("STRUCTEX_TEST_SET_KEY", "sk-abc123");
        let creds = ApiCredentials::from_env("STRUCTEX_TEST_SET_KEY").unwrap();
        assert_eq!(creds.api_key.expose(), "sk-abc123");
        std::env::remove_var("STRUCTEX_TEST_SET_KEY");
    }
}
