// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer credentials for the remote sync endpoint.
//!
//! Token lifecycle is owned elsewhere; this module only asks for the current
//! credential at delivery time.

use std::fmt;

/// Error type for credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential is configured or the configured one is empty.
    #[error("no bearer credential available: {0}")]
    Missing(String),
}

/// A bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of the current bearer credential.
pub trait CredentialProvider: Send + Sync {
    /// Produce a currently valid credential, or fail if none is valid.
    fn credential(&self) -> Result<Credential, AuthError>;
}

/// A fixed credential, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        StaticCredential(Some(Credential::bearer(token)))
    }

    pub fn none() -> Self {
        StaticCredential(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Result<Credential, AuthError> {
        match &self.0 {
            Some(c) if !c.token().is_empty() => Ok(c.clone()),
            _ => Err(AuthError::Missing("no static token configured".to_string())),
        }
    }
}

/// Reads the token from an environment variable on every call, so a
/// rotated token is picked up without a restart.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        EnvCredential { var: var.into() }
    }
}

impl CredentialProvider for EnvCredential {
    fn credential(&self) -> Result<Credential, AuthError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(Credential::bearer(token.trim())),
            Ok(_) => Err(AuthError::Missing(format!("${} is empty", self.var))),
            Err(_) => Err(AuthError::Missing(format!("${} is not set", self.var))),
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
