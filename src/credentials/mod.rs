//! Credential resolution for raw-email transports.
//!
//! The [`CredentialProvider`] trait is the port; adapters cover the common
//! sources:
//! - [`StaticCredentialProvider`]: fixed credentials for tests/development
//! - [`EnvironmentCredentialProvider`]: standard AWS environment variables
//! - [`ChainCredentialProvider`]: first provider that succeeds wins
//!
//! The secret key is held in a [`SecretString`] so it is never logged and
//! is zeroized on drop; `Debug` output redacts it.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::{MailError, MailResult};

/// Access credentials for a cloud email-sending API.
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<String>,
    expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::new(secret_access_key.into()),
            session_token: None,
            expiration: None,
        }
    }

    /// Adds a session token for temporary credentials.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Adds an expiration time for temporary credentials.
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Returns the access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the secret access key.
    ///
    /// This exposes the secret; do not log or persist the value.
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    /// Returns the session token if present.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Returns true if the credentials have an expiration time that has
    /// already passed.
    pub fn is_expired(&self) -> bool {
        match self.expiration {
            Some(expiration) => Utc::now() >= expiration,
            None => false,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Port for credential retrieval.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolves credentials, or fails with a `CredentialsUnavailable` error.
    async fn credentials(&self) -> MailResult<Credentials>;
}

/// Fixed credentials, for tests and local development.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Creates a provider returning the given credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key),
        }
    }

    /// Creates a provider from existing credentials.
    pub fn from_credentials(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn credentials(&self) -> MailResult<Credentials> {
        if self.credentials.is_expired() {
            return Err(MailError::credentials("Static credentials are expired"));
        }
        Ok(self.credentials.clone())
    }
}

/// Loads credentials from the standard environment variables:
/// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, and optionally
/// `AWS_SESSION_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentCredentialProvider;

impl EnvironmentCredentialProvider {
    /// Creates a new environment provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialProvider for EnvironmentCredentialProvider {
    async fn credentials(&self) -> MailResult<Credentials> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| MailError::credentials("AWS_ACCESS_KEY_ID is not set"))?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| MailError::credentials("AWS_SECRET_ACCESS_KEY is not set"))?;

        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Err(MailError::credentials(
                "Environment credentials are present but empty",
            ));
        }

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            if !token.is_empty() {
                credentials = credentials.with_session_token(token);
            }
        }

        Ok(credentials)
    }
}

/// Chains providers, returning the first successfully resolved credentials.
#[derive(Default)]
pub struct ChainCredentialProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainCredentialProvider {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the chain.
    pub fn with_provider(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl fmt::Debug for ChainCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCredentialProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for ChainCredentialProvider {
    async fn credentials(&self) -> MailResult<Credentials> {
        if self.providers.is_empty() {
            return Err(MailError::credentials("Credential chain is empty"));
        }

        let mut last_message = String::new();
        for provider in &self.providers {
            match provider.credentials().await {
                Ok(credentials) => return Ok(credentials),
                Err(e) => last_message = e.message().to_string(),
            }
        }

        Err(MailError::credentials(format!(
            "No provider in the chain yielded credentials (last: {})",
            last_message
        )))
    }
}
