//! Mailer configuration.
//!
//! Replaces ad-hoc constants in the entry point with an explicit,
//! validated configuration struct. No process-wide state.

use serde::{Deserialize, Serialize};

use crate::errors::{MailError, MailResult};
use crate::types::Address;

/// Default maximum encoded message size (10 MB, the common SES limit).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for a [`crate::mailer::Mailer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Sender identity used for the From header and the envelope sender.
    pub sender: Address,
    /// Optional Reply-To address.
    pub reply_to: Option<Address>,
    /// Maximum encoded message size in bytes.
    pub max_message_size: usize,
}

impl MailerConfig {
    /// Creates a new config builder.
    pub fn builder() -> MailerConfigBuilder {
        MailerConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> MailResult<()> {
        if self.sender.email().is_empty() {
            return Err(MailError::configuration("Sender address is required"));
        }
        if self.max_message_size == 0 {
            return Err(MailError::configuration(
                "max_message_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Builder for [`MailerConfig`].
#[derive(Debug, Default)]
pub struct MailerConfigBuilder {
    sender: Option<Address>,
    reply_to: Option<Address>,
    max_message_size: Option<usize>,
}

impl MailerConfigBuilder {
    /// Sets the sender identity.
    pub fn sender(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        self.sender = Some(address.try_into()?);
        Ok(self)
    }

    /// Sets the Reply-To address.
    pub fn reply_to(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        self.reply_to = Some(address.try_into()?);
        Ok(self)
    }

    /// Sets the maximum encoded message size in bytes.
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = Some(bytes);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> MailResult<MailerConfig> {
        let sender = self
            .sender
            .ok_or_else(|| MailError::configuration("Sender address is required"))?;

        let config = MailerConfig {
            sender,
            reply_to: self.reply_to,
            max_message_size: self.max_message_size.unwrap_or(DEFAULT_MAX_MESSAGE_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}
