//! Single-shot send orchestration.
//!
//! The [`Mailer`] ties the pieces together: resolve credentials through the
//! configured provider, assemble the message, and hand the raw artifact to
//! the transport. Assembly itself stays free of I/O and logging; this layer
//! owns both.

use std::sync::Arc;

use crate::assembler::MessageAssembler;
use crate::config::MailerConfig;
use crate::credentials::CredentialProvider;
use crate::errors::MailResult;
use crate::transport::RawTransport;
use crate::types::{Message, MessageBuilder, SendReceipt};

/// Sends assembled messages through a raw-email transport.
pub struct Mailer {
    config: MailerConfig,
    assembler: MessageAssembler,
    transport: Arc<dyn RawTransport>,
    credentials: Arc<dyn CredentialProvider>,
}

impl Mailer {
    /// Creates a mailer from its collaborators.
    pub fn new(
        config: MailerConfig,
        transport: Arc<dyn RawTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let assembler = MessageAssembler::from_config(&config);
        Self {
            config,
            assembler,
            transport,
            credentials,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Starts a message builder pre-populated with the configured sender
    /// identity and Reply-To.
    pub fn compose(&self) -> MailResult<MessageBuilder> {
        let sender = self.config.sender.to_header();
        let mut builder = Message::builder().from(sender.as_str())?;
        if let Some(reply_to) = &self.config.reply_to {
            builder = builder.header("Reply-To", reply_to.to_header());
        }
        Ok(builder)
    }

    /// Assembles and sends a message.
    ///
    /// Credentials are resolved first so a misconfigured environment fails
    /// before any attachment is read. The transport receives the envelope
    /// sender, the flat destination list, and the encoded bytes.
    pub async fn send(&self, message: &Message) -> MailResult<SendReceipt> {
        let _credentials = self.credentials.credentials().await?;

        let raw = self.assembler.assemble(message)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from = %message.from.email(),
            destinations = raw.destinations.len(),
            bytes = raw.size(),
            "submitting raw message"
        );

        let result = self
            .transport
            .send_raw(message.from.email(), &raw.destinations, &raw.data)
            .await;

        match &result {
            Ok(_receipt) => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    message_id = %message.message_id,
                    provider_message_id = _receipt.provider_message_id.as_deref().unwrap_or(""),
                    "message sent"
                );
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(
                    message_id = %message.message_id,
                    error = %_e,
                    "send failed"
                );
            }
        }

        result
    }
}
