//! Mock implementations for testing.
//!
//! Provides a recording transport, a programmable credential provider, and
//! canned test messages.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;

use crate::credentials::{CredentialProvider, Credentials};
use crate::errors::{MailError, MailResult};
use crate::transport::RawTransport;
use crate::types::{Message, SendReceipt};

/// One recorded `send_raw` invocation.
#[derive(Debug, Clone)]
pub struct RecordedSend {
    /// Envelope sender.
    pub from: String,
    /// Destination list as handed to the transport.
    pub destinations: Vec<String>,
    /// Encoded message bytes.
    pub data: Vec<u8>,
}

/// Mock raw-email transport that records every send.
#[derive(Debug, Default)]
pub struct MockRawTransport {
    sends: Arc<Mutex<Vec<RecordedSend>>>,
    fail_next: Arc<Mutex<Option<MailError>>>,
    receipt_id: Option<String>,
}

impl MockRawTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock transport that reports the given provider message id.
    pub fn with_receipt_id(id: impl Into<String>) -> Self {
        Self {
            receipt_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the next send to fail with the given error.
    pub fn fail_next_with(&self, error: MailError) -> &Self {
        *self.fail_next.lock().unwrap() = Some(error);
        self
    }

    /// Returns all recorded sends.
    pub fn recorded_sends(&self) -> Vec<RecordedSend> {
        self.sends.lock().unwrap().clone()
    }

    /// Clears recorded sends and any programmed failure.
    pub fn clear(&self) {
        self.sends.lock().unwrap().clear();
        *self.fail_next.lock().unwrap() = None;
    }
}

#[async_trait]
impl RawTransport for MockRawTransport {
    async fn send_raw(
        &self,
        from: &str,
        destinations: &[String],
        data: &[u8],
    ) -> MailResult<SendReceipt> {
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }

        self.sends.lock().unwrap().push(RecordedSend {
            from: from.to_string(),
            destinations: destinations.to_vec(),
            data: data.to_vec(),
        });

        Ok(SendReceipt {
            provider_message_id: self.receipt_id.clone(),
        })
    }
}

/// Mock credential provider.
#[derive(Debug, Clone)]
pub struct MockCredentialProvider {
    access_key_id: String,
    secret_access_key: String,
    should_fail: bool,
}

impl MockCredentialProvider {
    /// Creates a new mock provider.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            should_fail: false,
        }
    }

    /// Sets whether credential resolution should fail.
    pub fn set_should_fail(&mut self, fail: bool) {
        self.should_fail = fail;
    }
}

#[async_trait]
impl CredentialProvider for MockCredentialProvider {
    async fn credentials(&self) -> MailResult<Credentials> {
        if self.should_fail {
            Err(MailError::credentials("Mock credential failure"))
        } else {
            Ok(Credentials::new(
                self.access_key_id.clone(),
                self.secret_access_key.clone(),
            ))
        }
    }
}

/// Fixed timestamp used by the canned messages.
pub fn test_date() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc.with_ymd_and_hms(2025, 12, 1, 9, 30, 0).unwrap()
}

/// Creates a deterministic test message.
pub fn test_message() -> MailResult<Message> {
    Message::builder()
        .from("sender@example.com")?
        .to("recipient@example.com")?
        .subject("Test Subject")
        .html("<p>Test body</p>")
        .message_id("test.1@example.com")
        .date(test_date())
        .build()
}

/// Creates a deterministic test message with CC and BCC recipients.
pub fn test_message_full() -> MailResult<Message> {
    Message::builder()
        .from("Admin <sender@example.com>")?
        .to("recipient@example.com")?
        .cc("copy@example.com")?
        .bcc("hidden@example.com")?
        .subject("Test Subject")
        .html("<h1>Hello, World!</h1>")
        .message_id("test.2@example.com")
        .date(test_date())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_records_sends() {
        let transport = MockRawTransport::with_receipt_id("ses-0001");

        let receipt = transport
            .send_raw(
                "sender@example.com",
                &["a@x.com".to_string(), "b@x.com".to_string()],
                b"raw bytes",
            )
            .await
            .unwrap();

        assert_eq!(receipt.provider_message_id.as_deref(), Some("ses-0001"));

        let sends = transport.recorded_sends();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].from, "sender@example.com");
        assert_eq!(sends[0].destinations.len(), 2);
        assert_eq!(sends[0].data, b"raw bytes");
    }

    #[test]
    fn test_mock_transport_failure() {
        tokio_test::block_on(async {
            let transport = MockRawTransport::new();
            transport.fail_next_with(MailError::transport("simulated outage"));

            let result = transport.send_raw("s@x.com", &[], b"").await;
            assert!(result.is_err());

            // The failure is consumed; the next send succeeds
            assert!(transport.send_raw("s@x.com", &[], b"").await.is_ok());
        });
    }

    #[test]
    fn test_canned_messages() {
        let message = test_message_full().unwrap();
        assert_eq!(message.recipients.len(), 3);
        assert_eq!(message.from.email(), "sender@example.com");
    }
}
