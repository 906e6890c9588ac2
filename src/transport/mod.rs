//! Transport port for raw-email delivery.
//!
//! A transport accepts a fully encoded MIME message plus an explicit
//! destination list and hands it to a delivery backend (SES SendRawEmail,
//! an SMTP relay, and so on). Implementations live outside this crate;
//! [`crate::mocks::MockRawTransport`] is provided for tests.

use async_trait::async_trait;

use crate::errors::MailResult;
use crate::types::SendReceipt;

/// Port for sending a pre-encoded raw message.
///
/// The destination list is authoritative: recipients not present in it are
/// not delivered to, regardless of what the message headers say. This is
/// how BCC recipients receive their copy without appearing in headers.
#[async_trait]
pub trait RawTransport: Send + Sync {
    /// Submits the raw message to every destination.
    ///
    /// `from` is the envelope sender, `destinations` the flat recipient
    /// list (to + cc + bcc), `data` the encoded RFC 5322 message.
    async fn send_raw(
        &self,
        from: &str,
        destinations: &[String],
        data: &[u8],
    ) -> MailResult<SendReceipt>;
}
