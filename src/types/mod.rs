//! Core types for message assembly.
//!
//! This module provides:
//! - Address types with validation
//! - Recipient sets (to/cc/bcc) and their flat destination view
//! - Path-based attachments
//! - The `Message` structure and its builder
//! - The assembled `RawEmail` artifact

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{MailError, MailErrorKind, MailResult};

/// Email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Display name (e.g., "Admin").
    pub name: Option<String>,
    /// Email address (e.g., "admin@example.com").
    pub email: String,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> MailResult<Self> {
        let email = email.into();
        Self::validate_email(&email, MailErrorKind::InvalidRecipientAddress)?;
        Ok(Self { name: None, email })
    }

    /// Creates a new address with display name and email.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> MailResult<Self> {
        let email = email.into();
        Self::validate_email(&email, MailErrorKind::InvalidRecipientAddress)?;
        Ok(Self {
            name: Some(name.into()),
            email,
        })
    }

    /// Parses an address from a string (e.g., "Admin <admin@example.com>").
    pub fn parse(s: &str) -> MailResult<Self> {
        let s = s.trim();

        if let Some(start) = s.find('<') {
            if let Some(end) = s.find('>') {
                let name = s[..start].trim().trim_matches('"');
                let email = s[start + 1..end].trim();
                return Self::with_name(name, email);
            }
        }

        Self::new(s)
    }

    /// Validates an email address according to RFC 5321/5322 shape rules.
    fn validate_email(email: &str, kind: MailErrorKind) -> MailResult<()> {
        if email.is_empty() {
            return Err(MailError::validation(kind, "Email address cannot be empty"));
        }

        if email.len() > 254 {
            return Err(MailError::validation(
                kind,
                "Email address too long (max 254 characters)",
            ));
        }

        let at_count = email.chars().filter(|c| *c == '@').count();
        if at_count != 1 {
            return Err(MailError::validation(
                kind,
                "Email address must contain exactly one @",
            ));
        }

        let parts: Vec<&str> = email.split('@').collect();
        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() || local.len() > 64 {
            return Err(MailError::validation(
                kind,
                "Local part must be 1-64 characters",
            ));
        }

        if domain.is_empty() {
            return Err(MailError::validation(kind, "Domain cannot be empty"));
        }

        if email.chars().any(|c| c.is_control()) {
            return Err(MailError::validation(
                kind,
                "Email address cannot contain control characters",
            ));
        }

        Ok(())
    }

    /// Returns the email part only.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name if present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the domain part of the address.
    pub fn domain(&self) -> &str {
        self.email.split('@').nth(1).unwrap_or("localhost")
    }

    /// Formats the address for message headers.
    pub fn to_header(&self) -> String {
        match &self.name {
            Some(name) => {
                // Quote name if it contains special characters
                if name.contains(|c: char| !c.is_alphanumeric() && c != ' ') {
                    format!("\"{}\" <{}>", name, self.email)
                } else {
                    format!("{} <{}>", name, self.email)
                }
            }
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header())
    }
}

impl TryFrom<&str> for Address {
    type Error = MailError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = MailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::parse(&s)
    }
}

/// Recipient addresses grouped by header category.
///
/// Addresses are never deduplicated, neither within a list nor across lists.
/// The transport treats each destination as an independent delivery target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipientSet {
    /// Primary recipients. Must be non-empty for a sendable message.
    pub to: Vec<Address>,
    /// Carbon-copy recipients.
    pub cc: Vec<Address>,
    /// Blind carbon-copy recipients. Routed to but never written into headers.
    pub bcc: Vec<Address>,
}

impl RecipientSet {
    /// Creates an empty recipient set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recipients in to, cc, bcc order.
    pub fn all(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }

    /// Returns the flat destination list for the transport, in to, cc, bcc
    /// order with duplicates preserved.
    pub fn destinations(&self) -> Vec<String> {
        self.all().map(|a| a.email.clone()).collect()
    }

    /// Returns the total recipient count.
    pub fn len(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Returns true if no recipients are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// File attachment, referenced by path.
///
/// The file content is read when the message is assembled, not when the
/// attachment is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Path to the file on disk.
    pub path: PathBuf,
    /// Filename presented to recipients.
    pub filename: String,
    /// MIME content type.
    pub content_type: String,
}

impl Attachment {
    /// Creates an attachment from a path, guessing the content type from
    /// the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        Self {
            path,
            filename,
            content_type,
        }
    }

    /// Overrides the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Overrides the presented filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

/// A complete message ready for assembly.
///
/// Date and message id are fixed at build time so that assembling the same
/// message twice produces byte-identical output.
#[derive(Debug, Clone)]
pub struct Message {
    /// Sender address.
    pub from: Address,
    /// Recipients.
    pub recipients: RecipientSet,
    /// Subject line.
    pub subject: String,
    /// Pre-rendered HTML body. No sanitization is performed.
    pub html: String,
    /// File attachments, in order.
    pub attachments: Vec<Attachment>,
    /// Additional headers, sorted by name.
    pub headers: BTreeMap<String, String>,
    /// Message-ID header value (without angle brackets).
    pub message_id: String,
    /// Date header value.
    pub date: DateTime<Utc>,
}

impl Message {
    /// Creates a new message builder.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }
}

/// Builder for [`Message`].
#[derive(Debug, Default)]
pub struct MessageBuilder {
    from: Option<Address>,
    recipients: RecipientSet,
    subject: String,
    html: Option<String>,
    attachments: Vec<Attachment>,
    headers: BTreeMap<String, String>,
    message_id: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    /// Sets the sender address. The display name is optional.
    pub fn from(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        let mut address = address.try_into().map_err(|e| {
            MailError::validation(MailErrorKind::InvalidFromAddress, e.message().to_string())
        })?;
        if address.name.as_deref() == Some("") {
            address.name = None;
        }
        self.from = Some(address);
        Ok(self)
    }

    /// Adds a primary recipient.
    pub fn to(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        self.recipients.to.push(address.try_into()?);
        Ok(self)
    }

    /// Adds multiple primary recipients.
    pub fn to_many<I, A>(mut self, addresses: I) -> MailResult<Self>
    where
        I: IntoIterator<Item = A>,
        A: TryInto<Address, Error = MailError>,
    {
        for addr in addresses {
            self.recipients.to.push(addr.try_into()?);
        }
        Ok(self)
    }

    /// Adds a CC recipient.
    pub fn cc(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        self.recipients.cc.push(address.try_into()?);
        Ok(self)
    }

    /// Adds a BCC recipient.
    pub fn bcc(mut self, address: impl TryInto<Address, Error = MailError>) -> MailResult<Self> {
        self.recipients.bcc.push(address.try_into()?);
        Ok(self)
    }

    /// Replaces the full recipient set.
    pub fn recipients(mut self, recipients: RecipientSet) -> Self {
        self.recipients = recipients;
        self
    }

    /// Sets the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Adds an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Adds an attachment by path.
    pub fn attach_path(mut self, path: impl AsRef<Path>) -> Self {
        self.attachments.push(Attachment::from_path(path));
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the message id (without angle brackets).
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Sets the Date header value.
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Builds the message, validating required fields.
    pub fn build(self) -> MailResult<Message> {
        let from = self.from.ok_or_else(|| {
            MailError::validation(
                MailErrorKind::InvalidFromAddress,
                "From address is required",
            )
        })?;

        if self.recipients.to.is_empty() {
            return Err(MailError::validation(
                MailErrorKind::EmptyToList,
                "At least one To recipient is required",
            ));
        }

        let html = self.html.ok_or_else(|| {
            MailError::encoding("HTML body is required")
        })?;

        let date = self.date.unwrap_or_else(Utc::now);
        let message_id = self
            .message_id
            .unwrap_or_else(|| format!("{}.{}@{}", Uuid::new_v4(), date.timestamp(), from.domain()));

        Ok(Message {
            from,
            recipients: self.recipients,
            subject: self.subject,
            html,
            attachments: self.attachments,
            headers: self.headers,
            message_id,
            date,
        })
    }
}

/// The assembled artifact: encoded message bytes plus the flat destination
/// list handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEmail {
    /// Fully encoded RFC 5322 message.
    pub data: Vec<u8>,
    /// All recipient addresses in to, cc, bcc order.
    pub destinations: Vec<String>,
}

impl RawEmail {
    /// Returns the encoded size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Receipt returned by a transport after accepting a raw message.
#[derive(Debug, Clone, Default)]
pub struct SendReceipt {
    /// Provider-assigned message id, when the transport reports one.
    pub provider_message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse() {
        let addr = Address::parse("test@example.com").unwrap();
        assert_eq!(addr.email, "test@example.com");
        assert!(addr.name.is_none());

        let addr = Address::parse("Admin <admin@example.com>").unwrap();
        assert_eq!(addr.email, "admin@example.com");
        assert_eq!(addr.name, Some("Admin".to_string()));

        let addr = Address::parse("\"Doe, John\" <john@example.com>").unwrap();
        assert_eq!(addr.name, Some("Doe, John".to_string()));
    }

    #[rstest::rstest]
    #[case("test@example.com")]
    #[case("test.name@sub.example.com")]
    fn test_valid_addresses(#[case] input: &str) {
        assert!(Address::new(input).is_ok());
    }

    #[rstest::rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("two@@signs.com")]
    #[case("@no-local.com")]
    #[case("no-domain@")]
    #[case("control\x07char@example.com")]
    fn test_invalid_addresses(#[case] input: &str) {
        assert!(Address::new(input).is_err());
    }

    #[test]
    fn test_recipient_set_destinations_order() {
        let recipients = RecipientSet {
            to: vec![Address::new("a@x.com").unwrap()],
            cc: vec![Address::new("b@x.com").unwrap(), Address::new("a@x.com").unwrap()],
            bcc: vec![Address::new("c@x.com").unwrap()],
        };

        // Duplicates across lists pass through unchanged
        assert_eq!(
            recipients.destinations(),
            vec!["a@x.com", "b@x.com", "a@x.com", "c@x.com"]
        );
        assert_eq!(recipients.len(), 4);
    }

    #[test]
    fn test_attachment_from_path() {
        let attachment = Attachment::from_path("reports/monthly.pdf");
        assert_eq!(attachment.filename, "monthly.pdf");
        assert_eq!(attachment.content_type, "application/pdf");

        let csv = Attachment::from_path("data.bin").with_content_type("text/csv");
        assert_eq!(csv.content_type, "text/csv");
    }

    #[test]
    fn test_message_builder() {
        let message = Message::builder()
            .from("Admin <admin@example.com>").unwrap()
            .to("recipient@example.com").unwrap()
            .subject("Test")
            .html("<p>Hello</p>")
            .build()
            .unwrap();

        assert_eq!(message.from.email, "admin@example.com");
        assert_eq!(message.recipients.to.len(), 1);
        assert_eq!(message.subject, "Test");
        assert!(message.message_id.ends_with("@example.com"));
    }

    #[test]
    fn test_message_builder_requires_from() {
        let result = Message::builder()
            .to("recipient@example.com").unwrap()
            .html("<p>Hello</p>")
            .build();

        let err = result.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::InvalidFromAddress);
    }

    #[test]
    fn test_message_builder_rejects_empty_to() {
        // CC/BCC alone are not enough; the To list must be non-empty
        let result = Message::builder()
            .from("admin@example.com").unwrap()
            .cc("copy@example.com").unwrap()
            .html("<p>Hello</p>")
            .build();

        let err = result.unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::EmptyToList);
        assert!(err.is_validation());
    }

    #[test]
    fn test_message_builder_requires_body() {
        let result = Message::builder()
            .from("admin@example.com").unwrap()
            .to("recipient@example.com").unwrap()
            .build();
        assert!(result.is_err());
    }
}
