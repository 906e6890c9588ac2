//! Error types for message assembly and sending.
//!
//! Errors carry a [`MailErrorKind`] so callers can distinguish bad input
//! (validation), unreadable attachments, serialization failures, and
//! failures in the external collaborators (credentials, transport).

use std::fmt;
use thiserror::Error;

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Kinds of mail failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailErrorKind {
    // Validation errors
    /// Sender address is missing or malformed.
    InvalidFromAddress,
    /// A recipient address is malformed.
    InvalidRecipientAddress,
    /// The `to` list is empty.
    EmptyToList,

    // Attachment errors
    /// An attachment path could not be read.
    AttachmentUnreadable,

    // Encoding errors
    /// A header name or value is not representable.
    InvalidHeader,
    /// Message serialization failed.
    EncodingFailed,
    /// The encoded message exceeds the configured size limit.
    MessageTooLarge,

    // Collaborator errors
    /// Credentials could not be resolved.
    CredentialsUnavailable,
    /// The transport rejected or failed the send.
    TransportFailed,
    /// Configuration is invalid.
    ConfigurationInvalid,
}

impl MailErrorKind {
    /// Returns true for bad-input-shape errors.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MailErrorKind::InvalidFromAddress
                | MailErrorKind::InvalidRecipientAddress
                | MailErrorKind::EmptyToList
        )
    }

    /// Returns true for attachment errors.
    pub fn is_attachment(&self) -> bool {
        matches!(self, MailErrorKind::AttachmentUnreadable)
    }

    /// Returns true for serialization errors.
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            MailErrorKind::InvalidHeader
                | MailErrorKind::EncodingFailed
                | MailErrorKind::MessageTooLarge
        )
    }
}

impl fmt::Display for MailErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailErrorKind::InvalidFromAddress => write!(f, "Invalid sender address"),
            MailErrorKind::InvalidRecipientAddress => write!(f, "Invalid recipient address"),
            MailErrorKind::EmptyToList => write!(f, "Empty to list"),
            MailErrorKind::AttachmentUnreadable => write!(f, "Attachment unreadable"),
            MailErrorKind::InvalidHeader => write!(f, "Invalid header"),
            MailErrorKind::EncodingFailed => write!(f, "Encoding failed"),
            MailErrorKind::MessageTooLarge => write!(f, "Message too large"),
            MailErrorKind::CredentialsUnavailable => write!(f, "Credentials unavailable"),
            MailErrorKind::TransportFailed => write!(f, "Transport failed"),
            MailErrorKind::ConfigurationInvalid => write!(f, "Invalid configuration"),
        }
    }
}

/// Mail error with kind, message, and optional underlying cause.
#[derive(Error, Debug)]
pub struct MailError {
    kind: MailErrorKind,
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl MailError {
    /// Creates a new error.
    pub fn new(kind: MailErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_cause<E: std::error::Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> MailErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true for bad-input-shape errors.
    pub fn is_validation(&self) -> bool {
        self.kind.is_validation()
    }

    /// Returns true for attachment errors.
    pub fn is_attachment(&self) -> bool {
        self.kind.is_attachment()
    }

    /// Returns true for serialization errors.
    pub fn is_encoding(&self) -> bool {
        self.kind.is_encoding()
    }

    // Convenience constructors

    /// Creates a validation error.
    pub fn validation(kind: MailErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message)
    }

    /// Creates an attachment error.
    pub fn attachment(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::AttachmentUnreadable, message)
    }

    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::EncodingFailed, message)
    }

    /// Creates a credentials error.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::CredentialsUnavailable, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::TransportFailed, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(MailErrorKind::ConfigurationInvalid, message)
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(MailErrorKind::EmptyToList.is_validation());
        assert!(MailErrorKind::InvalidFromAddress.is_validation());
        assert!(MailErrorKind::AttachmentUnreadable.is_attachment());
        assert!(MailErrorKind::InvalidHeader.is_encoding());
        assert!(!MailErrorKind::TransportFailed.is_validation());
        assert!(!MailErrorKind::AttachmentUnreadable.is_encoding());
    }

    #[test]
    fn test_error_display() {
        let err = MailError::attachment("cannot read report.pdf");
        assert_eq!(err.kind(), MailErrorKind::AttachmentUnreadable);
        assert_eq!(
            format!("{}", err),
            "Attachment unreadable: cannot read report.pdf"
        );
    }

    #[test]
    fn test_error_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = MailError::attachment("cannot read report.pdf").with_cause(io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
