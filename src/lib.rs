//! # rawmail
//!
//! Raw MIME message assembly for raw-email transports:
//! - RFC 5322 message construction with HTML bodies and file attachments
//! - Recipient model (to/cc/bcc) with a flat destination list for the
//!   transport; BCC addresses never appear in the encoded headers
//! - Deterministic assembly: identical inputs give identical bytes
//! - Pluggable credential providers and a pluggable raw transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rawmail::{Mailer, MailerConfig};
//! use rawmail::credentials::EnvironmentCredentialProvider;
//! # use rawmail::mocks::MockRawTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MailerConfig::builder()
//!         .sender("Admin <admin@example.com>")?
//!         .build()?;
//!
//!     # let transport = Arc::new(MockRawTransport::new());
//!     let mailer = Mailer::new(
//!         config,
//!         transport,
//!         Arc::new(EnvironmentCredentialProvider::new()),
//!     );
//!
//!     let message = mailer.compose()?
//!         .to("recipient@example.com")?
//!         .cc("copy@example.com")?
//!         .subject("Sample Email")
//!         .html("<h1>Hello, World!</h1>")
//!         .build()?;
//!
//!     let receipt = mailer.send(&message).await?;
//!     println!("Sent: {:?}", receipt.provider_message_id);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Assembly
pub mod assembler;

// Collaborator ports
pub mod credentials;
pub mod transport;

// Orchestration
pub mod mailer;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use assembler::MessageAssembler;
pub use config::{MailerConfig, MailerConfigBuilder};
pub use credentials::{
    ChainCredentialProvider, CredentialProvider, Credentials, EnvironmentCredentialProvider,
    StaticCredentialProvider,
};
pub use errors::{MailError, MailErrorKind, MailResult};
pub use mailer::Mailer;
pub use transport::RawTransport;
pub use types::{
    Address, Attachment, Message, MessageBuilder, RawEmail, RecipientSet, SendReceipt,
};
