//! Single-shot raw send demo.
//!
//! Builds an HTML message with CC/BCC recipients and a file attachment,
//! resolves credentials through a provider chain, and submits the raw
//! artifact. Uses the mock transport so it runs without cloud access;
//! swap in a real `RawTransport` implementation for live sends.

use std::sync::Arc;

use rawmail::credentials::{
    ChainCredentialProvider, EnvironmentCredentialProvider, StaticCredentialProvider,
};
use rawmail::mocks::MockRawTransport;
use rawmail::{Attachment, Mailer, MailerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let message_title = "Hello, World!";
    let message_body = "This is a sample email sent through a raw-email transport.";

    let html = format!(
        r#"<html>
  <body style="background-color: #f5f5f5;">
    <h1 style="color: #333;">{}</h1>
    <p style="color: #666;">{}</p>
  </body>
</html>"#,
        message_title, message_body
    );

    // A small attachment written to a temp path for the demo
    let report_path = std::env::temp_dir().join("monthly_report.csv");
    std::fs::write(&report_path, b"Date,Sales\n2025-12-01,50000\n")?;

    let config = MailerConfig::builder()
        .sender("Admin <admin@example.com>")?
        .build()?;

    // Environment first, demo fallback second
    let credentials = ChainCredentialProvider::new()
        .with_provider(EnvironmentCredentialProvider::new())
        .with_provider(StaticCredentialProvider::new("DEMOKEY", "DEMOSECRET"));

    let transport = Arc::new(MockRawTransport::with_receipt_id("demo-0001"));
    let mailer = Mailer::new(config, transport.clone(), Arc::new(credentials));

    let message = mailer
        .compose()?
        .to("recipient@example.com")?
        .cc("copy@example.com")?
        .bcc("hidden@example.com")?
        .subject("Sample Email")
        .html(html)
        .attachment(Attachment::from_path(&report_path))
        .build()?;

    let receipt = mailer.send(&message).await?;
    println!(
        "Sent message {} (provider id: {:?})",
        message.message_id, receipt.provider_message_id
    );

    let sends = transport.recorded_sends();
    println!(
        "Transport received {} destinations: {:?}",
        sends[0].destinations.len(),
        sends[0].destinations
    );
    println!("Encoded size: {} bytes", sends[0].data.len());

    std::fs::remove_file(&report_path)?;
    Ok(())
}
