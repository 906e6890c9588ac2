//! MIME assembly of messages into transport-ready raw artifacts.
//!
//! Produces RFC 5322 compliant message bytes:
//! - Header encoding (RFC 2047) and folding
//! - Quoted-printable HTML body
//! - Base64 multipart/mixed attachment parts
//! - Deterministic boundaries, so identical inputs give identical bytes
//!
//! The Bcc list is never written into the artifact. Bcc addresses reach
//! recipients only through the flat destination list, which is the point
//! of a blind copy.

use std::fs;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::MailerConfig;
use crate::errors::{MailError, MailErrorKind, MailResult};
use crate::types::{Attachment, Message, RawEmail};

/// Assembles messages into raw MIME artifacts.
///
/// Assembly is a pure in-memory transformation except for attachment file
/// reads. No logging, no network I/O; those belong to the caller.
#[derive(Debug, Clone, Default)]
pub struct MessageAssembler {
    max_message_size: Option<usize>,
}

impl MessageAssembler {
    /// Creates an assembler with no size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler honoring the configured size limit.
    pub fn from_config(config: &MailerConfig) -> Self {
        Self {
            max_message_size: Some(config.max_message_size),
        }
    }

    /// Sets the maximum encoded message size.
    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = Some(limit);
        self
    }

    /// Assembles a message into a [`RawEmail`].
    ///
    /// The artifact's `destinations` concatenate the to, cc, and bcc lists
    /// in that order, duplicates preserved. The Bcc header is omitted from
    /// the encoded bytes.
    pub fn assemble(&self, message: &Message) -> MailResult<RawEmail> {
        if message.recipients.to.is_empty() {
            return Err(MailError::validation(
                MailErrorKind::EmptyToList,
                "Cannot assemble a message with an empty To list",
            ));
        }
        if message.from.email().is_empty() {
            return Err(MailError::validation(
                MailErrorKind::InvalidFromAddress,
                "Cannot assemble a message without a sender",
            ));
        }

        // Read attachment content up front so an unreadable path fails the
        // whole assembly before any bytes are produced.
        let attachment_data = self.read_attachments(&message.attachments)?;

        let mut output = Vec::new();
        let mut boundaries = BoundarySource::new(&message.message_id);

        write_header(&mut output, "Date", &format_date(message))?;
        write_header(&mut output, "From", &message.from.to_header())?;

        let to_list: Vec<String> = message.recipients.to.iter().map(|a| a.to_header()).collect();
        write_header(&mut output, "To", &to_list.join(", "))?;

        if !message.recipients.cc.is_empty() {
            let cc_list: Vec<String> =
                message.recipients.cc.iter().map(|a| a.to_header()).collect();
            write_header(&mut output, "Cc", &cc_list.join(", "))?;
        }

        // No Bcc header, ever.

        write_header(&mut output, "Subject", &encode_header_value(&message.subject))?;
        write_header(&mut output, "Message-ID", &format!("<{}>", message.message_id))?;

        for (name, value) in &message.headers {
            write_header(&mut output, name, &encode_header_value(value))?;
        }

        write_header(&mut output, "MIME-Version", "1.0")?;

        if attachment_data.is_empty() {
            self.write_html_body(&mut output, &message.html)?;
        } else {
            let boundary = boundaries.next();
            write_header(
                &mut output,
                "Content-Type",
                &format!("multipart/mixed; boundary=\"{}\"", boundary),
            )?;
            output.extend_from_slice(b"\r\n");

            output.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            self.write_html_body(&mut output, &message.html)?;
            output.extend_from_slice(b"\r\n");

            for (attachment, data) in message.attachments.iter().zip(&attachment_data) {
                output.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
                write_attachment_part(&mut output, attachment, data)?;
            }

            output.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        }

        if let Some(limit) = self.max_message_size {
            if output.len() > limit {
                return Err(MailError::new(
                    MailErrorKind::MessageTooLarge,
                    format!("Encoded message is {} bytes, limit is {}", output.len(), limit),
                ));
            }
        }

        Ok(RawEmail {
            data: output,
            destinations: message.recipients.destinations(),
        })
    }

    fn read_attachments(&self, attachments: &[Attachment]) -> MailResult<Vec<Vec<u8>>> {
        attachments
            .iter()
            .map(|a| {
                fs::read(&a.path).map_err(|e| {
                    MailError::attachment(format!("Cannot read attachment {}", a.path.display()))
                        .with_cause(e)
                })
            })
            .collect()
    }

    fn write_html_body(&self, output: &mut Vec<u8>, html: &str) -> MailResult<()> {
        write_header(output, "Content-Type", "text/html; charset=utf-8")?;
        write_header(output, "Content-Transfer-Encoding", "quoted-printable")?;
        output.extend_from_slice(b"\r\n");
        output.extend_from_slice(&quoted_printable::encode(html.as_bytes()));
        output.extend_from_slice(b"\r\n");
        Ok(())
    }
}

/// Deterministic boundary generator seeded by the message id.
struct BoundarySource {
    seed: String,
    counter: usize,
}

impl BoundarySource {
    fn new(message_id: &str) -> Self {
        // Only the local part participates; it is unique per message
        let seed = message_id
            .split('@')
            .next()
            .unwrap_or(message_id)
            .replace(['.', '-'], "");
        Self { seed, counter: 0 }
    }

    fn next(&mut self) -> String {
        self.counter += 1;
        format!("----=_Part_{}_{}", self.counter, self.seed)
    }
}

/// Writes a header line, folded at 78 characters.
fn write_header(output: &mut Vec<u8>, name: &str, value: &str) -> MailResult<()> {
    if name.is_empty() || name.chars().any(|c| c.is_control() || c == ':') {
        return Err(MailError::new(
            MailErrorKind::InvalidHeader,
            format!("Invalid header name: {:?}", name),
        ));
    }
    if value.chars().any(|c| c == '\r' || c == '\n') {
        return Err(MailError::new(
            MailErrorKind::InvalidHeader,
            format!("Header {} contains line breaks", name),
        ));
    }

    let header = format!("{}: {}", name, value);
    output.extend_from_slice(fold_header(&header).as_bytes());
    output.extend_from_slice(b"\r\n");
    Ok(())
}

/// Folds a header line at 78 characters.
fn fold_header(header: &str) -> String {
    if header.len() <= 78 {
        return header.to_string();
    }

    let mut result = String::new();
    let mut current_line = String::new();

    for word in header.split(' ') {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= 76 {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            result.push_str(&current_line);
            result.push_str("\r\n ");
            current_line = word.to_string();
        }
    }

    result.push_str(&current_line);
    result
}

/// Encodes a header value using RFC 2047 when it is not plain ASCII.
///
/// Values containing CR/LF are passed through unencoded so that
/// [`write_header`] rejects them instead of smuggling folded headers.
fn encode_header_value(value: &str) -> String {
    if value.contains(['\r', '\n']) || value.chars().all(|c| c.is_ascii() && !c.is_control()) {
        return value.to_string();
    }
    format!("=?UTF-8?B?{}?=", BASE64.encode(value.as_bytes()))
}

/// Formats the Date header from the message's injected timestamp.
fn format_date(message: &Message) -> String {
    message.date.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Writes one base64-encoded attachment part.
fn write_attachment_part(
    output: &mut Vec<u8>,
    attachment: &Attachment,
    data: &[u8],
) -> MailResult<()> {
    write_header(
        output,
        "Content-Type",
        &format!("{}; name=\"{}\"", attachment.content_type, attachment.filename),
    )?;
    write_header(output, "Content-Transfer-Encoding", "base64")?;
    write_header(
        output,
        "Content-Disposition",
        &format!("attachment; filename=\"{}\"", attachment.filename),
    )?;
    output.extend_from_slice(b"\r\n");

    let encoded = BASE64.encode(data);
    for chunk in encoded.as_bytes().chunks(76) {
        output.extend_from_slice(chunk);
        output.extend_from_slice(b"\r\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use chrono::TimeZone;
    use std::io::Write;

    fn fixed_date() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2025, 12, 1, 9, 30, 0).unwrap()
    }

    fn basic_message() -> Message {
        Message::builder()
            .from("Admin <admin@example.com>").unwrap()
            .to("recipient@example.com").unwrap()
            .subject("Monthly Report")
            .html("<h1>Hello, World!</h1>")
            .message_id("fixed.123@example.com")
            .date(fixed_date())
            .build()
            .unwrap()
    }

    #[test]
    fn test_basic_assembly_headers() {
        let raw = MessageAssembler::new().assemble(&basic_message()).unwrap();
        let content = String::from_utf8_lossy(&raw.data);

        assert!(content.contains("From: Admin <admin@example.com>"));
        assert!(content.contains("To: recipient@example.com"));
        assert!(content.contains("Subject: Monthly Report"));
        assert!(content.contains("MIME-Version: 1.0"));
        assert!(content.contains("Message-ID: <fixed.123@example.com>"));
        assert!(content.contains("Content-Type: text/html; charset=utf-8"));
        assert_eq!(raw.destinations, vec!["recipient@example.com"]);
    }

    #[test]
    fn test_bcc_routed_but_not_in_headers() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .bcc("b@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .message_id("fixed.456@x.com")
            .date(fixed_date())
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        let content = String::from_utf8_lossy(&raw.data);

        assert!(!content.to_lowercase().contains("bcc"));
        assert_eq!(raw.destinations, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_cc_header_present_when_set() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .cc("b@x.com").unwrap()
            .cc("c@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        let content = String::from_utf8_lossy(&raw.data);

        assert!(content.contains("Cc: b@x.com, c@x.com"));
        assert_eq!(raw.destinations.len(), 3);
    }

    #[test]
    fn test_destination_order_and_duplicates() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("dup@x.com").unwrap()
            .cc("dup@x.com").unwrap()
            .bcc("dup@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        assert_eq!(raw.destinations, vec!["dup@x.com", "dup@x.com", "dup@x.com"]);
    }

    #[test]
    fn test_missing_attachment_fails() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .attach_path("/nonexistent/report.pdf")
            .build()
            .unwrap();

        let err = MessageAssembler::new().assemble(&message).unwrap_err();
        assert!(err.is_attachment());
        assert!(err.message().contains("/nonexistent/report.pdf"));
    }

    #[test]
    fn test_attachment_encoding() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"Date,Sales\n2025-12-01,50000\n").unwrap();

        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .subject("s")
            .html("<p>see attached</p>")
            .attachment(Attachment::from_path(file.path()).with_filename("sales.csv"))
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        let content = String::from_utf8_lossy(&raw.data);

        assert!(content.contains("multipart/mixed"));
        assert!(content.contains("Content-Disposition: attachment; filename=\"sales.csv\""));
        assert!(content.contains("Content-Transfer-Encoding: base64"));
        assert!(content.contains(&BASE64.encode(b"Date,Sales\n2025-12-01,50000\n")));
    }

    #[test]
    fn test_idempotent_assembly() {
        let message = basic_message();
        let assembler = MessageAssembler::new();

        let first = assembler.assemble(&message).unwrap();
        let second = assembler.assemble(&message).unwrap();

        assert_eq!(first.data, second.data);
        assert_eq!(first.destinations, second.destinations);
    }

    #[test]
    fn test_subject_rfc2047_encoding() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .subject("Résumé")
            .html("<p>body</p>")
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        let content = String::from_utf8_lossy(&raw.data);
        assert!(content.contains("Subject: =?UTF-8?B?"));
    }

    #[test]
    fn test_header_injection_rejected() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .header("X-Campaign", "summer\r\nBcc: smuggled@x.com")
            .build()
            .unwrap();

        let err = MessageAssembler::new().assemble(&message).unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::InvalidHeader);
    }

    #[test]
    fn test_size_limit_enforced() {
        let message = Message::builder()
            .from("admin@example.com").unwrap()
            .to("a@x.com").unwrap()
            .subject("s")
            .html("<p>body</p>")
            .build()
            .unwrap();

        let err = MessageAssembler::new()
            .with_max_message_size(64)
            .assemble(&message)
            .unwrap_err();
        assert_eq!(err.kind(), MailErrorKind::MessageTooLarge);
    }

    #[test]
    fn test_roundtrip_with_mime_parser() {
        let message = Message::builder()
            .from("Admin <admin@example.com>").unwrap()
            .to("a@x.com").unwrap()
            .to("b@x.com").unwrap()
            .cc("c@x.com").unwrap()
            .subject("Monthly Report")
            .html("<h1>Hello, World!</h1>")
            .date(fixed_date())
            .build()
            .unwrap();

        let raw = MessageAssembler::new().assemble(&message).unwrap();
        let parsed = mailparse::parse_mail(&raw.data).unwrap();

        let headers = &parsed.headers;
        use mailparse::MailHeaderMap;
        assert_eq!(
            headers.get_first_value("Subject").as_deref(),
            Some("Monthly Report")
        );
        assert_eq!(
            headers.get_first_value("From").as_deref(),
            Some("Admin <admin@example.com>")
        );
        assert_eq!(
            headers.get_first_value("To").as_deref(),
            Some("a@x.com, b@x.com")
        );
        assert_eq!(headers.get_first_value("Cc").as_deref(), Some("c@x.com"));
        assert_eq!(parsed.get_body().unwrap().trim_end(), "<h1>Hello, World!</h1>");
    }
}
