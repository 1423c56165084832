use crate::error::{Error, Result};
use crate::files::{load_files, FileSource, LocalFiles};
use crate::header::{self, Headers, MimeVersion, Subject};
use crate::mailbox::Mailbox;
use crate::mimebody::{BinaryPart, ContentIdIndex, MimePart, MultiPart, Part, Parts, TextPart};
use crate::options::{Attachment, MailOptions, MessageContent, Recipient, RichText};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, warn};

/// Composed email message
///
/// Built in one step from [`MailOptions`] and immutable afterwards.
///
/// # Example
///
/// ```
/// use mailcompose::{Message, RichText};
///
/// let m = Message::builder()
///     .from(("NoBody", "nobody@domain.tld"))
///     .to("hei@domain.tld")
///     .subject("Happy new year")
///     .message(RichText::new().plain_text("Hello").html_text("<b>Hello</b>"))
///     .build()
///     .unwrap();
///
/// assert!(m.formatted().starts_with(concat!(
///     "From: \"NoBody\" <nobody@domain.tld>\r\n",
///     "To: hei@domain.tld\r\n",
///     "Subject: Happy new year\r\n",
///     "MIME-Version: 1.0\r\n",
///     "Content-Type: multipart/alternative; boundary=",
/// )));
/// ```
///
#[derive(Debug, Clone)]
pub struct Message {
    headers: Headers,
    body: Option<Part>,
}

impl Message {
    /// Creates a message builder
    #[inline]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Compose a message, reading path attachments from the local filesystem
    pub fn new(options: MailOptions) -> Result<Self> {
        Self::with_files(options, &LocalFiles)
    }

    /// Compose a message, reading path attachments from `files`
    pub fn with_files<F>(options: MailOptions, files: &F) -> Result<Self>
    where
        F: FileSource + ?Sized,
    {
        let MailOptions {
            from,
            to,
            subject,
            message,
            attachments,
        } = options;

        let mut headers = Headers::new();

        if let Some(from) = sender(from)? {
            headers.set(header::From(from));
        }
        headers.set(header::To(recipient(to)?));
        if let Some(subject) = subject.filter(|subject| !subject.is_empty()) {
            headers.set(Subject(subject));
        }
        headers.set(MimeVersion);

        let body = match message {
            Some(MessageContent::Text(text)) if !text.is_empty() => Some(TextPart::plain(text).into()),
            Some(MessageContent::Rich(rich)) => rich_body(rich, files)?,
            _ => None,
        };
        let body = attach(body, attachments, files)?;

        Ok(Message { headers, body })
    }

    /// Get the envelope headers (without the body `Content-*` headers)
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Read the body
    #[inline]
    pub fn body(&self) -> Option<&Part> {
        self.body.as_ref()
    }

    /// Render the header block: envelope headers followed by the body headers
    pub fn mail_header(&self) -> String {
        let mut header = self.headers.to_string();
        if let Some(ref body) = self.body {
            header.push_str(&body.mime_header());
        }
        header
    }

    /// Render the encoded body
    pub fn mail_body(&self) -> Option<String> {
        self.body.as_ref().map(MimePart::encode)
    }

    /// Render the complete message, ready to hand to a transport
    pub fn formatted(&self) -> String {
        let mut mail = self.mail_header();
        mail.push_str("\r\n");
        if let Some(body) = self.mail_body() {
            mail.push_str(&body);
        }
        mail
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.formatted())
    }
}

fn mailbox(name: String, address: String, field: &str) -> Result<Mailbox> {
    if name.is_empty() || address.is_empty() {
        return Err(Error::InvalidParam(format!(
            "{} requires a non-empty name and address",
            field
        )));
    }
    Ok(Mailbox::new(Some(name), address))
}

fn malformed(found: String, field: &str) -> Error {
    Error::InvalidParam(format!(
        "{} must be an address or a {{name, address}} object, found {}",
        field, found
    ))
}

fn sender(from: Option<Recipient>) -> Result<Option<Mailbox>> {
    match from {
        None => Ok(None),
        Some(Recipient::Address(address)) if address.is_empty() => Ok(None),
        Some(Recipient::Address(address)) => Ok(Some(Mailbox::new(None, address))),
        Some(Recipient::Named { name, address }) => mailbox(name, address, "from").map(Some),
        Some(Recipient::Malformed(found)) => Err(malformed(found, "from")),
    }
}

fn recipient(to: Option<Recipient>) -> Result<Mailbox> {
    match to {
        None => Err(Error::RecipientMissing),
        Some(Recipient::Address(address)) if address.is_empty() => Err(Error::RecipientMissing),
        Some(Recipient::Address(address)) => Ok(Mailbox::new(None, address)),
        Some(Recipient::Named { name, address }) => mailbox(name, address, "to"),
        Some(Recipient::Malformed(found)) => Err(malformed(found, "to")),
    }
}

/// Text body of plain and/or HTML text, with inline assets for the HTML
fn rich_body<F>(rich: RichText, files: &F) -> Result<Option<Part>>
where
    F: FileSource + ?Sized,
{
    let RichText {
        plain_text,
        html_text,
        assets,
    } = rich;

    let mut parts = Parts::new();
    let mut inline = Vec::new();

    if let Some(text) = plain_text.filter(|text| !text.is_empty()) {
        parts.push(TextPart::plain(text).into());
    }

    match html_text.filter(|text| !text.is_empty()) {
        Some(text) => {
            inline = load_files(assets, true, files)?;
            let index = content_id_index(&inline);
            parts.push(TextPart::html(text, &index).into());
        }
        None if !assets.is_empty() => {
            warn!(assets = assets.len(), "inline assets without HTML text are ignored");
        }
        None => {}
    }

    let body = match parts.len() {
        0 | 1 => parts.pop(),
        _ => {
            debug!(parts = parts.len(), "wrapping text into multipart/alternative");
            Some(MultiPart::alternative(parts)?.into())
        }
    };

    match body {
        Some(body) if !inline.is_empty() => {
            debug!(assets = inline.len(), "wrapping text into multipart/related");
            let mut related = vec![body];
            related.extend(inline.into_iter().map(Part::from));
            Ok(Some(MultiPart::related(related)?.into()))
        }
        body => Ok(body),
    }
}

fn content_id_index(parts: &[BinaryPart]) -> ContentIdIndex {
    let mut index = ContentIdIndex::new();
    for part in parts {
        if let Some(id) = part.content_id() {
            if index.insert(part.filename().to_string(), id.to_string()).is_some() {
                warn!(
                    filename = part.filename(),
                    "duplicate asset filename, only the last one is referenced"
                );
            }
        }
    }
    index
}

fn attach<F>(body: Option<Part>, attachments: Vec<Attachment>, files: &F) -> Result<Option<Part>>
where
    F: FileSource + ?Sized,
{
    let mut attachments = load_files(attachments, false, files)?;

    if attachments.is_empty() {
        return Ok(body);
    }

    match body {
        None if attachments.len() == 1 => Ok(attachments.pop().map(Part::from)),
        body => {
            debug!(attachments = attachments.len(), "wrapping body into multipart/mixed");
            let mut mixed: Parts = body.into_iter().collect();
            mixed.extend(attachments.into_iter().map(Part::from));
            Ok(Some(MultiPart::mixed(mixed)?.into()))
        }
    }
}

/// Message builder
///
/// Collects [`MailOptions`] in the "builder-style" pattern.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    options: MailOptions,
}

impl MessageBuilder {
    /// Creates a new default message builder
    #[inline]
    pub fn new() -> Self {
        MessageBuilder::default()
    }

    /// Set `From:` header
    #[inline]
    pub fn from<R: Into<Recipient>>(mut self, from: R) -> Self {
        self.options.from = Some(from.into());
        self
    }

    /// Set `To:` header
    #[inline]
    pub fn to<R: Into<Recipient>>(mut self, to: R) -> Self {
        self.options.to = Some(to.into());
        self
    }

    /// Set `Subject:` header
    #[inline]
    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.options.subject = Some(subject.into());
        self
    }

    /// Set message text
    #[inline]
    pub fn message<M: Into<MessageContent>>(mut self, message: M) -> Self {
        self.options.message = Some(message.into());
        self
    }

    /// Add an attachment
    #[inline]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.options.attachments.push(attachment);
        self
    }

    /// Add several attachments
    #[inline]
    pub fn attachments<I: IntoIterator<Item = Attachment>>(mut self, attachments: I) -> Self {
        self.options.attachments.extend(attachments);
        self
    }

    /// Get the collected options
    #[inline]
    pub fn options(&self) -> &MailOptions {
        &self.options
    }

    /// Compose the message, reading path attachments from the local filesystem
    pub fn build(self) -> Result<Message> {
        Message::new(self.options)
    }

    /// Compose the message, reading path attachments from `files`
    pub fn build_with<F>(self, files: &F) -> Result<Message>
    where
        F: FileSource + ?Sized,
    {
        Message::with_files(self.options, files)
    }
}

impl From<MailOptions> for MessageBuilder {
    fn from(options: MailOptions) -> Self {
        MessageBuilder { options }
    }
}

#[cfg(test)]
mod test {
    use super::Message;
    use crate::error::Error;
    use crate::header;
    use crate::mailbox::Mailbox;
    use crate::mimebody::{MimePart, MultiPartKind, Part, TextKind};
    use crate::options::{Attachment, MailOptions, Recipient, RichText};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn decode(body: &str) -> String {
        String::from_utf8(STANDARD.decode(body.replace("\r\n", "")).unwrap()).unwrap()
    }

    fn files() -> HashMap<PathBuf, Vec<u8>> {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/data/logo.png"), vec![0x89u8, b'P', b'N', b'G']);
        files.insert(PathBuf::from("/data/report.pdf"), b"%PDF-1.4".to_vec());
        files
    }

    #[test]
    fn envelope_headers() {
        let m = Message::builder()
            .from(("Каи", "kayo@example.com"))
            .to("Pony O.P. <pony@domain.tld>")
            .subject("яңа ел белән!")
            .message("Happy new year!")
            .build()
            .unwrap();

        assert_eq!(
            m.formatted(),
            concat!(
                "From: =?UTF-8?B?0JrQsNC4?= <kayo@example.com>\r\n",
                "To: Pony O.P. <pony@domain.tld>\r\n",
                "Subject: =?UTF-8?B?0Y/So9CwINC10Lsg0LHQtdC705nQvSE=?=\r\n",
                "MIME-Version: 1.0\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "\r\n",
                "SGFwcHkgbmV3IHllYXIh\r\n"
            )
        );
    }

    #[test]
    fn typed_envelope_headers() {
        let m = Message::builder()
            .to(("Hei", "hei@domain.tld"))
            .subject("Hello")
            .build()
            .unwrap();

        assert_eq!(m.headers().get::<header::From>(), None);
        assert_eq!(
            m.headers().get::<header::To>(),
            Some(&header::To(Mailbox::new(Some("Hei".into()), "hei@domain.tld")))
        );
        assert_eq!(
            m.headers().get::<header::Subject>(),
            Some(&header::Subject("Hello".into()))
        );
        assert_eq!(m.headers().get::<header::MimeVersion>(), Some(&header::MimeVersion));
    }

    #[test]
    fn headers_only() {
        let m = Message::builder()
            .from("")
            .to(("Hei", "hei@domain.tld"))
            .subject("")
            .build()
            .unwrap();

        assert!(m.body().is_none());
        assert_eq!(m.mail_body(), None);
        assert_eq!(
            m.formatted(),
            "To: \"Hei\" <hei@domain.tld>\r\nMIME-Version: 1.0\r\n\r\n"
        );
    }

    #[test]
    fn missing_recipient() {
        match Message::new(MailOptions::default()) {
            Err(Error::RecipientMissing) => {}
            other => panic!("unexpected {:?}", other),
        }
        match Message::builder().to("").message("Hi").build() {
            Err(Error::RecipientMissing) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_named_recipients() {
        match Message::builder().to(Recipient::named("", "hei@domain.tld")).build() {
            Err(Error::InvalidParam(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match Message::builder()
            .from(("NoBody", ""))
            .to("hei@domain.tld")
            .build()
        {
            Err(Error::InvalidParam(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_recipients() {
        match Message::builder()
            .to(Recipient::Malformed("integer `42`".into()))
            .build()
        {
            Err(Error::InvalidParam(message)) => assert!(message.starts_with("to ")),
            other => panic!("unexpected {:?}", other),
        }
        match Message::builder()
            .from(Recipient::Malformed("boolean `true`".into()))
            .to("hei@domain.tld")
            .build()
        {
            Err(Error::InvalidParam(message)) => assert!(message.starts_with("from ")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn duplicate_asset_filenames() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(
                RichText::new()
                    .html_text("<img src=\"logo.png\">")
                    .asset(Attachment::path("/data/logo.png"))
                    .asset(Attachment::data("logo.png", vec![1u8])),
            )
            .build_with(&files())
            .unwrap();

        let related = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(related.parts().len(), 3);
        match (&related.parts()[0], &related.parts()[2]) {
            (Part::Text(html), Part::Binary(last)) => assert_eq!(
                html.content(),
                format!("<img src=\"cid:{}\">", last.content_id().unwrap())
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn plain_and_html_become_alternative() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(RichText::new().plain_text("A").html_text("<b>B</b>"))
            .build()
            .unwrap();

        let alternative = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(alternative.kind(), MultiPartKind::Alternative);
        assert_eq!(alternative.parts().len(), 2);
        match (&alternative.parts()[0], &alternative.parts()[1]) {
            (Part::Text(plain), Part::Text(html)) => {
                assert_eq!(plain.kind(), TextKind::Plain);
                assert_eq!(plain.content(), "A");
                assert_eq!(html.kind(), TextKind::Html);
                assert_eq!(html.content(), "<b>B</b>");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_text_field_is_not_wrapped() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(RichText::new().plain_text("").html_text("<b>B</b>"))
            .build()
            .unwrap();

        match m.body() {
            Some(Part::Text(html)) => assert_eq!(html.kind(), TextKind::Html),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_rich_text_has_no_body() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(RichText::new().plain_text(""))
            .build()
            .unwrap();

        assert!(m.body().is_none());
    }

    #[test]
    fn inline_assets_become_related() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(
                RichText::new()
                    .plain_text("A")
                    .html_text("<img src=\"logo.png\">")
                    .asset(Attachment::path("/data/logo.png")),
            )
            .build_with(&files())
            .unwrap();

        let related = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(related.kind(), MultiPartKind::Related);
        assert_eq!(related.parts().len(), 2);

        let (alternative, image) = match (&related.parts()[0], &related.parts()[1]) {
            (Part::Multi(alternative), Part::Binary(image)) => (alternative, image),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(alternative.kind(), MultiPartKind::Alternative);
        assert_ne!(alternative.boundary(), related.boundary());
        assert!(image.is_inline());
        assert_eq!(image.filename(), "logo.png");

        let id = image.content_id().unwrap();
        match &alternative.parts()[1] {
            Part::Text(html) => {
                assert_eq!(html.content(), format!("<img src=\"cid:{}\">", id))
            }
            other => panic!("unexpected {:?}", other),
        }

        let mail = m.formatted();
        assert!(mail.contains(&format!("Content-ID: <{}>\r\n", id)));
        assert!(mail.contains("Content-Disposition: inline; filename=\"logo.png\"\r\n"));
    }

    #[test]
    fn assets_without_html_are_ignored() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message(
                RichText::new()
                    .plain_text("A")
                    .asset(Attachment::path("/data/missing.png")),
            )
            .build_with(&files())
            .unwrap();

        match m.body() {
            Some(Part::Text(plain)) => assert_eq!(plain.content(), "A"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_attachment_is_the_body() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .attachment(Attachment::path("/data/report.pdf"))
            .build_with(&files())
            .unwrap();

        match m.body() {
            Some(Part::Binary(file)) => {
                assert_eq!(file.filename(), "report.pdf");
                assert!(!file.is_inline());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(m.mail_header().ends_with(concat!(
            "Content-Type: application/pdf\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "Content-Disposition: attachment; filename=\"report.pdf\"\r\n"
        )));
        assert_eq!(m.mail_body().as_deref(), Some("JVBERi0xLjQ=\r\n"));
    }

    #[test]
    fn two_attachments_become_mixed() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .attachments(vec![
                Attachment::path("/data/report.pdf"),
                Attachment::data("notes.txt", "hello"),
            ])
            .build_with(&files())
            .unwrap();

        let mixed = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(mixed.kind(), MultiPartKind::Mixed);
        assert_eq!(mixed.parts().len(), 2);

        let body = m.mail_body().unwrap();
        let delimiter = format!("--{}\r\n", mixed.boundary());
        assert_eq!(body.matches(&delimiter).count(), 2);
        assert!(body.ends_with(&format!("--{}--\r\n", mixed.boundary())));
    }

    #[test]
    fn text_and_attachment_become_mixed() {
        let m = Message::builder()
            .to("hei@domain.tld")
            .message("See attached")
            .attachment(Attachment::data("notes.txt", "hello"))
            .build()
            .unwrap();

        let mixed = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(mixed.kind(), MultiPartKind::Mixed);
        match (&mixed.parts()[0], &mixed.parts()[1]) {
            (Part::Text(text), Part::Binary(file)) => {
                assert_eq!(decode(&text.encode()), "See attached");
                assert_eq!(file.filename(), "notes.txt");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn full_topology() {
        let m = Message::builder()
            .from("nobody@domain.tld")
            .to("hei@domain.tld")
            .message(
                RichText::new()
                    .plain_text("Hello")
                    .html_text("<img src='logo.png'>")
                    .asset(Attachment::path("/data/logo.png")),
            )
            .attachment(Attachment::path("/data/report.pdf"))
            .build_with(&files())
            .unwrap();

        let mixed = match m.body() {
            Some(Part::Multi(part)) => part,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(mixed.kind(), MultiPartKind::Mixed);
        match (&mixed.parts()[0], &mixed.parts()[1]) {
            (Part::Multi(related), Part::Binary(file)) => {
                assert_eq!(related.kind(), MultiPartKind::Related);
                assert_eq!(file.filename(), "report.pdf");
            }
            other => panic!("unexpected {:?}", other),
        }

        let mail = m.formatted();
        let header = format!(
            "MIME-Version: 1.0\r\nContent-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
            mixed.boundary()
        );
        assert!(mail.starts_with(&format!("From: nobody@domain.tld\r\nTo: hei@domain.tld\r\n{}", header)));
        assert!(mail.split("\r\n").all(|line| line.len() <= 998));
    }

    #[test]
    fn missing_attachment() {
        match Message::builder()
            .to("hei@domain.tld")
            .attachment(Attachment::path("/data/missing.pdf"))
            .build_with(&files())
        {
            Err(Error::AttachmentNotFound(path)) => {
                assert_eq!(path, PathBuf::from("/data/missing.pdf"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_asset() {
        match Message::builder()
            .to("hei@domain.tld")
            .message(
                RichText::new()
                    .html_text("<img src=\"logo.png\">")
                    .asset(Attachment::path("/data/nope.png")),
            )
            .build_with(&files())
        {
            Err(Error::AttachmentNotFound(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reject_malformed_json_descriptors() {
        let options: MailOptions = serde_json::from_str(
            r#"{"to": "hei@domain.tld", "attachments": [{"filename": "a.txt", "content": "text"}]}"#,
        )
        .unwrap();
        match Message::new(options) {
            Err(Error::ContentNotBinary) => {}
            other => panic!("unexpected {:?}", other),
        }

        let options: MailOptions = serde_json::from_str(r#"{"to": 42}"#).unwrap();
        match Message::new(options) {
            Err(Error::InvalidParam(message)) => assert!(message.ends_with("integer `42`")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn compose_from_json() {
        let options: MailOptions = serde_json::from_str(
            r#"{
                "from": {"name": "NoBody", "address": "nobody@domain.tld"},
                "to": "hei@domain.tld",
                "subject": "Hello",
                "message": {"plainText": "A", "htmlText": "<b>B</b>"},
                "attachments": [{"filename": "a.bin", "content": [1, 2, 3]}]
            }"#,
        )
        .unwrap();
        let m = Message::new(options).unwrap();

        match m.body() {
            Some(Part::Multi(mixed)) => {
                assert_eq!(mixed.kind(), MultiPartKind::Mixed);
                assert_eq!(mixed.parts().len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            m.headers().get::<header::From>(),
            Some(&header::From(Mailbox::new(
                Some("NoBody".into()),
                "nobody@domain.tld"
            )))
        );
    }
}
