use crate::encoder::encode_base64;
use crate::error::{Error, Result};
use crate::header::{
    ContentDisposition, ContentId, ContentTransferEncoding, ContentType, DispositionType, Headers,
};
use bytes::Bytes;
use lazy_static::lazy_static;
use mime::Mime;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use textnonce::TextNonce;

const BOUNDARY_PREFIX: &str = "boundary-";
const BOUNDARY_NONCE_LENGTH: usize = 48;
const CONTENT_ID_NONCE_LENGTH: usize = 32;

lazy_static! {
    // Quoted src attribute value; the quote style is captured by the group that matched
    static ref SRC_RE: Regex = Regex::new(r#"src=(?:"([^"]*)"|'([^']*)')"#).unwrap();
}

fn nonce(length: usize) -> Result<String> {
    TextNonce::sized(length)
        .map(TextNonce::into_string)
        .map_err(Error::Nonce)
}

/// Common contract of every node in a MIME tree
///
pub trait MimePart {
    /// The `Content-*` headers of the part
    fn headers(&self) -> Headers;

    /// The `Content-*` header lines of the part, each terminated by CRLF
    fn mime_header(&self) -> String {
        self.headers().to_string()
    }

    /// The encoded body of the part, terminated by CRLF
    fn encode(&self) -> String;
}

/// MIME part variants
///
#[derive(Debug, Clone)]
pub enum Part {
    /// Text content
    ///
    Text(TextPart),

    /// File content
    ///
    Binary(BinaryPart),

    /// Multiple parts of content
    ///
    Multi(MultiPart),
}

impl MimePart for Part {
    fn headers(&self) -> Headers {
        match *self {
            Part::Text(ref part) => part.headers(),
            Part::Binary(ref part) => part.headers(),
            Part::Multi(ref part) => part.headers(),
        }
    }

    fn encode(&self) -> String {
        match *self {
            Part::Text(ref part) => part.encode(),
            Part::Binary(ref part) => part.encode(),
            Part::Multi(ref part) => part.encode(),
        }
    }
}

impl Display for Part {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.mime_header())?;
        f.write_str("\r\n")?;
        f.write_str(&self.encode())
    }
}

impl From<TextPart> for Part {
    fn from(part: TextPart) -> Self {
        Part::Text(part)
    }
}

impl From<BinaryPart> for Part {
    fn from(part: BinaryPart) -> Self {
        Part::Binary(part)
    }
}

impl From<MultiPart> for Part {
    fn from(part: MultiPart) -> Self {
        Part::Multi(part)
    }
}

/// Parts of multipart body
///
pub type Parts = Vec<Part>;

/// Mapping from an asset filename, as referenced by `src`, to the content-id of an inline part
///
pub type ContentIdIndex = HashMap<String, String>;

/// The kind of text content
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `text/plain`
    Plain,

    /// `text/html`
    Html,
}

impl TextKind {
    pub fn mime(&self) -> Mime {
        match *self {
            TextKind::Plain => mime::TEXT_PLAIN,
            TextKind::Html => mime::TEXT_HTML,
        }
    }
}

/// Text part
///
/// UTF-8 text transferred as base64.
///
/// # Example
///
/// ```
/// use mailcompose::{ContentIdIndex, MimePart, TextPart};
///
/// let mut index = ContentIdIndex::new();
/// index.insert("logo.png".into(), "abc".into());
///
/// let part = TextPart::html("<img src=\"logo.png\">", &index);
///
/// assert_eq!(part.content(), "<img src=\"cid:abc\">");
/// assert_eq!(part.mime_header(), concat!(
///     "Content-Type: text/html; charset=utf-8\r\n",
///     "Content-Transfer-Encoding: base64\r\n",
/// ));
/// ```
///
#[derive(Debug, Clone, PartialEq)]
pub struct TextPart {
    kind: TextKind,
    content: String,
}

impl TextPart {
    /// Creates a text part
    ///
    /// For HTML content every `src` attribute whose quoted value is a key of
    /// `index` is rewritten to `cid:<content-id>`.
    pub fn new<S: Into<String>>(content: S, kind: TextKind, index: Option<&ContentIdIndex>) -> Self {
        let content = content.into();
        let content = match (kind, index) {
            (TextKind::Html, Some(index)) if !index.is_empty() => rewrite_content_ids(&content, index),
            _ => content,
        };

        TextPart { kind, content }
    }

    /// Creates a `text/plain` part
    #[inline]
    pub fn plain<S: Into<String>>(content: S) -> Self {
        Self::new(content, TextKind::Plain, None)
    }

    /// Creates a `text/html` part referencing inline parts through `index`
    #[inline]
    pub fn html<S: Into<String>>(content: S, index: &ContentIdIndex) -> Self {
        Self::new(content, TextKind::Html, Some(index))
    }

    #[inline]
    pub fn kind(&self) -> TextKind {
        self.kind
    }

    /// Read the content, after content-id rewriting
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl MimePart for TextPart {
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set(ContentType::Text(self.kind.mime()));
        headers.set(ContentTransferEncoding::Base64);
        headers
    }

    fn encode(&self) -> String {
        encode_base64(self.content.as_bytes())
    }
}

fn rewrite_content_ids(content: &str, index: &ContentIdIndex) -> String {
    SRC_RE
        .replace_all(content, |caps: &Captures| {
            let (quote, key) = match (caps.get(1), caps.get(2)) {
                (Some(key), _) => ('"', key.as_str()),
                (_, Some(key)) => ('\'', key.as_str()),
                _ => return caps[0].to_string(),
            };
            match index.get(key) {
                Some(id) => format!("src={}cid:{}{}", quote, id, quote),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Binary part
///
/// File content transferred as base64, either as an attachment or as an
/// inline part identified by a generated content-id.
///
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPart {
    filename: String,
    content: Bytes,
    mime_type: Mime,
    content_id: Option<String>,
}

impl BinaryPart {
    /// Creates a binary part
    ///
    /// The media type is guessed from the filename extension and falls
    /// back to `application/octet-stream`.
    pub fn new<F, C>(filename: F, content: C, inline: bool) -> Result<Self>
    where
        F: Into<String>,
        C: Into<Bytes>,
    {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename).first_or_octet_stream();
        let content_id = if inline {
            Some(nonce(CONTENT_ID_NONCE_LENGTH)?)
        } else {
            None
        };

        Ok(BinaryPart {
            filename,
            content: content.into(),
            mime_type,
            content_id,
        })
    }

    /// Creates an attachment part
    #[inline]
    pub fn attachment<F: Into<String>, C: Into<Bytes>>(filename: F, content: C) -> Result<Self> {
        Self::new(filename, content, false)
    }

    /// Creates an inline part
    #[inline]
    pub fn inline<F: Into<String>, C: Into<Bytes>>(filename: F, content: C) -> Result<Self> {
        Self::new(filename, content, true)
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[inline]
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    #[inline]
    pub fn mime_type(&self) -> &Mime {
        &self.mime_type
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        self.content_id.is_some()
    }

    /// Get the content-id, present for inline parts only
    #[inline]
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }
}

impl MimePart for BinaryPart {
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set(ContentType::Discrete(self.mime_type.clone()));
        headers.set(ContentTransferEncoding::Base64);

        let disposition = match self.content_id {
            Some(ref id) => {
                headers.set(ContentId(id.clone()));
                DispositionType::Inline
            }
            None => DispositionType::Attachment,
        };

        headers.set(ContentDisposition {
            disposition,
            filename: self.filename.clone(),
        });
        headers
    }

    fn encode(&self) -> String {
        encode_base64(&self.content)
    }
}

/// The kind of multipart
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiPartKind {
    /// Mixed kind to combine unrelated content parts
    ///
    /// For example this kind can be used to mix email message and attachments.
    Mixed,

    /// Alternative kind to join several variants of same email contents.
    ///
    /// The least preferred variant goes first: plain text before HTML.
    Alternative,

    /// Related kind to mix content and related resources.
    ///
    /// For example, you can include images into HTML content using that.
    Related,
}

impl MultiPartKind {
    pub fn as_str(&self) -> &'static str {
        use self::MultiPartKind::*;
        match *self {
            Mixed => "multipart/mixed",
            Alternative => "multipart/alternative",
            Related => "multipart/related",
        }
    }
}

impl Display for MultiPartKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultiPartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use self::MultiPartKind::*;
        match s {
            "multipart/mixed" => Ok(Mixed),
            "multipart/alternative" => Ok(Alternative),
            "multipart/related" => Ok(Related),
            _ => Err(Error::InvalidMultipartType(s.into())),
        }
    }
}

/// Multipart container
///
/// # Example
///
/// ```
/// use mailcompose::{MimePart, MultiPart, TextPart};
///
/// let part = MultiPart::alternative(vec![
///     TextPart::plain("Hello").into(),
/// ])
/// .unwrap()
/// .with_boundary("boundary-1");
///
/// assert_eq!(part.encode(), concat!(
///     "--boundary-1\r\n",
///     "Content-Type: text/plain; charset=utf-8\r\n",
///     "Content-Transfer-Encoding: base64\r\n",
///     "\r\n",
///     "SGVsbG8=\r\n",
///     "--boundary-1--\r\n",
/// ));
/// ```
///
#[derive(Debug, Clone)]
pub struct MultiPart {
    kind: MultiPartKind,
    boundary: String,
    parts: Parts,
}

impl MultiPart {
    /// Creates a container with a freshly generated boundary
    pub fn new(kind: MultiPartKind, parts: Parts) -> Result<Self> {
        let boundary = format!("{}{}", BOUNDARY_PREFIX, nonce(BOUNDARY_NONCE_LENGTH)?);

        Ok(MultiPart {
            kind,
            boundary,
            parts,
        })
    }

    /// Creates MultiPart mixed
    ///
    /// Shortcut for `MultiPart::new(MultiPartKind::Mixed, parts)`
    #[inline]
    pub fn mixed(parts: Parts) -> Result<Self> {
        Self::new(MultiPartKind::Mixed, parts)
    }

    /// Creates MultiPart alternative
    ///
    /// Shortcut for `MultiPart::new(MultiPartKind::Alternative, parts)`
    #[inline]
    pub fn alternative(parts: Parts) -> Result<Self> {
        Self::new(MultiPartKind::Alternative, parts)
    }

    /// Creates MultiPart related
    ///
    /// Shortcut for `MultiPart::new(MultiPartKind::Related, parts)`
    #[inline]
    pub fn related(parts: Parts) -> Result<Self> {
        Self::new(MultiPartKind::Related, parts)
    }

    /// Set custom boundary
    #[inline]
    pub fn with_boundary<S: Into<String>>(mut self, boundary: S) -> Self {
        self.boundary = boundary.into();
        self
    }

    #[inline]
    pub fn kind(&self) -> MultiPartKind {
        self.kind
    }

    /// Get the boundary of MultiPart contents
    #[inline]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the sub-parts from the MultiPart
    #[inline]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

impl MimePart for MultiPart {
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.set(ContentType::Multipart(self.kind, self.boundary.clone()));
        headers
    }

    fn encode(&self) -> String {
        let mut out = String::new();

        for part in &self.parts {
            out.push_str("--");
            out.push_str(&self.boundary);
            out.push_str("\r\n");
            out.push_str(&part.mime_header());
            out.push_str("\r\n");
            out.push_str(&part.encode());
        }

        out.push_str("--");
        out.push_str(&self.boundary);
        out.push_str("--\r\n");
        out
    }
}
