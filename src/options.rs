//! Input descriptors
//!
//! A message is described once by [`MailOptions`]; every field that accepts
//! several shapes is a tagged variant resolved when the message is composed.
//!
//! **NOTE**: Enable feature "serde" to be able deserialize the descriptors
//! using [serde](https://serde.rs/). Recipients then accept either an
//! address string or a `{name, address}` object, the message either a string
//! or a `{plainText, htmlText, assets}` object, attachments either a path
//! string or a `{filename, content}` object with `content` as a byte array.
//! Values of any other shape deserialize into the `Malformed`/`NotBinary`
//! variants and are rejected with a crate [`Error`](crate::Error) when the
//! message is composed.

#[cfg(feature = "serde")]
mod de;

use bytes::Bytes;
use std::path::PathBuf;

/// Sender or recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Address string, emitted verbatim
    Address(String),

    /// Addressee name with an address, emitted as a quoted-name address
    Named { name: String, address: String },

    /// Value of another shape from a loosely typed source, described for
    /// the error report
    Malformed(String),
}

impl Recipient {
    #[inline]
    pub fn named<N: Into<String>, A: Into<String>>(name: N, address: A) -> Self {
        Recipient::Named {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Recipient::Address(address.into())
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Recipient::Address(address)
    }
}

impl<N: Into<String>, A: Into<String>> From<(N, A)> for Recipient {
    fn from((name, address): (N, A)) -> Self {
        Recipient::named(name, address)
    }
}

/// File to attach or to embed
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Filesystem path, read when the message is composed
    ///
    /// The final path component becomes the part filename.
    Path(PathBuf),

    /// Named in-memory content
    Data { filename: String, content: FileContent },

    /// Value of another shape from a loosely typed source, described for
    /// the error report
    Malformed(String),
}

impl Attachment {
    #[inline]
    pub fn path<P: Into<PathBuf>>(path: P) -> Self {
        Attachment::Path(path.into())
    }

    #[inline]
    pub fn data<F: Into<String>, C: Into<Bytes>>(filename: F, content: C) -> Self {
        Attachment::Data {
            filename: filename.into(),
            content: FileContent::Binary(content.into()),
        }
    }
}

/// Content of an in-memory attachment
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// Raw bytes
    Binary(Bytes),

    /// Anything that is not a byte buffer, described for the error report
    NotBinary(String),
}

/// Plain and/or HTML message text with the assets the HTML refers to
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct RichText {
    pub plain_text: Option<String>,

    pub html_text: Option<String>,

    /// Files embedded inline and referenced from the HTML by filename,
    /// e.g. `<img src="logo.png">`; ignored without HTML text
    ///
    /// When two assets share a filename both are embedded, but references
    /// resolve to the last one.
    pub assets: Vec<Attachment>,
}

impl RichText {
    #[inline]
    pub fn new() -> Self {
        RichText::default()
    }

    #[inline]
    pub fn plain_text<S: Into<String>>(mut self, text: S) -> Self {
        self.plain_text = Some(text.into());
        self
    }

    #[inline]
    pub fn html_text<S: Into<String>>(mut self, text: S) -> Self {
        self.html_text = Some(text.into());
        self
    }

    #[inline]
    pub fn asset(mut self, asset: Attachment) -> Self {
        self.assets.push(asset);
        self
    }
}

/// Message text
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// Plain text only
    Text(String),

    /// Plain and/or HTML text
    Rich(RichText),
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.into())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<RichText> for MessageContent {
    fn from(rich: RichText) -> Self {
        MessageContent::Rich(rich)
    }
}

/// Complete description of a message
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct MailOptions {
    pub from: Option<Recipient>,

    /// Required
    pub to: Option<Recipient>,

    pub subject: Option<String>,

    pub message: Option<MessageContent>,

    pub attachments: Vec<Attachment>,
}
