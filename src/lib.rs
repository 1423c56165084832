//! Compose RFC 5322 email messages with MIME bodies.
//!
//! A message is described by [`MailOptions`] (or collected through
//! [`MessageBuilder`]) and composed into a tree of MIME parts whose shape
//! depends on what was supplied:
//!
//! * plain text and HTML text are joined into `multipart/alternative`,
//! * HTML with inline assets is wrapped into `multipart/related`, and the
//!   `src` references to the assets are rewritten to `cid:` URLs,
//! * attachments are mixed with the text into `multipart/mixed`.
//!
//! Every leaf is base64 encoded. The rendered text is meant to be handed to a
//! transport; this crate does not send anything.
//!
//! ```
//! use mailcompose::{Attachment, Message, RichText};
//!
//! let m = Message::builder()
//!     .from(("NoBody", "nobody@domain.tld"))
//!     .to("hei@domain.tld")
//!     .subject("Happy new year")
//!     .message(RichText::new()
//!         .plain_text("Hello!")
//!         .html_text("<p>Hello!</p><img src=\"smile.png\">")
//!         .asset(Attachment::data("smile.png", vec![0x89u8, b'P', b'N', b'G'])))
//!     .attachment(Attachment::data("example.c", "int main() { return 0; }"))
//!     .build()
//!     .unwrap();
//!
//! let mail = m.formatted();
//! assert!(mail.contains("Content-Type: multipart/mixed;"));
//! assert!(mail.contains("Content-Type: multipart/related;"));
//! assert!(mail.contains("Content-Type: multipart/alternative;"));
//! ```

mod encoder;
mod error;
mod files;
pub mod header;
mod mailbox;
mod message;
mod mimebody;
mod options;
mod utf8_b;

pub use crate::encoder::{encode_base64, MAX_LINE_LENGTH};
pub use crate::error::{Error, Result};
pub use crate::files::{FileSource, LocalFiles};
pub use crate::mailbox::Mailbox;
pub use crate::message::{Message, MessageBuilder};
pub use crate::mimebody::{
    BinaryPart, ContentIdIndex, MimePart, MultiPart, MultiPartKind, Part, Parts, TextKind, TextPart,
};
pub use crate::options::{Attachment, FileContent, MailOptions, MessageContent, Recipient, RichText};
