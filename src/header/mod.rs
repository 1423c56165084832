//! Typed header values
//!
//! Every header implements [`hyperx`]'s [`Header`], so a message or part
//! keeps them in a [`Headers`] map that preserves insertion order and
//! renders `Name: value\r\n` lines.

mod content;
mod mailbox;
mod special;
mod textual;

pub use self::content::*;
pub use self::mailbox::*;
pub use self::special::*;
pub use self::textual::*;

pub use hyperx::header::{Header, Headers};

use hyperx::header::RawLike;
use hyperx::{Error as HyperError, Result as HyperResult};
use std::str::from_utf8;

/// Single-line header value as text
fn raw_str<'a, T>(raw: &'a T) -> HyperResult<&'a str>
where
    T: RawLike<'a>,
{
    raw.one()
        .ok_or(HyperError::Header)
        .and_then(|r| from_utf8(r).map_err(|_| HyperError::Header))
        .map(str::trim)
}
