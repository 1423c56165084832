use super::raw_str;
use hyperx::header::{Formatter as HeaderFormatter, Header, RawLike};
use hyperx::{Error as HyperError, Result as HyperResult};
use std::fmt::Result as FmtResult;

/// `MIME-Version` header. Only version 1.0 exists.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MimeVersion;

impl Header for MimeVersion {
    fn header_name() -> &'static str {
        "MIME-Version"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        raw_str(raw).and_then(|s| match s {
            "1.0" => Ok(MimeVersion),
            _ => Err(HyperError::Header),
        })
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(&"1.0")
    }
}
