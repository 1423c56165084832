use super::raw_str;
use crate::utf8_b;
use hyperx::header::{Formatter as HeaderFormatter, Header, RawLike};
use hyperx::{Error as HyperError, Result as HyperResult};
use std::fmt::Result as FmtResult;

/// `Subject:` header, encoded when it carries non-ASCII text
#[derive(Debug, Clone, PartialEq)]
pub struct Subject(pub String);

impl Header for Subject {
    fn header_name() -> &'static str {
        "Subject"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        raw_str(raw)
            .and_then(|s| utf8_b::decode(s).ok_or(HyperError::Header))
            .map(Subject)
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(&utf8_b::encode(&self.0))
    }
}
