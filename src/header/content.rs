use super::raw_str;
use crate::mimebody::MultiPartKind;
use crate::utf8_b;
use hyperx::header::{Formatter as HeaderFormatter, Header, RawLike};
use hyperx::{Error as HyperError, Result as HyperResult};
use mime::Mime;
use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};
use std::str::FromStr;

/// `Content-Type:` header
#[derive(Debug, Clone, PartialEq)]
pub enum ContentType {
    /// Discrete media type rendered without parameters
    Discrete(Mime),

    /// Textual media type in UTF-8
    Text(Mime),

    /// Multipart media type with its boundary
    Multipart(MultiPartKind, String),
}

impl Display for ContentType {
    fn fmt(&self, f: &mut FmtFormatter) -> FmtResult {
        use self::ContentType::*;
        match self {
            Discrete(mime) => f.write_str(mime.essence_str()),
            Text(mime) => write!(f, "{}; charset=utf-8", mime.essence_str()),
            Multipart(kind, boundary) => write!(f, "{}; boundary=\"{}\"", kind, boundary),
        }
    }
}

impl FromStr for ContentType {
    type Err = HyperError;

    fn from_str(s: &str) -> HyperResult<Self> {
        let mime: Mime = s.parse().map_err(|_| HyperError::Header)?;
        let essence: Mime = mime.essence_str().parse().map_err(|_| HyperError::Header)?;

        if mime.type_() == mime::MULTIPART {
            let kind = mime
                .essence_str()
                .parse::<MultiPartKind>()
                .map_err(|_| HyperError::Header)?;
            let boundary = mime.get_param(mime::BOUNDARY).ok_or(HyperError::Header)?;
            return Ok(ContentType::Multipart(
                kind,
                boundary.as_str().trim_matches('"').into(),
            ));
        }

        match mime.get_param(mime::CHARSET) {
            Some(charset) if charset == mime::UTF_8 => Ok(ContentType::Text(essence)),
            Some(_) => Err(HyperError::Header),
            None => Ok(ContentType::Discrete(essence)),
        }
    }
}

impl Header for ContentType {
    fn header_name() -> &'static str {
        "Content-Type"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        raw_str(raw).and_then(str::parse)
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(self)
    }
}

/// `Content-Transfer-Encoding:` header
///
/// Every leaf part of a composed message is base64 encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentTransferEncoding {
    Base64,
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut FmtFormatter) -> FmtResult {
        use self::ContentTransferEncoding::*;
        f.write_str(match *self {
            Base64 => "base64",
        })
    }
}

impl Header for ContentTransferEncoding {
    fn header_name() -> &'static str {
        "Content-Transfer-Encoding"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        raw_str(raw).and_then(|s| {
            if s.eq_ignore_ascii_case("base64") {
                Ok(ContentTransferEncoding::Base64)
            } else {
                Err(HyperError::Header)
            }
        })
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(self)
    }
}

/// `Content-ID:` header, rendered in angle brackets
#[derive(Debug, Clone, PartialEq)]
pub struct ContentId(pub String);

impl Header for ContentId {
    fn header_name() -> &'static str {
        "Content-ID"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        raw_str(raw).and_then(|s| {
            s.strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .map(|id| ContentId(id.into()))
                .ok_or(HyperError::Header)
        })
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(&format!("<{}>", self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispositionType {
    /// Displayed as part of the message, referenced by `cid:` URLs
    Inline,

    /// Offered for saving
    Attachment,
}

impl Display for DispositionType {
    fn fmt(&self, f: &mut FmtFormatter) -> FmtResult {
        use self::DispositionType::*;
        f.write_str(match *self {
            Inline => "inline",
            Attachment => "attachment",
        })
    }
}

impl FromStr for DispositionType {
    type Err = HyperError;

    fn from_str(s: &str) -> HyperResult<Self> {
        use self::DispositionType::*;
        match s {
            "inline" => Ok(Inline),
            "attachment" => Ok(Attachment),
            _ => Err(HyperError::Header),
        }
    }
}

/// `Content-Disposition:` header with a filename parameter
///
/// ASCII filenames are emitted verbatim, anything else as an encoded-word.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDisposition {
    pub disposition: DispositionType,
    pub filename: String,
}

impl Header for ContentDisposition {
    fn header_name() -> &'static str {
        "Content-Disposition"
    }

    fn parse_header<'a, T>(raw: &'a T) -> HyperResult<Self>
    where
        T: RawLike<'a>,
    {
        let s = raw_str(raw)?;
        let mut params = s.split(';').map(str::trim);
        let disposition = params
            .next()
            .ok_or(HyperError::Header)?
            .to_ascii_lowercase()
            .parse()?;
        let filename = params
            .find_map(|param| param.strip_prefix("filename="))
            .map(|name| name.trim_matches('"'))
            .and_then(utf8_b::decode)
            .ok_or(HyperError::Header)?;

        Ok(ContentDisposition {
            disposition,
            filename,
        })
    }

    fn fmt_header(&self, f: &mut HeaderFormatter) -> FmtResult {
        f.fmt_line(&format!(
            "{}; filename=\"{}\"",
            self.disposition,
            utf8_b::encode(&self.filename)
        ))
    }
}
