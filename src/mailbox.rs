use crate::error::{Error, Result};
use crate::utf8_b;
use std::fmt::{Display, Formatter, Result as FmtResult, Write};
use std::str::FromStr;

/// Email address with optional addressee name
///
/// The address is kept as supplied: no syntax validation is performed
/// beyond the non-emptiness checks done when a message is composed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox {
    /// Addressee name
    pub name: Option<String>,

    /// Address part, or a preformatted address string
    pub address: String,
}

impl Mailbox {
    /// Create new mailbox using email address and addressee name
    pub fn new<A: Into<String>>(name: Option<String>, address: A) -> Self {
        Mailbox {
            name,
            address: address.into(),
        }
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.name {
            Some(ref name) if utf8_b::is_plain(name) => {
                f.write_char('"')?;
                for c in name.chars() {
                    if c == '"' || c == '\\' {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                write!(f, "\" <{}>", self.address)
            }
            // encoded-words must not appear inside a quoted-string
            Some(ref name) => write!(f, "{} <{}>", utf8_b::encode(name), self.address),
            None => f.write_str(&self.address),
        }
    }
}

impl FromStr for Mailbox {
    type Err = Error;

    /// Parse `addr`, `name <addr>`, `"quoted name" <addr>` or
    /// `=?UTF-8?B?...?= <addr>`
    fn from_str(src: &str) -> Result<Mailbox> {
        let src = src.trim();
        let (name, address) = match (src.rfind('<'), src.rfind('>')) {
            (Some(open), Some(close)) if open < close => {
                (src[..open].trim(), src[open + 1..close].trim())
            }
            _ => ("", src),
        };

        if address.is_empty() {
            return Err(Error::InvalidParam(format!("mailbox `{}` has no address", src)));
        }

        let name = match name {
            "" => None,
            name => Some(parse_name(name).ok_or_else(|| {
                Error::InvalidParam(format!("mailbox `{}` has a malformed name", src))
            })?),
        };

        Ok(Mailbox::new(name, address))
    }
}

fn parse_name(name: &str) -> Option<String> {
    match name.strip_prefix('"').and_then(|name| name.strip_suffix('"')) {
        Some(quoted) => {
            let mut unquoted = String::with_capacity(quoted.len());
            let mut chars = quoted.chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => unquoted.extend(chars.next()),
                    c => unquoted.push(c),
                }
            }
            Some(unquoted)
        }
        None => utf8_b::decode(name),
    }
}
