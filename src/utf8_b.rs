//! RFC 2047 `B` encoded-words with the UTF-8 charset.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Check whether a header value can be emitted as is
///
/// Every byte must be in the 0x00–0x7F range.
#[inline]
pub fn is_plain(s: &str) -> bool {
    s.is_ascii()
}

/// Encode a header value, leaving ASCII text untouched
pub fn encode(s: &str) -> String {
    if is_plain(s) {
        s.into()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(s.as_bytes()))
    }
}

/// Decode a header value produced by [`encode`]
///
/// Text that is not an encoded-word is returned as is. Charsets other than
/// UTF-8 and the `Q` encoding are not supported.
pub fn decode(s: &str) -> Option<String> {
    let word = match s.strip_prefix("=?").and_then(|s| s.strip_suffix("?=")) {
        Some(word) => word,
        None => return Some(s.into()),
    };

    let mut fields = word.splitn(3, '?');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(charset), Some(encoding), Some(text))
            if charset.eq_ignore_ascii_case("utf-8") && encoding.eq_ignore_ascii_case("b") =>
        {
            STANDARD
                .decode(text)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        }
        _ => None,
    }
}
