use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Maximum length of an encoded body line, CRLF excluded
pub const MAX_LINE_LENGTH: usize = 78 - 2;

/// Base64 codec
///
/// Produces a transfer-encoded body: base64 text hard-wrapped into CRLF
/// terminated lines.
pub struct Base64Codec {
    line_wrapper: LineWrapper,
}

impl Base64Codec {
    pub fn new() -> Self {
        Base64Codec {
            line_wrapper: LineWrapper::new(MAX_LINE_LENGTH),
        }
    }

    pub fn encode(&self, data: &[u8]) -> String {
        self.line_wrapper.wrap(&STANDARD.encode(data))
    }
}

impl Default for Base64Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Line wrapper
///
/// Splits ASCII text into lines of at most `max_length` characters,
/// terminating every line (the last one too) with CRLF.
struct LineWrapper {
    max_length: usize,
}

impl LineWrapper {
    fn new(max_length: usize) -> Self {
        LineWrapper { max_length }
    }

    fn wrap(&self, text: &str) -> String {
        if text.is_empty() {
            return "\r\n".into();
        }

        let lines = (text.len() + self.max_length - 1) / self.max_length;
        let mut out = String::with_capacity(text.len() + lines * 2);
        let mut rest = text;

        while !rest.is_empty() {
            // base64 output is ASCII, so any index is a char boundary
            let (line, tail) = rest.split_at(self.max_length.min(rest.len()));
            out.push_str(line);
            out.push_str("\r\n");
            rest = tail;
        }

        out
    }
}

/// Encode binary data as line-wrapped base64
pub fn encode_base64(data: &[u8]) -> String {
    Base64Codec::new().encode(data)
}
