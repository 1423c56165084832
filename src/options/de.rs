use super::{Attachment, FileContent, MessageContent, Recipient, RichText};
use serde::{
    de::{
        value::MapAccessDeserializer, Deserializer, Error as DeError, MapAccess,
        SeqAccess, Unexpected, Visitor,
    },
    Deserialize,
};
use std::fmt::{Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Any value of a self-describing format
///
/// Recipients and attachments are read through this shape so that a value
/// of the wrong type becomes a descriptor the composer rejects, instead of
/// a deserialization failure.
enum Loose {
    Text(String),
    Bytes(Vec<u8>),
    Unsigned(u64),
    Seq(Vec<Loose>),
    Map(Vec<(String, Loose)>),
    Other(String),
}

impl Loose {
    fn describe(&self) -> String {
        match self {
            Loose::Text(s) => Unexpected::Str(s).to_string(),
            Loose::Bytes(b) => Unexpected::Bytes(b).to_string(),
            Loose::Unsigned(v) => Unexpected::Unsigned(*v).to_string(),
            Loose::Seq(_) => Unexpected::Seq.to_string(),
            Loose::Map(_) => Unexpected::Map.to_string(),
            Loose::Other(s) => s.clone(),
        }
    }

    /// Byte buffer or an array of byte values
    fn into_bytes(self) -> Result<Vec<u8>, Loose> {
        match self {
            Loose::Bytes(bytes) => Ok(bytes),
            Loose::Seq(items) => {
                let bytes: Option<Vec<u8>> = items
                    .iter()
                    .map(|item| match item {
                        Loose::Unsigned(v) => u8::try_from(*v).ok(),
                        _ => None,
                    })
                    .collect();
                bytes.ok_or(Loose::Seq(items))
            }
            other => Err(other),
        }
    }
}

impl<'de> Deserialize<'de> for Loose {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LooseVisitor;

        impl LooseVisitor {
            fn other<E: DeError>(self, unexp: Unexpected) -> Result<Loose, E> {
                Ok(Loose::Other(unexp.to_string()))
            }
        }

        impl<'de> Visitor<'de> for LooseVisitor {
            type Value = Loose;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("any value")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Loose::Text(v.into()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Loose::Text(v))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Loose::Bytes(v.into()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Loose::Bytes(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(Loose::Unsigned(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                match u64::try_from(v) {
                    Ok(v) => Ok(Loose::Unsigned(v)),
                    Err(_) => self.other(Unexpected::Signed(v)),
                }
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                self.other(Unexpected::Float(v))
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                self.other(Unexpected::Bool(v))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                self.other(Unexpected::Unit)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                self.other(Unexpected::Option)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Loose::deserialize(deserializer)
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Loose::Seq(items))
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut fields = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    fields.push((key, map.next_value()?));
                }
                Ok(Loose::Map(fields))
            }
        }

        deserializer.deserialize_any(LooseVisitor)
    }
}

fn recipient(value: Loose) -> Recipient {
    let fields = match value {
        Loose::Text(address) => return Recipient::Address(address),
        Loose::Map(fields) => fields,
        other => return Recipient::Malformed(other.describe()),
    };

    let mut name = String::new();
    let mut address = String::new();
    for (key, value) in fields {
        let field = match key.as_str() {
            "name" => &mut name,
            "address" => &mut address,
            _ => continue,
        };
        match value {
            Loose::Text(text) => *field = text,
            other => return Recipient::Malformed(format!("{}: {}", key, other.describe())),
        }
    }

    Recipient::Named { name, address }
}

fn attachment(value: Loose) -> Attachment {
    let fields = match value {
        Loose::Text(path) => return Attachment::Path(PathBuf::from(path)),
        Loose::Map(fields) => fields,
        other => return Attachment::Malformed(other.describe()),
    };

    let mut filename = String::new();
    let mut content = FileContent::NotBinary("missing".into());
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("filename", Loose::Text(text)) => filename = text,
            ("filename", other) => {
                return Attachment::Malformed(format!("filename: {}", other.describe()))
            }
            ("content", value) => {
                content = match value.into_bytes() {
                    Ok(bytes) => FileContent::Binary(bytes.into()),
                    Err(other) => FileContent::NotBinary(other.describe()),
                }
            }
            _ => {}
        }
    }

    Attachment::Data { filename, content }
}

impl<'de> Deserialize<'de> for Recipient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Loose::deserialize(deserializer).map(recipient)
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Loose::deserialize(deserializer).map(attachment)
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MessageVisitor;

        impl<'de> Visitor<'de> for MessageVisitor {
            type Value = MessageContent;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("message string or {plainText, htmlText, assets} object")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Ok(MessageContent::Text(s.into()))
            }

            fn visit_map<V>(self, map: V) -> Result<Self::Value, V::Error>
            where
                V: MapAccess<'de>,
            {
                RichText::deserialize(MapAccessDeserializer::new(map)).map(MessageContent::Rich)
            }
        }

        deserializer.deserialize_any(MessageVisitor)
    }
}
