//! Registration definition assembly and canonical serialization.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{RegdefError, RegdefResult};
use crate::template::Template;

pub const FIELD_REPOSITORY_NAME: &str = "repository_name";
pub const FIELD_DOCKER_USERNAME: &str = "docker_username";
pub const FIELD_DOCKER_PASSWORD: &str = "docker_password";
pub const FIELD_PUBLIC_KEY_ID: &str = "public_key_id";
pub const FIELD_PUBLIC_KEY: &str = "public_key";
pub const FIELD_VENDOR_KEY: &str = "vendor_key";

/// Fields the assembler always writes.
pub const REQUIRED_FIELDS: [&str; 6] = [
    FIELD_REPOSITORY_NAME,
    FIELD_DOCKER_USERNAME,
    FIELD_DOCKER_PASSWORD,
    FIELD_PUBLIC_KEY_ID,
    FIELD_PUBLIC_KEY,
    FIELD_VENDOR_KEY,
];

/// Indentation of the serialized document.
const INDENT: &[u8] = b"   ";

/// Values resolved by the pipeline stages.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub repository_uri: String,
    pub username: String,
    pub password: String,
    pub public_key_id: String,
    pub public_key: String,
    pub vendor_key: String,
}

impl std::fmt::Debug for ResolvedFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFields")
            .field("repository_uri", &self.repository_uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("public_key_id", &self.public_key_id)
            .field("public_key", &self.public_key)
            .field("vendor_key", &self.vendor_key)
            .finish()
    }
}

/// Registry user: explicit `dockerid` when non-empty, otherwise the namespace.
pub fn resolve_username(dockerid: Option<&str>, namespace: &str) -> String {
    match dockerid {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => namespace.to_string(),
    }
}

/// The finished registration definition document.
#[derive(Clone, PartialEq)]
pub struct RegistrationDefinition {
    document: Map<String, Value>,
}

impl std::fmt::Debug for RegistrationDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut redacted = self.document.clone();
        if redacted.contains_key(FIELD_DOCKER_PASSWORD) {
            redacted.insert(FIELD_DOCKER_PASSWORD.to_string(), "<redacted>".into());
        }
        f.debug_struct("RegistrationDefinition")
            .field("document", &redacted)
            .finish()
    }
}

/// Copy `template` and overwrite the six resolved fields.
///
/// Fails if any resolved field is empty.
pub fn assemble(
    template: &Template,
    fields: &ResolvedFields,
) -> RegdefResult<RegistrationDefinition> {
    let values = [
        (FIELD_REPOSITORY_NAME, &fields.repository_uri),
        (FIELD_DOCKER_USERNAME, &fields.username),
        (FIELD_DOCKER_PASSWORD, &fields.password),
        (FIELD_PUBLIC_KEY_ID, &fields.public_key_id),
        (FIELD_PUBLIC_KEY, &fields.public_key),
        (FIELD_VENDOR_KEY, &fields.vendor_key),
    ];

    let mut document = template.clone();
    for (field, value) in values {
        if value.is_empty() {
            return Err(RegdefError::IncompleteDefinition { field });
        }
        document.insert(field.to_string(), Value::String(value.clone()));
    }

    Ok(RegistrationDefinition { document })
}

impl RegistrationDefinition {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.document.get(field).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Serialize with sorted keys and three-space indentation.
    ///
    /// Output is pure ASCII: other characters are written as `\uXXXX`
    /// escapes (UTF-16 surrogate pairs above U+FFFF). Identical documents
    /// always produce identical bytes.
    pub fn to_canonical_bytes(&self) -> RegdefResult<Vec<u8>> {
        let sorted = sort_keys(&Value::Object(self.document.clone()));

        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter::new());
        sorted.serialize(&mut ser).map_err(|e| RegdefError::Serialize {
            message: e.to_string(),
        })?;
        Ok(buf)
    }

    pub fn to_canonical_string(&self) -> RegdefResult<String> {
        let bytes = self.to_canonical_bytes()?;
        String::from_utf8(bytes).map_err(|e| RegdefError::Serialize {
            message: e.to_string(),
        })
    }

    /// `sha256:<hex>` of the canonical serialization.
    pub fn digest(&self) -> RegdefResult<String> {
        let bytes = self.to_canonical_bytes()?;
        Ok(format!("sha256:{}", hex::encode(Sha256::digest(&bytes))))
    }
}

/// Pretty printer that escapes everything outside printable ASCII.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl AsciiFormatter<'_> {
    fn new() -> Self {
        Self(PrettyFormatter::with_indent(INDENT))
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (' '..='~').contains(&c) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Rebuild objects with keys inserted in sorted order, at every depth.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
