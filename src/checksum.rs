//! Checksums used to recognise schemas the registry already stores

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::subject::SchemaType;

/// SHA256 checksum of schema text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Checksum of a schema, keyed by its format so identical text in two
    /// formats does not collide
    pub fn of_schema(schema_type: SchemaType, schema: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(schema_type.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(schema.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_hex_sha256() {
        let checksum = Checksum::of_schema(SchemaType::Protobuf, "message A {}");
        assert_eq!(checksum.as_str().len(), 64);
        assert!(checksum.to_string().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_schema_checksum_includes_type() {
        let content = r#"{"type": "string"}"#;
        let avro = Checksum::of_schema(SchemaType::Avro, content);
        let json = Checksum::of_schema(SchemaType::Json, content);
        assert_ne!(avro, json);
        assert_eq!(avro, Checksum::of_schema(SchemaType::Avro, content));
    }
}
