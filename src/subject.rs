//! Subject definitions
//!
//! A subject ties a registry subject name to a schema file on disk and the
//! format that file is written in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Format of a schema file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    /// Apache Avro (`.avsc`)
    Avro,
    /// JSON Schema (`.json`)
    Json,
    /// Protocol Buffers (`.proto`)
    Protobuf,
}

impl SchemaType {
    /// Name used by schema registries for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Json => "JSON",
            SchemaType::Protobuf => "PROTOBUF",
        }
    }

    /// Get the file extension for this schema type
    pub fn extension(&self) -> &'static str {
        match self {
            SchemaType::Avro => "avsc",
            SchemaType::Json => "json",
            SchemaType::Protobuf => "proto",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVRO" => Ok(SchemaType::Avro),
            "JSON" => Ok(SchemaType::Json),
            "PROTOBUF" | "PROTO" => Ok(SchemaType::Protobuf),
            other => Err(format!("unknown schema type: {}", other)),
        }
    }
}

/// Version selector meaning "latest version of the subject"
pub const LATEST_VERSION: i32 = -1;

/// A schema already stored in the registry that another schema depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReference {
    /// Name the referencing schema uses (Avro full name, JSON `$ref`, proto import path)
    pub name: String,
    /// Registry subject holding the referenced schema
    pub subject: String,
    /// Version of the referenced subject (-1 for latest)
    #[serde(default = "latest_version")]
    pub version: i32,
}

impl SchemaReference {
    pub fn new(name: impl Into<String>, subject: impl Into<String>, version: i32) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            version,
        }
    }
}

/// A schema file on disk that the subject's schema depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalReference {
    /// Name the referencing schema uses
    pub name: String,
    /// Path relative to the root directory
    pub path: String,
}

/// One schema to register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Registry-side subject name
    #[serde(rename = "subject")]
    pub input_subject: String,
    /// Schema file, relative to the root directory
    pub file: String,
    /// Format of the schema file
    #[serde(rename = "type", default = "default_schema_type")]
    pub schema_type: SchemaType,
    /// Ask the registry to normalize the schema before storing it
    #[serde(default)]
    pub normalize: bool,
    /// Schemas from the registry this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<SchemaReference>,
    /// Schema files this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_references: Vec<LocalReference>,
}

impl Subject {
    /// Create a new subject
    pub fn new(
        input_subject: impl Into<String>,
        file: impl Into<String>,
        schema_type: SchemaType,
    ) -> Self {
        Self {
            input_subject: input_subject.into(),
            file: file.into(),
            schema_type,
            normalize: false,
            references: Vec::new(),
            local_references: Vec::new(),
        }
    }

    /// Set the normalize flag
    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Add a reference to a schema stored in the registry
    pub fn add_reference(
        mut self,
        name: impl Into<String>,
        subject: impl Into<String>,
        version: i32,
    ) -> Self {
        self.references.push(SchemaReference::new(name, subject, version));
        self
    }

    /// Add a reference to a schema file on disk
    pub fn add_local_reference(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.local_references.push(LocalReference {
            name: name.into(),
            path: path.into(),
        });
        self
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.input_subject, self.schema_type, self.file)
    }
}

fn latest_version() -> i32 {
    LATEST_VERSION
}

fn default_schema_type() -> SchemaType {
    SchemaType::Avro
}
