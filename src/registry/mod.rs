//! Schema registry clients
//!
//! [`RegistryClient`] is the seam between the registration loop and whatever
//! stores schemas. [`LocalRegistry`] is a directory-backed implementation.

pub mod local;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resolver::ParsedSchema;
use crate::subject::{SchemaReference, SchemaType};

pub use local::LocalRegistry;

/// Identifier a registry assigns to a stored schema
pub type SchemaId = u32;

/// A schema version as stored in a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    pub id: SchemaId,
    pub subject: String,
    pub version: i32,
    pub schema_type: SchemaType,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<SchemaReference>,
}

/// Operations the registration loop and resolvers need from a registry
pub trait RegistryClient {
    /// Register `schema` under `subject` and return the id the registry assigned
    fn register(
        &mut self,
        subject: &str,
        schema: &ParsedSchema,
        normalize: bool,
    ) -> Result<SchemaId>;

    /// Fetch a stored schema version; `version` of -1 selects the latest
    fn schema_by_version(&self, subject: &str, version: i32) -> Result<RegisteredSchema>;
}
