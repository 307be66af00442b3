//! JSON Schema resolution

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{RegisterError, Result};
use crate::resolver::SchemaSources;
use crate::subject::SchemaType;

/// Check that the subject file and every dependency are JSON Schema
/// documents. Returns the source text and a compact form with sorted keys.
pub(crate) fn resolve(sources: &SchemaSources) -> Result<(String, String)> {
    for dependency in &sources.dependencies {
        compile(&dependency.schema, &dependency.origin)?;
    }

    // Objects are BTreeMaps, so compact output already has sorted keys
    let value = compile(&sources.main, &sources.path)?;
    Ok((sources.main.clone(), value.to_string()))
}

fn compile(text: &str, origin: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| RegisterError::invalid(SchemaType::Json, origin, e))?;

    if !(value.is_object() || value.is_boolean()) {
        return Err(RegisterError::invalid(
            SchemaType::Json,
            origin,
            "a schema must be an object or a boolean",
        ));
    }

    JSONSchema::compile(&value).map_err(|e| RegisterError::invalid(SchemaType::Json, origin, e))?;
    Ok(value)
}
