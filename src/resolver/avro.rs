//! Avro resolution

use apache_avro::Schema;

use crate::error::{RegisterError, Result};
use crate::resolver::SchemaSources;
use crate::subject::SchemaType;

/// Parse the subject schema together with its dependencies so named types
/// from references resolve. Returns the source text and its Parsing
/// Canonical Form.
pub(crate) fn resolve(sources: &SchemaSources) -> Result<(String, String)> {
    for dependency in &sources.dependencies {
        serde_json::from_str::<serde_json::Value>(&dependency.schema).map_err(|e| {
            RegisterError::invalid(SchemaType::Avro, &dependency.origin, e)
        })?;
    }

    let mut inputs: Vec<&str> = sources.dependencies.iter().map(|d| d.schema.as_str()).collect();
    inputs.push(&sources.main);

    // parse_list only accepts named types, so a lone schema goes through parse_str
    let schema = if inputs.len() == 1 {
        Schema::parse_str(&sources.main)
    } else {
        Schema::parse_list(&inputs)
            .and_then(|mut parsed| parsed.pop().ok_or(apache_avro::Error::GetNameField))
    }
    .map_err(|e| RegisterError::invalid(SchemaType::Avro, &sources.path, e))?;

    Ok((sources.main.clone(), schema.canonical_form()))
}
