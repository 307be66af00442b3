//! Schema resolution
//!
//! Turns a [`Subject`] into a [`ParsedSchema`] the registry can accept. The
//! schema file and its local references are read from disk, remote
//! references are fetched from the registry, and the result is checked by
//! the strategy for the subject's format.

mod avro;
mod json;
mod protobuf;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{RegisterError, Result};
use crate::registry::RegistryClient;
use crate::subject::{SchemaReference, SchemaType, Subject};

/// A registry-ready schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchema {
    pub schema_type: SchemaType,
    /// Schema text as written in the source file
    pub schema: String,
    /// Format-specific normalized form, used when the subject asks for normalization
    pub canonical: String,
    /// Remote references, pinned to the versions they resolved to
    pub references: Vec<SchemaReference>,
}

/// Resolution strategy for one schema format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaResolver {
    Avro,
    Json,
    Protobuf,
}

impl SchemaResolver {
    /// Pick the strategy for a format
    pub fn provide(schema_type: SchemaType) -> Self {
        match schema_type {
            SchemaType::Avro => SchemaResolver::Avro,
            SchemaType::Json => SchemaResolver::Json,
            SchemaType::Protobuf => SchemaResolver::Protobuf,
        }
    }

    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaResolver::Avro => SchemaType::Avro,
            SchemaResolver::Json => SchemaType::Json,
            SchemaResolver::Protobuf => SchemaType::Protobuf,
        }
    }

    /// Read, resolve and check the subject's schema
    ///
    /// Remote references are looked up through `client`, so this can fail
    /// with registry errors as well as resolution errors.
    pub fn parse<C: RegistryClient + ?Sized>(
        &self,
        client: &C,
        root_dir: &Path,
        subject: &Subject,
    ) -> Result<ParsedSchema> {
        if subject.input_subject.trim().is_empty() {
            return Err(RegisterError::EmptySubject {
                file: subject.file.clone(),
            });
        }

        let sources = SchemaSources::load(client, root_dir, subject)?;
        let (schema, canonical) = match self {
            SchemaResolver::Avro => avro::resolve(&sources)?,
            SchemaResolver::Json => json::resolve(&sources)?,
            SchemaResolver::Protobuf => protobuf::resolve(&sources)?,
        };

        Ok(ParsedSchema {
            schema_type: self.schema_type(),
            schema,
            canonical,
            references: sources.pinned,
        })
    }
}

/// A dependency of the schema being resolved
#[derive(Debug, Clone)]
pub(crate) struct NamedSchema {
    pub name: String,
    /// Where the text came from, for error messages
    pub origin: String,
    pub schema: String,
}

/// Everything a format strategy needs to check one subject
#[derive(Debug)]
pub(crate) struct SchemaSources {
    /// Subject file, as configured
    pub path: String,
    pub main: String,
    /// Dependencies, ordered so that every schema comes after the ones it depends on
    pub dependencies: Vec<NamedSchema>,
    /// Direct remote references with concrete versions
    pub pinned: Vec<SchemaReference>,
}

impl SchemaSources {
    fn load<C: RegistryClient + ?Sized>(
        client: &C,
        root_dir: &Path,
        subject: &Subject,
    ) -> Result<Self> {
        let main = read_file(root_dir, &subject.file)?;

        let mut dependencies = Vec::new();
        let mut pinned = Vec::new();
        let mut seen = HashSet::new();
        for reference in &subject.references {
            let version = fetch_remote(client, reference, &mut seen, &mut dependencies)?;
            pinned.push(SchemaReference::new(&reference.name, &reference.subject, version));
        }

        for local in &subject.local_references {
            dependencies.push(NamedSchema {
                name: local.name.clone(),
                origin: local.path.clone(),
                schema: read_file(root_dir, &local.path)?,
            });
        }

        Ok(Self {
            path: subject.file.clone(),
            main,
            dependencies,
            pinned,
        })
    }

    /// Names the main schema may import or refer to
    pub fn dependency_names(&self) -> HashSet<&str> {
        self.dependencies.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Fetch a remote reference and, depth first, everything it references.
/// Returns the concrete version the reference resolved to.
fn fetch_remote<C: RegistryClient + ?Sized>(
    client: &C,
    reference: &SchemaReference,
    seen: &mut HashSet<(String, i32)>,
    out: &mut Vec<NamedSchema>,
) -> Result<i32> {
    let registered = client.schema_by_version(&reference.subject, reference.version)?;
    if !seen.insert((registered.subject.clone(), registered.version)) {
        return Ok(registered.version);
    }

    for nested in &registered.references {
        fetch_remote(client, nested, seen, out)?;
    }

    out.push(NamedSchema {
        name: reference.name.clone(),
        origin: format!("{} v{}", registered.subject, registered.version),
        schema: registered.schema,
    });
    Ok(registered.version)
}

fn read_file(root_dir: &Path, relative: &str) -> Result<String> {
    let path = root_dir.join(relative);
    fs::read_to_string(&path).map_err(|e| RegisterError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::LocalRegistry;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_provide_matches_type() {
        for schema_type in [SchemaType::Avro, SchemaType::Json, SchemaType::Protobuf] {
            assert_eq!(SchemaResolver::provide(schema_type).schema_type(), schema_type);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let registry = LocalRegistry::open(dir.path().join("registry")).unwrap();
        let subject = Subject::new("a", "missing.avsc", SchemaType::Avro);

        let result = SchemaResolver::Avro.parse(&registry, dir.path(), &subject);
        assert!(matches!(result, Err(RegisterError::Io { .. })));
    }

    #[test]
    fn test_empty_subject_name_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.avsc"), r#""string""#).unwrap();
        let registry = LocalRegistry::open(dir.path().join("registry")).unwrap();
        let subject = Subject::new("  ", "a.avsc", SchemaType::Avro);

        let result = SchemaResolver::Avro.parse(&registry, dir.path(), &subject);
        assert!(matches!(result, Err(RegisterError::EmptySubject { .. })));
    }

    #[test]
    fn test_remote_reference_pinned_to_latest() {
        let dir = tempdir().unwrap();
        let mut registry = LocalRegistry::open(dir.path().join("registry")).unwrap();

        fs::write(
            dir.path().join("address.avsc"),
            r#"{
                "type": "record", "name": "Address", "namespace": "com.acme",
                "fields": [{"name": "city", "type": "string"}]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("user.avsc"),
            r#"{
                "type": "record", "name": "User", "namespace": "com.acme",
                "fields": [{"name": "home", "type": "com.acme.Address"}]
            }"#,
        )
        .unwrap();

        let address = Subject::new("address", "address.avsc", SchemaType::Avro);
        let parsed = SchemaResolver::Avro.parse(&registry, dir.path(), &address).unwrap();
        registry.register("address", &parsed, false).unwrap();

        let user = Subject::new("user", "user.avsc", SchemaType::Avro)
            .add_reference("com.acme.Address", "address", -1);
        let parsed = SchemaResolver::Avro.parse(&registry, dir.path(), &user).unwrap();
        assert_eq!(parsed.references, vec![SchemaReference::new("com.acme.Address", "address", 1)]);
    }

    #[test]
    fn test_unknown_remote_reference_is_registry_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.avsc"), r#""string""#).unwrap();
        let registry = LocalRegistry::open(dir.path().join("registry")).unwrap();
        let subject =
            Subject::new("a", "a.avsc", SchemaType::Avro).add_reference("x", "missing", -1);

        let err = SchemaResolver::Avro.parse(&registry, dir.path(), &subject).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Registration);
    }
}
