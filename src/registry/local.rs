//! Directory-backed schema registry
//!
//! Stores subjects and schema versions under a root directory:
//!
//! ```text
//! registry/
//! ├── index.json
//! └── schemas/
//!     ├── 1.avsc
//!     ├── 2.json
//!     └── 3.proto
//! ```
//!
//! Versions are append-only. A schema whose text (after optional
//! normalization) is already stored keeps its id, so registering the same
//! file twice does not create a new version.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checksum::Checksum;
use crate::error::{RegisterError, Result};
use crate::registry::{RegisteredSchema, RegistryClient, SchemaId};
use crate::resolver::ParsedSchema;
use crate::subject::{SchemaReference, SchemaType, LATEST_VERSION};

const INDEX_FILE: &str = "index.json";

/// A schema stored once and shared by every subject version that registered it
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSchema {
    id: SchemaId,
    schema_type: SchemaType,
    checksum: Checksum,
    schema: String,
    #[serde(default)]
    references: Vec<SchemaReference>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubjectVersion {
    version: i32,
    id: SchemaId,
    registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryIndex {
    next_id: SchemaId,
    schemas: Vec<StoredSchema>,
    subjects: BTreeMap<String, Vec<SubjectVersion>>,
}

impl Default for RegistryIndex {
    fn default() -> Self {
        Self {
            next_id: 1,
            schemas: Vec::new(),
            subjects: BTreeMap::new(),
        }
    }
}

impl RegistryIndex {
    fn schema(&self, id: SchemaId) -> Option<&StoredSchema> {
        self.schemas.iter().find(|s| s.id == id)
    }

    fn find(&self, checksum: &Checksum, references: &[SchemaReference]) -> Option<&StoredSchema> {
        self.schemas
            .iter()
            .find(|s| &s.checksum == checksum && s.references == references)
    }
}

/// A schema registry kept in a local directory
pub struct LocalRegistry {
    /// Path to the registry root
    root: PathBuf,
    index: RegistryIndex,
}

impl LocalRegistry {
    /// Open an existing registry or create a new one
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(root.join("schemas")).map_err(|e| storage_error(&root, e))?;

        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content =
                fs::read_to_string(&index_path).map_err(|e| storage_error(&index_path, e))?;
            serde_json::from_str(&content)?
        } else {
            RegistryIndex::default()
        };

        Ok(Self { root, index })
    }

    /// Get the root path of the registry
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All subjects with at least one version, sorted
    pub fn subjects(&self) -> Vec<&str> {
        self.index.subjects.keys().map(String::as_str).collect()
    }

    /// Version numbers registered under a subject
    pub fn versions(&self, subject: &str) -> Vec<i32> {
        self.index
            .subjects
            .get(subject)
            .map(|versions| versions.iter().map(|v| v.version).collect())
            .unwrap_or_default()
    }

    fn save(&self, index: &RegistryIndex) -> Result<()> {
        let index_path = self.root.join(INDEX_FILE);
        let content = serde_json::to_string_pretty(index)?;
        fs::write(&index_path, content).map_err(|e| storage_error(&index_path, e))
    }

    fn write_schema_file(&self, stored: &StoredSchema) -> Result<()> {
        let path = self
            .root
            .join("schemas")
            .join(format!("{}.{}", stored.id, stored.schema_type.extension()));
        fs::write(&path, &stored.schema).map_err(|e| storage_error(&path, e))
    }
}

impl RegistryClient for LocalRegistry {
    fn register(
        &mut self,
        subject: &str,
        schema: &ParsedSchema,
        normalize: bool,
    ) -> Result<SchemaId> {
        let text = if normalize { &schema.canonical } else { &schema.schema };
        let checksum = Checksum::of_schema(schema.schema_type, text);

        let versions = self.index.subjects.get(subject).map(Vec::as_slice).unwrap_or_default();

        // The first version fixes the subject's format
        if let Some(latest) = versions.last() {
            let existing_type = self
                .index
                .schema(latest.id)
                .map(|s| s.schema_type)
                .ok_or_else(|| dangling(latest.id))?;
            if existing_type != schema.schema_type {
                return Err(RegisterError::Incompatible {
                    subject: subject.to_string(),
                    reason: format!(
                        "subject holds {} schemas, cannot register {}",
                        existing_type, schema.schema_type
                    ),
                });
            }
        }

        // Only a repeat of the latest version is a no-op; an older schema
        // comes back as a new version carrying its original id
        let existing = self.index.find(&checksum, &schema.references).map(|s| s.id);
        if let (Some(id), Some(latest)) = (existing, versions.last()) {
            if latest.id == id {
                debug!(subject, id, "schema already latest version of subject");
                return Ok(id);
            }
        }

        let next_version = versions.last().map(|v| v.version + 1).unwrap_or(1);

        // Staged on a copy so a failed save leaves the registry untouched
        let mut index = self.index.clone();
        let id = match existing {
            Some(id) => id,
            None => {
                let stored = StoredSchema {
                    id: index.next_id,
                    schema_type: schema.schema_type,
                    checksum,
                    schema: text.clone(),
                    references: schema.references.clone(),
                    created_at: Utc::now(),
                };
                self.write_schema_file(&stored)?;
                index.next_id += 1;
                let id = stored.id;
                index.schemas.push(stored);
                id
            }
        };

        index
            .subjects
            .entry(subject.to_string())
            .or_default()
            .push(SubjectVersion {
                version: next_version,
                id,
                registered_at: Utc::now(),
            });
        self.save(&index)?;
        self.index = index;

        debug!(subject, id, version = next_version, "stored new subject version");
        Ok(id)
    }

    fn schema_by_version(&self, subject: &str, version: i32) -> Result<RegisteredSchema> {
        let versions = self
            .index
            .subjects
            .get(subject)
            .ok_or_else(|| RegisterError::SubjectNotFound(subject.to_string()))?;

        let entry = if version == LATEST_VERSION {
            versions.last()
        } else {
            versions.iter().find(|v| v.version == version)
        }
        .ok_or_else(|| RegisterError::VersionNotFound {
            subject: subject.to_string(),
            version,
        })?;

        let stored = self
            .index
            .schema(entry.id)
            .ok_or_else(|| dangling(entry.id))?;

        Ok(RegisteredSchema {
            id: stored.id,
            subject: subject.to_string(),
            version: entry.version,
            schema_type: stored.schema_type,
            schema: stored.schema.clone(),
            references: stored.references.clone(),
        })
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> RegisterError {
    RegisterError::Registry(format!("{}: {}", path.display(), err))
}

fn dangling(id: SchemaId) -> RegisterError {
    RegisterError::Registry(format!("dangling schema id {}", id))
}
