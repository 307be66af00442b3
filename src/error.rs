//! Error types for schema registration

use std::path::PathBuf;

use thiserror::Error;

use crate::subject::SchemaType;

/// Result type for registration operations
pub type Result<T> = std::result::Result<T, RegisterError>;

/// Schema registration errors
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Subject name must not be empty (file {file})")]
    EmptySubject { file: String },

    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {schema_type} schema in {path}: {reason}")]
    InvalidSchema {
        schema_type: SchemaType,
        path: String,
        reason: String,
    },

    #[error("Import '{import}' in {path} is not declared as a reference")]
    UnresolvedImport { import: String, path: String },

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Version {version} not found for subject {subject}")]
    VersionNotFound { subject: String, version: i32 },

    #[error("Incompatible schema for subject {subject}: {reason}")]
    Incompatible { subject: String, reason: String },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Registry index error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which stage of a registration attempt an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The subject's schema could not be read, parsed or have its references resolved
    Resolution,
    /// The registry rejected or could not process the request
    Registration,
    /// The report file could not be written
    Report,
}

impl RegisterError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegisterError::EmptySubject { .. }
            | RegisterError::Io { .. }
            | RegisterError::InvalidSchema { .. }
            | RegisterError::UnresolvedImport { .. } => ErrorKind::Resolution,
            RegisterError::SubjectNotFound(_)
            | RegisterError::VersionNotFound { .. }
            | RegisterError::Incompatible { .. }
            | RegisterError::Registry(_)
            | RegisterError::Json(_) => ErrorKind::Registration,
            RegisterError::Report { .. } => ErrorKind::Report,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegisterError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(
        schema_type: SchemaType,
        path: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        RegisterError::InvalidSchema {
            schema_type,
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = RegisterError::invalid(SchemaType::Avro, "a.avsc", "bad");
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let err = RegisterError::SubjectNotFound("orders-value".to_string());
        assert_eq!(err.kind(), ErrorKind::Registration);

        let err = RegisterError::Report {
            path: PathBuf::from("out/registered.csv"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.kind(), ErrorKind::Report);
    }

    #[test]
    fn test_error_display_names_subject() {
        let err = RegisterError::Incompatible {
            subject: "orders-value".to_string(),
            reason: "type changed".to_string(),
        };
        assert_eq!(err.to_string(), "Incompatible schema for subject orders-value: type changed");
    }
}
