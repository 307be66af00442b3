//! Registration report
//!
//! `registered.csv` lists every subject a run registered, in the order they
//! were registered:
//!
//! ```text
//! subject, path, id
//! orders-value, avro/orders.avsc, 7
//! ```
//!
//! Each row is appended with its own open/write/close, so rows written before
//! an abnormal exit survive.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{RegisterError, Result};
use crate::registry::SchemaId;

/// Name of the report file inside the output directory
pub const REPORT_FILE: &str = "registered.csv";

const HEADER: &str = "subject, path, id\n";

/// Append-only record of successful registrations
#[derive(Debug, Clone)]
pub struct RegistrationReport {
    destination: Option<PathBuf>,
}

impl RegistrationReport {
    /// Report into `output_dir/registered.csv`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            destination: Some(output_dir.as_ref().join(REPORT_FILE)),
        }
    }

    /// A report that writes nothing
    pub fn disabled() -> Self {
        Self { destination: None }
    }

    pub fn from_output_dir(output_dir: Option<&Path>) -> Self {
        output_dir.map(|dir| Self::new(dir)).unwrap_or_else(Self::disabled)
    }

    /// Path of the report file, if reporting is enabled
    pub fn path(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Truncate the report and write its header. Leaves the file untouched
    /// when there is nothing to register.
    pub fn initialize(&self, has_subjects: bool) -> Result<()> {
        let Some(path) = self.destination.as_deref() else {
            return Ok(());
        };
        if !has_subjects {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| report_error(path, e))?;
        }
        fs::write(path, HEADER).map_err(|e| report_error(path, e))
    }

    /// Append one registered subject
    pub fn append(&self, subject: &str, path: &str, id: SchemaId) -> Result<()> {
        let Some(destination) = self.destination.as_deref() else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(destination)
            .map_err(|e| report_error(destination, e))?;
        file.write_all(format!("{}, {}, {}\n", subject, path, id).as_bytes())
            .map_err(|e| report_error(destination, e))
    }
}

fn report_error(path: &Path, source: std::io::Error) -> RegisterError {
    RegisterError::Report {
        path: path.to_path_buf(),
        source,
    }
}
