//! Schema Register
//!
//! Registers a batch of Avro, JSON Schema and Protobuf subjects against a
//! schema registry and records what was registered.
//!
//! ## Features
//!
//! - **Ordered Registration**: Subjects are registered one at a time, in the
//!   order given, so a schema can reference a subject registered earlier in
//!   the same run
//! - **Failure Policy**: Failing subjects are logged and counted, or stop the
//!   run when fail-fast is enabled
//! - **Audit Trail**: `registered.csv` lists every subject that was actually
//!   registered, with its schema id
//! - **References**: Schemas can depend on registry subjects or on local files
//!
//! ## Flow
//!
//! ```text
//! register.toml ──> RegisterTask::run
//!                     for each subject:
//!                       SchemaResolver::parse ──> RegistryClient::register
//!                       ──> RegistrationReport::append
//!                   ──> RunOutcome
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod subject;
pub mod task;

pub use checksum::Checksum;
pub use config::RegisterConfig;
pub use error::{ErrorKind, RegisterError, Result};
pub use registry::{LocalRegistry, RegisteredSchema, RegistryClient, SchemaId};
pub use report::RegistrationReport;
pub use resolver::{ParsedSchema, SchemaResolver};
pub use subject::{LocalReference, SchemaReference, SchemaType, Subject};
pub use task::{RegisterTask, Registration, RunOutcome, RunSummary, SubjectFailure};
