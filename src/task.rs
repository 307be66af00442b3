//! The registration loop
//!
//! [`RegisterTask`] registers a list of subjects one after another, in the
//! order given. Each subject is resolved, registered, and on success recorded
//! in the [`RegistrationReport`]. A failing subject is logged and counted, or
//! with fail-fast enabled ends the run.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{RegisterError, Result};
use crate::registry::{RegistryClient, SchemaId};
use crate::report::RegistrationReport;
use crate::resolver::SchemaResolver;
use crate::subject::Subject;

/// A subject the run registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub subject: String,
    pub path: String,
    pub id: SchemaId,
}

/// A subject the run could not register
#[derive(Debug)]
pub struct SubjectFailure {
    pub subject: String,
    pub path: String,
    pub error: RegisterError,
}

/// What a run did, in processing order
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Subjects for which resolution was started
    pub attempted: usize,
    pub registered: Vec<Registration>,
    /// Failures that were counted and skipped
    pub failures: Vec<SubjectFailure>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Result of [`RegisterTask::run`]
#[derive(Debug)]
pub enum RunOutcome {
    /// Every subject was attempted
    Completed(RunSummary),
    /// Fail-fast stopped the run at `failure`; later subjects were not attempted
    Aborted {
        summary: RunSummary,
        failure: SubjectFailure,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(summary) => summary,
            RunOutcome::Aborted { summary, .. } => summary,
        }
    }

    /// Number of failures counted by the run. An aborted run reports its
    /// cause through [`RunOutcome::failure`] instead.
    pub fn error_count(&self) -> usize {
        self.summary().failed()
    }

    /// The failure that aborted the run
    pub fn failure(&self) -> Option<&SubjectFailure> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Aborted { failure, .. } => Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(summary) if summary.failures.is_empty())
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Registers subjects against a registry, one run per task
pub struct RegisterTask<'a, C: RegistryClient + ?Sized> {
    client: &'a mut C,
    root_dir: PathBuf,
    subjects: Vec<Subject>,
    report: RegistrationReport,
    fail_fast: bool,
    quiet: bool,
}

impl<'a, C: RegistryClient + ?Sized> RegisterTask<'a, C> {
    /// Create a task. `output_dir` is resolved against `root_dir`; without
    /// one no report is written.
    pub fn new(
        client: &'a mut C,
        root_dir: impl Into<PathBuf>,
        subjects: Vec<Subject>,
        output_dir: Option<&Path>,
    ) -> Self {
        let root_dir = root_dir.into();
        let output_dir = output_dir.map(|dir| root_dir.join(dir));
        let report = RegistrationReport::from_output_dir(output_dir.as_deref());
        Self {
            client,
            root_dir,
            subjects,
            report,
            fail_fast: false,
            quiet: false,
        }
    }

    /// Stop at the first failing subject
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Skip the per-subject info logs
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn report(&self) -> &RegistrationReport {
        &self.report
    }

    /// Register every subject in order
    ///
    /// Returns `Err` only when the report header cannot be written, before any
    /// subject is attempted. Per-subject failures are part of the outcome.
    pub fn run(self) -> Result<RunOutcome> {
        let RegisterTask {
            client,
            root_dir,
            subjects,
            report,
            fail_fast,
            quiet,
        } = self;

        report.initialize(!subjects.is_empty())?;

        let mut summary = RunSummary::default();
        for subject in subjects {
            summary.attempted += 1;

            let registered =
                register_subject(&mut *client, &root_dir, &subject, quiet).and_then(|id| {
                    report.append(&subject.input_subject, &subject.file, id)?;
                    Ok(id)
                });

            match registered {
                Ok(id) => summary.registered.push(Registration {
                    subject: subject.input_subject,
                    path: subject.file,
                    id,
                }),
                Err(e) => {
                    error!(
                        subject = %subject,
                        kind = ?e.kind(),
                        "Could not register schema for '{}': {}",
                        subject,
                        e
                    );
                    let failure = SubjectFailure {
                        subject: subject.input_subject,
                        path: subject.file,
                        error: e,
                    };
                    if fail_fast {
                        return Ok(RunOutcome::Aborted { summary, failure });
                    }
                    summary.failures.push(failure);
                }
            }
        }

        Ok(RunOutcome::Completed(summary))
    }
}

fn register_subject<C: RegistryClient + ?Sized>(
    client: &mut C,
    root_dir: &Path,
    subject: &Subject,
    quiet: bool,
) -> Result<SchemaId> {
    let parsed =
        SchemaResolver::provide(subject.schema_type).parse(&*client, root_dir, subject)?;

    if !quiet {
        info!("Registering {} (from {})", subject.input_subject, subject.file);
    }
    let id = client.register(&subject.input_subject, &parsed, subject.normalize)?;
    if !quiet {
        info!(
            "{} (from {}) has been registered with id {}",
            subject.input_subject, subject.file, id
        );
    }

    Ok(id)
}
