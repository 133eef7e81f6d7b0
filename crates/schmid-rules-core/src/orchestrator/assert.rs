//! The `assert` command: check every module and classify the findings.

use super::{resolve_configuration, skip_reason, working_dir, SkipReason};
use crate::error::SchmidRulesError;
use crate::loader::{ComponentLoader, ResolverContext};
use crate::project::{ProjectEvaluator, ProjectModel};
use crate::resolver::DEFAULT_CONFIGURATION_FILE_NAME;
use crate::types::{Severity, Violation, ViolationReport};
use std::path::PathBuf;
use tracing::info;

/// Settings of the `assert` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertSettings {
    /// Configuration file name or direct path.
    pub config_name: String,
    /// Only run on the execution root (default: true).
    pub skip_root: bool,
    /// Fail when at least one error-severity violation exists (default: true).
    pub fail_on_error: bool,
    /// Skip this unit entirely (default: false).
    pub skip: bool,
}

impl Default for AssertSettings {
    fn default() -> Self {
        Self {
            config_name: DEFAULT_CONFIGURATION_FILE_NAME.to_string(),
            skip_root: true,
            fail_on_error: true,
            skip: false,
        }
    }
}

/// Result of a completed `assert` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertOutcome {
    /// Nothing was checked.
    Skipped(SkipReason),
    /// The check ran and the build may continue.
    Passed(ViolationReport),
    /// The check ran and error-severity violations break the build.
    Failed(ViolationReport),
}

impl AssertOutcome {
    /// Returns true for [`AssertOutcome::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the report, if the check ran.
    #[must_use]
    pub fn report(&self) -> Option<&ViolationReport> {
        match self {
            Self::Skipped(_) => None,
            Self::Passed(report) | Self::Failed(report) => Some(report),
        }
    }

    /// Converts a failure into [`SchmidRulesError::RulesViolated`].
    ///
    /// # Errors
    ///
    /// Returns an error for [`AssertOutcome::Failed`].
    pub fn into_result(self) -> Result<Option<ViolationReport>, SchmidRulesError> {
        match self {
            Self::Skipped(_) => Ok(None),
            Self::Passed(report) => Ok(Some(report)),
            Self::Failed(report) => Err(SchmidRulesError::RulesViolated {
                errors: report.errors.len(),
                warnings: report.warnings.len(),
            }),
        }
    }
}

/// Partitions violations by severity.
///
/// # Errors
///
/// Returns [`SchmidRulesError::InternalConsistency`] on the first severity
/// outside the engine contract. Nothing is downgraded.
pub fn classify(violations: &[Violation]) -> Result<ViolationReport, SchmidRulesError> {
    let mut report = ViolationReport::default();
    for violation in violations {
        match &violation.severity {
            Severity::Error => report.errors.push(violation.description.clone()),
            Severity::Warn => report.warnings.push(violation.description.clone()),
            Severity::Unrecognized(severity) => {
                return Err(SchmidRulesError::InternalConsistency {
                    severity: severity.clone(),
                });
            }
        }
    }
    Ok(report)
}

/// Orchestrates the `assert` command.
#[derive(Debug, Clone, Default)]
pub struct AssertCommand {
    settings: AssertSettings,
    working_dir: Option<PathBuf>,
}

impl AssertCommand {
    /// Creates the command.
    #[must_use]
    pub fn new(settings: AssertSettings) -> Self {
        Self {
            settings,
            working_dir: None,
        }
    }

    /// Overrides the process working directory used for direct paths.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &AssertSettings {
        &self.settings
    }

    /// Runs the command against `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration resolution, engine loading or the
    /// engine itself fails, or if an unrecognized severity is reported.
    /// Violations are not errors; see [`AssertOutcome`].
    pub fn run(
        &self,
        project: &ProjectModel,
        loader: &ComponentLoader<'_>,
    ) -> Result<AssertOutcome, SchmidRulesError> {
        if let Some(reason) = skip_reason(project, self.settings.skip, self.settings.skip_root) {
            info!("{reason}");
            return Ok(AssertOutcome::Skipped(reason));
        }

        let working_dir = working_dir(self.working_dir.as_deref())?;
        let source = resolve_configuration(&working_dir, &self.settings.config_name, project)?;

        let evaluator = ProjectEvaluator::new(project);
        let engine = loader.load(&project.engine, ResolverContext::new(), &evaluator)?;

        let base_dirs = project.member_base_dirs();
        info!("Checking {} module(s)", base_dirs.len());
        let violations = engine.check(source.path(), &base_dirs)?;

        let report = classify(&violations)?;
        // engine order, one line per violation
        for violation in &violations {
            violation.log();
        }

        if self.settings.fail_on_error && report.has_errors() {
            return Ok(AssertOutcome::Failed(report));
        }
        Ok(AssertOutcome::Passed(report))
    }
}
