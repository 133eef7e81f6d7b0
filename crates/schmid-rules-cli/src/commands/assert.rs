//! Assert command implementation.

use anyhow::{Context, Result};
use schmid_rules_core::{
    AssertCommand, AssertSettings, ComponentLoader, ComponentRegistry, ProjectModel,
};

use crate::OutputFormat;

/// Runs the assert command.
pub fn run(project: &ProjectModel, settings: AssertSettings, format: OutputFormat) -> Result<()> {
    let registry = ComponentRegistry::builtin();
    let loader = ComponentLoader::new(&registry).anchor(project.base_dir());

    tracing::debug!(
        "Asserting {} with engine `{}`",
        project.identifier,
        project.engine.kind
    );

    let outcome = AssertCommand::new(settings)
        .run(project, &loader)
        .context("Architecture assertion could not run")?;

    if let Some(report) = outcome.report() {
        super::output::print(report, format)?;
    }

    // Failed outcome becomes an error so the process exits non-zero
    outcome.into_result()?;
    Ok(())
}
