//! Export command implementation.

use anyhow::{Context, Result};
use schmid_rules_core::{
    ComponentLoader, ComponentRegistry, ExportCommand, ExportOutcome, ExportSettings, ProjectModel,
};

/// Runs the export command.
pub fn run(project: &ProjectModel, settings: ExportSettings) -> Result<()> {
    let registry = ComponentRegistry::builtin();
    let loader = ComponentLoader::new(&registry).anchor(project.base_dir());

    let outcome = ExportCommand::new(settings)
        .run(project, &loader)
        .context("XMI export failed")?;

    if let ExportOutcome::Written(path) = outcome {
        println!("{}", path.display());
    }
    Ok(())
}
