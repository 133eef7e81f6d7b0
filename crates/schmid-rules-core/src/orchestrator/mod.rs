//! Command orchestration.
//!
//! Both commands share the same front half:
//!
//! ```text
//! skip check ── skipped ──▶ done
//!     │
//!     ▼
//! resolve configuration ──▶ load engine ──▶ command-specific work
//! ```
//!
//! The skip check runs before any I/O, so a skipped unit never resolves a
//! configuration file or loads an engine.

mod assert;
mod export;

pub use assert::{classify, AssertCommand, AssertOutcome, AssertSettings};
pub use export::{output_directory, ExportCommand, ExportOutcome, ExportSettings};

use crate::error::SchmidRulesError;
use crate::project::ProjectModel;
use crate::resolver::{self, ConfigSource};
use std::path::{Path, PathBuf};
use tracing::info;

/// Why a command did nothing for the current unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The unit is not the execution root and root-only mode is on.
    NotExecutionRoot,
    /// Skipping was requested explicitly.
    Requested,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExecutionRoot => write!(f, "Project is not execution root. Skipping."),
            Self::Requested => write!(f, "Skipping as requested."),
        }
    }
}

/// Applies the skip policy.
///
/// `skip_root` keeps the check on the execution root only, so a multi-module
/// run reports once.
fn skip_reason(project: &ProjectModel, skip: bool, skip_root: bool) -> Option<SkipReason> {
    if skip {
        return Some(SkipReason::Requested);
    }
    if skip_root && !project.execution_root {
        return Some(SkipReason::NotExecutionRoot);
    }
    None
}

fn working_dir(explicit: Option<&Path>) -> Result<PathBuf, SchmidRulesError> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().map_err(|e| SchmidRulesError::Io {
            path: PathBuf::from("."),
            source: e,
        }),
    }
}

fn resolve_configuration(
    working_dir: &Path,
    name: &str,
    project: &ProjectModel,
) -> Result<ConfigSource, SchmidRulesError> {
    let source = resolver::resolve_from(working_dir, name, &project.config_candidates())?;
    info!("{}", source.path().display());
    Ok(source)
}
