//! Project descriptor discovery.
//!
//! Resolves the project model using a deterministic priority order:
//!
//! 1. `--project` flag (explicit descriptor path)
//! 2. `{cwd}/schmid-project.toml`
//! 3. No descriptor found → standalone model of the working directory

use anyhow::{Context, Result};
use schmid_rules_core::ProjectModel;
use std::path::{Path, PathBuf};

/// Descriptor file name looked up in the working directory.
pub const PROJECT_DESCRIPTOR_NAME: &str = "schmid-project.toml";

/// Where the project model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    /// Explicitly specified via `--project`.
    Explicit(PathBuf),
    /// Found in the working directory.
    Discovered(PathBuf),
    /// No descriptor; the directory itself is the project.
    Standalone(PathBuf),
}

impl ProjectSource {
    /// Builds the project model.
    pub fn load(&self) -> Result<ProjectModel> {
        match self {
            Self::Explicit(p) | Self::Discovered(p) => {
                tracing::debug!("Using project descriptor: {}", p.display());
                ProjectModel::from_file(p)
                    .with_context(|| format!("Failed to load project: {}", p.display()))
            }
            Self::Standalone(dir) => {
                tracing::debug!("No project descriptor, using {}", dir.display());
                Ok(ProjectModel::standalone(dir))
            }
        }
    }
}

/// Resolves the project source against the current directory.
pub fn resolve(explicit: Option<&Path>) -> Result<ProjectSource> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(resolve_inner(&cwd, explicit))
}

/// Testable core: accepts the working directory as parameter.
fn resolve_inner(working_dir: &Path, explicit: Option<&Path>) -> ProjectSource {
    // Explicit path is trusted as-is; loading reports a missing file
    if let Some(p) = explicit {
        return ProjectSource::Explicit(working_dir.join(p));
    }

    let candidate = working_dir.join(PROJECT_DESCRIPTOR_NAME);
    if candidate.is_file() {
        tracing::debug!("Found project descriptor: {}", candidate.display());
        return ProjectSource::Discovered(candidate);
    }

    ProjectSource::Standalone(working_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_takes_priority_over_discovered() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PROJECT_DESCRIPTOR_NAME), "").unwrap();
        let explicit = tmp.path().join("other.toml");

        let result = resolve_inner(tmp.path(), Some(&explicit));
        assert_eq!(result, ProjectSource::Explicit(explicit));
    }

    #[test]
    fn relative_explicit_path_is_anchored_at_working_dir() {
        let result = resolve_inner(Path::new("/work"), Some(Path::new("sub/project.toml")));
        assert_eq!(
            result,
            ProjectSource::Explicit(PathBuf::from("/work/sub/project.toml"))
        );
    }

    #[test]
    fn descriptor_in_working_dir_is_discovered() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PROJECT_DESCRIPTOR_NAME), "").unwrap();

        let result = resolve_inner(tmp.path(), None);
        assert_eq!(
            result,
            ProjectSource::Discovered(tmp.path().join(PROJECT_DESCRIPTOR_NAME))
        );
    }

    #[test]
    fn directory_named_like_descriptor_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(PROJECT_DESCRIPTOR_NAME)).unwrap();

        let result = resolve_inner(tmp.path(), None);
        assert_eq!(result, ProjectSource::Standalone(tmp.path().to_path_buf()));
    }

    #[test]
    fn no_descriptor_is_standalone() {
        let tmp = TempDir::new().unwrap();
        let result = resolve_inner(tmp.path(), None);
        assert_eq!(result, ProjectSource::Standalone(tmp.path().to_path_buf()));
    }

    #[test]
    fn discovered_descriptor_loads_with_base_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(PROJECT_DESCRIPTOR_NAME),
            "identifier = \"shop\"\nruntime-dependencies = []\n",
        )
        .unwrap();

        let project = resolve_inner(tmp.path(), None).load().unwrap();
        assert_eq!(project.identifier, "shop");
        assert_eq!(project.base_dir(), Some(tmp.path()));
    }

    #[test]
    fn standalone_model_is_execution_root_with_resolved_dependencies() {
        let tmp = TempDir::new().unwrap();
        let project = resolve_inner(tmp.path(), None).load().unwrap();
        assert!(project.execution_root);
        assert_eq!(project.runtime_dependencies, Some(Vec::new()));
        assert!(project.test_resources.is_empty());
    }

    #[test]
    fn missing_explicit_descriptor_fails_to_load() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_inner(tmp.path(), Some(Path::new("missing.toml")))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load project"));
    }
}
