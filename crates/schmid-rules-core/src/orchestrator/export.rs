//! The `export` command: write the rule model as an XMI file.

use super::{resolve_configuration, skip_reason, working_dir, SkipReason};
use crate::engine::EngineError;
use crate::error::SchmidRulesError;
use crate::loader::{ComponentLoader, ResolverContext};
use crate::project::{ProjectEvaluator, ProjectModel};
use crate::resolver::DEFAULT_CONFIGURATION_FILE_NAME;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings of the `export` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Configuration file name or direct path.
    pub config_name: String,
    /// Output file name (default: `<identifier>.xml`).
    pub output: Option<String>,
    /// Output directory override.
    pub output_dir: Option<PathBuf>,
    /// Only run on the execution root (default: true).
    pub skip_root: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            config_name: DEFAULT_CONFIGURATION_FILE_NAME.to_string(),
            output: None,
            output_dir: None,
            skip_root: true,
        }
    }
}

/// Result of a completed `export` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing was exported.
    Skipped(SkipReason),
    /// The XMI file was written to this absolute path.
    Written(PathBuf),
}

/// Picks the output directory: explicit override, then the build output
/// directory, then the working directory. First non-empty candidate wins.
#[must_use]
pub fn output_directory(
    explicit: Option<&Path>,
    build_output: Option<PathBuf>,
    working_dir: &Path,
) -> PathBuf {
    explicit
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| working_dir.join(dir))
        .or(build_output)
        .unwrap_or_else(|| working_dir.to_path_buf())
}

/// Orchestrates the `export` command.
#[derive(Debug, Clone, Default)]
pub struct ExportCommand {
    settings: ExportSettings,
    working_dir: Option<PathBuf>,
}

impl ExportCommand {
    /// Creates the command.
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            working_dir: None,
        }
    }

    /// Overrides the process working directory.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Runs the command against `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration resolution or engine loading fails,
    /// if the engine fails, or if the output cannot be created or written.
    pub fn run(
        &self,
        project: &ProjectModel,
        loader: &ComponentLoader<'_>,
    ) -> Result<ExportOutcome, SchmidRulesError> {
        if let Some(reason) = skip_reason(project, false, self.settings.skip_root) {
            info!("{reason}");
            return Ok(ExportOutcome::Skipped(reason));
        }

        let working_dir = working_dir(self.working_dir.as_deref())?;
        let source = resolve_configuration(&working_dir, &self.settings.config_name, project)?;

        let evaluator = ProjectEvaluator::new(project);
        let engine = loader.load(&project.engine, ResolverContext::new(), &evaluator)?;

        let directory = output_directory(
            self.settings.output_dir.as_deref(),
            project.build_output_dir(),
            &working_dir,
        );
        ensure_directory(&directory)?;

        let file_name = self
            .settings
            .output
            .clone()
            .unwrap_or_else(|| format!("{}.xml", project.identifier));
        let path = directory.join(file_name);

        write_xmi(&path, |out| {
            engine.create_xmi(source.path(), &project.identifier, out)
        })?;

        info!("Created XMI file {}", path.display());
        Ok(ExportOutcome::Written(path))
    }
}

fn ensure_directory(directory: &Path) -> Result<(), SchmidRulesError> {
    if directory.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(directory).map_err(|e| SchmidRulesError::Io {
        path: directory.to_path_buf(),
        source: e,
    })?;
    info!("Directory {} created.", directory.display());
    Ok(())
}

/// Opens `path`, hands it to `write` and flushes. The file is closed on
/// every exit path.
fn write_xmi<F>(path: &Path, write: F) -> Result<(), SchmidRulesError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), EngineError>,
{
    let io_error = |source: std::io::Error| SchmidRulesError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);

    write(&mut out).map_err(|e| match e {
        EngineError::Io(source) => io_error(source),
        other => SchmidRulesError::ExternalEngine(other),
    })?;
    out.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_output_dir_wins_over_build_and_working_dir() {
        let dir = output_directory(
            Some(Path::new("/out")),
            Some(PathBuf::from("/work/target")),
            Path::new("/work"),
        );
        assert_eq!(dir, PathBuf::from("/out"));
    }

    #[test]
    fn relative_output_dir_is_anchored_at_working_dir() {
        let dir = output_directory(Some(Path::new("xmi")), None, Path::new("/work"));
        assert_eq!(dir, PathBuf::from("/work/xmi"));
    }

    #[test]
    fn build_output_dir_wins_over_working_dir() {
        let dir = output_directory(None, Some(PathBuf::from("/work/target")), Path::new("/cwd"));
        assert_eq!(dir, PathBuf::from("/work/target"));
    }

    #[test]
    fn empty_output_dir_falls_through_to_build_dir() {
        let dir = output_directory(
            Some(Path::new("")),
            Some(PathBuf::from("/work/target")),
            Path::new("/cwd"),
        );
        assert_eq!(dir, PathBuf::from("/work/target"));
    }

    #[test]
    fn working_dir_is_last_resort() {
        let dir = output_directory(None, None, Path::new("/cwd"));
        assert_eq!(dir, PathBuf::from("/cwd"));
    }

    #[test]
    fn ensure_directory_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn write_xmi_maps_writer_io_failure_to_io_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shop.xml");

        let err = write_xmi(&path, |_| {
            Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        })
        .unwrap_err();
        assert!(matches!(err, SchmidRulesError::Io { path: ref p, .. } if p == &path));
    }

    #[test]
    fn write_xmi_keeps_engine_failures_as_engine_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shop.xml");

        let err = write_xmi(&path, |_| {
            Err(EngineError::Failed {
                status: "exit status: 2".into(),
                message: "bad config".into(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, SchmidRulesError::ExternalEngine(_)));
    }

    #[test]
    fn write_xmi_writes_all_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("shop.xml");

        write_xmi(&path, |out| {
            out.write_all(b"<xmi/>")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<xmi/>");
    }
}
