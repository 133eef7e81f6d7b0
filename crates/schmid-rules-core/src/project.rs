//! Host project model.
//!
//! Stands in for the build system's view of the project being checked. It is
//! read from a TOML project descriptor:
//!
//! ```toml
//! identifier = "shop"
//! execution-root = true
//! build-directory = "target"
//! test-resources = ["src/test/resources"]
//! runtime-dependencies = ["target/classes", "lib/rule-checker"]
//! members = [".", "shop-web", "shop-persistence"]
//!
//! [properties]
//! profile = "strict"
//!
//! [engine]
//! kind = "process"
//! executable = "rule-checker"
//! args = ["--profile", "${profile}"]
//! ```

use crate::loader::{EvaluationError, ExpressionEvaluator, RUNTIME_DEPENDENCIES_EXPRESSION};
use crate::resolver::CONVENTIONAL_CONFIG_DIR;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Declaration of a pluggable component: its kind plus declared fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentSpec {
    /// Registered component kind.
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Declared field values, possibly containing `${...}` expressions.
    #[serde(flatten)]
    pub fields: toml::Table,
}

impl Default for ComponentSpec {
    fn default() -> Self {
        let mut fields = toml::Table::new();
        fields.insert(
            "executable".to_string(),
            toml::Value::String(DEFAULT_EXECUTABLE.to_string()),
        );
        Self {
            kind: default_kind(),
            fields,
        }
    }
}

/// Default checker executable of the built-in `process` component.
const DEFAULT_EXECUTABLE: &str = "schmid-rules-engine";

fn default_kind() -> String {
    "process".to_string()
}

fn default_true() -> bool {
    true
}

fn default_build_directory() -> PathBuf {
    PathBuf::from("target")
}

/// The project a command runs against.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectModel {
    /// Project identifier (artifact name).
    pub identifier: String,

    /// Base directory. Filled from the descriptor location when omitted.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Whether this unit is the top-level unit of the run.
    #[serde(default = "default_true")]
    pub execution_root: bool,

    /// Build output directory, relative to the base directory.
    #[serde(default = "default_build_directory")]
    pub build_directory: PathBuf,

    /// Declared test resource directories, in declaration order.
    #[serde(default)]
    pub test_resources: Vec<PathBuf>,

    /// Resolved runtime dependency paths. `None` until dependency
    /// resolution has run.
    #[serde(default)]
    pub runtime_dependencies: Option<Vec<PathBuf>>,

    /// Base directories of every unit in a multi-module run.
    #[serde(default)]
    pub members: Vec<PathBuf>,

    /// User properties available to `${name}` expressions.
    #[serde(default)]
    pub properties: toml::Table,

    /// The rule engine component.
    #[serde(default)]
    pub engine: ComponentSpec,
}

/// Errors loading a project descriptor.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// IO error reading the descriptor.
    #[error("failed to read project descriptor {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in the descriptor.
    #[error("failed to parse project descriptor: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

impl ProjectModel {
    /// Loads a descriptor from a TOML file.
    ///
    /// A missing or relative `base-dir` is anchored at the descriptor's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProjectError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut project = Self::parse(&content)?;

        let descriptor_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        project.base_dir = Some(match project.base_dir.take() {
            Some(base) if base.is_absolute() => base,
            Some(base) => descriptor_dir.join(base),
            None => descriptor_dir,
        });
        Ok(project)
    }

    /// Parses a descriptor from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ProjectError> {
        toml::from_str(content).map_err(|e| ProjectError::Parse {
            message: e.to_string(),
        })
    }

    /// Model of a directory without a descriptor.
    ///
    /// The directory is its own execution root, has no test resources and no
    /// runtime dependencies, and uses the default engine.
    #[must_use]
    pub fn standalone(base_dir: &Path) -> Self {
        let identifier = base_dir
            .file_name()
            .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            identifier,
            base_dir: Some(base_dir.to_path_buf()),
            execution_root: true,
            build_directory: default_build_directory(),
            test_resources: Vec::new(),
            runtime_dependencies: Some(Vec::new()),
            members: Vec::new(),
            properties: toml::Table::new(),
            engine: ComponentSpec::default(),
        }
    }

    /// Returns the base directory, if one is known.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Anchors a relative path at the base directory.
    #[must_use]
    pub fn anchor(&self, path: &Path) -> PathBuf {
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Configuration candidate directories in probe order: the conventional
    /// config directory, then each test resource directory.
    #[must_use]
    pub fn config_candidates(&self) -> Vec<PathBuf> {
        std::iter::once(Path::new(CONVENTIONAL_CONFIG_DIR))
            .chain(self.test_resources.iter().map(PathBuf::as_path))
            .map(|p| self.anchor(p))
            .collect()
    }

    /// Build output directory, only when the base directory is known.
    #[must_use]
    pub fn build_output_dir(&self) -> Option<PathBuf> {
        self.base_dir().map(|base| base.join(&self.build_directory))
    }

    /// Base directories handed to the rule engine.
    ///
    /// Falls back to the project's own base directory for a single-unit run.
    #[must_use]
    pub fn member_base_dirs(&self) -> Vec<PathBuf> {
        if self.members.is_empty() {
            return self.base_dir.iter().cloned().collect();
        }
        self.members.iter().map(|m| self.anchor(m)).collect()
    }
}

/// Answers `${...}` expressions from a [`ProjectModel`].
///
/// | Expression | Value |
/// |------------|-------|
/// | `project.identifier` | identifier |
/// | `project.base-dir` | base directory |
/// | `project.build-directory` | build output directory |
/// | `project.runtime-dependencies` | array of dependency paths |
/// | `project.members` | array of member base directories |
/// | `env.NAME` | environment variable |
/// | `name` | entry of `[properties]` |
pub struct ProjectEvaluator<'a> {
    project: &'a ProjectModel,
}

impl<'a> ProjectEvaluator<'a> {
    /// Creates an evaluator over `project`.
    #[must_use]
    pub fn new(project: &'a ProjectModel) -> Self {
        Self { project }
    }
}

fn path_value(path: &Path) -> toml::Value {
    toml::Value::String(path.to_string_lossy().into_owned())
}

fn path_array(paths: impl IntoIterator<Item = PathBuf>) -> toml::Value {
    toml::Value::Array(paths.into_iter().map(|p| path_value(&p)).collect())
}

impl ExpressionEvaluator for ProjectEvaluator<'_> {
    fn evaluate(&self, expression: &str) -> Result<toml::Value, EvaluationError> {
        let unavailable = |reason: &str| EvaluationError::Unavailable {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        match expression {
            "project.identifier" => Ok(toml::Value::String(self.project.identifier.clone())),
            "project.base-dir" => self
                .project
                .base_dir()
                .map(path_value)
                .ok_or_else(|| unavailable("project has no base directory")),
            "project.build-directory" => self
                .project
                .build_output_dir()
                .map(|p| path_value(&p))
                .ok_or_else(|| unavailable("project has no base directory")),
            RUNTIME_DEPENDENCIES_EXPRESSION => self
                .project
                .runtime_dependencies
                .as_ref()
                .map(|deps| path_array(deps.iter().map(|d| self.project.anchor(d))))
                .ok_or_else(|| {
                    unavailable("dependency resolution has not produced a runtime dependency list")
                }),
            "project.members" => Ok(path_array(self.project.member_base_dirs())),
            _ => {
                if let Some(name) = expression.strip_prefix("env.") {
                    return std::env::var(name)
                        .map(toml::Value::String)
                        .map_err(|_| unavailable("environment variable is not set"));
                }
                self.project
                    .properties
                    .get(expression)
                    .cloned()
                    .ok_or_else(|| EvaluationError::Unknown(expression.to_string()))
            }
        }
    }
}
