//! # schmid-rules-core
//!
//! Build-time driver for an external architecture-rule checker.
//!
//! This crate locates the project's rule configuration file, loads the
//! checker component declared by the project, and turns the checker's
//! findings into a pass/fail outcome. It includes:
//!
//! - [`resolver`] for first-match lookup of the configuration file
//! - [`ComponentLoader`] for extending the [`ResolverContext`] with the
//!   project's runtime dependencies and binding a component's declared fields
//! - [`RuleEngine`] and [`XmiWriter`] capability contracts, with the
//!   built-in [`ProcessEngine`] variant
//! - [`AssertCommand`] and [`ExportCommand`] orchestrators
//!
//! ## Example
//!
//! ```ignore
//! use schmid_rules_core::{AssertCommand, AssertSettings, ComponentLoader, ComponentRegistry};
//!
//! let project = ProjectModel::from_file("schmid-project.toml".as_ref())?;
//! let registry = ComponentRegistry::builtin();
//! let loader = ComponentLoader::new(&registry).anchor(project.base_dir());
//!
//! let outcome = AssertCommand::new(AssertSettings::default()).run(&project, &loader)?;
//! outcome.into_result()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod error;
mod loader;
mod project;
mod types;

/// External engine contracts and built-in variants.
pub mod engine;
/// Command orchestrators.
pub mod orchestrator;
pub mod resolver;

pub use binder::{bind, ComponentConfig, FieldError, FieldKind, FieldSpec};
pub use engine::{
    ComponentRegistry, Engine, EngineBox, EngineError, ProcessEngine, ProcessEngineConfig,
    RuleEngine, XmiWriter,
};
pub use error::SchmidRulesError;
pub use loader::{
    prepare, runtime_dependency_paths, ComponentError, ComponentLoader, EvaluationError,
    ExpressionEvaluator, ResolverContext, RUNTIME_DEPENDENCIES_EXPRESSION,
};
pub use orchestrator::{
    AssertCommand, AssertOutcome, AssertSettings, ExportCommand, ExportOutcome, ExportSettings,
    SkipReason,
};
pub use project::{ComponentSpec, ProjectError, ProjectEvaluator, ProjectModel};
pub use resolver::{ConfigSource, CONVENTIONAL_CONFIG_DIR, DEFAULT_CONFIGURATION_FILE_NAME};
pub use types::{Severity, Violation, ViolationReport};
