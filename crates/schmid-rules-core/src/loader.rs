//! Pluggable component loading.
//!
//! A component's implementation may ship with the project being checked
//! rather than with this tool. Loading therefore happens in a fixed order:
//!
//! ```text
//! ${project.runtime-dependencies}
//!   ↓ prepare()          extend the ResolverContext (append-only)
//! ResolverContext
//!   ↓ bind()             evaluate, coerce and validate declared fields
//! typed component config
//!   ↓ registry factory
//! EngineBox
//! ```
//!
//! [`ComponentLoader::load`] runs the three steps as one call, with the
//! context passed by value, so a component can never be bound against a
//! partially extended context.

use crate::binder::{format_field_errors, FieldError};
use crate::engine::{ComponentRegistry, EngineBox};
use crate::project::ComponentSpec;
use miette::Diagnostic;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expression naming the host project's runtime dependency paths.
pub const RUNTIME_DEPENDENCIES_EXPRESSION: &str = "project.runtime-dependencies";

/// Ordered, append-only set of locations used to look up component code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverContext {
    locations: Vec<PathBuf>,
}

impl ResolverContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the locations in insertion order.
    #[must_use]
    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Returns true if `location` is already part of the context.
    #[must_use]
    pub fn contains(&self, location: &Path) -> bool {
        self.locations.iter().any(|l| l == location)
    }

    /// Returns the number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns true if no location has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Appends a location. Re-adding a known location is a no-op.
    ///
    /// Returns `true` if the location was new.
    fn push(&mut self, location: PathBuf) -> bool {
        if self.contains(&location) {
            return false;
        }
        self.locations.push(location);
        true
    }

    /// Looks up a file by name in every location, first match wins.
    ///
    /// A location that is itself a file matches only when its file name equals
    /// `name` exactly; a directory location matches when it holds `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.locations.iter().find_map(|location| {
            if location.is_file() {
                let matches = location.file_name().is_some_and(|f| f == name);
                return matches.then(|| location.clone());
            }
            let candidate = location.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
            if cfg!(windows) {
                let exe = location.join(format!("{name}.exe"));
                if exe.is_file() {
                    return Some(exe);
                }
            }
            None
        })
    }
}

/// Extends `context` with every path in `extra_paths`.
///
/// Relative paths are anchored at `anchor` when given. Paths already in the
/// context are skipped, so extending twice with the same path is equivalent
/// to extending once.
///
/// # Errors
///
/// Returns [`ComponentError::InvalidLocation`] if a path is empty.
pub fn prepare(
    mut context: ResolverContext,
    extra_paths: &[PathBuf],
    anchor: Option<&Path>,
) -> Result<ResolverContext, ComponentError> {
    for path in extra_paths {
        if path.as_os_str().is_empty() {
            return Err(ComponentError::InvalidLocation { path: path.clone() });
        }
        let location = match anchor {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.clone(),
        };
        if context.push(location.clone()) {
            debug!("added {} to resolver context", location.display());
        }
    }
    Ok(context)
}

/// Evaluates `${...}` expressions found in declared component fields.
pub trait ExpressionEvaluator {
    /// Evaluates the expression body (without the `${` and `}` delimiters).
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is unknown or its value is not
    /// available yet.
    fn evaluate(&self, expression: &str) -> Result<toml::Value, EvaluationError>;
}

/// Failure to evaluate a single expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// Nothing answers to this expression.
    #[error("unknown expression `{0}`")]
    Unknown(String),

    /// The expression is known but has no value in this run.
    #[error("`{expression}` is not available: {reason}")]
    Unavailable {
        /// The expression body.
        expression: String,
        /// Why there is no value.
        reason: String,
    },

    /// A non-scalar value was embedded inside a larger string.
    #[error("`{expression}` yields {found}, which cannot be embedded in a string")]
    NotScalar {
        /// The expression body.
        expression: String,
        /// TOML type name of the value.
        found: &'static str,
    },
}

/// Errors while preparing or configuring a pluggable component.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ComponentError {
    /// The dependency path list could not be obtained.
    #[error("there was a problem evaluating: ${{{expression}}}: {message}")]
    #[diagnostic(
        code(schmid_rules::component::evaluation),
        help(
            "dependency resolution must run before this command; \
             declare `runtime-dependencies` in the project descriptor"
        )
    )]
    Evaluation {
        /// The expression body that failed.
        expression: String,
        /// Failure detail.
        message: String,
    },

    /// A dependency path cannot be used as a location.
    #[error("unable to access project dependency: `{}`", .path.display())]
    #[diagnostic(code(schmid_rules::component::invalid_location))]
    InvalidLocation {
        /// The offending path.
        path: PathBuf,
    },

    /// One or more declared fields could not be bound.
    #[error("invalid configuration for component `{component}`:\n{}", format_field_errors(.errors))]
    #[diagnostic(code(schmid_rules::component::fields))]
    Fields {
        /// Component kind being configured.
        component: String,
        /// Every field problem found.
        errors: Vec<FieldError>,
    },

    /// The bound values did not fit the component's typed configuration.
    #[error("component `{component}` rejected its configuration: {message}")]
    #[diagnostic(code(schmid_rules::component::binding))]
    Binding {
        /// Component kind being configured.
        component: String,
        /// Deserialization detail.
        message: String,
    },

    /// No factory is registered under the requested kind.
    #[error("no component registered for kind `{kind}` (available: {})", .available.join(", "))]
    #[diagnostic(code(schmid_rules::component::unknown_kind))]
    UnknownKind {
        /// Requested kind.
        kind: String,
        /// Registered kinds.
        available: Vec<String>,
    },
}

/// Obtains the runtime dependency paths through `evaluator`.
///
/// # Errors
///
/// Returns [`ComponentError::Evaluation`] if the expression fails or does not
/// yield a list of strings.
pub fn runtime_dependency_paths(
    evaluator: &dyn ExpressionEvaluator,
) -> Result<Vec<PathBuf>, ComponentError> {
    let failed = |message: String| ComponentError::Evaluation {
        expression: RUNTIME_DEPENDENCIES_EXPRESSION.to_string(),
        message,
    };

    let value = evaluator
        .evaluate(RUNTIME_DEPENDENCIES_EXPRESSION)
        .map_err(|e| failed(e.to_string()))?;

    let toml::Value::Array(items) = value else {
        return Err(failed(format!("expected array, found {}", value.type_str())));
    };

    items
        .into_iter()
        .map(|item| match item {
            toml::Value::String(s) => Ok(PathBuf::from(s)),
            other => Err(failed(format!(
                "expected array of strings, found {} element",
                other.type_str()
            ))),
        })
        .collect()
}

/// Loads components from a [`ComponentRegistry`].
pub struct ComponentLoader<'r> {
    registry: &'r ComponentRegistry,
    anchor: Option<PathBuf>,
}

impl<'r> ComponentLoader<'r> {
    /// Creates a loader backed by `registry`.
    #[must_use]
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self {
            registry,
            anchor: None,
        }
    }

    /// Sets the directory relative dependency paths are anchored at.
    #[must_use]
    pub fn anchor(mut self, anchor: Option<&Path>) -> Self {
        self.anchor = anchor.map(Path::to_path_buf);
        self
    }

    /// Extends `context` with the project's runtime dependencies, then binds
    /// and instantiates the component described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns a [`ComponentError`] if the dependency list is unavailable, a
    /// path is unusable, or any declared field fails to bind. No component is
    /// returned in that case.
    pub fn load(
        &self,
        spec: &ComponentSpec,
        context: ResolverContext,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<EngineBox, ComponentError> {
        let paths = runtime_dependency_paths(evaluator)?;
        let context = prepare(context, &paths, self.anchor.as_deref())?;
        debug!(
            "resolver context holds {} location(s), configuring `{}`",
            context.len(),
            spec.kind
        );
        self.registry.instantiate(spec, &context, evaluator)
    }
}
