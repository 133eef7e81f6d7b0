//! Core types for rule-check findings.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Severity of a violation reported by the rule engine.
///
/// The engine is external, so its severity strings are not trusted to fall
/// within the known set. Only the exact values `ERROR` and `WARN` are known;
/// anything else, including other spellings, is kept verbatim as
/// [`Severity::Unrecognized`] and rejected during classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Build-breaking finding.
    Error,
    /// Advisory finding, never fails the build.
    Warn,
    /// A severity value outside the engine contract.
    Unrecognized(String),
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => "ERROR".to_string(),
            Severity::Warn => "WARN".to_string(),
            Severity::Unrecognized(value) => value,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warn => write!(f, "WARN"),
            Self::Unrecognized(value) => write!(f, "{value}"),
        }
    }
}

/// A single finding produced by the rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Severity as reported by the engine.
    pub severity: Severity,
    /// Human-readable description.
    pub description: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(severity: impl Into<Severity>, description: impl Into<String>) -> Self {
        Self {
            severity: severity.into(),
            description: description.into(),
        }
    }

    /// Creates an error-severity violation.
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(Severity::Error, description)
    }

    /// Creates a warn-severity violation.
    #[must_use]
    pub fn warn(description: impl Into<String>) -> Self {
        Self::new(Severity::Warn, description)
    }

    /// Emits one log line at the level matching the severity.
    pub fn log(&self) {
        match &self.severity {
            Severity::Error => error!("{}", self.description),
            Severity::Warn => warn!("{}", self.description),
            Severity::Unrecognized(severity) => error!("[{severity}] {}", self.description),
        }
    }
}

/// Violations partitioned by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    /// Descriptions of error-severity violations, in engine order.
    pub errors: Vec<String>,
    /// Descriptions of warn-severity violations, in engine order.
    pub warnings: Vec<String>,
}

impl ViolationReport {
    /// Returns true if at least one error-severity violation was found.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if no violation of any severity was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// One-line count summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Found {} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )
    }
}
