//! Command-level error taxonomy.

use crate::engine::EngineError;
use crate::loader::ComponentError;
use miette::Diagnostic;
use std::path::PathBuf;

/// Errors that abort a command.
///
/// None of these are retried; each one terminates the current command with
/// a failing outcome.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum SchmidRulesError {
    /// No candidate location holds a readable configuration file.
    #[error("{name} not found in [{}]", format_candidates(.candidates))]
    #[diagnostic(
        code(schmid_rules::configuration_not_found),
        help(
            "place the file in src/main/config or a test resource directory, \
             or pass a direct path with --config"
        )
    )]
    ConfigurationNotFound {
        /// Configuration file name that was searched for.
        name: String,
        /// Every directory probed, in probe order.
        candidates: Vec<PathBuf>,
    },

    /// The pluggable component could not be prepared or configured.
    #[error(transparent)]
    #[diagnostic(transparent)]
    ComponentConfiguration(#[from] ComponentError),

    /// The external engine failed for a reason other than a violation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    ExternalEngine(#[from] EngineError),

    /// Creating or writing an output artifact failed.
    #[error("I/O failure on {}: {source}", .path.display())]
    #[diagnostic(code(schmid_rules::io))]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The engine returned a severity outside its contract.
    #[error("severity not implemented: {severity}")]
    #[diagnostic(
        code(schmid_rules::internal_consistency),
        help("the rule engine and this driver disagree on the severity set; upgrade one of them")
    )]
    InternalConsistency {
        /// The unrecognized severity value.
        severity: String,
    },

    /// Error-severity violations were found and the command is set to fail on them.
    #[error(
        "architecture rules violated: {errors} error(s), {warnings} warning(s) - \
         see log above for details"
    )]
    #[diagnostic(code(schmid_rules::rules_violated))]
    RulesViolated {
        /// Number of error-severity violations.
        errors: usize,
        /// Number of warn-severity violations.
        warnings: usize,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_lists_every_candidate() {
        let err = SchmidRulesError::ConfigurationNotFound {
            name: "schmid-rules.xml".to_string(),
            candidates: vec![
                PathBuf::from("src/main/config"),
                PathBuf::from("src/test/resources"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "schmid-rules.xml not found in [src/main/config, src/test/resources]"
        );
    }

    #[test]
    fn internal_consistency_names_the_severity() {
        let err = SchmidRulesError::InternalConsistency {
            severity: "FATAL".to_string(),
        };
        assert_eq!(err.to_string(), "severity not implemented: FATAL");
    }
}
