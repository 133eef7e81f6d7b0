//! Capability contracts for the external rule engine.
//!
//! The engine itself is not implemented here. [`RuleEngine`] and
//! [`XmiWriter`] describe what the orchestrators need from it; concrete
//! variants are registered in a [`ComponentRegistry`] at startup.

use crate::types::Violation;
use miette::Diagnostic;
use std::io::Write;
use std::path::{Path, PathBuf};

mod process;
mod registry;

pub use process::{ProcessEngine, ProcessEngineConfig};
pub use registry::{ComponentRegistry, EngineFactory};

/// Evaluates architecture rules.
pub trait RuleEngine {
    /// Checks `base_dirs` against the rules in `config` and returns every
    /// finding, in engine order.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot run or rejects its configuration.
    /// Findings are never reported as errors.
    fn check(&self, config: &Path, base_dirs: &[PathBuf]) -> Result<Vec<Violation>, EngineError>;
}

/// Exports the rule model as an XMI interchange document.
pub trait XmiWriter {
    /// Streams the XMI document for `config` into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails or `out` cannot be written.
    fn create_xmi(
        &self,
        config: &Path,
        identifier: &str,
        out: &mut dyn Write,
    ) -> Result<(), EngineError>;
}

/// A component offering both capabilities.
pub trait Engine: RuleEngine + XmiWriter {}

impl<T: RuleEngine + XmiWriter + ?Sized> Engine for T {}

/// Type alias for boxed [`Engine`] trait objects.
pub type EngineBox = Box<dyn Engine>;

/// Engine-side failures, distinct from rule violations.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum EngineError {
    /// The engine could not be started.
    #[error("failed to launch `{}`: {source}", .executable.display())]
    #[diagnostic(code(schmid_rules::engine::spawn))]
    Spawn {
        /// Executable that failed to start.
        executable: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The engine ran but reported a failure, typically a configuration problem.
    #[error("Configuration Exception ({status}): {message}")]
    #[diagnostic(code(schmid_rules::engine::failed))]
    Failed {
        /// Exit status description.
        status: String,
        /// Engine-provided detail.
        message: String,
    },

    /// The engine's output does not follow the protocol.
    #[error("engine produced unreadable output: {0}")]
    #[diagnostic(code(schmid_rules::engine::protocol))]
    Protocol(String),

    /// Reading engine output or writing the destination failed.
    #[error("engine I/O failure: {0}")]
    #[diagnostic(code(schmid_rules::engine::io))]
    Io(#[from] std::io::Error),
}
