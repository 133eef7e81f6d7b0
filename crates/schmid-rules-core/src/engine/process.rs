//! Rule engine backed by an external checker executable.
//!
//! Protocol:
//!
//! ```text
//! <executable> <args..> check --config <file> --base-dir <dir> [--base-dir <dir>..]
//!   stdout: JSON array of {"severity": "...", "description": "..."}
//!
//! <executable> <args..> create-xmi --config <file> --identifier <id>
//!   stdout: XMI document bytes
//! ```
//!
//! A non-zero exit status means the engine rejected its input; stderr is
//! carried into the error.

use super::{EngineError, RuleEngine, XmiWriter};
use crate::binder::{bind, ComponentConfig, FieldKind, FieldSpec};
use crate::loader::{ComponentError, ExpressionEvaluator, ResolverContext};
use crate::types::Violation;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

/// Configuration of the `process` component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessEngineConfig {
    /// Resolved checker executable.
    pub executable: PathBuf,
    /// Arguments placed before the subcommand.
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Working directory of the checker process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl ComponentConfig for ProcessEngineConfig {
    const COMPONENT: &'static str = ProcessEngine::KIND;

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::required("executable", FieldKind::Executable),
            FieldSpec::optional("args", FieldKind::StringList),
            FieldSpec::optional("env", FieldKind::StringTable),
            FieldSpec::optional("working-dir", FieldKind::Path),
        ];
        FIELDS
    }
}

/// Runs the checker as a child process per call.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: ProcessEngineConfig,
}

impl ProcessEngine {
    /// Registry kind.
    pub const KIND: &'static str = "process";

    /// Creates an engine from an already bound configuration.
    #[must_use]
    pub fn new(config: ProcessEngineConfig) -> Self {
        Self { config }
    }

    /// Binds the declared fields and creates the engine.
    ///
    /// # Errors
    ///
    /// Returns a [`ComponentError`] if any field fails to bind.
    pub fn configure(
        fields: &toml::Table,
        context: &ResolverContext,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<Self, ComponentError> {
        let config: ProcessEngineConfig = bind(fields, context, evaluator)?;
        debug!("process engine uses {}", config.executable.display());
        Ok(Self::new(config))
    }

    /// Returns the bound configuration.
    #[must_use]
    pub fn config(&self) -> &ProcessEngineConfig {
        &self.config
    }

    fn command(&self, subcommand: &str, config: &Path) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .args(&self.config.args)
            .arg(subcommand)
            .arg("--config")
            .arg(config)
            .envs(&self.config.env);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            executable: self.config.executable.clone(),
            source,
        }
    }
}

fn failed(status: ExitStatus, stderr: &[u8]) -> EngineError {
    EngineError::Failed {
        status: status.to_string(),
        message: String::from_utf8_lossy(stderr).trim().to_string(),
    }
}

impl RuleEngine for ProcessEngine {
    fn check(&self, config: &Path, base_dirs: &[PathBuf]) -> Result<Vec<Violation>, EngineError> {
        let mut command = self.command("check", config);
        for dir in base_dirs {
            command.arg("--base-dir").arg(dir);
        }
        debug!("running {command:?}");

        let output = command.output().map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(failed(output.status, &output.stderr));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| EngineError::Protocol(e.to_string()))
    }
}

impl XmiWriter for ProcessEngine {
    fn create_xmi(
        &self,
        config: &Path,
        identifier: &str,
        out: &mut dyn Write,
    ) -> Result<(), EngineError> {
        let mut command = self.command("create-xmi", config);
        command
            .arg("--identifier")
            .arg(identifier)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            // stderr goes straight to the terminal so it cannot block the stdout copy
            .stderr(Stdio::inherit());
        debug!("running {command:?}");

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let copied = match child.stdout.take() {
            Some(mut stdout) => std::io::copy(&mut stdout, out),
            None => Ok(0),
        };

        if let Err(e) = copied {
            // best effort, the copy error is what gets reported
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Io(e));
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(failed(status, b"see engine output above"));
        }
        out.flush()?;
        Ok(())
    }
}
