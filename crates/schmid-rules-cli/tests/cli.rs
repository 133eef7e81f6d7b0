//! End-to-end tests: run the `schmid-rules` binary against temporary projects.
//!
//! The checker is a shell script driven through the built-in `process`
//! engine (`/bin/sh <script> <subcommand> ...`).

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CHECKER: &str = r#"
case "$1" in
  check)
    printf '%s' '[{"severity":"WARN","description":"cycle"},'
    printf '%s' '{"severity":"ERROR","description":"web uses persistence"}]'
    ;;
  create-xmi)
    printf '<xmi id="%s"/>' "$5"
    ;;
  *)
    echo "unknown subcommand $1" >&2
    exit 2
    ;;
esac
"#;

struct Project {
    tmp: TempDir,
}

impl Project {
    /// Project with a checker script, a rule configuration file and a
    /// descriptor. `extra` is appended to the descriptor's top-level keys.
    fn new(extra: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::write(root.join("checker.sh"), CHECKER).unwrap();
        fs::create_dir_all(root.join("src/main/config")).unwrap();
        fs::write(root.join("src/main/config/schmid-rules.xml"), "<rules/>").unwrap();

        let descriptor = format!(
            r#"identifier = "shop"
runtime-dependencies = []
{extra}

[engine]
kind = "process"
executable = "/bin/sh"
args = ["{}"]
"#,
            root.join("checker.sh").display()
        );
        fs::write(root.join("schmid-project.toml"), descriptor).unwrap();
        Self { tmp }
    }

    fn root(&self) -> &Path {
        self.tmp.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        run_in(self.root(), args)
    }
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_schmid-rules"))
        .args(args)
        .current_dir(dir)
        .env_remove("SCHMID_RULES_PROJECT")
        .env_remove("SCHMID_RULES_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn assert_fails_on_error_and_prints_json_report() {
    let project = Project::new("");
    let output = project.run(&["assert", "--format", "json"]);

    assert!(!output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "errors": ["web uses persistence"],
            "warnings": ["cycle"],
        })
    );
    assert!(stderr(&output).contains("architecture rules violated: 1 error(s), 1 warning(s)"));
}

#[test]
fn assert_logs_resolved_configuration_and_violations() {
    let project = Project::new("");
    let output = project.run(&["assert", "--fail-on-error", "false"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let log = stderr(&output);
    assert!(log.contains("src/main/config/schmid-rules.xml"));
    assert!(stdout(&output).contains("Found 1 error(s), 1 warning(s)"));

    let lines: Vec<&str> = log.lines().collect();
    let line_of = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no log line with {needle:?} in:\n{log}"))
    };
    let warning = line_of("cycle");
    let error = line_of("web uses persistence");

    // one line per violation, at its own level, in engine order
    assert!(lines[warning].contains("WARN"), "{}", lines[warning]);
    assert!(lines[error].contains("ERROR"), "{}", lines[error]);
    assert!(warning < error);
}

#[test]
fn assert_skips_non_root_unit_without_resolving_configuration() {
    let project = Project::new("execution-root = false");
    fs::remove_file(project.root().join("src/main/config/schmid-rules.xml")).unwrap();

    let output = project.run(&["assert"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Project is not execution root. Skipping."));
    assert!(stdout(&output).is_empty());
}

#[test]
fn assert_reports_missing_configuration() {
    let project = Project::new("");
    let output = project.run(&["assert", "--config", "other-rules.xml"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("other-rules.xml not found in"));
}

#[test]
fn assert_reports_unresolved_dependencies() {
    let project = Project::new("");
    let descriptor = fs::read_to_string(project.root().join("schmid-project.toml"))
        .unwrap()
        .replace("runtime-dependencies = []\n", "");
    fs::write(project.root().join("other-project.toml"), descriptor).unwrap();

    let output = project.run(&["--project", "other-project.toml", "assert"]);
    assert!(!output.status.success());
    assert!(stderr(&output)
        .contains("there was a problem evaluating: ${project.runtime-dependencies}"));
}

#[test]
fn explicit_skip_succeeds_without_descriptor() {
    let tmp = TempDir::new().unwrap();
    let output = run_in(tmp.path(), &["assert", "--skip"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Skipping as requested."));
}

#[test]
fn export_writes_into_build_directory() {
    let project = Project::new("");
    let output = project.run(&["export"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = project.root().join("target/shop.xml");
    assert_eq!(fs::read_to_string(&written).unwrap(), r#"<xmi id="shop"/>"#);

    let log = stderr(&output);
    assert!(log.contains("created."));
    assert!(log.contains("Created XMI file"));
}

#[test]
fn create_xmi_alias_honours_output_options() {
    let project = Project::new("");
    let output = project.run(&[
        "create-xmi",
        "--output",
        "model.xmi",
        "--output-dir",
        "out/xmi",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let written = project.root().join("out/xmi/model.xmi");
    assert!(written.is_file());
    assert!(stdout(&output).contains("model.xmi"));
}
