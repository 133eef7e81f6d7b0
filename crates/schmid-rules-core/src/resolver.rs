//! Configuration file resolution with ordered fallback.
//!
//! Resolves the configuration file using a deterministic priority order:
//!
//! 1. The configured name itself, if it already names a regular file
//! 2. `{base}/src/main/config/{name}`
//! 3. `{test-resource}/{name}` for each declared test resource directory, in
//!    declared order
//! 4. Nothing matched → [`SchmidRulesError::ConfigurationNotFound`]
//!
//! Only existence, file type and readability are checked. The file is never
//! parsed here, and when several candidates hold a file the first one wins.

use crate::error::SchmidRulesError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name.
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "schmid-rules.xml";

/// Conventional configuration directory, relative to the project base directory.
pub const CONVENTIONAL_CONFIG_DIR: &str = "src/main/config";

/// Where the configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The configured name was itself a path to an existing file.
    Direct(PathBuf),
    /// Found inside one of the candidate directories.
    Candidate {
        /// Directory that held the file.
        directory: PathBuf,
        /// Full path to the file.
        path: PathBuf,
    },
}

impl ConfigSource {
    /// Returns the resolved file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Direct(p) | Self::Candidate { path: p, .. } => p,
        }
    }

    /// Returns `true` if the candidate search was bypassed.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }
}

/// Resolves `name` against `candidates`, relative to the process working directory.
///
/// See module-level docs for resolution order.
///
/// # Errors
///
/// Returns [`SchmidRulesError::ConfigurationNotFound`] if no candidate holds a
/// readable regular file, or [`SchmidRulesError::Io`] if the working directory
/// cannot be determined.
pub fn resolve(name: &str, candidates: &[PathBuf]) -> Result<ConfigSource, SchmidRulesError> {
    let working_dir = std::env::current_dir().map_err(|e| SchmidRulesError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    resolve_from(&working_dir, name, candidates)
}

/// Testable core: relative names and candidates are anchored at `working_dir`.
///
/// # Errors
///
/// Returns [`SchmidRulesError::ConfigurationNotFound`] if no candidate holds a
/// readable regular file.
pub fn resolve_from(
    working_dir: &Path,
    name: &str,
    candidates: &[PathBuf],
) -> Result<ConfigSource, SchmidRulesError> {
    // 1. Direct path override
    let direct = working_dir.join(name);
    if direct.is_file() {
        debug!("{name} used as direct path {}", direct.display());
        return Ok(ConfigSource::Direct(direct));
    }

    // 2. Candidate directories, strictly in order
    for candidate in candidates {
        let directory = working_dir.join(candidate);
        debug!("try to find configuration in {}", directory.display());

        let path = directory.join(name);
        if is_readable_file(&path) {
            debug!("{name} found in the directory {}", directory.display());
            return Ok(ConfigSource::Candidate { directory, path });
        }
        debug!("{name} not found");
    }

    Err(SchmidRulesError::ConfigurationNotFound {
        name: name.to_string(),
        candidates: candidates.to_vec(),
    })
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NAME: &str = "schmid-rules.xml";

    fn dir_with_config(root: &Path, sub: &str, content: &str) -> PathBuf {
        let dir = root.join(sub);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(NAME), content).unwrap();
        dir
    }

    #[test]
    fn first_candidate_with_file_wins() {
        let tmp = TempDir::new().unwrap();
        let a = dir_with_config(tmp.path(), "a", "<a/>");
        let b = dir_with_config(tmp.path(), "b", "<b/>");

        let result = resolve_from(tmp.path(), NAME, &[a.clone(), b]).unwrap();
        assert_eq!(result.path(), a.join(NAME));
        assert!(!result.is_direct());
    }

    #[test]
    fn reordering_candidates_changes_result() {
        let tmp = TempDir::new().unwrap();
        let a = dir_with_config(tmp.path(), "a", "<a/>");
        let b = dir_with_config(tmp.path(), "b", "<b/>");

        let result = resolve_from(tmp.path(), NAME, &[b.clone(), a]).unwrap();
        assert_eq!(result.path(), b.join(NAME));
    }

    #[test]
    fn missing_candidate_directory_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let present = dir_with_config(tmp.path(), "present", "");

        let result = resolve_from(
            tmp.path(),
            NAME,
            &[tmp.path().join("does-not-exist"), present.clone()],
        )
        .unwrap();
        assert_eq!(
            result,
            ConfigSource::Candidate {
                directory: present.clone(),
                path: present.join(NAME),
            }
        );
    }

    #[test]
    fn directory_named_like_config_is_not_a_match() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        fs::create_dir_all(a.join(NAME)).unwrap();
        let b = dir_with_config(tmp.path(), "b", "");

        let result = resolve_from(tmp.path(), NAME, &[a, b.clone()]).unwrap();
        assert_eq!(result.path(), b.join(NAME));
    }

    #[test]
    fn direct_path_bypasses_candidates() {
        let tmp = TempDir::new().unwrap();
        let here = tmp.path().join("here");
        fs::create_dir_all(&here).unwrap();
        fs::write(here.join("config.xml"), "").unwrap();
        let other = dir_with_config(tmp.path(), "other", "");

        let result = resolve_from(tmp.path(), "./here/config.xml", &[other]).unwrap();
        assert!(result.is_direct());
        assert_eq!(result.path(), tmp.path().join("here/config.xml"));
    }

    #[test]
    fn relative_candidates_are_anchored_at_working_dir() {
        let tmp = TempDir::new().unwrap();
        dir_with_config(tmp.path(), "src/main/config", "");

        let result =
            resolve_from(tmp.path(), NAME, &[PathBuf::from(CONVENTIONAL_CONFIG_DIR)]).unwrap();
        assert_eq!(
            result.path(),
            tmp.path().join(CONVENTIONAL_CONFIG_DIR).join(NAME)
        );
    }

    #[test]
    fn duplicate_candidates_are_probed_again() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();

        let err = resolve_from(tmp.path(), NAME, &[empty.clone(), empty.clone()]).unwrap_err();
        match err {
            SchmidRulesError::ConfigurationNotFound { candidates, .. } => {
                assert_eq!(candidates, vec![empty.clone(), empty]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nothing_found_reports_name_and_candidates() {
        let tmp = TempDir::new().unwrap();
        let candidates = vec![tmp.path().join("x"), tmp.path().join("y")];

        let err = resolve_from(tmp.path(), NAME, &candidates).unwrap_err();
        match err {
            SchmidRulesError::ConfigurationNotFound {
                name,
                candidates: tried,
            } => {
                assert_eq!(name, NAME);
                assert_eq!(tried, candidates);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_candidate_list_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            resolve_from(tmp.path(), NAME, &[]),
            Err(SchmidRulesError::ConfigurationNotFound { .. })
        ));
    }
}
