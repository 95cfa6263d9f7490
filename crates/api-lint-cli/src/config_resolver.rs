//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file using a deterministic priority order:
//!
//! 1. `--config` flag or `$API_LINT_CONFIG` (explicit path)
//! 2. `api-lint.toml` or `.api-lint.toml` in the working directory or the
//!    nearest ancestor that has one
//! 3. `~/.api-lint/config.toml` (global fallback)
//! 4. No config found → defaults

use anyhow::{Context, Result};
use api_lint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found in the working directory or one of its ancestors.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.api-lint/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["api-lint.toml", ".api-lint.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let project = project_dir.ancestors().find_map(|dir| {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    });
    if let Some(candidate) = project {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

/// Returns the global config directory path.
///
/// Resolution: `$API_LINT_CONFIG_DIR` > `~/.api-lint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("API_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".api-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_is_trusted_as_is() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("api-lint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
        assert!(result.load().is_err());
    }

    #[test]
    fn project_config_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".api-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".api-lint.toml"))
        );

        fs::write(tmp.path().join("api-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("api-lint.toml"))
        );
    }

    #[test]
    fn project_config_found_in_ancestor() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("api-lint.toml"), "").unwrap();
        let nested = tmp.path().join("protos/google/example");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            resolve_inner(&nested, None, None),
            ConfigSource::Project(tmp.path().join("api-lint.toml"))
        );
    }

    #[test]
    fn global_used_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_dir = Some(global.path().to_path_buf());

        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("api-lint.toml"), "").unwrap();
        assert!(matches!(
            resolve_inner(project.path(), None, global_dir),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_parses_resolved_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api-lint.toml");
        fs::write(
            &path,
            "[linter]\nparallelism = 2\n\n[[configs]]\ndisabled_rules = [\"core::0126\"]\n",
        )
        .unwrap();

        let config = ConfigSource::Project(path).load().unwrap();
        assert_eq!(config.linter.parallelism, Some(2));
        assert_eq!(config.configs.len(), 1);
    }

    #[test]
    fn load_default_without_file() {
        let config = ConfigSource::Default.load().unwrap();
        assert!(config.configs.is_empty());
    }
}
