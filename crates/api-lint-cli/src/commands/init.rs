//! Init command implementation.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "api-lint.toml";

const DEFAULT_CONFIG: &str = r#"# api-lint configuration

[linter]
# Worker threads for linting declarations (0 = all cores, 1 = sequential)
# parallelism = 0

# Rule configurations are applied in order; the last entry matching a
# file decides whether a rule runs on it.

# [[configs]]
# included_paths = ["google/example/**/*.proto"]
# excluded_paths = ["**/internal/**"]
# disabled_rules = ["core::0136"]

# [[configs]]
# included_paths = ["google/example/library/**"]
# enabled_rules = ["core::0136::http-body"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to enable or disable rules");
    println!("  2. Run: api-lint check <DESCRIPTOR.json>...");

    Ok(())
}

/// Writes the default config into `dir`, returning its path.
fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::debug!("Wrote {}", config_path.display());
    Ok(config_path)
}
