//! Check command implementation.

use anyhow::{Context, Result};
use api_lint_core::{FileDescriptor, Linter, Registry, RuleName, WILDCARD};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// A descriptor input: one file, or a set of files.
#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorInput {
    One(FileDescriptor),
    Set(Vec<FileDescriptor>),
}

/// Runs the check command. Returns true if any problem was found.
pub fn run(
    paths: &[PathBuf],
    format: OutputFormat,
    disable_rules: &[String],
    jobs: Option<usize>,
    source: &ConfigSource,
) -> Result<bool> {
    let mut config = source.load()?;

    let mut registry = Registry::new();
    api_lint_rules::register_all(&mut registry).context("Failed to register rules")?;

    for rule in disable_rules {
        if rule != WILDCARD && registry.rules_in_namespace(rule).next().is_none() {
            tracing::warn!("Unknown rule: {}", rule);
        }
        config.disable_rule(rule.clone());
    }

    let files = load_descriptors(paths)?;

    let mut builder = Linter::builder(&registry).config(config);
    if let Some(jobs) = jobs {
        builder = builder.parallelism(jobs);
    }
    let linter = builder.build().context("Failed to build linter")?;

    let result = linter.lint_files(&files);

    for response in &result.responses {
        for site in response.unused_directives() {
            tracing::warn!(
                "{}: unused suppression of {} on {} `{}`",
                response.file_path,
                site.targets.join(", "),
                site.owner.kind(),
                site.owner.name()
            );
        }
    }

    super::output::print(&result, format)?;

    let engine_problems = result
        .problems()
        .filter(|(_, p)| p.rule.as_ref().is_some_and(RuleName::is_engine))
        .count();
    if engine_problems > 0 {
        tracing::warn!("{} problem(s) were raised by the linter itself", engine_problems);
    }

    Ok(result.has_problems())
}

/// Reads descriptor files, flattening descriptor sets, in argument order.
fn load_descriptors(paths: &[PathBuf]) -> Result<Vec<FileDescriptor>> {
    let mut files = Vec::new();
    for path in paths {
        match read_descriptor(path)? {
            DescriptorInput::One(file) => files.push(file),
            DescriptorInput::Set(set) => files.extend(set),
        }
    }
    Ok(files)
}

fn read_descriptor(path: &Path) -> Result<DescriptorInput> {
    tracing::debug!("Loading descriptor: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse descriptor {}", path.display()))
}
