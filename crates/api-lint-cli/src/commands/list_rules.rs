//! List rules command implementation.

use anyhow::{Context, Result};
use api_lint_core::Registry;

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    let mut registry = Registry::new();
    api_lint_rules::register_all(&mut registry).context("Failed to register rules")?;

    println!("Available rules:\n");
    println!("{:<40} {:<12} Description", "Name", "Kind");
    println!("{}", "-".repeat(100));

    for rule in registry.iter() {
        println!(
            "{:<40} {:<12} {}",
            rule.name().to_string(),
            rule.kind().to_string(),
            rule.description()
        );
    }

    println!("\n{} rule(s) registered.", registry.len());

    println!("\nUse --disable-rule to turn off a rule or a whole group, e.g.:");
    println!("  api-lint check --disable-rule core::0126::unspecified library.json");
    println!("  api-lint check --disable-rule core::0131 library.json");
    println!("\nSuppress a rule on one declaration with a comment:");
    println!("  // (-- api-linter: core::0126::unspecified=disabled");
    println!("  //     aip.dev/not-precedent: <why this is an exception> --)");

    Ok(())
}
