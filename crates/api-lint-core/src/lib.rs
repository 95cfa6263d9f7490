//! # api-lint-core
//!
//! Core framework for linting API schema descriptors.
//!
//! This crate provides the foundational types for building API linters.
//! It includes:
//!
//! - [`FileDescriptor`] and friends, the schema tree being linted
//! - [`Rule`] and [`KindRule`] for rules bound to one declaration kind
//! - [`Registry`] for owning rules under unique [`RuleName`]s
//! - [`suppression`] for in-source `api-linter:` directives
//! - [`Linter`] for orchestrating lint execution
//! - [`Problem`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use api_lint_core::{Linter, Registry};
//!
//! let mut registry = Registry::new();
//! api_lint_rules::register_all(&mut registry)?;
//!
//! let linter = Linter::builder(&registry).parallelism(4).build()?;
//! let result = linter.lint_files(&files);
//! print!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod declaration;
mod descriptor;
mod engine;
mod registry;
mod rule;
mod rule_name;
mod types;

/// Helpers for building problem locations.
pub mod locations;
/// Suppression directive parsing and lookup.
pub mod suppression;

pub use config::{Config, ConfigError, LinterConfig, RuleConfig};
pub use declaration::{Declaration, DeclarationTree};
pub use descriptor::{
    Descriptor, DescriptorKind, DescriptorNode, EnumDescriptor, EnumValueDescriptor,
    FieldDescriptor, FieldType, FileDescriptor, HttpRule, Label, MessageDescriptor,
    MethodDescriptor, ScalarType, ServiceDescriptor, SourceSpans, Span,
};
pub use engine::{run, LintError, Linter, LinterBuilder};
pub use registry::{Registry, RegistryError};
pub use rule::{
    EnumRule, EnumValueRule, FieldRule, FileRule, KindRule, LintFn, MessageRule, MethodRule,
    OnlyIfFn, Rule, RuleBox, ServiceRule,
};
pub use rule_name::{RuleName, RuleNameError, CORE_NAMESPACE, ENGINE_NAMESPACE, WILDCARD};
pub use types::{
    DirectiveSite, LintResponse, LintResult, Location, LocationKind, Problem, ProblemDiagnostic,
    SuppressionRecord,
};
