//! # api-lint-rules
//!
//! Built-in lint rules for api-lint, grouped by the AIP they enforce.
//!
//! ## Available Rules
//!
//! | Name | Description |
//! |------|-------------|
//! | `core::0126::unspecified` | First enum value is `<ENUM>_UNSPECIFIED` |
//! | `core::0131::http-body` | Get methods have no HTTP body |
//! | `core::0131::http-method` | Get methods use HTTP GET |
//! | `core::0131::http-uri-name` | Get URIs bind `name` |
//! | `core::0131::request-message-name` | Get methods take `Get<Resource>Request` |
//! | `core::0133::http-body` | Create methods send the resource field as body |
//! | `core::0133::http-method` | Create methods use HTTP POST |
//! | `core::0133::request-message-name` | Create methods take `Create<Resource>Request` |
//! | `core::0135::http-body` | Delete methods have no HTTP body |
//! | `core::0135::http-method` | Delete methods use HTTP DELETE |
//! | `core::0135::request-message-name` | Delete methods take `Delete<Resource>Request` |
//! | `core::0136::http-body` | POST custom methods use `*` as body |
//! | `core::0136::response-message-name` | Custom methods return `<Method>Response` |
//! | `core::25146::object-values` | Map values are not messages |
//!
//! ## Usage
//!
//! ```ignore
//! use api_lint_core::{Linter, Registry};
//!
//! let mut registry = Registry::new();
//! api_lint_rules::register_all(&mut registry)?;
//! let linter = Linter::builder(&registry).build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aip0126;
pub mod aip0131;
pub mod aip0133;
pub mod aip0135;
pub mod aip0136;
pub mod aip25146;

/// Shared helpers for rule implementations.
pub mod utils;

use api_lint_core::{Registry, RegistryError};
use tracing::debug;

/// Signature of a rule provider's `add_rules` function.
pub type AddRulesFn = fn(&mut Registry) -> Result<(), RegistryError>;

/// Every built-in rule provider.
pub const PROVIDERS: &[AddRulesFn] = &[
    aip0126::add_rules,
    aip0131::add_rules,
    aip0133::add_rules,
    aip0135::add_rules,
    aip0136::add_rules,
    aip25146::add_rules,
];

/// Registers every built-in rule.
///
/// # Errors
///
/// Returns an error if a built-in rule name is already registered or the
/// registry is frozen.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    for add_rules in PROVIDERS {
        add_rules(registry)?;
    }
    debug!("Registered {} built-in rules", registry.len());
    Ok(())
}

/// Re-export core types for convenience.
pub use api_lint_core::{Problem, Rule, RuleName};
