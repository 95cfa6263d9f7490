//! [AIP-135](https://aip.dev/135): standard methods, Delete.
//!
//! # Detected Patterns
//!
//! - `DeleteBook` whose request is not `DeleteBookRequest`
//! - `DeleteBook` bound to an HTTP verb other than `DELETE`
//! - `DeleteBook` with an HTTP body

use crate::utils::{
    is_delete_method, lint_http_method, lint_method_has_matching_request_name, lint_no_http_body,
};
use api_lint_core::{MethodRule, Registry, RegistryError, RuleName};

const AIP: u32 = 135;

/// Registers the AIP-135 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        MethodRule::new(RuleName::core(AIP, "request-message-name")?, |m, _| {
            lint_method_has_matching_request_name(m)
        })
        .only_if(|m, _| is_delete_method(m))
        .with_description("Delete methods take a `Delete<Resource>Request`"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-method")?, |m, _| {
            lint_http_method(m, "DELETE")
        })
        .only_if(|m, _| is_delete_method(m))
        .with_description("Delete methods use the HTTP DELETE verb"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-body")?, |m, _| lint_no_http_body(m))
            .only_if(|m, _| is_delete_method(m))
            .with_description("Delete methods have no HTTP body"),
    )
}
