//! [AIP-131](https://aip.dev/131): standard methods, Get.
//!
//! # Detected Patterns
//!
//! - `GetBook` whose request is not `GetBookRequest`
//! - `GetBook` bound to an HTTP verb other than `GET`
//! - `GetBook` with an HTTP body
//! - `GetBook` whose URI has no `name` variable
//!
//! # Good Patterns
//!
//! ```proto
//! rpc GetBook(GetBookRequest) returns (Book) {
//!   option (google.api.http) = {
//!     get: "/v1/{name=publishers/*/books/*}"
//!   };
//! }
//! ```

use crate::utils::{
    is_get_method, lint_http_method, lint_http_uri_has_variable,
    lint_method_has_matching_request_name, lint_no_http_body,
};
use api_lint_core::{MethodRule, Registry, RegistryError, RuleName};

const AIP: u32 = 131;

/// Registers the AIP-131 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        MethodRule::new(RuleName::core(AIP, "request-message-name")?, |m, _| {
            lint_method_has_matching_request_name(m)
        })
        .only_if(|m, _| is_get_method(m))
        .with_description("Get methods take a `Get<Resource>Request`"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-method")?, |m, _| {
            lint_http_method(m, "GET")
        })
        .only_if(|m, _| is_get_method(m))
        .with_description("Get methods use the HTTP GET verb"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-body")?, |m, _| lint_no_http_body(m))
            .only_if(|m, _| is_get_method(m))
            .with_description("Get methods have no HTTP body"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-uri-name")?, |m, _| {
            lint_http_uri_has_variable(m, "name")
        })
        .only_if(|m, _| is_get_method(m))
        .with_description("Get methods bind the `name` variable in the HTTP URI"),
    )
}
