//! [AIP-133](https://aip.dev/133): standard methods, Create.
//!
//! # Detected Patterns
//!
//! - `CreateBook` whose request is not `CreateBookRequest`
//! - `CreateBook` bound to an HTTP verb other than `POST`
//! - `CreateBook` whose HTTP body is not the resource field (`book`)

use crate::utils::{
    is_create_method, lint_http_body, lint_http_method, lint_method_has_matching_request_name,
    to_snake_case, verb_noun,
};
use api_lint_core::{MethodDescriptor, MethodRule, Problem, Registry, RegistryError, RuleName};

const AIP: u32 = 133;

/// Registers the AIP-133 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        MethodRule::new(RuleName::core(AIP, "request-message-name")?, |m, _| {
            lint_method_has_matching_request_name(m)
        })
        .only_if(|m, _| is_create_method(m))
        .with_description("Create methods take a `Create<Resource>Request`"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-method")?, |m, _| {
            lint_http_method(m, "POST")
        })
        .only_if(|m, _| is_create_method(m))
        .with_description("Create methods use the HTTP POST verb"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-body")?, |m, _| lint_resource_body(m))
            .only_if(|m, _| is_create_method(m))
            .with_description("Create methods send the resource as the HTTP body"),
    )
}

fn lint_resource_body(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    let Some(resource) = verb_noun(&m.name, "Create") else {
        return vec![];
    };
    let field = to_snake_case(resource);
    lint_http_body(m, &field, &format!("use the resource field `{field}` as the"))
        .into_iter()
        .map(|p| p.with_suggestion(field.clone()))
        .collect()
}
