//! [AIP-136](https://aip.dev/136): custom methods.
//!
//! # Detected Patterns
//!
//! - `ArchiveBook` returning something other than `ArchiveBookResponse`,
//!   the resource (`Book`), or a long-running operation
//! - A custom method bound only to `POST` whose HTTP body is not `*`

use crate::utils::{
    is_custom_method, lint_method_has_matching_response_name, lint_wildcard_http_body,
    method_noun, OPERATION,
};
use api_lint_core::{MethodDescriptor, MethodRule, Problem, Registry, RegistryError, RuleName};

const AIP: u32 = 136;

/// Registers the AIP-136 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        MethodRule::new(RuleName::core(AIP, "response-message-name")?, |m, _| {
            lint_response_name(m)
        })
        .only_if(|m, _| is_custom_method(m))
        .with_description("Custom methods return `<Method>Response` or the resource"),
    )?;
    registry.register(
        MethodRule::new(RuleName::core(AIP, "http-body")?, |m, _| {
            lint_wildcard_http_body(m)
        })
        .only_if(|m, _| is_custom_method(m) && is_post_only(m))
        .with_description("POST custom methods use `*` as the HTTP body"),
    )
}

fn is_post_only(m: &MethodDescriptor) -> bool {
    !m.http_rules.is_empty()
        && m.http_rules
            .iter()
            .all(|rule| rule.method.eq_ignore_ascii_case("POST"))
}

fn lint_response_name(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    // `ArchiveBook` may return the `Book` it acted on.
    if m.output_type == OPERATION || method_noun(&m.name) == Some(m.output_name()) {
        return vec![];
    }
    lint_method_has_matching_response_name(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, http, method, service_file};

    #[test]
    fn accepts_response_resource_and_operation() {
        let file = service_file(vec![
            method("ArchiveBook", "ArchiveBookRequest", "ArchiveBookResponse", vec![]),
            method("PublishBook", "PublishBookRequest", "Book", vec![]),
            method("ImportBooks", "ImportBooksRequest", OPERATION, vec![]),
        ]);
        assert!(check(&file, add_rules).is_empty());
    }

    #[test]
    fn detects_response_name() {
        let file = service_file(vec![method(
            "ArchiveBook",
            "ArchiveBookRequest",
            "ArchiveResult",
            vec![],
        )]);
        let problems = check(&file, add_rules);

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].rule_id(), "core::0136::response-message-name");
        assert_eq!(problems[0].suggestion.as_deref(), Some("ArchiveBookResponse"));
    }

    #[test]
    fn resource_must_be_the_whole_noun() {
        let file = service_file(vec![
            method("ArchiveBook", "ArchiveBookRequest", "k", vec![]),
            method("ArchiveBook", "ArchiveBookRequest", "ook", vec![]),
            method("SortShelfBooks", "SortShelfBooksRequest", "Books", vec![]),
        ]);
        let problems = check(&file, add_rules);

        assert_eq!(problems.len(), 3);
        assert!(problems
            .iter()
            .all(|p| p.rule_id() == "core::0136::response-message-name"));
    }

    #[test]
    fn post_custom_methods_use_wildcard_body() {
        let file = service_file(vec![
            method(
                "ArchiveBook",
                "ArchiveBookRequest",
                "ArchiveBookResponse",
                vec![http("POST", "/v1/{name=books/*}:archive", "")],
            ),
            method(
                "CheckBook",
                "CheckBookRequest",
                "CheckBookResponse",
                vec![http("GET", "/v1/{name=books/*}:check", "")],
            ),
        ]);
        let problems = check(&file, add_rules);

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].rule_id(), "core::0136::http-body");
        assert_eq!(problems[0].descriptor.name(), "ArchiveBook");
    }

    #[test]
    fn standard_methods_are_not_custom() {
        let file = service_file(vec![method("GetBook", "GetBookRequest", "Shelf", vec![])]);
        assert!(check(&file, add_rules).is_empty());
    }
}
