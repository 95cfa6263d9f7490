//! Shared helpers for rule implementations.

use api_lint_core::{locations, FileDescriptor, HttpRule, MethodDescriptor, Problem};

/// Packages whose files define the common protos and are never linted
/// for style.
const COMMON_PACKAGES: &[&str] = &[
    "google.api",
    "google.longrunning",
    "google.protobuf",
    "google.rpc",
    "google.type",
];

/// Full name of the long-running operation message.
pub const OPERATION: &str = "google.longrunning.Operation";

const STANDARD_VERBS: &[&str] = &[
    "Get",
    "List",
    "Create",
    "Update",
    "Delete",
    "BatchGet",
    "BatchCreate",
    "BatchUpdate",
    "BatchDelete",
];

/// Returns true for files in one of the common proto packages.
#[must_use]
pub fn is_common_proto(file: &FileDescriptor) -> bool {
    COMMON_PACKAGES.iter().any(|p| {
        file.package
            .strip_prefix(p)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    })
}

/// Returns the resource noun if `name` is `<verb><Noun>`, e.g.
/// `verb_noun("CreateBook", "Create") == Some("Book")`.
#[must_use]
pub fn verb_noun<'n>(name: &'n str, verb: &str) -> Option<&'n str> {
    name.strip_prefix(verb)
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

/// Returns the noun after a method's leading verb, e.g. `Book` for
/// `ArchiveBook`.
#[must_use]
pub fn method_noun(name: &str) -> Option<&str> {
    name.char_indices()
        .skip(1)
        .find(|(_, c)| c.is_ascii_uppercase())
        .map(|(i, _)| &name[i..])
}

/// Returns true for `Get<Resource>` methods.
#[must_use]
pub fn is_get_method(m: &MethodDescriptor) -> bool {
    verb_noun(&m.name, "Get").is_some()
}

/// Returns true for `Create<Resource>` methods.
#[must_use]
pub fn is_create_method(m: &MethodDescriptor) -> bool {
    verb_noun(&m.name, "Create").is_some()
}

/// Returns true for `Delete<Resource>` methods.
#[must_use]
pub fn is_delete_method(m: &MethodDescriptor) -> bool {
    verb_noun(&m.name, "Delete").is_some()
}

/// Returns true for methods that are not one of the standard methods.
#[must_use]
pub fn is_custom_method(m: &MethodDescriptor) -> bool {
    !STANDARD_VERBS
        .iter()
        .any(|verb| verb_noun(&m.name, verb).is_some())
}

/// Returns the variable names bound in a URI template, e.g. `name` for
/// `/v1/{name=publishers/*/books/*}`.
#[must_use]
pub fn http_uri_variables(path: &str) -> Vec<&str> {
    path.split('{')
        .skip(1)
        .filter_map(|segment| segment.split_once('}').map(|(var, _)| var))
        .map(|var| var.split_once('=').map_or(var, |(name, _)| name).trim())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Converts `PascalCase` (or `camelCase`) to `snake_case`.
///
/// Acronyms stay together: `HTTPRequest` becomes `http_request`.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Converts `PascalCase` to `UPPER_SNAKE_CASE`.
#[must_use]
pub fn to_upper_snake_case(s: &str) -> String {
    to_snake_case(s).to_ascii_uppercase()
}

/// Returns a problem if any HTTP binding's body differs from `want`.
///
/// `msg` completes "The `<method>` method should ... HTTP body.".
#[must_use]
pub fn lint_http_body<'a>(m: &'a MethodDescriptor, want: &str, msg: &str) -> Vec<Problem<'a>> {
    first_binding(m, |rule| rule.body != want)
        .map(|_| {
            Problem::new(
                format!("The `{}` method should {msg} HTTP body.", m.name),
                m,
            )
            .with_location(locations::method_http_rule(m))
        })
        .into_iter()
        .collect()
}

/// Returns a problem if any HTTP binding has a body.
#[must_use]
pub fn lint_no_http_body(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    lint_http_body(m, "", "not have an")
}

/// Returns a problem if any HTTP binding's body is not `*`.
#[must_use]
pub fn lint_wildcard_http_body(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    lint_http_body(m, "*", "use \"*\" as the")
}

/// Returns a problem if any HTTP binding does not use `verb`.
#[must_use]
pub fn lint_http_method<'a>(m: &'a MethodDescriptor, verb: &str) -> Vec<Problem<'a>> {
    first_binding(m, |rule| !rule.method.eq_ignore_ascii_case(verb))
        .map(|_| {
            Problem::new(
                format!("The `{}` method should use the HTTP {verb} verb.", m.name),
                m,
            )
            .with_location(locations::method_http_rule(m))
        })
        .into_iter()
        .collect()
}

/// Returns a problem if any HTTP binding's URI lacks the variable `var`.
#[must_use]
pub fn lint_http_uri_has_variable<'a>(m: &'a MethodDescriptor, var: &str) -> Vec<Problem<'a>> {
    first_binding(m, |rule| !http_uri_variables(&rule.path).contains(&var))
        .map(|_| {
            Problem::new(format!("HTTP URI should include a `{var}` variable."), m)
                .with_location(locations::method_http_rule(m))
        })
        .into_iter()
        .collect()
}

/// Returns a problem unless the request message is `<Method>Request`.
#[must_use]
pub fn lint_method_has_matching_request_name(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    let want = format!("{}Request", m.name);
    if m.input_name() == want {
        return vec![];
    }
    vec![Problem::new(
        format!("Request message should be named after the RPC, i.e. {want:?}."),
        m,
    )
    .with_suggestion(want)
    .with_location(locations::method_request_type(m))]
}

/// Returns a problem unless the response message is `<Method>Response`.
#[must_use]
pub fn lint_method_has_matching_response_name(m: &MethodDescriptor) -> Vec<Problem<'_>> {
    let want = format!("{}Response", m.name);
    if m.output_name() == want {
        return vec![];
    }
    vec![Problem::new(
        format!("Response message should be named after the RPC, i.e. {want:?}."),
        m,
    )
    .with_suggestion(want)
    .with_location(locations::method_response_type(m))]
}

fn first_binding(m: &MethodDescriptor, bad: impl Fn(&HttpRule) -> bool) -> Option<&HttpRule> {
    m.http_rules.iter().find(|rule| bad(*rule))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_noun() {
        assert_eq!(method_noun("ArchiveBook"), Some("Book"));
        assert_eq!(method_noun("SortShelfBooks"), Some("ShelfBooks"));
        assert_eq!(method_noun("Archive"), None);
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("BookState"), "book_state");
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_snake_case("Type2Format"), "type2_format");
        assert_eq!(to_snake_case("state"), "state");
        assert_eq!(to_upper_snake_case("IPAddressKind"), "IP_ADDRESS_KIND");
    }

    #[test]
    fn classifies_methods() {
        let named = |name: &str| MethodDescriptor {
            name: name.into(),
            ..MethodDescriptor::default()
        };
        assert!(is_get_method(&named("GetBook")));
        assert!(!is_get_method(&named("Getaway")));
        assert!(is_create_method(&named("CreateBook")));
        assert!(is_delete_method(&named("DeleteBook")));
        assert!(is_custom_method(&named("ArchiveBook")));
        assert!(!is_custom_method(&named("BatchGetBooks")));
        assert!(is_custom_method(&named("Getaway")));
    }

    #[test]
    fn extracts_uri_variables() {
        assert_eq!(
            http_uri_variables("/v1/{parent=publishers/*}/books/{book_id}"),
            vec!["parent", "book_id"]
        );
        assert!(http_uri_variables("/v1/books").is_empty());
    }

    #[test]
    fn common_protos() {
        let file = |package: &str| FileDescriptor {
            package: package.into(),
            ..FileDescriptor::default()
        };
        assert!(is_common_proto(&file("google.protobuf")));
        assert!(is_common_proto(&file("google.type")));
        assert!(!is_common_proto(&file("google.apis.library")));
        assert!(!is_common_proto(&file("example.v1")));
    }
}
