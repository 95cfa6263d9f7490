//! Helpers for pointing a [`Location`] at part of a declaration.
//!
//! Each helper prefers the precise span recorded by the parser and falls
//! back to the whole declaration when that span is missing, keeping the
//! requested precision level so consumers can still tell them apart.

use crate::descriptor::{Descriptor, FieldDescriptor, MethodDescriptor, Span};
use crate::types::{Location, LocationKind};

/// Name of the HTTP annotation option.
pub const HTTP_OPTION: &str = "google.api.http";

/// The whole declaration.
#[must_use]
pub fn descriptor<'a>(d: impl Into<Descriptor<'a>>) -> Location {
    let d = d.into();
    Location::new(LocationKind::Declaration, d.spans().declaration)
}

/// The declared name.
#[must_use]
pub fn descriptor_name<'a>(d: impl Into<Descriptor<'a>>) -> Location {
    let d = d.into();
    let spans = d.spans();
    Location::new(LocationKind::Name, pick(spans.name, spans.declaration))
}

/// The type of a field.
#[must_use]
pub fn field_type(f: &FieldDescriptor) -> Location {
    Location::new(LocationKind::Type, pick(f.spans.ty, f.spans.declaration))
}

/// The request type of a method.
#[must_use]
pub fn method_request_type(m: &MethodDescriptor) -> Location {
    Location::new(
        LocationKind::RequestType,
        pick(m.spans.input_type, m.spans.declaration),
    )
}

/// The response type of a method.
#[must_use]
pub fn method_response_type(m: &MethodDescriptor) -> Location {
    Location::new(
        LocationKind::ResponseType,
        pick(m.spans.output_type, m.spans.declaration),
    )
}

/// The `google.api.http` annotation of a method.
#[must_use]
pub fn method_http_rule(m: &MethodDescriptor) -> Location {
    option(m, HTTP_OPTION)
}

/// A named option annotation.
#[must_use]
pub fn option<'a>(d: impl Into<Descriptor<'a>>, name: &str) -> Location {
    let spans = d.into().spans();
    Location::new(
        LocationKind::Option(name.to_string()),
        pick(spans.options.get(name).copied(), spans.declaration),
    )
}

fn pick(precise: Option<Span>, fallback: Span) -> Span {
    precise.unwrap_or(fallback)
}
