//! [AIP-146](https://aip.dev/146) (`core::25146`): generic fields.
//!
//! # Rationale
//!
//! Maps whose values are messages tend to grow into untyped object bags.
//! Prefer a repeated message field, or a map with scalar values.
//!
//! # Detected Patterns
//!
//! - `map<K, V>` fields where `V` is a message
//!
//! Files in the common proto packages (`google.protobuf`, ...) are exempt.

use crate::utils::is_common_proto;
use api_lint_core::{
    locations, FieldDescriptor, FieldRule, FieldType, Problem, Registry, RegistryError, RuleName,
};

const AIP: u32 = 25146;

/// Registers the AIP-146 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        FieldRule::new(RuleName::core(AIP, "object-values")?, |f, _| {
            lint_object_values(f)
        })
        .only_if(|f, decl| !is_common_proto(decl.file()) && f.map_value_type().is_some())
        .with_description("Map fields should not use messages as values"),
    )
}

fn lint_object_values(f: &FieldDescriptor) -> Vec<Problem<'_>> {
    match f.map_value_type().and_then(FieldType::message_type) {
        Some(_) => vec![Problem::new("Avoid using objects as map values.", f)
            .with_location(locations::field_type(f))],
        None => vec![],
    }
}
