//! [AIP-126](https://aip.dev/126): enumerations.
//!
//! # Rationale
//!
//! The zero value of an enum is what readers see when a field is unset, so
//! it must not carry meaning. It is named after the enum with an
//! `_UNSPECIFIED` suffix.
//!
//! # Detected Patterns
//!
//! - A first value (number 0) not named `<ENUM_NAME>_UNSPECIFIED`
//!
//! # Good Patterns
//!
//! ```proto
//! enum BookFormat {
//!   BOOK_FORMAT_UNSPECIFIED = 0;
//!   HARDCOVER = 1;
//! }
//! ```

use crate::utils::to_upper_snake_case;
use api_lint_core::{
    locations, Declaration, EnumValueDescriptor, EnumValueRule, Problem, Registry,
    RegistryError, RuleName,
};

const AIP: u32 = 126;

/// Registers the AIP-126 rules.
///
/// # Errors
///
/// Returns an error if a rule is already registered or the registry is frozen.
pub fn add_rules(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        EnumValueRule::new(RuleName::core(AIP, "unspecified")?, lint_unspecified)
            .only_if(|v, _| is_first_enum_value(v))
            .with_description("The first enum value should be `<ENUM>_UNSPECIFIED`"),
    )
}

// proto3 requires the first value to be 0.
fn is_first_enum_value(v: &EnumValueDescriptor) -> bool {
    v.number == 0
}

fn lint_unspecified<'a>(
    v: &'a EnumValueDescriptor,
    decl: Declaration<'a, '_>,
) -> Vec<Problem<'a>> {
    let Some(parent) = decl.parent() else {
        return vec![];
    };
    let want = format!("{}_UNSPECIFIED", to_upper_snake_case(parent.name()));
    if v.name == want {
        return vec![];
    }
    vec![
        Problem::new(format!("The first enum value should be {want:?}"), v)
            .with_suggestion(want)
            .with_location(locations::descriptor_name(v)),
    ]
}
