//! Rule traits for defining lint rules.

use crate::declaration::Declaration;
use crate::descriptor::{
    DescriptorKind, DescriptorNode, EnumDescriptor, EnumValueDescriptor, FieldDescriptor,
    FileDescriptor, MessageDescriptor, MethodDescriptor, ServiceDescriptor,
};
use crate::rule_name::RuleName;
use crate::types::Problem;
use std::fmt;

/// A lint rule bound to one declaration kind.
///
/// Most rules are built with [`KindRule`] and its aliases ([`FieldRule`],
/// [`EnumValueRule`], ...). Implement this trait directly only when a rule
/// needs behavior those cannot express.
///
/// The engine calls [`Rule::applies_to`] first and [`Rule::lint`] only when
/// it returns true, and only for declarations of [`Rule::kind`].
pub trait Rule: Send + Sync {
    /// Returns the unique name of this rule.
    fn name(&self) -> &RuleName;

    /// Returns the declaration kind this rule checks.
    fn kind(&self) -> DescriptorKind;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &str {
        ""
    }

    /// Applicability guard. Defaults to always true.
    fn applies_to(&self, decl: Declaration<'_, '_>) -> bool {
        let _ = decl;
        true
    }

    /// Checks one declaration and returns any problems found.
    fn lint<'a>(&self, decl: Declaration<'a, '_>) -> Vec<Problem<'a>>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Applicability guard of a [`KindRule`].
pub type OnlyIfFn<D> = for<'a, 't> fn(&'a D, Declaration<'a, 't>) -> bool;

/// Check function of a [`KindRule`].
pub type LintFn<D> = for<'a, 't> fn(&'a D, Declaration<'a, 't>) -> Vec<Problem<'a>>;

/// A rule over one descriptor type, built from plain functions.
///
/// Check functions are `fn` pointers, so rules cannot carry state between
/// invocations.
///
/// ```ignore
/// use api_lint_core::{locations, FieldRule, Problem, RuleName};
///
/// let rule = FieldRule::new(RuleName::core(25146, "object-values")?, |f, _| {
///     match f.map_value_type().and_then(|t| t.message_type()) {
///         Some(_) => vec![Problem::new("Avoid using objects as map values.", f)
///             .with_location(locations::field_type(f))],
///         None => vec![],
///     }
/// })
/// .only_if(|f, _| f.map_value_type().is_some());
/// ```
pub struct KindRule<D: DescriptorNode> {
    name: RuleName,
    description: &'static str,
    only_if: Option<OnlyIfFn<D>>,
    lint: LintFn<D>,
}

impl<D: DescriptorNode> KindRule<D> {
    /// Creates a rule with the given check function.
    #[must_use]
    pub fn new(name: RuleName, lint: LintFn<D>) -> Self {
        Self {
            name,
            description: "",
            only_if: None,
            lint,
        }
    }

    /// Sets the applicability guard.
    #[must_use]
    pub fn only_if(mut self, only_if: OnlyIfFn<D>) -> Self {
        self.only_if = Some(only_if);
        self
    }

    /// Sets the description shown by `list-rules`.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

impl<D: DescriptorNode> Rule for KindRule<D> {
    fn name(&self) -> &RuleName {
        &self.name
    }

    fn kind(&self) -> DescriptorKind {
        D::KIND
    }

    fn description(&self) -> &str {
        self.description
    }

    fn applies_to(&self, decl: Declaration<'_, '_>) -> bool {
        D::downcast(decl.descriptor())
            .is_some_and(|d| self.only_if.map_or(true, |only_if| only_if(d, decl)))
    }

    fn lint<'a>(&self, decl: Declaration<'a, '_>) -> Vec<Problem<'a>> {
        D::downcast(decl.descriptor()).map_or_else(Vec::new, |d| (self.lint)(d, decl))
    }
}

impl<D: DescriptorNode> fmt::Debug for KindRule<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRule")
            .field("name", &self.name)
            .field("kind", &D::KIND)
            .finish_non_exhaustive()
    }
}

/// A rule over files.
pub type FileRule = KindRule<FileDescriptor>;
/// A rule over messages.
pub type MessageRule = KindRule<MessageDescriptor>;
/// A rule over fields.
pub type FieldRule = KindRule<FieldDescriptor>;
/// A rule over enums.
pub type EnumRule = KindRule<EnumDescriptor>;
/// A rule over enum values.
pub type EnumValueRule = KindRule<EnumValueDescriptor>;
/// A rule over services.
pub type ServiceRule = KindRule<ServiceDescriptor>;
/// A rule over methods.
pub type MethodRule = KindRule<MethodDescriptor>;
