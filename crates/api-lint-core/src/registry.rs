//! The rule registry.

use crate::config::Config;
use crate::descriptor::DescriptorKind;
use crate::rule::{Rule, RuleBox};
use crate::rule_name::{RuleName, RuleNameError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::debug;

/// Errors raised while populating a [`Registry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A rule with the same name is already registered.
    #[error("duplicate rule name `{0}`")]
    DuplicateRuleName(RuleName),

    /// Registration was attempted after a run started.
    #[error("cannot register `{0}`: registry is frozen")]
    RegistryFrozen(RuleName),

    /// A rule provider built an invalid name.
    #[error(transparent)]
    InvalidName(#[from] RuleNameError),
}

/// Owns every registered rule, keyed and ordered by [`RuleName`].
///
/// Registration is the only mutation. The registry freezes when a
/// [`Linter`](crate::Linter) is built over it; later registrations fail with
/// [`RegistryError::RegistryFrozen`].
#[derive(Default)]
pub struct Registry {
    rules: BTreeMap<RuleName, RuleBox>,
    frozen: AtomicBool,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRuleName`] if the name is taken (the
    /// first registration is kept) or [`RegistryError::RegistryFrozen`] once
    /// a run has started.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> Result<(), RegistryError> {
        self.register_box(Box::new(rule))
    }

    /// Registers a boxed rule.
    ///
    /// # Errors
    ///
    /// See [`Registry::register`].
    pub fn register_box(&mut self, rule: RuleBox) -> Result<(), RegistryError> {
        let name = rule.name().clone();
        if self.is_frozen() {
            return Err(RegistryError::RegistryFrozen(name));
        }
        if self.rules.contains_key(&name) {
            return Err(RegistryError::DuplicateRuleName(name));
        }
        debug!("Registered rule: {}", name);
        self.rules.insert(name, rule);
        Ok(())
    }

    /// Looks up a rule by exact name.
    #[must_use]
    pub fn lookup(&self, name: &RuleName) -> Option<&dyn Rule> {
        self.rules.get(name).map(|rule| &**rule)
    }

    /// Rules bound to a declaration kind, ordered by name.
    pub fn rules_for_kind(&self, kind: DescriptorKind) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.iter().filter(move |r| r.kind() == kind)
    }

    /// Rules whose name starts with a namespace prefix (`core`, `core::0126`).
    pub fn rules_in_namespace<'r>(
        &'r self,
        prefix: &'r str,
    ) -> impl Iterator<Item = &'r dyn Rule> + 'r {
        self.iter().filter(move |r| r.name().matches_prefix(prefix))
    }

    /// Rules the config leaves enabled for a file path.
    pub fn enabled_rules<'r>(
        &'r self,
        config: &'r Config,
        path: &'r str,
    ) -> impl Iterator<Item = &'r dyn Rule> + 'r {
        self.iter()
            .filter(move |r| config.is_rule_enabled(r.name(), path))
    }

    /// All rules, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules.values().map(|rule| &**rule)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Forbids further registration.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Returns true once the registry is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{EnumValueRule, FieldRule, MessageRule};

    fn field_rule(number: u32, short: &'static str) -> FieldRule {
        FieldRule::new(RuleName::core(number, short).unwrap(), |_, _| vec![])
    }

    #[test]
    fn duplicate_name_keeps_first_registration() {
        let mut registry = Registry::new();
        registry
            .register(field_rule(25146, "object-values").with_description("first"))
            .unwrap();
        let err = registry
            .register(field_rule(25146, "object-values").with_description("second"))
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateRuleName(_)));
        assert_eq!(registry.len(), 1);
        let name = RuleName::core(25146, "object-values").unwrap();
        assert_eq!(registry.lookup(&name).unwrap().description(), "first");
    }

    #[test]
    fn frozen_registry_rejects_registration() {
        let mut registry = Registry::new();
        registry.register(field_rule(1, "a")).unwrap();
        registry.freeze();

        let err = registry.register(field_rule(2, "b")).unwrap_err();
        assert!(matches!(err, RegistryError::RegistryFrozen(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rules_for_kind_is_name_ordered() {
        let mut registry = Registry::new();
        registry.register(field_rule(140, "lower-snake")).unwrap();
        registry.register(field_rule(25146, "object-values")).unwrap();
        registry.register(field_rule(131, "zz")).unwrap();
        registry
            .register(MessageRule::new(RuleName::core(123, "x").unwrap(), |_, _| vec![]))
            .unwrap();

        let names: Vec<_> = registry
            .rules_for_kind(DescriptorKind::Field)
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "core::0131::zz",
                "core::0140::lower-snake",
                "core::25146::object-values"
            ]
        );
        assert_eq!(registry.rules_for_kind(DescriptorKind::Enum).count(), 0);
    }

    #[test]
    fn namespace_and_config_filters() {
        let mut registry = Registry::new();
        registry.register(field_rule(131, "a")).unwrap();
        registry.register(field_rule(131, "b")).unwrap();
        registry
            .register(EnumValueRule::new(
                RuleName::core(126, "unspecified").unwrap(),
                |_, _| vec![],
            ))
            .unwrap();

        assert_eq!(registry.rules_in_namespace("core::131").count(), 2);
        assert_eq!(registry.rules_in_namespace("core").count(), 3);

        let mut config = Config::new();
        config.disable_rule("core::0131::a");
        let enabled: Vec<_> = registry
            .enabled_rules(&config, "a.proto")
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(enabled, vec!["core::0126::unspecified", "core::0131::b"]);
    }
}
