//! Traversal and dispatch: runs registered rules over a descriptor tree.

use crate::config::Config;
use crate::declaration::{Declaration, DeclarationTree};
use crate::descriptor::FileDescriptor;
use crate::registry::Registry;
use crate::rule::Rule;
use crate::rule_name::RuleName;
use crate::suppression::SuppressionIndex;
use crate::types::{DirectiveSite, LintResponse, LintResult, Problem, SuppressionRecord};

use rayon::prelude::*;
use std::any::Any;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur while setting up a [`Linter`].
#[derive(Debug, Error)]
pub enum LintError {
    /// The worker pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring a [`Linter`].
pub struct LinterBuilder<'r> {
    registry: &'r Registry,
    config: Option<Config>,
    parallelism: Option<usize>,
}

impl<'r> LinterBuilder<'r> {
    /// Creates a new builder over a registry.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: None,
            parallelism: None,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the number of worker threads, overriding the config
    /// (0 = all cores, 1 = sequential).
    #[must_use]
    pub fn parallelism(mut self, jobs: usize) -> Self {
        self.parallelism = Some(jobs);
        self
    }

    /// Builds the linter and freezes the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a dedicated thread pool cannot be created.
    pub fn build(self) -> Result<Linter<'r>, LintError> {
        let config = self.config.unwrap_or_default();
        let dispatch = match self.parallelism.or(config.linter.parallelism) {
            Some(1) => Dispatch::Sequential,
            None | Some(0) => Dispatch::Shared,
            Some(jobs) => Dispatch::Pool(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()?,
            ),
        };

        self.registry.freeze();
        Ok(Linter {
            registry: self.registry,
            config,
            dispatch,
        })
    }
}

enum Dispatch {
    Sequential,
    Shared,
    Pool(rayon::ThreadPool),
}

/// Runs the rules of a frozen [`Registry`] over descriptor files.
///
/// Use [`Linter::builder()`] to construct an instance.
pub struct Linter<'r> {
    registry: &'r Registry,
    config: Config,
    dispatch: Dispatch,
}

impl<'r> Linter<'r> {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder(registry: &'r Registry) -> LinterBuilder<'r> {
        LinterBuilder::new(registry)
    }

    /// Creates a linter with default configuration on the shared rayon pool.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        registry.freeze();
        Self {
            registry,
            config: Config::default(),
            dispatch: Dispatch::Shared,
        }
    }

    /// Returns the registry this linter runs.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lints files in input order.
    #[must_use]
    pub fn lint_files<'a>(&self, files: &'a [FileDescriptor]) -> LintResult<'a> {
        info!(
            "Linting {} file(s) with {} rule(s)",
            files.len(),
            self.registry.len()
        );

        let result = LintResult {
            responses: files.iter().map(|file| self.lint_file(file)).collect(),
        };

        info!(
            "Lint complete: {} problem(s) in {} file(s)",
            result.problem_count(),
            result.files_checked()
        );
        result
    }

    /// Lints one file.
    ///
    /// Problems are ordered by declaration position, then pre-order index,
    /// then rule name. Problems one rule reports on one declaration keep the
    /// order the rule emitted them in.
    #[must_use]
    pub fn lint_file<'a>(&self, file: &'a FileDescriptor) -> LintResponse<'a> {
        debug!("Linting: {}", file.path);

        let tree = DeclarationTree::build(file);
        let suppressions = SuppressionIndex::build(&tree);
        let enabled: BTreeSet<&RuleName> = self
            .registry
            .enabled_rules(&self.config, &file.path)
            .map(|rule| rule.name())
            .collect();
        let run = FileRun {
            tree: &tree,
            suppressions: &suppressions,
            registry: self.registry,
            enabled: &enabled,
        };

        let outcomes: Vec<Outcome<'a>> = match &self.dispatch {
            Dispatch::Sequential => (0..tree.len()).map(|i| run.visit(i)).collect(),
            Dispatch::Shared => (0..tree.len()).into_par_iter().map(|i| run.visit(i)).collect(),
            Dispatch::Pool(pool) => {
                pool.install(|| (0..tree.len()).into_par_iter().map(|i| run.visit(i)).collect())
            }
        };

        let mut tagged = Vec::new();
        let mut records = Vec::new();
        for outcome in outcomes {
            let position = (outcome.position, outcome.index);
            tagged.extend(outcome.problems.into_iter().map(|p| (position, p)));
            records.extend(outcome.suppressions);
        }
        tagged.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.rule.cmp(&b.rule)));

        let directives = tree
            .iter()
            .flat_map(|decl| {
                suppressions
                    .directives_of(decl.index())
                    .iter()
                    .enumerate()
                    .map(move |(index, d)| DirectiveSite {
                        owner: decl.descriptor(),
                        index,
                        targets: d.tokens.clone(),
                    })
            })
            .collect();

        LintResponse {
            file_path: &file.path,
            problems: tagged.into_iter().map(|(_, p)| p).collect(),
            suppressions: records,
            directives,
        }
    }
}

impl std::fmt::Debug for Linter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linter")
            .field("registry", self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Runs every registered rule over one file with default settings.
#[must_use]
pub fn run<'a>(file: &'a FileDescriptor, registry: &Registry) -> Vec<Problem<'a>> {
    Linter::new(registry).lint_file(file).problems
}

#[derive(Default)]
struct Outcome<'a> {
    index: usize,
    position: (u32, u32),
    problems: Vec<Problem<'a>>,
    suppressions: Vec<SuppressionRecord<'a>>,
}

struct FileRun<'a, 't> {
    tree: &'t DeclarationTree<'a>,
    suppressions: &'t SuppressionIndex,
    registry: &'t Registry,
    enabled: &'t BTreeSet<&'t RuleName>,
}

impl<'a> FileRun<'a, '_> {
    fn visit(&self, index: usize) -> Outcome<'a> {
        let Some(decl) = self.tree.get(index) else {
            return Outcome::default();
        };
        let span = decl.span();
        let mut outcome = Outcome {
            index,
            position: (span.start_line, span.start_column),
            ..Outcome::default()
        };

        for malformed in self.suppressions.malformed().iter().filter(|m| m.owner == index) {
            warn!(
                "Malformed suppression directive on {} `{}`: {}",
                decl.kind(),
                decl.full_name(),
                malformed.error
            );
            outcome.problems.push(
                Problem::new(malformed.error.to_string(), decl.descriptor())
                    .with_rule(RuleName::malformed_suppression_directive()),
            );
        }

        let rules = self
            .registry
            .rules_for_kind(decl.kind())
            .filter(|r| self.enabled.contains(r.name()));
        for rule in rules {
            match isolate(|| rule.applies_to(decl)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(message) => {
                    outcome.problems.push(internal_error(rule, decl, &message));
                    continue;
                }
            }

            if let Some(found) = self.suppressions.find(decl, rule.name()) {
                debug!("Suppressed {} on `{}`", rule.name(), decl.full_name());
                if let Some(owner) = self.tree.get(found.owner) {
                    outcome.suppressions.push(SuppressionRecord {
                        rule: rule.name().clone(),
                        descriptor: decl.descriptor(),
                        directive_owner: owner.descriptor(),
                        directive_index: found.index,
                    });
                }
                continue;
            }

            match isolate(|| rule.lint(decl)) {
                Ok(problems) => outcome.problems.extend(
                    problems
                        .into_iter()
                        .map(|p| p.with_rule(rule.name().clone())),
                ),
                Err(message) => outcome.problems.push(internal_error(rule, decl, &message)),
            }
        }

        outcome
    }
}

thread_local! {
    static ISOLATED: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the panic hook so panics caught by [`isolate`] are only reported
/// through the internal-error problem and its log line.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !ISOLATED.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn isolate<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    install_quiet_hook();
    let was_isolated = ISOLATED.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    ISOLATED.with(|flag| flag.set(was_isolated));
    result.map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn internal_error<'a>(rule: &dyn Rule, decl: Declaration<'a, '_>, message: &str) -> Problem<'a> {
    error!(
        "Rule {} panicked on `{}`: {}",
        rule.name(),
        decl.full_name(),
        message
    );
    Problem::new(
        format!("rule `{}` failed: {message}", rule.name()),
        decl.descriptor(),
    )
    .with_rule(RuleName::internal_rule_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        DescriptorKind, EnumDescriptor, EnumValueDescriptor, SourceSpans, Span,
    };
    use crate::rule::{EnumRule, EnumValueRule};

    fn value(name: &str, number: i32, line: u32) -> EnumValueDescriptor {
        EnumValueDescriptor {
            name: name.into(),
            number,
            spans: SourceSpans::at(Span::line(line, 3, 20)),
            ..EnumValueDescriptor::default()
        }
    }

    fn file() -> FileDescriptor {
        FileDescriptor {
            path: "states.proto".into(),
            package: "example.v1".into(),
            enums: vec![EnumDescriptor {
                name: "State".into(),
                values: vec![value("ACTIVE", 1, 5), value("STATE_UNSPECIFIED", 0, 4)],
                spans: SourceSpans::at(Span::line(3, 1, 30)),
                ..EnumDescriptor::default()
            }],
            ..FileDescriptor::default()
        }
    }

    fn every_value() -> EnumValueRule {
        EnumValueRule::new(RuleName::core(1, "every-value").unwrap(), |v, _| {
            vec![Problem::new(v.name.clone(), v)]
        })
    }

    #[test]
    fn test_builder() {
        let registry = Registry::new();
        let linter = Linter::builder(&registry)
            .parallelism(2)
            .build()
            .expect("Failed to build linter");

        assert!(linter.registry().is_frozen());
        assert!(linter.config().configs.is_empty());
    }

    #[test]
    fn sorts_by_source_position() {
        let mut registry = Registry::new();
        registry.register(every_value()).unwrap();
        let file = file();

        let messages: Vec<_> = run(&file, &registry)
            .into_iter()
            .map(|p| p.message)
            .collect();
        assert_eq!(messages, vec!["STATE_UNSPECIFIED", "ACTIVE"]);
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let mut registry = Registry::new();
        registry.register(every_value()).unwrap();
        let file = file();

        let sequential = Linter::builder(&registry).parallelism(1).build().unwrap();
        let parallel = Linter::builder(&registry).parallelism(4).build().unwrap();
        assert_eq!(
            sequential.lint_file(&file).problems,
            parallel.lint_file(&file).problems
        );
    }

    #[test]
    fn panicking_rule_becomes_internal_error() {
        let mut registry = Registry::new();
        registry
            .register(EnumRule::new(RuleName::core(2, "boom").unwrap(), |_, _| {
                panic!("exploded")
            }))
            .unwrap();
        registry.register(every_value()).unwrap();
        let file = file();

        let problems = run(&file, &registry);
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0].rule, Some(RuleName::internal_rule_error()));
        assert!(problems[0].message.contains("core::0002::boom"));
        assert!(problems[0].message.contains("exploded"));
    }

    #[test]
    fn isolate_restores_panic_reporting() {
        let caught = isolate(|| -> u8 { panic!("quiet") });
        assert_eq!(caught, Err("quiet".to_string()));
        assert!(!ISOLATED.with(Cell::get));

        let nested = isolate(|| isolate(|| -> u8 { panic!("inner") }));
        assert_eq!(nested, Ok(Err("inner".to_string())));
        assert!(!ISOLATED.with(Cell::get));
    }

    #[test]
    fn dispatch_only_reaches_rules_of_the_declaration_kind() {
        let mut registry = Registry::new();
        registry.register(every_value()).unwrap();
        registry
            .register(EnumRule::new(RuleName::core(3, "enum-name").unwrap(), |e, _| {
                vec![Problem::new(e.name.clone(), e)]
            }))
            .unwrap();
        let file = file();

        let problems = run(&file, &registry);
        let kinds: Vec<_> = problems.iter().map(|p| p.descriptor.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                DescriptorKind::Enum,
                DescriptorKind::EnumValue,
                DescriptorKind::EnumValue
            ]
        );
    }

    #[test]
    fn config_disables_rules_per_path() {
        let mut registry = Registry::new();
        registry.register(every_value()).unwrap();
        let mut config = Config::new();
        config.disable_rule("core::0001");
        let linter = Linter::builder(&registry).config(config).build().unwrap();

        assert!(linter.lint_file(&file()).problems.is_empty());
    }
}
