//! Core types for lint problems and results.

use crate::descriptor::{Descriptor, DescriptorKind, Span};
use crate::locations;
use crate::rule_name::RuleName;
use miette::Diagnostic;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Which part of a declaration a [`Location`] points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// The whole declaration.
    Declaration,
    /// Its name.
    Name,
    /// The type of a field.
    Type,
    /// The request type of a method.
    RequestType,
    /// The response type of a method.
    ResponseType,
    /// A named option annotation, e.g. `google.api.http`.
    Option(String),
}

/// The implicated part of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Precision level.
    pub kind: LocationKind,
    /// Resolved source range.
    pub span: Span,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(kind: LocationKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A lint problem found in a declaration.
///
/// Rules build problems with [`Problem::new`]; the engine stamps the rule
/// name afterwards, so `rule` is always set on problems returned from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem<'a> {
    /// Human-readable message.
    pub message: String,
    /// Suggested replacement text for the implicated span.
    pub suggestion: Option<String>,
    /// The offending declaration.
    pub descriptor: Descriptor<'a>,
    /// The implicated part of the declaration.
    pub location: Location,
    /// The rule that produced this problem.
    pub rule: Option<RuleName>,
}

impl<'a> Problem<'a> {
    /// Creates a problem located at the whole declaration.
    #[must_use]
    pub fn new(message: impl Into<String>, descriptor: impl Into<Descriptor<'a>>) -> Self {
        let descriptor = descriptor.into();
        Self {
            message: message.into(),
            suggestion: None,
            descriptor,
            location: locations::descriptor(descriptor),
            rule: None,
        }
    }

    /// Narrows the location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Adds a suggested replacement.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Tags the problem with the rule that produced it.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleName) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Textual rule id, or an empty string for untagged problems.
    #[must_use]
    pub fn rule_id(&self) -> String {
        self.rule.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// Formats the problem for terminal output.
    #[must_use]
    pub fn format(&self, file_path: &str) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} at {}:{}:{}\n",
            self.rule_id(),
            file_path,
            self.location.span.start_line,
            self.location.span.start_column,
        );
        let _ = writeln!(
            output,
            "  {} `{}`: {}",
            self.descriptor.kind(),
            self.descriptor.name(),
            self.message
        );
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: replace with `{suggestion}`");
        }
        if let Some(uri) = self.rule.as_ref().and_then(RuleName::doc_uri) {
            let _ = writeln!(output, "  = see: {uri}");
        }
        output
    }
}

impl fmt::Display for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.location.span.start_line,
            self.location.span.start_column,
            self.rule_id(),
            self.message
        )
    }
}

impl Serialize for Problem<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Problem", 6)?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("suggestion", &self.suggestion)?;
        s.serialize_field("rule_id", &self.rule)?;
        s.serialize_field("kind", &self.descriptor.kind())?;
        s.serialize_field("descriptor", self.descriptor.name())?;
        s.serialize_field("location", &self.location)?;
        s.end()
    }
}

/// Owned, renderable form of a [`Problem`] for miette reports.
#[derive(Debug, thiserror::Error)]
#[error("{kind} `{name}`: {message}")]
pub struct ProblemDiagnostic {
    message: String,
    kind: DescriptorKind,
    name: String,
    rule: String,
    help: Option<String>,
    url: Option<String>,
}

impl Diagnostic for ProblemDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        (!self.rule.is_empty()).then(|| Box::new(&self.rule) as Box<dyn fmt::Display + 'a>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn url<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.url.as_ref().map(|u| Box::new(u) as Box<dyn fmt::Display + 'a>)
    }
}

impl From<&Problem<'_>> for ProblemDiagnostic {
    fn from(p: &Problem<'_>) -> Self {
        Self {
            message: p.message.clone(),
            kind: p.descriptor.kind(),
            name: p.descriptor.name().to_string(),
            rule: p.rule_id(),
            help: p
                .suggestion
                .as_ref()
                .map(|s| format!("replace with `{s}`")),
            url: p.rule.as_ref().and_then(RuleName::doc_uri),
        }
    }
}

/// A suppression that prevented a rule from running on a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRecord<'a> {
    /// The rule that was skipped.
    pub rule: RuleName,
    /// The declaration it was skipped on.
    pub descriptor: Descriptor<'a>,
    /// The declaration whose comment carried the directive.
    pub directive_owner: Descriptor<'a>,
    /// Position of the directive among its owner's directives.
    pub directive_index: usize,
}

/// A valid suppression directive found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSite<'a> {
    /// The declaration whose comment carries the directive.
    pub owner: Descriptor<'a>,
    /// Position among the owner's directives.
    pub index: usize,
    /// The directive's rule tokens as written.
    pub targets: Vec<String>,
}

/// Lint results for one file.
#[derive(Debug, Clone, Serialize)]
pub struct LintResponse<'a> {
    /// Path of the linted file.
    pub file_path: &'a str,
    /// Problems in deterministic order.
    pub problems: Vec<Problem<'a>>,
    /// Suppressions exercised during the run.
    #[serde(skip)]
    pub suppressions: Vec<SuppressionRecord<'a>>,
    /// Every valid directive in the file.
    #[serde(skip)]
    pub directives: Vec<DirectiveSite<'a>>,
}

impl<'a> LintResponse<'a> {
    /// Directives that did not suppress anything during the run.
    #[must_use]
    pub fn unused_directives(&self) -> Vec<&DirectiveSite<'a>> {
        self.directives
            .iter()
            .filter(|site| {
                !self
                    .suppressions
                    .iter()
                    .any(|s| s.directive_owner.is_same(site.owner) && s.directive_index == site.index)
            })
            .collect()
    }

    /// Problems produced by a given rule.
    #[must_use]
    pub fn by_rule(&self, rule: &RuleName) -> Vec<&Problem<'a>> {
        self.problems
            .iter()
            .filter(|p| p.rule.as_ref() == Some(rule))
            .collect()
    }
}

/// Results of linting one or more files.
#[derive(Debug, Default, Serialize)]
pub struct LintResult<'a> {
    /// One response per file, in input order.
    pub responses: Vec<LintResponse<'a>>,
}

impl<'a> LintResult<'a> {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files checked.
    #[must_use]
    pub fn files_checked(&self) -> usize {
        self.responses.len()
    }

    /// Total number of problems.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.responses.iter().map(|r| r.problems.len()).sum()
    }

    /// Returns true if any file has problems.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.responses.iter().any(|r| !r.problems.is_empty())
    }

    /// Iterates `(file path, problem)` pairs.
    pub fn problems(&self) -> impl Iterator<Item = (&'a str, &Problem<'a>)> {
        self.responses
            .iter()
            .flat_map(|r| r.problems.iter().map(move |p| (r.file_path, p)))
    }

    /// Formats all problems as a report.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for (path, problem) in self.problems() {
            let _ = writeln!(report, "{}", problem.format(path));
        }
        let _ = writeln!(
            report,
            "Found {} problem(s) in {} file(s)",
            self.problem_count(),
            self.files_checked()
        );
        report
    }
}
