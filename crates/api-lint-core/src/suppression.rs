//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! (-- api-linter: core::0126::unspecified=disabled
//!     aip.dev/not-precedent: We need to do this because reasons. --)
//! ```
//!
//! A directive applies to the declaration whose comment carries it and to
//! everything nested inside that declaration. Any match on the declaration or
//! an ancestor suppresses; there is no re-enabling.

use crate::declaration::{Declaration, DeclarationTree};
use crate::rule_name::{normalize_path, RuleName, WILDCARD};

/// Tag that starts a directive.
pub const DIRECTIVE_TAG: &str = "api-linter:";

/// Tag that starts the required justification.
pub const JUSTIFICATION_TAG: &str = "aip.dev/not-precedent:";

/// Suffix every rule token must carry.
pub const DISABLED_SUFFIX: &str = "=disabled";

const OPEN_MARKER: &str = "(--";
const CLOSE_MARKER: &str = "--)";

/// What a directive token disables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionTarget {
    /// Every rule.
    All,
    /// A rule or group of rules, as normalized path segments.
    Prefix(Vec<String>),
}

impl SuppressionTarget {
    /// Returns true if this target covers `name`.
    #[must_use]
    pub fn matches(&self, name: &RuleName) -> bool {
        match self {
            Self::All => true,
            Self::Prefix(segments) => name.matches_prefix(&segments.join("::")),
        }
    }
}

/// A parsed, valid suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionDirective {
    /// Rule tokens as written, without the `=disabled` suffix.
    pub tokens: Vec<String>,
    /// What the tokens disable.
    pub targets: Vec<SuppressionTarget>,
    /// The not-precedent justification.
    pub justification: String,
}

impl SuppressionDirective {
    /// Returns true if this directive disables `name`.
    #[must_use]
    pub fn suppresses(&self, name: &RuleName) -> bool {
        self.targets.iter().any(|t| t.matches(name))
    }
}

/// Why a directive was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// No `aip.dev/not-precedent:` line with text in the comment.
    #[error("suppression directive `{directive}` is missing an `aip.dev/not-precedent:` justification")]
    MissingJustification {
        /// The directive line.
        directive: String,
    },

    /// The tag is present but names no rules.
    #[error("suppression directive `{directive}` does not name any rules")]
    Empty {
        /// The directive line.
        directive: String,
    },

    /// A token is not `<rule>=disabled`.
    #[error("invalid token `{token}` in suppression directive, expected `<rule>=disabled`")]
    InvalidToken {
        /// The offending token.
        token: String,
    },
}

/// Everything found in one comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    /// Valid directives, in order.
    pub directives: Vec<SuppressionDirective>,
    /// Rejected directives, one per occurrence.
    pub errors: Vec<DirectiveError>,
}

/// Parses every directive in a comment.
///
/// A comment may hold several `(-- ... --)` blocks; text outside them forms
/// its own block. Each line starting with [`DIRECTIVE_TAG`] (optionally after
/// `(--`) is one directive. A block's [`JUSTIFICATION_TAG`] text, which may
/// continue on following lines up to `--)`, justifies the directives in that
/// block only.
#[must_use]
pub fn parse_comment(text: &str) -> ParsedComment {
    let mut parsed = ParsedComment::default();
    for block in split_blocks(text) {
        parse_block(&block, &mut parsed);
    }
    parsed
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    let mut in_block = false;
    for line in text.lines() {
        let trimmed = line.trim();
        let opens = trimmed
            .strip_prefix("//")
            .unwrap_or(trimmed)
            .trim_start()
            .starts_with(OPEN_MARKER);
        if opens {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            in_block = true;
        }
        current.push(line);
        if in_block && trimmed.ends_with(CLOSE_MARKER) {
            blocks.push(std::mem::take(&mut current));
            in_block = false;
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_block(raw: &[&str], parsed: &mut ParsedComment) {
    let justification = find_justification(raw);
    for line in raw.iter().map(|l| clean_line(l)) {
        let Some(rest) = line.strip_prefix(DIRECTIVE_TAG) else {
            continue;
        };
        // A justification may share the directive's line.
        let body = rest.split(JUSTIFICATION_TAG).next().unwrap_or(rest);
        match parse_tokens(body) {
            Ok(_) if justification.is_none() => {
                parsed.errors.push(DirectiveError::MissingJustification {
                    directive: line.to_string(),
                });
            }
            Ok((tokens, targets)) if !targets.is_empty() => {
                parsed.directives.push(SuppressionDirective {
                    tokens,
                    targets,
                    justification: justification.clone().unwrap_or_default(),
                });
            }
            Ok(_) => parsed.errors.push(DirectiveError::Empty {
                directive: line.to_string(),
            }),
            Err(e) => parsed.errors.push(e),
        }
    }
}

fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("//").unwrap_or(line).trim_start();
    let line = line.strip_prefix(OPEN_MARKER).unwrap_or(line).trim();
    line.strip_suffix(CLOSE_MARKER).unwrap_or(line).trim_end()
}

fn find_justification(raw: &[&str]) -> Option<String> {
    let start = raw.iter().position(|l| l.contains(JUSTIFICATION_TAG))?;

    let mut parts = Vec::new();
    for (i, line) in raw[start..].iter().enumerate() {
        let cleaned = clean_line(line);
        let text = if i == 0 {
            cleaned
                .split_once(JUSTIFICATION_TAG)
                .map_or("", |(_, text)| text)
        } else if cleaned.starts_with(DIRECTIVE_TAG) {
            break;
        } else {
            cleaned
        };
        parts.push(text.trim());
        if line.trim_end().ends_with(CLOSE_MARKER) {
            break;
        }
    }

    let text = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn parse_tokens(body: &str) -> Result<(Vec<String>, Vec<SuppressionTarget>), DirectiveError> {
    let mut tokens = Vec::new();
    let mut targets = Vec::new();
    for raw in body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let invalid = || DirectiveError::InvalidToken {
            token: raw.to_string(),
        };
        let path = raw.strip_suffix(DISABLED_SUFFIX).ok_or_else(invalid)?;
        // A bare `=disabled` omits the path and means every rule.
        let target = if path == WILDCARD || path.is_empty() {
            SuppressionTarget::All
        } else {
            SuppressionTarget::Prefix(normalize_path(path).ok_or_else(invalid)?)
        };
        tokens.push(if path.is_empty() { WILDCARD } else { path }.to_string());
        targets.push(target);
    }
    Ok((tokens, targets))
}

/// Returns true if `name` is disabled for `decl` by a directive on the
/// declaration, any ancestor, or the file.
///
/// Comments are parsed on every call; [`SuppressionIndex`] caches them for a
/// whole run.
#[must_use]
pub fn is_suppressed(decl: Declaration<'_, '_>, name: &RuleName) -> bool {
    decl.scope_chain().any(|scope| {
        scope
            .comments()
            .iter()
            .any(|c| parse_comment(c).directives.iter().any(|d| d.suppresses(name)))
    })
}

/// A directive rejected while indexing, with the declaration carrying it.
#[derive(Debug, Clone)]
pub struct MalformedDirective {
    /// Pre-order index of the declaration whose comment has the directive.
    pub owner: usize,
    /// What was wrong with it.
    pub error: DirectiveError,
}

/// Where a suppression came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveRef {
    /// Pre-order index of the declaration carrying the directive.
    pub owner: usize,
    /// Position among that declaration's directives.
    pub index: usize,
}

/// Directives of every declaration in a tree, parsed once.
#[derive(Debug, Default)]
pub struct SuppressionIndex {
    directives: Vec<Vec<SuppressionDirective>>,
    malformed: Vec<MalformedDirective>,
}

impl SuppressionIndex {
    /// Parses the comments of every declaration in `tree`.
    #[must_use]
    pub fn build(tree: &DeclarationTree<'_>) -> Self {
        let mut index = Self::default();
        for decl in tree.iter() {
            let mut own = Vec::new();
            for comment in decl.comments() {
                let parsed = parse_comment(comment);
                own.extend(parsed.directives);
                index
                    .malformed
                    .extend(parsed.errors.into_iter().map(|error| MalformedDirective {
                        owner: decl.index(),
                        error,
                    }));
            }
            index.directives.push(own);
        }
        index
    }

    /// Directives carried by one declaration.
    #[must_use]
    pub fn directives_of(&self, owner: usize) -> &[SuppressionDirective] {
        self.directives
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Directives that were rejected, in tree order.
    #[must_use]
    pub fn malformed(&self) -> &[MalformedDirective] {
        &self.malformed
    }

    /// Finds the closest directive disabling `name` for `decl`.
    #[must_use]
    pub fn find(&self, decl: Declaration<'_, '_>, name: &RuleName) -> Option<DirectiveRef> {
        decl.scope_chain().find_map(|scope| {
            self.directives_of(scope.index())
                .iter()
                .position(|d| d.suppresses(name))
                .map(|index| DirectiveRef {
                    owner: scope.index(),
                    index,
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FileDescriptor, MessageDescriptor};

    fn unspecified() -> RuleName {
        RuleName::core(126, "unspecified").unwrap()
    }

    #[test]
    fn test_parse_directive_with_justification() {
        let parsed = parse_comment(
            "(-- api-linter: core::0126::unspecified=disabled\n    aip.dev/not-precedent: Legacy enum. --)",
        );
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.directives.len(), 1);
        let directive = &parsed.directives[0];
        assert_eq!(directive.tokens, vec!["core::0126::unspecified"]);
        assert_eq!(directive.justification, "Legacy enum.");
        assert!(directive.suppresses(&unspecified()));
    }

    #[test]
    fn test_parse_multiple_tokens() {
        let parsed = parse_comment(
            "(-- api-linter: core::0126::unspecified=disabled,core::0131=disabled\n    aip.dev/not-precedent: Reasons. --)",
        );
        let directive = &parsed.directives[0];
        assert_eq!(directive.tokens.len(), 2);
        assert!(directive.suppresses(&RuleName::core(131, "http-method").unwrap()));
        assert!(!directive.suppresses(&RuleName::core(133, "http-body").unwrap()));
    }

    #[test]
    fn test_namespace_and_wildcard_tokens() {
        let parsed = parse_comment(
            "(-- api-linter: core=disabled\n    aip.dev/not-precedent: Generated. --)",
        );
        assert!(parsed.directives[0].suppresses(&unspecified()));

        let parsed =
            parse_comment("(-- api-linter: all=disabled aip.dev/not-precedent: Vendored. --)");
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.directives[0].targets, vec![SuppressionTarget::All]);
        assert_eq!(parsed.directives[0].justification, "Vendored.");

        let parsed = parse_comment("(-- api-linter: =disabled aip.dev/not-precedent: Legacy. --)");
        assert_eq!(parsed.directives[0].targets, vec![SuppressionTarget::All]);
        assert_eq!(parsed.directives[0].tokens, vec![WILDCARD.to_string()]);
    }

    #[test]
    fn test_unpadded_number_normalized() {
        let parsed =
            parse_comment("api-linter: core::126::unspecified=disabled\naip.dev/not-precedent: x");
        assert!(parsed.directives[0].suppresses(&unspecified()));
    }

    #[test]
    fn test_multi_line_justification() {
        let parsed = parse_comment(
            "(-- api-linter: core::0126=disabled\n    aip.dev/not-precedent: This enum predates\n    the guidance. --)",
        );
        assert_eq!(
            parsed.directives[0].justification,
            "This enum predates the guidance."
        );
    }

    #[test]
    fn test_missing_justification_is_error() {
        let parsed = parse_comment("(-- api-linter: core::0126::unspecified=disabled --)");
        assert!(parsed.directives.is_empty());
        assert!(matches!(
            parsed.errors.as_slice(),
            [DirectiveError::MissingJustification { .. }]
        ));

        let parsed =
            parse_comment("api-linter: core::0126=disabled\naip.dev/not-precedent:   --)");
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_bad_tokens_are_errors() {
        let parsed = parse_comment(
            "api-linter: core::0126::unspecified=enabled\naip.dev/not-precedent: x",
        );
        assert_eq!(
            parsed.errors,
            vec![DirectiveError::InvalidToken {
                token: "core::0126::unspecified=enabled".into()
            }]
        );

        let parsed = parse_comment("api-linter: Core::X=disabled\naip.dev/not-precedent: x");
        assert!(matches!(
            parsed.errors.as_slice(),
            [DirectiveError::InvalidToken { .. }]
        ));

        let parsed = parse_comment("api-linter:\naip.dev/not-precedent: x");
        assert!(matches!(
            parsed.errors.as_slice(),
            [DirectiveError::Empty { .. }]
        ));
    }

    #[test]
    fn test_justification_does_not_cross_blocks() {
        let parsed = parse_comment(
            "(-- api-linter: core::0126=disabled --)\nSome prose.\n(-- api-linter: core::0131=disabled\n    aip.dev/not-precedent: Only for 131. --)",
        );
        assert_eq!(parsed.directives.len(), 1);
        assert_eq!(parsed.directives[0].tokens, vec!["core::0131".to_string()]);
        assert_eq!(parsed.directives[0].justification, "Only for 131.");
        assert!(matches!(
            parsed.errors.as_slice(),
            [DirectiveError::MissingJustification { directive }] if directive.contains("core::0126")
        ));
    }

    #[test]
    fn test_plain_comment_has_no_directives() {
        let parsed = parse_comment("A book in the library.\nMentions api-linter in prose.");
        assert_eq!(parsed, ParsedComment::default());
    }

    #[test]
    fn test_each_directive_line_reported() {
        let parsed = parse_comment("api-linter: core::0126=disabled\napi-linter: core::0131=disabled");
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn test_ancestor_directive_suppresses_descendants() {
        let file = FileDescriptor {
            path: "a.proto".into(),
            messages: vec![
                MessageDescriptor {
                    name: "Outer".into(),
                    comments: vec![
                        "(-- api-linter: core::0126=disabled\n    aip.dev/not-precedent: x --)"
                            .into(),
                    ],
                    messages: vec![MessageDescriptor {
                        name: "Inner".into(),
                        ..MessageDescriptor::default()
                    }],
                    ..MessageDescriptor::default()
                },
                MessageDescriptor {
                    name: "Sibling".into(),
                    ..MessageDescriptor::default()
                },
            ],
            ..FileDescriptor::default()
        };
        let tree = DeclarationTree::build(&file);
        let inner = tree.get(2).unwrap();
        let sibling = tree.get(3).unwrap();
        assert_eq!(inner.name(), "Inner");
        assert_eq!(sibling.name(), "Sibling");

        assert!(is_suppressed(inner, &unspecified()));
        assert!(!is_suppressed(sibling, &unspecified()));

        let index = SuppressionIndex::build(&tree);
        assert_eq!(
            index.find(inner, &unspecified()),
            Some(DirectiveRef { owner: 1, index: 0 })
        );
        assert_eq!(index.find(sibling, &unspecified()), None);
        assert!(index.malformed().is_empty());
    }
}
