//! Hierarchical rule names (`core::0126::unspecified`).

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between the segments of a rule name.
pub const SEPARATOR: &str = "::";

/// Namespace of the rules shipped with the linter.
pub const CORE_NAMESPACE: &str = "core";

/// Namespace reserved for diagnostics raised by the engine itself.
pub const ENGINE_NAMESPACE: &str = "lint";

/// Token that matches every rule in suppression directives and config.
pub const WILDCARD: &str = "all";

/// Errors building or parsing a [`RuleName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleNameError {
    /// The namespace is empty or has characters outside `[a-z0-9-]`.
    #[error("invalid rule namespace `{0}`")]
    InvalidNamespace(String),

    /// The namespace is reserved.
    #[error("rule namespace `{0}` is reserved")]
    ReservedNamespace(String),

    /// The short name is not kebab-case.
    #[error("rule short name `{0}` must be kebab-case")]
    InvalidShortName(String),

    /// The textual form does not have three segments or the number is bad.
    #[error("malformed rule name `{0}`, expected `<namespace>::<number>::<name>`")]
    Malformed(String),
}

/// The stable identity of a rule.
///
/// Ordered by namespace, then number, then short name; this order drives
/// registry iteration and therefore output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleName {
    namespace: String,
    number: u32,
    short_name: String,
}

impl RuleName {
    /// Creates a validated rule name.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace or short name is invalid or the
    /// namespace is reserved.
    pub fn new(namespace: &str, number: u32, short_name: &str) -> Result<Self, RuleNameError> {
        if !is_segment(namespace) {
            return Err(RuleNameError::InvalidNamespace(namespace.to_string()));
        }
        if namespace == ENGINE_NAMESPACE || namespace == WILDCARD {
            return Err(RuleNameError::ReservedNamespace(namespace.to_string()));
        }
        if !is_segment(short_name) || short_name.starts_with('-') || short_name.ends_with('-') {
            return Err(RuleNameError::InvalidShortName(short_name.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            number,
            short_name: short_name.to_string(),
        })
    }

    /// Creates a name in the `core` namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the short name is not kebab-case.
    pub fn core(number: u32, short_name: &str) -> Result<Self, RuleNameError> {
        Self::new(CORE_NAMESPACE, number, short_name)
    }

    /// Name used for problems raised when a rule panics.
    #[must_use]
    pub fn internal_rule_error() -> Self {
        Self::engine("internal-rule-error")
    }

    /// Name used for problems raised for unusable suppression directives.
    #[must_use]
    pub fn malformed_suppression_directive() -> Self {
        Self::engine("malformed-suppression-directive")
    }

    fn engine(short_name: &str) -> Self {
        Self {
            namespace: ENGINE_NAMESPACE.to_string(),
            number: 0,
            short_name: short_name.to_string(),
        }
    }

    /// The namespace segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The numeric segment.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The short-name segment.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Whether this name was minted by the engine rather than a rule provider.
    #[must_use]
    pub fn is_engine(&self) -> bool {
        self.namespace == ENGINE_NAMESPACE
    }

    /// Documentation link for core rules.
    #[must_use]
    pub fn doc_uri(&self) -> Option<String> {
        (self.namespace == CORE_NAMESPACE)
            .then(|| format!("https://linter.aip.dev/{}/{}", self.number, self.short_name))
    }

    /// Returns true if `prefix` names this rule or one of its enclosing groups.
    ///
    /// `prefix` is matched segment-wise, so `core::01` does not match
    /// `core::0126::unspecified`. Numeric segments are compared by value
    /// (`core::126` matches `core::0126::unspecified`), and [`WILDCARD`]
    /// matches everything.
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        if prefix == WILDCARD {
            return true;
        }
        let Some(wanted) = normalize_path(prefix) else {
            return false;
        };
        let own = [
            self.namespace.clone(),
            format!("{:04}", self.number),
            self.short_name.clone(),
        ];
        wanted.len() <= own.len() && wanted.iter().zip(&own).all(|(w, o)| w == o)
    }
}

/// Normalizes a rule path (`core::126`) into comparable segments
/// (`["core", "0126"]`). Returns `None` for syntactically invalid paths.
#[must_use]
pub fn normalize_path(path: &str) -> Option<Vec<String>> {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    if segments.len() > 3 || !segments.iter().all(|s| is_segment(s)) {
        return None;
    }
    Some(
        segments
            .iter()
            .enumerate()
            .map(|(i, s)| match s.parse::<u32>() {
                Ok(n) if i == 1 => format!("{n:04}"),
                _ => (*s).to_string(),
            })
            .collect(),
    )
}

fn is_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{:04}{SEPARATOR}{}",
            self.namespace, self.number, self.short_name
        )
    }
}

impl FromStr for RuleName {
    type Err = RuleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(number), Some(short_name), None) => {
                let number = number
                    .parse::<u32>()
                    .map_err(|_| RuleNameError::Malformed(s.to_string()))?;
                Self::new(namespace, number, short_name)
            }
            _ => Err(RuleNameError::Malformed(s.to_string())),
        }
    }
}

impl Serialize for RuleName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
