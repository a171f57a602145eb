//! Rule-set engine: parsing and ordered application of rewrite rules.

use crate::config::RewriteRule;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// Error returned when a raw setting value is not a JSON rule array.
#[derive(Debug, thiserror::Error)]
pub enum ConfigParseError {
    #[error("invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One rule compiled for application.
#[derive(Debug)]
struct CompiledRule {
    /// `None` when the pattern failed to compile; the rule is inert and
    /// skipped at apply time.
    regex: Option<Regex>,
    replacement: String,
    /// Whether the `g` flag was present (replace all vs first match only).
    global: bool,
    /// Original pattern, kept for logging.
    pattern: String,
}

/// The ordered set of currently active rewrite rules.
///
/// A `RuleSet` is immutable once built. Configuration reloads construct a
/// fresh set and swap it in wholesale, so concurrent readers never observe a
/// partially updated list.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// The empty rule set; [`apply`](Self::apply) is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of rule objects into a new rule set.
    ///
    /// Only JSON validity is enforced here. Patterns that fail to compile
    /// are kept as inert entries rather than failing the whole load, so one
    /// bad rule never takes down the rest of the list.
    pub fn parse(raw: &str) -> Result<Self, ConfigParseError> {
        let specs: Vec<RewriteRule> = serde_json::from_str(raw)?;
        Ok(Self::from_rules(&specs))
    }

    /// Build a rule set from already-parsed rules.
    pub fn from_rules(specs: &[RewriteRule]) -> Self {
        Self {
            rules: specs.iter().map(compile_rule).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule in listed order over `text`, each operating on the
    /// output of the previous one, and return the transformed text.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            let Some(regex) = &rule.regex else {
                debug!(pattern = %rule.pattern, "skipping rule with invalid pattern");
                continue;
            };
            out = if rule.global {
                regex.replace_all(&out, rule.replacement.as_str()).into_owned()
            } else {
                regex.replace(&out, rule.replacement.as_str()).into_owned()
            };
        }
        out
    }
}

/// Compile a single rule, mapping its JS-style flag letters onto the regex
/// builder. Unknown flag letters are ignored.
fn compile_rule(spec: &RewriteRule) -> CompiledRule {
    let mut builder = RegexBuilder::new(&spec.pattern);
    let mut global = false;
    for flag in spec.flags.chars() {
        match flag {
            'g' => global = true,
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            _ => {}
        }
    }

    let regex = match builder.build() {
        Ok(regex) => Some(regex),
        Err(error) => {
            warn!(
                pattern = %spec.pattern,
                %error,
                "rule pattern failed to compile, rule will be skipped"
            );
            None
        }
    };

    CompiledRule {
        regex,
        replacement: spec.replacement.clone(),
        global,
        pattern: spec.pattern.clone(),
    }
}
