//! Configuration types for the rewrite plugin.

use serde::{Deserialize, Serialize};

/// Flags applied when a rule does not specify any: global + case-insensitive.
pub const DEFAULT_FLAGS: &str = "gi";

/// The rule list shipped as the setting's package value.
pub const DEFAULT_RULES_JSON: &str = r#"[
  {
    "regex": "rocketchat",
    "flags": "gi",
    "replacement": "Rocket.Chat"
  }
]"#;

/// A single substitution rule as persisted in the host setting.
///
/// The wire field names mirror the setting's JSON schema (`regex`, `flags`,
/// `replacement`). Every field is optional; any JSON object parses as a rule
/// with the missing fields defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteRule {
    /// The pattern to match.
    #[serde(rename = "regex")]
    pub pattern: String,
    /// JS-style flag letters: `g` (replace all occurrences), `i`, `m`, `s`,
    /// `x`. Unknown letters are ignored.
    pub flags: String,
    /// Replacement template; `$1` and `${name}` expand to capture groups.
    pub replacement: String,
}

impl Default for RewriteRule {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            flags: DEFAULT_FLAGS.to_string(),
            replacement: String::new(),
        }
    }
}
