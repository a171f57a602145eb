//! Regex rewrite plugin for outgoing chat messages.
//!
//! The hosting chat runtime persists a JSON array of substitution rules in a
//! plugin setting; on every outgoing message the plugin applies each rule in
//! order to the message body before it is sent.
//!
//! ## Rule format
//!
//! ```json
//! [
//!   {
//!     "regex": "rocketchat",
//!     "flags": "gi",
//!     "replacement": "Rocket.Chat"
//!   }
//! ]
//! ```
//!
//! `flags` are JS-style letters (`g` replace-all, `i`, `m`, `s`, `x`) and
//! default to `"gi"`. A rule whose pattern does not compile is skipped; a
//! setting value that is not a valid JSON rule array is rejected and the
//! previously loaded rules stay active.

pub mod config;
pub mod host;
pub mod plugin;
pub mod rule;

pub use config::{RewriteRule, DEFAULT_FLAGS, DEFAULT_RULES_JSON};
pub use host::{
    MapSettings, MessageEvent, MessagePlugin, PluginInfo, SettingSpec, SettingType,
    SettingsSource,
};
pub use plugin::{PluginStats, RewritePlugin, RULES_SETTING_ID};
pub use rule::{ConfigParseError, RuleSet};
