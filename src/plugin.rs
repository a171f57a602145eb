//! The rewrite plugin: process-wide rule state plus the host hooks.

use crate::config::DEFAULT_RULES_JSON;
use crate::host::{MessageEvent, MessagePlugin, PluginInfo, SettingSpec, SettingType, SettingsSource};
use crate::rule::RuleSet;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Setting id under which the host persists the rule list.
pub const RULES_SETTING_ID: &str = "ticketNumberFormat";

/// Message rewrite plugin.
///
/// Holds the one process-wide [`RuleSet`] and applies it to every outgoing
/// message body. The set is replaced wholesale on each successful
/// configuration load; a failed load keeps the previous rules authoritative.
pub struct RewritePlugin {
    rules: RwLock<RuleSet>,
    messages_total: AtomicU64,
    messages_rewritten: AtomicU64,
    config_errors: AtomicU64,
}

/// Counter snapshot for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginStats {
    pub messages_total: u64,
    pub messages_rewritten: u64,
    pub config_errors: u64,
}

impl RewritePlugin {
    /// Create a plugin with no rules loaded.
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(RuleSet::empty()),
            messages_total: AtomicU64::new(0),
            messages_rewritten: AtomicU64::new(0),
            config_errors: AtomicU64::new(0),
        }
    }

    /// Parse `raw` and swap in the resulting rule set.
    ///
    /// On parse failure the previous rules stay authoritative and `false` is
    /// returned so the caller can report the update as rejected.
    pub async fn reload(&self, raw: &str) -> bool {
        match RuleSet::parse(raw) {
            Ok(set) => {
                info!(rules = set.len(), "loaded rewrite rules");
                *self.rules.write().await = set;
                true
            }
            Err(error) => {
                self.config_errors.fetch_add(1, Ordering::Relaxed);
                let retained = self.rules.read().await.len();
                warn!(
                    %error,
                    retained,
                    "rejected rewrite rule update, keeping previous rules"
                );
                false
            }
        }
    }

    /// Number of currently loaded rules (including inert ones).
    pub async fn rule_count(&self) -> usize {
        self.rules.read().await.len()
    }

    pub fn stats(&self) -> PluginStats {
        PluginStats {
            messages_total: self.messages_total.load(Ordering::Relaxed),
            messages_rewritten: self.messages_rewritten.load(Ordering::Relaxed),
            config_errors: self.config_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for RewritePlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePlugin for RewritePlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "chat-rewrite".to_string(),
            name: "Message Rewrite".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn settings(&self) -> Vec<SettingSpec> {
        vec![SettingSpec {
            id: RULES_SETTING_ID.to_string(),
            setting_type: SettingType::String,
            package_value: DEFAULT_RULES_JSON.to_string(),
            required: false,
            public: false,
            multiline: true,
            i18n_label: "TicketNumberFormat".to_string(),
            i18n_description: "TicketNumberFormat_Description".to_string(),
        }]
    }

    async fn on_enable(&self, settings: &dyn SettingsSource) -> bool {
        let raw = settings.value_of(RULES_SETTING_ID).unwrap_or_default();
        self.reload(&raw).await
    }

    async fn on_setting_updated(&self, id: &str, value: &str) {
        if id != RULES_SETTING_ID {
            return;
        }
        self.reload(value).await;
    }

    fn applies_to(&self, event: &MessageEvent) -> bool {
        event.text_str().is_some()
    }

    async fn on_message_send(&self, mut event: MessageEvent) -> MessageEvent {
        self.messages_total.fetch_add(1, Ordering::Relaxed);

        // Absent body is treated as the empty string.
        let text = event.text_str().unwrap_or("");
        let rewritten = self.rules.read().await.apply(text);
        if rewritten != text {
            self.messages_rewritten.fetch_add(1, Ordering::Relaxed);
            debug!(message_id = %event.message_id, "rewrote outgoing message");
        }
        event.text = Some(Value::String(rewritten));
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: Option<Value>) -> MessageEvent {
        MessageEvent {
            message_id: "m1".to_string(),
            room_id: "general".to_string(),
            sender: "alice".to_string(),
            text,
        }
    }

    #[tokio::test]
    async fn test_reload_swaps_rules() {
        let plugin = RewritePlugin::new();
        assert!(plugin.reload(r#"[{"regex":"a","replacement":"b"}]"#).await);
        assert_eq!(plugin.rule_count().await, 1);

        assert!(plugin.reload("[]").await);
        assert_eq!(plugin.rule_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_rules() {
        let plugin = RewritePlugin::new();
        assert!(plugin.reload(r#"[{"regex":"a","replacement":"b"}]"#).await);

        assert!(!plugin.reload("not json").await);
        assert_eq!(plugin.rule_count().await, 1);

        let event = plugin.on_message_send(message(Some("a".into()))).await;
        assert_eq!(event.text_str(), Some("b"));
        assert_eq!(plugin.stats().config_errors, 1);
    }

    #[tokio::test]
    async fn test_setting_update_ignores_other_ids() {
        let plugin = RewritePlugin::new();
        plugin
            .on_setting_updated("someOtherSetting", r#"[{"regex":"a","replacement":"b"}]"#)
            .await;
        assert_eq!(plugin.rule_count().await, 0);

        plugin
            .on_setting_updated(RULES_SETTING_ID, r#"[{"regex":"a","replacement":"b"}]"#)
            .await;
        assert_eq!(plugin.rule_count().await, 1);
    }

    #[tokio::test]
    async fn test_applies_to_string_payloads_only() {
        let plugin = RewritePlugin::new();
        assert!(plugin.applies_to(&message(Some("hello".into()))));
        assert!(!plugin.applies_to(&message(None)));
        assert!(!plugin.applies_to(&message(Some(serde_json::json!({"blocks": []})))));
    }

    #[tokio::test]
    async fn test_absent_text_treated_as_empty() {
        let plugin = RewritePlugin::new();
        assert!(plugin.reload(r#"[{"regex":"a","replacement":"b"}]"#).await);

        let event = plugin.on_message_send(message(None)).await;
        assert_eq!(event.text_str(), Some(""));
    }

    #[tokio::test]
    async fn test_stats_count_rewrites() {
        let plugin = RewritePlugin::new();
        assert!(plugin.reload(r#"[{"regex":"a","replacement":"b"}]"#).await);

        plugin.on_message_send(message(Some("a".into()))).await;
        plugin.on_message_send(message(Some("xyz".into()))).await;

        let stats = plugin.stats();
        assert_eq!(stats.messages_total, 2);
        assert_eq!(stats.messages_rewritten, 1);
    }

    #[test]
    fn test_declared_setting_matches_reload_key() {
        let plugin = RewritePlugin::new();
        let settings = plugin.settings();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].id, RULES_SETTING_ID);
        assert_eq!(settings[0].setting_type, SettingType::String);
        assert!(settings[0].multiline);
    }

    #[tokio::test]
    async fn test_default_package_value_is_loadable() {
        let plugin = RewritePlugin::new();
        let settings = plugin.settings();
        assert!(plugin.reload(&settings[0].package_value).await);

        let event = plugin
            .on_message_send(message(Some("rocketchat is great".into())))
            .await;
        assert_eq!(event.text_str(), Some("Rocket.Chat is great"));
    }
}
