//! Plugin contract types for the hosting chat runtime.
//!
//! The host loads the plugin, registers the settings it declares, and drives
//! the hooks in [`MessagePlugin`]: [`on_enable`](MessagePlugin::on_enable)
//! once at startup with the persisted configuration,
//! [`on_setting_updated`](MessagePlugin::on_setting_updated) on every setting
//! change, and the message hooks on every outgoing message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Plugin identity handed to the host at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
}

/// Setting value types the host can persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    String,
    Boolean,
    Int,
}

/// A setting the plugin asks the host to register and persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    /// Default value shipped with the plugin package.
    pub package_value: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub multiline: bool,
    /// i18n key resolved by the host, not by the plugin.
    pub i18n_label: String,
    pub i18n_description: String,
}

/// Read access to host-persisted setting values.
pub trait SettingsSource: Send + Sync {
    fn value_of(&self, id: &str) -> Option<String>;
}

/// In-memory settings, used by the CLI harness and in tests.
#[derive(Debug, Clone, Default)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(id.into(), value.into());
        self
    }
}

impl SettingsSource for MapSettings {
    fn value_of(&self, id: &str) -> Option<String> {
        self.values.get(id).cloned()
    }
}

/// An outgoing message as delivered by the host.
///
/// The body arrives as untyped JSON: hosts allow non-string payloads
/// (attachment-only messages, for example), and a transform plugin must only
/// act when the payload is actually a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_id: String,
    pub room_id: String,
    pub sender: String,
    #[serde(default)]
    pub text: Option<Value>,
}

impl MessageEvent {
    /// The message body, when it is a string.
    pub fn text_str(&self) -> Option<&str> {
        self.text.as_ref().and_then(Value::as_str)
    }
}

/// Hooks a message-transform plugin exposes to the host.
#[async_trait]
pub trait MessagePlugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    /// Settings to register when the plugin is installed.
    fn settings(&self) -> Vec<SettingSpec>;

    /// Called once when the plugin is enabled, after settings are persisted.
    /// Returns whether the startup configuration was accepted.
    async fn on_enable(&self, settings: &dyn SettingsSource) -> bool;

    /// Called whenever any setting changes, with the new raw value. The
    /// plugin must ignore ids it does not own.
    async fn on_setting_updated(&self, id: &str, value: &str);

    /// Cheap pre-check; the host only invokes
    /// [`on_message_send`](Self::on_message_send) when this returns true.
    fn applies_to(&self, event: &MessageEvent) -> bool;

    /// Transform an outgoing message before the host sends it.
    async fn on_message_send(&self, event: MessageEvent) -> MessageEvent;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_settings_lookup() {
        let settings = MapSettings::new().with("a", "1").with("b", "2");
        assert_eq!(settings.value_of("a").as_deref(), Some("1"));
        assert_eq!(settings.value_of("missing"), None);
    }

    #[test]
    fn test_message_event_text_str() {
        let event: MessageEvent = serde_json::from_str(
            r#"{"message_id":"m1","room_id":"r1","sender":"alice","text":"hello"}"#,
        )
        .unwrap();
        assert_eq!(event.text_str(), Some("hello"));

        let no_text: MessageEvent =
            serde_json::from_str(r#"{"message_id":"m2","room_id":"r1","sender":"alice"}"#)
                .unwrap();
        assert_eq!(no_text.text_str(), None);

        let non_string: MessageEvent = serde_json::from_str(
            r#"{"message_id":"m3","room_id":"r1","sender":"alice","text":{"blocks":[]}}"#,
        )
        .unwrap();
        assert_eq!(non_string.text_str(), None);
    }
}
