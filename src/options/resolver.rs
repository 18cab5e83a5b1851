// src/options/resolver.rs
use super::{OptionKey, OptionMap, OptionsError, OptionsStore};
use crate::sanitize::sanitize_settings;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Name under which the whole configuration mapping is stored.
pub const OPTION_NAME: &str = "beepi_chatkit_options";

/// Fully resolved configuration, every key backed by its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatkitOptions {
    pub start_url: String,
    pub refresh_url: String,
    pub workflow_id: String,
    pub start_screen_greeting: String,
    pub start_screen_prompt_label: String,
    pub start_screen_prompt_text: String,
}

impl Default for ChatkitOptions {
    fn default() -> Self {
        Self::from_map(&OptionMap::new())
    }
}

impl ChatkitOptions {
    fn from_map(stored: &OptionMap) -> Self {
        let value = |key: OptionKey| {
            stored
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| key.default_value().to_string())
        };

        Self {
            start_url: value(OptionKey::StartUrl),
            refresh_url: value(OptionKey::RefreshUrl),
            workflow_id: value(OptionKey::WorkflowId),
            start_screen_greeting: value(OptionKey::StartScreenGreeting),
            start_screen_prompt_label: value(OptionKey::StartScreenPromptLabel),
            start_screen_prompt_text: value(OptionKey::StartScreenPromptText),
        }
    }

    pub fn to_map(&self) -> OptionMap {
        [
            (OptionKey::StartUrl, &self.start_url),
            (OptionKey::RefreshUrl, &self.refresh_url),
            (OptionKey::WorkflowId, &self.workflow_id),
            (OptionKey::StartScreenGreeting, &self.start_screen_greeting),
            (OptionKey::StartScreenPromptLabel, &self.start_screen_prompt_label),
            (OptionKey::StartScreenPromptText, &self.start_screen_prompt_text),
        ]
        .into_iter()
        .map(|(key, value)| (key.as_str().to_string(), value.clone()))
        .collect()
    }
}

/// Reads and writes the plugin configuration through an [`OptionsStore`].
#[derive(Clone)]
pub struct OptionsResolver {
    store: Arc<dyn OptionsStore>,
}

impl OptionsResolver {
    pub fn new(store: Arc<dyn OptionsStore>) -> Self {
        Self { store }
    }

    /// Stored value for `key`, or `default` when it was never saved.
    /// No validation happens here; values were sanitized on write.
    pub fn get_option(&self, key: &str, default: &str) -> String {
        self.store
            .get(OPTION_NAME)
            .and_then(|mut stored| stored.remove(key))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn resolve(&self) -> ChatkitOptions {
        let stored = self.store.get_or(OPTION_NAME, OptionMap::new());
        ChatkitOptions::from_map(&stored)
    }

    /// Install the default mapping unless one already exists.
    pub async fn activate(&self) -> Result<bool, OptionsError> {
        if self.store.get(OPTION_NAME).is_some() {
            tracing::debug!("options already present, activation leaves them untouched");
            return Ok(false);
        }

        self.store
            .set(OPTION_NAME, ChatkitOptions::default().to_map())
            .await?;
        tracing::info!("installed default ChatKit options");
        Ok(true)
    }

    /// Sanitize a settings submission and replace the stored mapping with it.
    pub async fn save(&self, raw: &HashMap<String, String>) -> Result<OptionMap, OptionsError> {
        let clean = sanitize_settings(raw);
        self.store.set(OPTION_NAME, clean.clone()).await?;
        tracing::info!(keys = clean.len(), "saved ChatKit options");
        Ok(clean)
    }

    pub async fn uninstall(&self) -> Result<bool, OptionsError> {
        let existed = self.store.delete(OPTION_NAME).await?;
        tracing::info!(existed, "removed ChatKit options");
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{MemoryOptionsStore, DEFAULT_GREETING, DEFAULT_START_URL};

    fn resolver() -> OptionsResolver {
        OptionsResolver::new(Arc::new(MemoryOptionsStore::new()))
    }

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_key_returns_supplied_default() {
        let resolver = resolver();
        assert_eq!(
            resolver.get_option("start_screen_prompt_label", "Get Started"),
            "Get Started"
        );
        assert_eq!(resolver.get_option("anything", ""), "");
    }

    #[tokio::test]
    async fn present_key_wins_over_default() {
        let resolver = resolver();
        resolver
            .save(&raw(&[("start_screen_greeting", "Welcome! How may I assist?")]))
            .await
            .unwrap();

        assert_eq!(
            resolver.get_option("start_screen_greeting", "How can I help you today?"),
            "Welcome! How may I assist?"
        );
        assert_eq!(
            resolver.get_option("start_screen_greeting", "something else"),
            "Welcome! How may I assist?"
        );
    }

    #[tokio::test]
    async fn stored_empty_string_is_not_replaced_by_default() {
        let resolver = resolver();
        resolver.save(&raw(&[("start_url", "javascript:alert(1)")])).await.unwrap();

        assert_eq!(resolver.get_option("start_url", DEFAULT_START_URL), "");
    }

    #[tokio::test]
    async fn activation_installs_defaults_once() {
        let resolver = resolver();
        assert!(resolver.activate().await.unwrap());

        let options = resolver.resolve();
        assert_eq!(options, ChatkitOptions::default());
        assert_eq!(options.start_screen_greeting, DEFAULT_GREETING);
        assert_eq!(options.start_screen_prompt_label, "Get Started");
        assert_eq!(options.start_screen_prompt_text, "Hi! How can you assist me today?");

        resolver.save(&raw(&[("workflow_id", "wf_9")])).await.unwrap();
        assert!(!resolver.activate().await.unwrap());
        assert_eq!(resolver.get_option("workflow_id", ""), "wf_9");
    }

    #[tokio::test]
    async fn save_replaces_the_whole_mapping() {
        let resolver = resolver();
        resolver.save(&raw(&[("workflow_id", "wf_1")])).await.unwrap();
        resolver
            .save(&raw(&[("start_screen_prompt_label", "Start Chat")]))
            .await
            .unwrap();

        let options = resolver.resolve();
        assert_eq!(options.workflow_id, "");
        assert_eq!(options.start_screen_prompt_label, "Start Chat");
    }

    #[tokio::test]
    async fn uninstall_deletes_the_option() {
        let resolver = resolver();
        resolver.activate().await.unwrap();
        assert!(resolver.uninstall().await.unwrap());
        assert!(!resolver.uninstall().await.unwrap());
        assert_eq!(resolver.get_option("workflow_id", "fallback"), "fallback");
    }
}
