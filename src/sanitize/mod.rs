// src/sanitize/mod.rs
//
// Write-side sanitizers for admin-entered settings and read-side cleaning of
// untrusted strings coming back from the worker.
//
mod text;
mod url_field;

pub use self::text::{esc_attr, sanitize_html_class, sanitize_text_field, strip_all_tags};
pub use self::url_field::sanitize_url;

use crate::options::{FieldKind, OptionKey, OptionMap};
use std::collections::HashMap;

/// Clean a raw settings submission.
///
/// Every recognized key is passed through the sanitizer for its field kind;
/// anything else is dropped.
pub fn sanitize_settings(raw: &HashMap<String, String>) -> OptionMap {
    let mut clean = OptionMap::new();

    for (name, value) in raw {
        let Some(key) = OptionKey::from_name(name) else {
            tracing::debug!(key = %name, "dropping unrecognized settings key");
            continue;
        };

        let sanitized = match key.kind() {
            FieldKind::Text => sanitize_text_field(value),
            FieldKind::Url => sanitize_url(value),
        };
        clean.insert(key.as_str().to_string(), sanitized);
    }

    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn start_screen_fields_lose_their_markup() {
        let clean = sanitize_settings(&raw(&[
            ("start_screen_greeting", "<script>alert(\"XSS\")</script>Hello"),
            ("start_screen_prompt_label", "Start<br>Chat"),
            ("start_screen_prompt_text", "Hello<strong>World</strong>"),
        ]));

        assert_eq!(clean["start_screen_greeting"], "Hello");
        assert_eq!(clean["start_screen_prompt_label"], "StartChat");
        assert_eq!(clean["start_screen_prompt_text"], "HelloWorld");
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let clean = sanitize_settings(&raw(&[
            ("workflow_id", "wf_123"),
            ("admin_password", "hunter2"),
        ]));

        assert_eq!(clean.len(), 1);
        assert_eq!(clean["workflow_id"], "wf_123");
    }

    #[test]
    fn url_fields_are_validated() {
        let clean = sanitize_settings(&raw(&[
            ("start_url", " https://worker.example.com/api/chatkit/start "),
            ("refresh_url", "javascript:alert(1)"),
        ]));

        assert_eq!(clean["start_url"], "https://worker.example.com/api/chatkit/start");
        assert_eq!(clean["refresh_url"], "");
    }
}
