// src/embed/shortcode.rs
use super::RenderContext;
use crate::sanitize::{esc_attr, sanitize_html_class};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

pub const SHORTCODE_TAG: &str = "chatkit";
pub const DEFAULT_CONTAINER_ID: &str = "chatkit-container";

static SHORTCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[chatkit(\s[^\]]*)?\]").expect("shortcode pattern"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#)
        .expect("attribute pattern")
});

pub fn has_shortcode(content: &str) -> bool {
    SHORTCODE.is_match(content)
}

/// `name="value"`, `name='value'` and `name=value` pairs; names are lowercased.
pub fn parse_attributes(raw: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
            Some((name, value.as_str().to_string()))
        })
        .collect()
}

pub fn container_id(attributes: &HashMap<String, String>) -> String {
    attributes
        .get("container_id")
        .map(|id| sanitize_html_class(id))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string())
}

pub fn render_container(container_id: &str) -> String {
    format!(r#"<div id="{}"></div>"#, esc_attr(container_id))
}

/// Replace every shortcode in `content`, recording each rendered container.
pub fn replace_shortcodes(content: &str, context: &mut RenderContext) -> String {
    SHORTCODE
        .replace_all(content, |caps: &Captures<'_>| {
            let attributes = caps
                .get(1)
                .map(|raw| parse_attributes(raw.as_str()))
                .unwrap_or_default();
            let id = container_id(&attributes);
            let html = render_container(&id);
            context.record(id);
            html
        })
        .into_owned()
}
