// src/embed/assets.rs
use super::EmbedError;
use crate::config::AssetsConfig;
use crate::options::ChatkitOptions;
use crate::sanitize::esc_attr;
use serde::Serialize;

/// Global the init script reads its configuration from.
pub const CONFIG_GLOBAL: &str = "beepichatKitConfig";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub start_url: String,
    pub refresh_url: String,
    pub workflow_id: String,
    pub container_id: String,
    pub start_screen: StartScreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartScreen {
    pub greeting: String,
    pub prompts: Vec<StartScreenPrompt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartScreenPrompt {
    pub label: String,
    pub prompt: String,
}

impl ClientConfig {
    pub fn new(options: &ChatkitOptions, container_id: &str) -> Self {
        Self {
            start_url: options.start_url.clone(),
            refresh_url: options.refresh_url.clone(),
            workflow_id: options.workflow_id.clone(),
            container_id: container_id.to_string(),
            start_screen: StartScreen {
                greeting: options.start_screen_greeting.clone(),
                prompts: vec![StartScreenPrompt {
                    label: options.start_screen_prompt_label.clone(),
                    prompt: options.start_screen_prompt_text.clone(),
                }],
            },
        }
    }
}

// JSON that cannot close the surrounding <script> element or break a JS string.
fn script_safe_json(config: &ClientConfig) -> Result<String, EmbedError> {
    let json = serde_json::to_string(config)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

/// Stylesheet, vendor script, inline configuration and init script, in load order.
pub fn asset_tags(assets: &AssetsConfig, config: &ClientConfig) -> Result<String, EmbedError> {
    let mut tags = Vec::with_capacity(4);

    if let Some(style) = &assets.style_url {
        tags.push(format!(
            r#"<link rel="stylesheet" id="beepi-chatkit-style-css" href="{}" media="all" />"#,
            esc_attr(style)
        ));
    }

    tags.push(format!(
        r#"<script src="{}" id="openai-chatkit-js"></script>"#,
        esc_attr(&assets.vendor_script_url)
    ));
    tags.push(format!(
        r#"<script id="beepi-chatkit-init-js-extra">var {} = {};</script>"#,
        CONFIG_GLOBAL,
        script_safe_json(config)?
    ));
    tags.push(format!(
        r#"<script src="{}" id="beepi-chatkit-init-js"></script>"#,
        esc_attr(&assets.init_script_url)
    ));

    Ok(tags.join("\n"))
}
