// src/embed/mod.rs
//
// Page-side embed point: `[chatkit]` shortcodes become the container element
// the vendor script mounts into, and the scripts plus client configuration are
// emitted only for pages that actually rendered one.
//
mod assets;
mod context;
mod renderer;
mod shortcode;

pub use assets::{asset_tags, ClientConfig, StartScreen, StartScreenPrompt, CONFIG_GLOBAL};
pub use context::RenderContext;
pub use renderer::{EmbedRenderer, RenderedPage};
pub use shortcode::{
    container_id, has_shortcode, parse_attributes, render_container, replace_shortcodes,
    DEFAULT_CONTAINER_ID, SHORTCODE_TAG,
};

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("failed to serialize client configuration: {0}")]
    Serialization(#[from] serde_json::Error),
}
