// src/embed/renderer.rs
use super::{
    asset_tags, has_shortcode, replace_shortcodes, ClientConfig, EmbedError, RenderContext,
    DEFAULT_CONTAINER_ID,
};
use crate::config::AssetsConfig;
use crate::metrics::MetricsCollector;
use crate::options::OptionsResolver;
use std::sync::Arc;

#[derive(Debug)]
pub struct RenderedPage {
    pub html: String,
    pub context: RenderContext,
}

pub struct EmbedRenderer {
    assets: AssetsConfig,
    resolver: OptionsResolver,
    metrics: Option<Arc<MetricsCollector>>,
}

impl EmbedRenderer {
    pub fn new(assets: AssetsConfig, resolver: OptionsResolver) -> Self {
        Self {
            assets,
            resolver,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Expand shortcodes in `content`; assets are appended only when at least
    /// one container was rendered for this page.
    pub fn render(&self, content: &str) -> Result<RenderedPage, EmbedError> {
        let mut context = RenderContext::new();
        if !has_shortcode(content) {
            return Ok(RenderedPage {
                html: content.to_string(),
                context,
            });
        }

        let mut html = replace_shortcodes(content, &mut context);

        if !context.shortcode_used() {
            return Ok(RenderedPage { html, context });
        }

        let container = context.primary_container().unwrap_or(DEFAULT_CONTAINER_ID);
        let config = ClientConfig::new(&self.resolver.resolve(), container);
        html.push('\n');
        html.push_str(&asset_tags(&self.assets, &config)?);

        if let Some(metrics) = &self.metrics {
            metrics.record_shortcodes(context.containers().len());
        }
        tracing::debug!(containers = context.containers().len(), "rendered chat embed");

        Ok(RenderedPage { html, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MemoryOptionsStore;
    use std::collections::HashMap;

    fn renderer() -> (EmbedRenderer, OptionsResolver) {
        let resolver = OptionsResolver::new(Arc::new(MemoryOptionsStore::new()));
        (
            EmbedRenderer::new(AssetsConfig::default(), resolver.clone()),
            resolver,
        )
    }

    #[test]
    fn page_without_shortcode_gets_no_assets() {
        let (renderer, _) = renderer();
        let page = renderer.render("<p>Plain page</p>").unwrap();

        assert_eq!(page.html, "<p>Plain page</p>");
        assert!(!page.context.shortcode_used());
    }

    #[test]
    fn page_with_shortcode_gets_container_and_assets() {
        let (renderer, _) = renderer();
        let page = renderer.render("<p>Chat:</p>[chatkit]").unwrap();

        assert!(page.html.starts_with(r#"<p>Chat:</p><div id="chatkit-container"></div>"#));
        assert!(page.html.contains("chatkit.js"));
        assert!(page.html.contains(r#""containerId":"chatkit-container""#));
    }

    #[test]
    fn render_state_does_not_leak_between_pages() {
        let (renderer, _) = renderer();
        renderer.render("[chatkit]").unwrap();

        let second = renderer.render("no chat here").unwrap();
        assert!(!second.context.shortcode_used());
        assert!(!second.html.contains("<script"));
    }

    #[tokio::test]
    async fn saved_options_flow_into_client_config() {
        let (renderer, resolver) = renderer();
        let raw = HashMap::from([
            ("workflow_id".to_string(), "wf_abc".to_string()),
            ("start_screen_greeting".to_string(), "Hei!".to_string()),
        ]);
        resolver.save(&raw).await.unwrap();

        let page = renderer.render(r#"[chatkit container_id="support"]"#).unwrap();
        assert!(page.html.contains(r#""workflowId":"wf_abc""#));
        assert!(page.html.contains(r#""greeting":"Hei!""#));
        assert!(page.html.contains(r#""containerId":"support""#));
    }
}
