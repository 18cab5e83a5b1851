// src/app.rs
use crate::admin::{AdminApi, AdminGate};
use crate::config::ServerConfig;
use crate::embed::EmbedRenderer;
use crate::health::{HealthRelay, HealthTransport};
use crate::metrics::MetricsCollector;
use crate::options::{OptionsResolver, OptionsStore};
use std::sync::Arc;

/// Everything a request handler needs, wired once at startup.
pub struct App {
    pub admin: AdminApi,
    pub renderer: EmbedRenderer,
    pub resolver: OptionsResolver,
    pub metrics: Option<Arc<MetricsCollector>>,
}

impl App {
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn OptionsStore>,
        transport: Arc<dyn HealthTransport>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let resolver = OptionsResolver::new(store);
        let gate = AdminGate::new(config.admin.token.clone(), config.admin.nonce_ttl());

        let mut relay = HealthRelay::new(transport);
        let mut admin_metrics = None;
        let mut renderer = EmbedRenderer::new(config.assets.clone(), resolver.clone());
        if let Some(metrics) = &metrics {
            relay = relay.with_metrics(metrics.clone());
            admin_metrics = Some(metrics.clone());
            renderer = renderer.with_metrics(metrics.clone());
        }

        let mut admin = AdminApi::new(gate, resolver.clone(), relay);
        if let Some(metrics) = admin_metrics {
            admin = admin.with_metrics(metrics);
        }

        Self {
            admin,
            renderer,
            resolver,
            metrics,
        }
    }
}
