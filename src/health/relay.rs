// src/health/relay.rs
use super::{HealthReport, HealthResult, HealthTransport, TransportError};
use crate::metrics::{MetricsCollector, Timer};
use crate::sanitize::sanitize_text_field;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum HealthError {
    #[error("Invalid start URL configuration")]
    InvalidStartUrl,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {0}: Unable to fetch health status")]
    HttpStatus(u16),

    #[error("Invalid JSON response from health endpoint")]
    InvalidJson,

    #[error("Missing status field in health response")]
    MissingStatus,
}

impl HealthError {
    /// Coarse class used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            HealthError::InvalidStartUrl => "config",
            HealthError::Transport(_) => "transport",
            HealthError::HttpStatus(_) | HealthError::InvalidJson | HealthError::MissingStatus => {
                "protocol"
            }
        }
    }
}

/// Path the worker serves its health document on.
pub const HEALTH_PATH: &str = "/api/health";

/// Health endpoint on the same origin as the start URL.
///
/// Only scheme and authority survive; credentials, path, query and fragment
/// of the start URL are discarded.
pub fn health_url(start_url: &str) -> Result<Url, HealthError> {
    let mut url = Url::parse(start_url.trim()).map_err(|_| HealthError::InvalidStartUrl)?;
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(HealthError::InvalidStartUrl);
    }

    url.set_username("").map_err(|_| HealthError::InvalidStartUrl)?;
    url.set_password(None).map_err(|_| HealthError::InvalidStartUrl)?;
    url.set_path(HEALTH_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub struct HealthRelay {
    transport: Arc<dyn HealthTransport>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthRelay {
    pub fn new(transport: Arc<dyn HealthTransport>) -> Self {
        Self {
            transport,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Check the worker behind `start_url` once and normalize the outcome.
    pub async fn check_health(&self, start_url: &str) -> HealthResult {
        let timer = Timer::new();
        let outcome = self.fetch_report(start_url).await;

        if let Some(metrics) = &self.metrics {
            let label = match &outcome {
                Ok(_) => "success",
                Err(e) => e.kind(),
            };
            metrics.record_health_check(label, timer.elapsed());
        }

        match outcome {
            Ok(report) => {
                debug!(status = %report.status, version = %report.version, "worker health fetched");
                HealthResult::Healthy(report)
            }
            Err(e) => {
                warn!(kind = e.kind(), "health check failed: {}", e);
                HealthResult::failed(e.to_string())
            }
        }
    }

    async fn fetch_report(&self, start_url: &str) -> Result<HealthReport, HealthError> {
        let url = health_url(start_url)?;
        debug!(%url, "requesting worker health");

        let response = self.transport.get_json(&url).await?;
        if response.status != 200 {
            return Err(HealthError::HttpStatus(response.status));
        }

        let body: Value =
            serde_json::from_str(&response.body).map_err(|_| HealthError::InvalidJson)?;
        parse_report(&body)
    }
}

fn parse_report(body: &Value) -> Result<HealthReport, HealthError> {
    let status = match body.get("status") {
        None | Some(Value::Null) => return Err(HealthError::MissingStatus),
        Some(value) => display_string(value),
    };

    let version = body.get("version").map(display_string).unwrap_or_default();

    let uptime = body.get("uptime").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
    });

    Ok(HealthReport {
        status,
        version,
        uptime,
    })
}

// Scalars are rendered as text; arrays and objects carry nothing displayable.
fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_text_field(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
