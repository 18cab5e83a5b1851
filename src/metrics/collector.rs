// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Inbound requests
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,

    // Health relay
    pub health_checks_total: IntCounterVec,
    pub health_check_duration_seconds: HistogramVec,

    // Admin gate and settings
    pub auth_failures_total: IntCounterVec,
    pub options_saves_total: IntCounter,
    pub shortcodes_rendered_total: IntCounter,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("chatkit_requests_total", "Total number of requests"),
            &["method", "route", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "chatkit_request_duration_seconds",
                "Request duration in seconds",
            ),
            &["method", "route"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let health_checks_total = IntCounterVec::new(
            Opts::new(
                "chatkit_health_checks_total",
                "Worker health checks by outcome (success, config, transport, protocol)",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(health_checks_total.clone()))?;

        let health_check_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "chatkit_health_check_duration_seconds",
                "Worker health check duration in seconds",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(health_check_duration_seconds.clone()))?;

        let auth_failures_total = IntCounterVec::new(
            Opts::new(
                "chatkit_auth_failures_total",
                "Rejected admin requests by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(auth_failures_total.clone()))?;

        let options_saves_total =
            IntCounter::new("chatkit_options_saves_total", "Settings submissions saved")?;
        registry.register(Box::new(options_saves_total.clone()))?;

        let shortcodes_rendered_total = IntCounter::new(
            "chatkit_shortcodes_rendered_total",
            "Chat containers rendered from shortcodes",
        )?;
        registry.register(Box::new(shortcodes_rendered_total.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            health_checks_total,
            health_check_duration_seconds,
            auth_failures_total,
            options_saves_total,
            shortcodes_rendered_total,
        })
    }

    pub fn record_request(&self, method: &str, route: &str, status_code: u16, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, route, &status])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_health_check(&self, outcome: &str, duration: Duration) {
        self.health_checks_total.with_label_values(&[outcome]).inc();
        self.health_check_duration_seconds
            .with_label_values(&[outcome])
            .observe(duration.as_secs_f64());
    }

    pub fn record_auth_failure(&self, reason: &str) {
        self.auth_failures_total.with_label_values(&[reason]).inc();
    }

    pub fn record_options_save(&self) {
        self.options_saves_total.inc();
    }

    pub fn record_shortcodes(&self, count: usize) {
        self.shortcodes_rendered_total.inc_by(count as u64);
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathered_text_contains_recorded_series() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_health_check("transport", Duration::from_millis(12));
        metrics.record_auth_failure("nonce");

        let text = String::from_utf8(registry.gather().unwrap()).unwrap();
        assert!(text.contains("chatkit_health_checks_total{outcome=\"transport\"} 1"));
        assert!(text.contains("chatkit_auth_failures_total{reason=\"nonce\"} 1"));
    }
}
