// src/admin/ajax.rs
use super::{AdminError, AdminGate, AuthError, Capability};
use crate::health::{HealthRelay, HealthResult};
use crate::metrics::MetricsCollector;
use crate::options::{ChatkitOptions, OptionKey, OptionMap, OptionsResolver};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const HEALTH_CHECK_ACTION: &str = "beepi_chatkit_health_check";
pub const SETTINGS_ACTION: &str = "beepi_chatkit_settings";

/// `{"success": .., "data": ..}` reply shape expected by the settings page.
#[derive(Debug, Clone, Serialize)]
pub struct AjaxEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> AjaxEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl AjaxEnvelope<HealthResult> {
    pub fn from_health(result: HealthResult) -> Self {
        Self {
            success: result.is_success(),
            data: result,
        }
    }
}

/// Admin-only operations. Every entry point checks the capability first and
/// the nonce second, before touching the options or the worker.
pub struct AdminApi {
    gate: AdminGate,
    resolver: OptionsResolver,
    relay: HealthRelay,
    metrics: Option<Arc<MetricsCollector>>,
}

impl AdminApi {
    pub fn new(gate: AdminGate, resolver: OptionsResolver, relay: HealthRelay) -> Self {
        Self {
            gate,
            resolver,
            relay,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn issue_nonce(&self, authorization: Option<&str>, action: &str) -> Result<String, AdminError> {
        self.require(authorization)?;
        Ok(self.gate.nonces().issue(action))
    }

    /// Dispatch a form-encoded AJAX call (`action`, `nonce`).
    pub async fn ajax(
        &self,
        authorization: Option<&str>,
        form: &HashMap<String, String>,
    ) -> Result<AjaxEnvelope<HealthResult>, AdminError> {
        self.require(authorization)?;

        let action = form.get("action").map(String::as_str).unwrap_or_default();
        match action {
            HEALTH_CHECK_ACTION => {
                self.check_nonce(HEALTH_CHECK_ACTION, form.get("nonce").map(String::as_str))?;
                let result = self.health_check().await;
                Ok(AjaxEnvelope::from_health(result))
            }
            other => Err(AdminError::UnknownAction(other.to_string())),
        }
    }

    pub fn options(&self, authorization: Option<&str>) -> Result<ChatkitOptions, AdminError> {
        self.require(authorization)?;
        Ok(self.resolver.resolve())
    }

    pub async fn save_options(
        &self,
        authorization: Option<&str>,
        nonce: Option<&str>,
        raw: &HashMap<String, String>,
    ) -> Result<OptionMap, AdminError> {
        self.require(authorization)?;
        self.check_nonce(SETTINGS_ACTION, nonce)?;

        let saved = self.resolver.save(raw).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_options_save();
        }
        Ok(saved)
    }

    async fn health_check(&self) -> HealthResult {
        let start_url = self
            .resolver
            .get_option(OptionKey::StartUrl.as_str(), OptionKey::StartUrl.default_value());
        self.relay.check_health(&start_url).await
    }

    fn require(&self, authorization: Option<&str>) -> Result<(), AdminError> {
        self.gate
            .require(authorization, Capability::ManageOptions)
            .map_err(|e| self.rejected(e))
    }

    fn check_nonce(&self, action: &str, nonce: Option<&str>) -> Result<(), AdminError> {
        self.gate
            .check_nonce(action, nonce)
            .map_err(|e| self.rejected(e))
    }

    fn rejected(&self, err: AuthError) -> AdminError {
        if let Some(metrics) = &self.metrics {
            metrics.record_auth_failure(err.reason());
        }
        AdminError::Auth(err)
    }
}
