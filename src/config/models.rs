// src/config/models.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// JSON file backing the options store.
    #[serde(default = "default_options_path")]
    pub options_path: PathBuf,

    pub admin: AdminConfig,

    #[serde(default)]
    pub health: HealthCheckConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token that grants the `manage_options` capability.
    pub token: String,

    #[serde(default = "default_nonce_ttl")]
    pub nonce_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    #[serde(default = "default_health_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,

    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Scripts and styles emitted next to a rendered shortcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_vendor_script")]
    pub vendor_script_url: String,

    #[serde(default = "default_init_script")]
    pub init_script_url: String,

    #[serde(default = "default_style")]
    pub style_url: Option<String>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.admin.token.trim().is_empty() {
            bail!("admin.token must not be empty");
        }
        if self.admin.nonce_ttl_secs == 0 {
            bail!("admin.nonce_ttl_secs must be greater than zero");
        }
        self.health.validate()?;
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/'");
        }
        Url::parse(&self.assets.vendor_script_url).with_context(|| {
            format!(
                "assets.vendor_script_url {:?} is not a URL",
                self.assets.vendor_script_url
            )
        })?;
        Ok(())
    }
}

impl AdminConfig {
    pub fn nonce_ttl(&self) -> Duration {
        Duration::from_secs(self.nonce_ttl_secs)
    }
}

impl HealthCheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("health.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_health_timeout(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            vendor_script_url: default_vendor_script(),
            init_script_url: default_init_script(),
            style_url: default_style(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_options_path() -> PathBuf {
    PathBuf::from("options.json")
}

fn default_nonce_ttl() -> u64 {
    // Same lifetime as a WordPress nonce.
    24 * 60 * 60
}

fn default_health_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_vendor_script() -> String {
    "https://cdn.platform.openai.com/deployments/chatkit/chatkit.js".to_string()
}

fn default_init_script() -> String {
    "/assets/js/chatkit-init.js".to_string()
}

fn default_style() -> Option<String> {
    Some("/assets/css/chatkit.css".to_string())
}
