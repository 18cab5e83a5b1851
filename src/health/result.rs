// src/health/result.rs
use serde::ser::{Serialize, SerializeMap, Serializer};

/// What the worker reported, already cleaned for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    /// Only some worker versions report this.
    pub uptime: Option<u64>,
}

/// Outcome of one health check, serialized as
/// `{"success":true,"status":..,"version":..}` or `{"success":false,"error":..}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthResult {
    Healthy(HealthReport),
    Failed { error: String },
}

impl HealthResult {
    pub fn failed(error: impl Into<String>) -> Self {
        HealthResult::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HealthResult::Healthy(_))
    }

    pub fn report(&self) -> Option<&HealthReport> {
        match self {
            HealthResult::Healthy(report) => Some(report),
            HealthResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            HealthResult::Healthy(_) => None,
            HealthResult::Failed { error } => Some(error),
        }
    }
}

impl Serialize for HealthResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HealthResult::Healthy(report) => {
                let len = if report.uptime.is_some() { 4 } else { 3 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("status", &report.status)?;
                map.serialize_entry("version", &report.version)?;
                if let Some(uptime) = report.uptime {
                    map.serialize_entry("uptime", &uptime)?;
                }
                map.end()
            }
            HealthResult::Failed { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn healthy_result_has_no_error_field() {
        let result = HealthResult::Healthy(HealthReport {
            status: "ok".into(),
            version: "1.0.0".into(),
            uptime: None,
        });

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "status": "ok", "version": "1.0.0"})
        );
    }

    #[test]
    fn uptime_is_emitted_only_when_reported() {
        let result = HealthResult::Healthy(HealthReport {
            status: "ok".into(),
            version: String::new(),
            uptime: Some(3600),
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["uptime"], 3600);
    }

    #[test]
    fn failed_result_has_only_error() {
        let value = serde_json::to_value(HealthResult::failed("boom")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }
}
