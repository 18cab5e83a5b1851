// src/health/mod.rs
mod relay;
mod result;
mod transport;

pub use relay::{health_url, HealthError, HealthRelay, HEALTH_PATH};
pub use result::{HealthReport, HealthResult};
pub use transport::{HealthTransport, ReqwestTransport, TransportError, TransportResponse};
