// src/admin/auth.rs
use super::NonceRegistry;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read and change plugin settings, run health checks.
    ManageOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Insufficient permissions")]
    MissingCapability,

    #[error("Invalid security token")]
    InvalidNonce,
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCapability => "capability",
            AuthError::InvalidNonce => "nonce",
        }
    }
}

/// Capability and nonce checks in front of every admin operation.
/// Both fail closed: anything unexpected is a rejection.
pub struct AdminGate {
    token: String,
    nonces: NonceRegistry,
}

impl AdminGate {
    pub fn new(token: impl Into<String>, nonce_ttl: Duration) -> Self {
        Self {
            token: token.into(),
            nonces: NonceRegistry::new(nonce_ttl),
        }
    }

    pub fn nonces(&self) -> &NonceRegistry {
        &self.nonces
    }

    /// `authorization` is the raw `Authorization` header value, if any.
    pub fn require(&self, authorization: Option<&str>, capability: Capability) -> Result<(), AuthError> {
        let granted = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .map_or(false, |presented| {
                !self.token.is_empty() && constant_time_eq(presented.as_bytes(), self.token.as_bytes())
            });

        if !granted {
            warn!(?capability, "admin request without required capability");
            return Err(AuthError::MissingCapability);
        }
        Ok(())
    }

    pub fn check_nonce(&self, action: &str, nonce: Option<&str>) -> Result<(), AuthError> {
        match nonce {
            Some(nonce) if self.nonces.verify(action, nonce) => Ok(()),
            _ => {
                warn!(action, "admin request with missing or invalid nonce");
                Err(AuthError::InvalidNonce)
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new("s3cret", Duration::from_secs(60))
    }

    #[test]
    fn bearer_token_grants_manage_options() {
        assert!(gate()
            .require(Some("Bearer s3cret"), Capability::ManageOptions)
            .is_ok());
    }

    #[test]
    fn wrong_or_missing_token_is_rejected() {
        let gate = gate();
        for header in [None, Some("Bearer nope"), Some("s3cret"), Some("Basic s3cret"), Some("Bearer ")] {
            assert_eq!(
                gate.require(header, Capability::ManageOptions),
                Err(AuthError::MissingCapability),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn empty_configured_token_never_matches() {
        let gate = AdminGate::new("", Duration::from_secs(60));
        assert!(gate.require(Some("Bearer "), Capability::ManageOptions).is_err());
    }

    #[test]
    fn nonce_check_requires_matching_action() {
        let gate = gate();
        let nonce = gate.nonces().issue("beepi_chatkit_health_check");

        assert!(gate.check_nonce("beepi_chatkit_health_check", Some(&nonce)).is_ok());
        assert_eq!(
            gate.check_nonce("beepi_chatkit_settings", Some(&nonce)),
            Err(AuthError::InvalidNonce)
        );
        assert_eq!(
            gate.check_nonce("beepi_chatkit_health_check", None),
            Err(AuthError::InvalidNonce)
        );
    }
}
