// src/admin/mod.rs
mod ajax;
mod auth;
mod nonce;

pub use ajax::{AdminApi, AjaxEnvelope, HEALTH_CHECK_ACTION, SETTINGS_ACTION};
pub use auth::{AdminGate, AuthError, Capability};
pub use nonce::NonceRegistry;

use crate::options::OptionsError;
use hyper::{header, Body, Response, StatusCode};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unable to save settings: {0}")]
    Options(#[from] OptionsError),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::Auth(_) => StatusCode::FORBIDDEN,
            AdminError::UnknownAction(_) => StatusCode::NOT_FOUND,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Options(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Admin failures always use the error envelope so the settings page can show them.
impl From<AdminError> for Response<Body> {
    fn from(err: AdminError) -> Self {
        let body = json!({ "success": false, "data": { "error": err.to_string() } });

        let mut response = Response::new(Body::from(body.to_string()));
        *response.status_mut() = err.status();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}
