// src/server/handler.rs
use crate::admin::{AdminError, AjaxEnvelope, HEALTH_CHECK_ACTION};
use crate::app::App;
use crate::metrics::Timer;
use hyper::header::{self, HeaderValue};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

/// Largest request body accepted by any route.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct RequestHandler {
    app: Arc<App>,
}

impl RequestHandler {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let app = self.app.clone();
        Box::pin(async move {
            let timer = Timer::new();
            let method = req.method().clone();
            let (label, response) = route(&app, req).await;

            if let Some(metrics) = &app.metrics {
                metrics.record_request(
                    method.as_str(),
                    label,
                    response.status().as_u16(),
                    timer.elapsed(),
                );
            }
            Ok(response)
        })
    }
}

async fn route(app: &App, req: Request<Body>) -> (&'static str, Response<Body>) {
    let path = req.uri().path().to_string();
    match (req.method(), path.as_str()) {
        (&Method::POST, "/render") => ("render", render(app, req).await),
        (&Method::GET, "/admin/nonce") => ("admin_nonce", issue_nonce(app, &req)),
        (&Method::POST, "/admin/ajax") => ("admin_ajax", ajax(app, req).await),
        (&Method::GET, "/admin/options") => ("admin_options", get_options(app, &req)),
        (&Method::POST, "/admin/options") => ("admin_options", save_options(app, req).await),
        _ => ("not_found", text_response(StatusCode::NOT_FOUND, "Not Found")),
    }
}

async fn render(app: &App, req: Request<Body>) -> Response<Body> {
    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let content = String::from_utf8_lossy(&body);

    match app.renderer.render(&content) {
        Ok(page) => {
            let mut response = Response::new(Body::from(page.html));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            response
        }
        Err(e) => {
            tracing::error!(%e, "embed render failed");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Render failed")
        }
    }
}

fn issue_nonce(app: &App, req: &Request<Body>) -> Response<Body> {
    let query = query_params(req);
    let action = query
        .get("action")
        .map(String::as_str)
        .unwrap_or(HEALTH_CHECK_ACTION);

    match app.admin.issue_nonce(authorization(req), action) {
        Ok(nonce) => json_response(StatusCode::OK, &json!({ "nonce": nonce })),
        Err(e) => e.into(),
    }
}

async fn ajax(app: &App, req: Request<Body>) -> Response<Body> {
    let auth = authorization(&req).map(str::to_string);
    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let form: HashMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();

    match app.admin.ajax(auth.as_deref(), &form).await {
        Ok(envelope) => json_response(StatusCode::OK, &envelope),
        Err(e) => e.into(),
    }
}

fn get_options(app: &App, req: &Request<Body>) -> Response<Body> {
    match app.admin.options(authorization(req)) {
        Ok(options) => json_response(StatusCode::OK, &AjaxEnvelope::ok(options)),
        Err(e) => e.into(),
    }
}

async fn save_options(app: &App, req: Request<Body>) -> Response<Body> {
    let auth = authorization(&req).map(str::to_string);
    let nonce = query_params(&req).remove("nonce");
    let body = match read_body(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    let raw = match settings_from_json(&body) {
        Ok(raw) => raw,
        Err(e) => return e.into(),
    };

    match app.admin.save_options(auth.as_deref(), nonce.as_deref(), &raw).await {
        Ok(saved) => json_response(StatusCode::OK, &AjaxEnvelope::ok(saved)),
        Err(e) => e.into(),
    }
}

/// Settings arrive as a flat JSON object; scalars are taken as text, nested
/// values are ignored like any other unrecognized input.
fn settings_from_json(body: &[u8]) -> Result<HashMap<String, String>, AdminError> {
    let object: HashMap<String, Value> = serde_json::from_slice(body)
        .map_err(|e| AdminError::BadRequest(format!("expected a JSON object: {}", e)))?;

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

fn authorization(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

fn query_params(req: &Request<Body>) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

async fn read_body(req: Request<Body>) -> Result<hyper::body::Bytes, Response<Body>> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > MAX_BODY_BYTES) {
        return Err(text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
    }

    let body = hyper::body::to_bytes(req.into_body()).await.map_err(|e| {
        tracing::warn!(%e, "failed to read request body");
        text_response(StatusCode::BAD_REQUEST, "Bad Request")
    })?;

    if body.len() > MAX_BODY_BYTES {
        return Err(text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
    }
    Ok(body)
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(%e, "failed to serialize response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_json_keeps_scalars_only() {
        let raw = settings_from_json(br#"{"workflow_id":"wf","n":3,"flag":true,"nested":{"a":1},"x":null}"#)
            .unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw["n"], "3");
        assert_eq!(raw["flag"], "true");
    }

    #[test]
    fn settings_json_must_be_an_object() {
        let err = settings_from_json(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, AdminError::BadRequest(_)));
    }
}
