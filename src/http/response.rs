//! HTTP response building module
//!
//! Every response the API produces is JSON. Errors use a single-field
//! envelope: `{"detail": "<message>"}`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

/// Start a response with the headers every JSON reply carries
fn json_builder(status: StatusCode, http_config: &HttpConfig) -> Builder {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Server", &http_config.server_name);

    if http_config.enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }
    builder
}

/// Build JSON response; HEAD requests get the headers and an empty body
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    http_config: &HttpConfig,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response(http_config, is_head);
        }
    };

    let content_length = json.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(json) };

    json_builder(status, http_config)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build `{"detail": ...}` error response
pub fn error_response(
    status: StatusCode,
    detail: &str,
    http_config: &HttpConfig,
    is_head: bool,
) -> Response<Full<Bytes>> {
    json_response(status, &ErrorBody { detail }, http_config, is_head)
}

/// Build 404 Not Found response for unknown routes
pub fn build_404_response(http_config: &HttpConfig, is_head: bool) -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found", http_config, is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        http_config,
        false,
    );
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Request body too large",
        http_config,
        false,
    )
}

/// Build 500 response without going through serde, so it cannot fail again
pub fn build_500_response(http_config: &HttpConfig, is_head: bool) -> Response<Full<Bytes>> {
    const BODY: &str = r#"{"detail":"Internal Server Error"}"#;
    let body = if is_head { Bytes::new() } else { Bytes::from_static(BODY.as_bytes()) };

    json_builder(StatusCode::INTERNAL_SERVER_ERROR, http_config)
        .header("Content-Length", BODY.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(http_config: &HttpConfig) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS)
        .header("Server", &http_config.server_name);

    if http_config.enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build health check response
pub fn build_health_response(http_config: &HttpConfig, is_head: bool) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({"status": "ok"}),
        http_config,
        is_head,
    )
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let http = HttpConfig::default();
        let response = error_response(StatusCode::NOT_FOUND, "Report not found", &http, false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(response.headers()["Server"], "report-mock-api");
        assert_eq!(body_string(response).await, r#"{"detail":"Report not found"}"#);
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let http = HttpConfig::default();
        let response = json_response(StatusCode::OK, &serde_json::json!({"a": 1}), &http, true);
        assert_eq!(response.headers()["Content-Length"], "7");
        assert_eq!(body_string(response).await, "");
    }

    #[test]
    fn test_cors_header_follows_config() {
        let mut http = HttpConfig::default();
        let response = build_health_response(&http, false);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        http.enable_cors = false;
        let response = build_health_response(&http, false);
        assert!(!response.headers().contains_key("Access-Control-Allow-Origin"));

        let response = build_options_response(&http);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!response.headers().contains_key("Access-Control-Allow-Methods"));
    }

    #[tokio::test]
    async fn test_405_has_allow_header() {
        let response = build_405_response(&HttpConfig::default());
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], ALLOWED_METHODS);
        assert_eq!(body_string(response).await, r#"{"detail":"Method Not Allowed"}"#);
    }

    #[tokio::test]
    async fn test_500_body() {
        let response = build_500_response(&HttpConfig::default(), false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response).await,
            r#"{"detail":"Internal Server Error"}"#
        );
    }
}
