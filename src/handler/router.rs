//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, and dispatching to the report service.

use http_body_util::Full;
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response, StatusCode};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppState, HttpConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::reports::{ImageNumber, ReportError};
use crate::store::DocumentStore;

const REPORTS_PREFIX: &str = "/api/reports";

/// Endpoints served by the API
#[derive(Debug, PartialEq, Eq)]
enum ApiRoute<'a> {
    Health,
    ListReports,
    ReportDetail(Cow<'a, str>),
    ReportImage(Cow<'a, str>, Cow<'a, str>),
    Unknown,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<S: DocumentStore>(
    req: Request<Incoming>,
    state: Arc<AppState<S>>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // The body is never read; only the request head is needed
    let (parts, _body) = req.into_parts();
    let access_log = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_parts(&parts, peer_addr));

    let response = route(&parts.method, parts.uri.path(), &parts.headers, &state).await;

    if let Some(mut entry) = access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Produce the response for one request
pub async fn route<S: DocumentStore>(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    state: &AppState<S>,
) -> Response<Full<Bytes>> {
    let http_config = &state.config.http;
    let is_head = *method == Method::HEAD;

    // 1. Match route; unknown paths are 404 whatever the method
    let api_route = match_route(path, &http_config.health_path);
    if api_route == ApiRoute::Unknown {
        return http::build_404_response(http_config, is_head);
    }

    // 2. Check HTTP method
    if let Some(resp) = check_http_method(method, http_config) {
        return resp;
    }

    // 3. Check body size
    if let Some(resp) = check_body_size(headers, http_config) {
        return resp;
    }

    // 4. Dispatch
    let result = match api_route {
        ApiRoute::Health => return http::build_health_response(http_config, is_head),
        ApiRoute::Unknown => return http::build_404_response(http_config, is_head),
        ApiRoute::ListReports => state.service.list_reports().await,
        ApiRoute::ReportDetail(report_id) => state.service.get_report(&report_id).await,
        ApiRoute::ReportImage(report_id, image_number) => match ImageNumber::parse(&image_number) {
            Ok(number) => state.service.get_report_image(&report_id, number).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(document) => http::json_response(StatusCode::OK, &document, http_config, is_head),
        Err(e) => report_error_response(&e, path, http_config, is_head),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, http_config: &HttpConfig) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(http_config)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response(http_config))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, http_config: &HttpConfig) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    let max_body_size = http_config.max_body_size;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(http_config))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn match_route<'a>(path: &'a str, health_path: &str) -> ApiRoute<'a> {
    if path == health_path {
        return ApiRoute::Health;
    }

    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    let Some(rest) = path.strip_prefix(REPORTS_PREFIX) else {
        return ApiRoute::Unknown;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [""] => ApiRoute::ListReports,
        ["", id] if !id.is_empty() => ApiRoute::ReportDetail(percent_decode(id)),
        ["", id, "images", number] if !id.is_empty() => {
            ApiRoute::ReportImage(percent_decode(id), percent_decode(number))
        }
        _ => ApiRoute::Unknown,
    }
}

/// Decode `%XX` escapes in a path segment; invalid UTF-8 leaves it untouched
fn percent_decode(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }

    let hex = |b: Option<&u8>| {
        b.and_then(|b| char::from(*b).to_digit(16))
            .and_then(|d| u8::try_from(d).ok())
    };
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], hex(bytes.get(i + 1)), hex(bytes.get(i + 2))) {
            (b'%', Some(hi), Some(lo)) => {
                decoded.push(hi * 16 + lo);
                i += 3;
            }
            (b, _, _) => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(decoded).map_or(Cow::Borrowed(segment), Cow::Owned)
}

fn report_error_response(
    error: &ReportError,
    path: &str,
    http_config: &HttpConfig,
    is_head: bool,
) -> Response<Full<Bytes>> {
    if error.is_server_fault() {
        logger::log_error(&format!("{path}: {error}"));
    } else {
        logger::log_debug(&format!("{path}: {} {error}", error.status().as_u16()));
    }
    http::error_response(error.status(), error.detail(), http_config, is_head)
}
