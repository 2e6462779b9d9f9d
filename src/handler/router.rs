//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, body size
//! limits, health checks, then route table resolution and view dispatch.

use crate::config::{AppState, HealthConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::shop::ViewRequest;
use http_body_util::Full;
use percent_encoding::percent_decode_str;
use hyper::body::Bytes;
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling.
///
/// The body is never read, only its declared length is checked.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let (mut response, route_name) = if let Some(resp) =
        check_http_method(method, state.config.http.enable_cors)
    {
        (resp, None)
    } else if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        (resp, None)
    } else if let Some(resp) = check_health(path, &state.config.health, is_head) {
        (resp, None)
    } else {
        dispatch(path, is_head, &state)
    };

    http::apply_server_header(&mut response, &state.config.http.server_name);

    if state.access_log_enabled() {
        let entry = build_access_entry(&req, &response, peer_addr, route_name, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the path and call the matched view.
///
/// Returns the namespaced route name alongside the response, `None` on 404.
/// The path is percent-decoded first; text that is not UTF-8 once decoded
/// cannot match any route.
fn dispatch(raw_path: &str, is_head: bool, state: &AppState) -> (Response<Full<Bytes>>, Option<String>) {
    let Ok(decoded) = percent_decode_str(raw_path).decode_utf8() else {
        logger::log_debug(&format!("{raw_path} is not UTF-8 after decoding"));
        return (http::build_404_response(is_head), None);
    };
    let path: &str = &decoded;

    match state.routes.resolve(path) {
        Ok(resolved) => {
            logger::log_debug(&format!("{path} -> {}", resolved.name));
            let view_req = ViewRequest {
                path,
                is_head,
                args: &resolved.args,
                catalog: &state.catalog,
                urls: &state.routes,
            };
            let view = resolved.handler();
            (view(&view_req), Some(resolved.name))
        }
        Err(e) => {
            logger::log_debug(&e.to_string());
            (http::build_404_response(is_head), None)
        }
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
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

/// Health checks answer ahead of the route table
fn check_health(path: &str, health: &HealthConfig, is_head: bool) -> Option<Response<Full<Bytes>>> {
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        Some(http::build_health_response("ok", is_head))
    } else {
        None
    }
}

fn build_access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    route_name: Option<String>,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.route = route_name;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::shop::Course;
    use http_body_util::{BodyExt, Empty};
    use hyper::StatusCode;

    fn state() -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/shop-config").unwrap();
        cfg.logging.access_log = false;
        cfg.http.max_body_size = 16;
        cfg.catalog.courses = vec![Course {
            id: 42,
            title: "Tokio".into(),
            description: "Async runtime".into(),
        }];
        Arc::new(AppState::new(&cfg).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(method: Method, path: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Empty::<Bytes>::new())
            .unwrap();
        handle_request(req, state(), peer()).await.unwrap()
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index() {
        let resp = send(Method::GET, "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Server"], "shop-server/0.1");
        assert!(body_string(resp).await.contains("/course/42"));
    }

    #[tokio::test]
    async fn test_single_course() {
        let resp = send(Method::GET, "/course/42").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("<h1>Tokio</h1>"));
    }

    #[tokio::test]
    async fn test_unknown_course_and_paths_are_404() {
        for path in ["/course/7", "/course/abc", "/unknown", "/course/42/"] {
            assert_eq!(send(Method::GET, path).await.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_percent_encoded_path_is_decoded() {
        let resp = send(Method::GET, "/course/%34%32").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("<h1>Tokio</h1>"));

        // %FF alone is not valid UTF-8
        assert_eq!(send(Method::GET, "/course/%FF").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_query_string_ignored_for_matching() {
        let resp = send(Method::GET, "/course/42?ref=home").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_has_empty_body() {
        let resp = send(Method::HEAD, "/course/42").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_ne!(resp.headers()["Content-Length"], "0");
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_methods() {
        assert_eq!(
            send(Method::POST, "/").await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            send(Method::OPTIONS, "/").await.status(),
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let req = Request::builder()
            .uri("/")
            .header(CONTENT_LENGTH, "1024")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = handle_request(req, state(), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_health_checks() {
        let resp = send(Method::GET, "/healthz").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "ok");
        assert_eq!(send(Method::GET, "/readyz").await.status(), StatusCode::OK);
    }

    #[test]
    fn test_access_entry_records_route() {
        let req = Request::builder()
            .uri("/course/42?ref=home")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        let resp = http::build_404_response(false);
        let entry = build_access_entry(
            &req,
            &resp,
            peer(),
            Some("shop:single_course".to_string()),
            Instant::now(),
        );
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.query.as_deref(), Some("ref=home"));
        assert_eq!(entry.http_version, "1.1");
        assert_eq!(entry.status, 404);
        assert_eq!(entry.body_bytes, "404 Not Found".len());
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.route.as_deref(), Some("shop:single_course"));
    }
}
