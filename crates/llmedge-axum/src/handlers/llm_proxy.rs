//! `/llm/*` reverse proxy.
//!
//! Forwards chat-completion requests to the local inference server after
//! canonicalizing the body, and streams the response back byte for byte.
//! Streaming is pull-based end to end: when the downstream client stalls
//! or disconnects, the upstream read stops with it, so long token
//! streams neither buffer in memory nor leak upstream connections.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use llmedge_core::chat::{transform, RawCompletionRequest};
use tracing::debug;

use crate::error::HttpError;
use crate::state::AppState;

/// Routing prefix removed before forwarding upstream.
const ROUTE_PREFIX: &str = "/llm";

/// Headers that must never reach the inference server: they leak origin
/// topology or fight the single-hop content length computed here.
const EXCLUDED_HEADERS: &[&str] = &[
    "host",
    "x-forwarded-for",
    "x-real-ip",
    "x-forwarded-proto",
    "x-nginx-proxy",
    "connection",
    "accept-encoding",
    "content-length",
];

/// Proxy one request to the local inference server.
pub async fn forward(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match forward_inner(&state, &method, &uri, &headers, &body).await {
        Ok(response) => response,
        Err(HttpError::Proxy(detail)) => {
            state
                .ledger
                .record(&format!("Proxy error: {detail}"), "LLM Proxy Route");
            HttpError::Proxy(detail).into_response()
        }
    }
}

async fn forward_inner(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response, HttpError> {
    let target = target_url(&state.inference_base, uri);
    debug!(%target, "proxying LLM request");

    // Canonicalize the body and compute the exact forwarded length.
    let raw = RawCompletionRequest::from_body(body);
    let canonical = transform(&raw, &state.transform);
    let payload = serde_json::to_vec(&canonical).map_err(|e| HttpError::Proxy(e.to_string()))?;

    let upstream = state
        .client
        .request(convert_method(method), &target)
        .headers(forwarded_headers(headers, payload.len()))
        .body(payload)
        .send()
        .await
        .map_err(|e| HttpError::Proxy(e.to_string()))?;

    // Copy status and headers verbatim, then hand the body over as a
    // stream so chunked completions flow through without buffering.
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| HttpError::Proxy(e.to_string()))?;
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        // This hop re-frames the body, so its framing header stays local.
        if name.as_str() == "transfer-encoding" {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    builder
        .body(Body::from_stream(stream))
        .map_err(|e| HttpError::Proxy(e.to_string()))
}

/// Rewrite the public path onto the inference endpoint.
fn target_url(inference_base: &str, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    let stripped = path_and_query
        .strip_prefix(ROUTE_PREFIX)
        .unwrap_or(path_and_query);
    format!("{inference_base}{stripped}")
}

/// Inbound headers minus the excluded set, plus the fixed upstream trio.
fn forwarded_headers(inbound: &HeaderMap, content_length: usize) -> reqwest::header::HeaderMap {
    use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};

    let mut headers = reqwest::header::HeaderMap::new();
    for (name, value) in inbound {
        let name = name.as_str();
        if EXCLUDED_HEADERS.contains(&name) {
            continue;
        }
        // Header names/values crossing http crate versions; skip anything
        // that fails to convert rather than failing the request.
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.insert(name, value);
        }
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    // Must match the serialized byte length exactly or the upstream parse
    // is corrupted.
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
    headers
}

fn convert_method(method: &Method) -> reqwest::Method {
    reqwest::Method::from_bytes(method.as_str().as_bytes())
        .unwrap_or(reqwest::Method::POST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_prefix_is_stripped_from_forwarded_path() {
        let uri: Uri = "/llm/v1/chat/completions".parse().unwrap();
        assert_eq!(
            target_url("http://127.0.0.1:8080", &uri),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
    }

    #[test]
    fn query_string_survives_the_rewrite() {
        let uri: Uri = "/llm/v1/models?verbose=1".parse().unwrap();
        assert_eq!(
            target_url("http://127.0.0.1:8080", &uri),
            "http://127.0.0.1:8080/v1/models?verbose=1"
        );
    }

    #[test]
    fn excluded_headers_never_reach_upstream() {
        let mut inbound = HeaderMap::new();
        inbound.insert("host", "edge.acu.run".parse().unwrap());
        inbound.insert("connection", "keep-alive".parse().unwrap());
        inbound.insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        inbound.insert("x-real-ip", "10.0.0.1".parse().unwrap());
        inbound.insert("x-forwarded-proto", "https".parse().unwrap());
        inbound.insert("x-nginx-proxy", "true".parse().unwrap());
        inbound.insert("accept-encoding", "gzip".parse().unwrap());
        inbound.insert("content-length", "999".parse().unwrap());
        inbound.insert("x-request-id", "abc123".parse().unwrap());

        let forwarded = forwarded_headers(&inbound, 42);

        for name in EXCLUDED_HEADERS {
            if *name == "content-length" {
                continue;
            }
            assert!(!forwarded.contains_key(*name), "{name} leaked upstream");
        }
        assert_eq!(forwarded["x-request-id"], "abc123");
        assert_eq!(forwarded["content-type"], "application/json");
        assert_eq!(forwarded["accept"], "application/json");
        assert_eq!(forwarded["content-length"], "42");
    }
}
