use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full, combinators::BoxBody};
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode, header};
use std::convert::Infallible;
use tracing::{debug, error, info};

/// Read an HTML file from disk and deliver it with no-cache headers —
/// the login and dashboard shells must always reflect the current build.
pub fn deliver_html_page<P: AsRef<Path>>(
    file_path: P,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let path: PathBuf = file_path.as_ref().to_path_buf();

    debug!("Reading page from: {}", path.display());

    let content: Vec<u8> = std::fs::read(&path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, get_mime_type(&path))
        .body(full(content))
        .map_err(|e| anyhow!("Failed to build page response: {}", e))?;

    Ok(add_no_cache_headers(response))
}

/// Add no-cache headers for page deliveries
pub fn add_no_cache_headers<T>(mut res: Response<T>) -> Response<T> {
    let headers = res.headers_mut();

    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    res
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Delivers a redirect response
pub fn deliver_redirect(location: &str) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Delivering redirect to: {}", location);

    let response = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(empty())
        .map_err(|e: http::Error| {
            error!("Failed to build redirect response to {}: {}", location, e);
            anyhow!("Failed to build redirect response: {}", e)
        })?;

    Ok(response)
}

/// Helper function to create an empty body
pub fn empty() -> BoxBody<Bytes, Infallible> {
    Empty::<Bytes>::new().boxed()
}

/// Helper function to create a full body from various types
pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    Full::new(chunk.into()).boxed()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
