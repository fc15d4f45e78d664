use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use tracing::info;

use crate::AppState;
use crate::handlers::http::utils::full;
use crate::session::cookie;

/// POST /api/auth/logout
///
/// Clears the session cookie. The token itself stays valid until its
/// embedded expiry — copies cached outside this browser are unaffected.
pub async fn handle_logout(
    _req: Request<IncomingBody>,
    _state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Admin logged out");

    let clear_cookie =
        cookie::clear_session_cookie().context("Failed to build clear-cookie header")?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .header("set-cookie", clear_cookie)
        .body(full(Bytes::from(r#"{"ok":true}"#)))
        .context("Failed to build logout response")?;

    Ok(response)
}
