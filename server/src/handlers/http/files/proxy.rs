use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode, header};
use tracing::{error, info, warn};

use crate::AppState;
use crate::handlers::http::utils::{deliver_error_json, full, query_param};
use crate::session::{require_admin, resolve};

/// GET /api/file?key=…  (or ?url=<public url>)
///
/// Streams an object's bytes back with its stored content type. The
/// browser never talks to the object store directly — everything goes
/// through this authenticated proxy.
pub async fn handle_file_proxy(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let claims = resolve(&req, state.jwt_secret.as_deref());
    if let Err(e) = require_admin(claims.as_ref()) {
        warn!("Unauthorised file fetch attempt");
        return deliver_error_json(e.message(), e.status());
    }

    let Some(store) = &state.storage else {
        return deliver_error_json("File service not configured", StatusCode::SERVICE_UNAVAILABLE);
    };

    // Either an explicit key or a public URL the key can be recovered from.
    let object_key = query_param(&req, "key")
        .or_else(|| query_param(&req, "url").and_then(|url| store.key_from_url(&url)));

    let Some(object_key) = object_key else {
        return deliver_error_json("Missing key or url parameter", StatusCode::BAD_REQUEST);
    };

    info!("Proxying object: {}", object_key);

    match store.get_object(&object_key).await {
        Ok(Some((bytes, content_type))) => {
            let filename = object_key.rsplit('/').next().unwrap_or(&object_key);

            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", filename),
                )
                .body(full(bytes))
                .context("Failed to build file response")?;

            Ok(response)
        }
        Ok(None) => deliver_error_json("File not found", StatusCode::NOT_FOUND),
        Err(e) => {
            // Unreadable objects answer 404 like absent ones; detail stays
            // in the log.
            error!("Object fetch failed: {:#}", e);
            deliver_error_json("File not found", StatusCode::NOT_FOUND)
        }
    }
}
