use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use tracing::{error, info, warn};

use crate::AppState;
use crate::database::users;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json};
use crate::session::{require_admin, resolve};

/// GET /api/users
///
/// Admin-only listing of all accounts, newest first. The role check runs
/// here as well as in the gate — this handler stays safe when invoked
/// directly.
pub async fn handle_list_users(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Serving user list");

    let claims = resolve(&req, state.jwt_secret.as_deref());
    if let Err(e) = require_admin(claims.as_ref()) {
        warn!("Unauthorised user list attempt");
        return deliver_error_json(e.message(), e.status());
    }

    let Some(db) = &state.db else {
        return deliver_error_json("Database not configured", StatusCode::SERVICE_UNAVAILABLE);
    };

    match users::list(db).await {
        Ok(user_list) => deliver_serialized_json(&user_list, StatusCode::OK),
        Err(e) => {
            error!("Failed to query user list: {}", e);
            deliver_error_json("Database error", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
