use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::database::tickets;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json};
use crate::session::{require_admin, resolve};

/// Longest accepted `file_url`. Matches the column width.
const MAX_FILE_URL_LEN: usize = 1024;

#[derive(Debug, Deserialize)]
struct CreateTicketData {
    user_id: Option<String>,
    file_url: Option<String>,
}

/// GET /api/tickets
///
/// Admin-only listing of all tickets joined with their owner's email.
pub async fn handle_list_tickets(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Serving ticket list");

    let claims = resolve(&req, state.jwt_secret.as_deref());
    if let Err(e) = require_admin(claims.as_ref()) {
        warn!("Unauthorised ticket list attempt");
        return deliver_error_json(e.message(), e.status());
    }

    let Some(db) = &state.db else {
        return deliver_error_json("Database not configured", StatusCode::SERVICE_UNAVAILABLE);
    };

    match tickets::list(db).await {
        Ok(ticket_list) => deliver_serialized_json(&ticket_list, StatusCode::OK),
        Err(e) => {
            error!("Failed to query ticket list: {}", e);
            deliver_error_json("Database error", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/tickets
///
/// Admin-only ticket creation: `{user_id, file_url}` in, `{id, ok}` out.
pub async fn handle_create_ticket(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing ticket creation");

    let claims = resolve(&req, state.jwt_secret.as_deref());
    if let Err(e) = require_admin(claims.as_ref()) {
        warn!("Unauthorised ticket creation attempt");
        return deliver_error_json(e.message(), e.status());
    }

    let Some(db) = state.db.clone() else {
        return deliver_error_json("Database not configured", StatusCode::SERVICE_UNAVAILABLE);
    };

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Failed to read ticket body: {}", e);
            return deliver_error_json("Invalid JSON body", StatusCode::BAD_REQUEST);
        }
    };

    let data: CreateTicketData = match serde_json::from_slice(&body) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to parse ticket JSON: {}", e);
            return deliver_error_json("Invalid JSON body", StatusCode::BAD_REQUEST);
        }
    };

    let (user_id, file_url) = match validate_create(&data) {
        Ok(fields) => fields,
        Err(message) => {
            warn!("Ticket creation rejected: {}", message);
            return deliver_error_json(message, StatusCode::BAD_REQUEST);
        }
    };

    match tickets::create(&db, user_id, file_url).await {
        Ok(id) => deliver_serialized_json(
            &serde_json::json!({ "id": id, "ok": true }),
            StatusCode::OK,
        ),
        Err(e) => {
            error!("Failed to create ticket: {}", e);
            deliver_error_json("Failed to create ticket", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Field checks for ticket creation. Returns the parsed owner id and the
/// file URL, or the client-facing rejection message.
fn validate_create(data: &CreateTicketData) -> std::result::Result<(Uuid, &str), &'static str> {
    let user_id = data
        .user_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or("user_id and file_url are required")?;

    let file_url = data
        .file_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or("user_id and file_url are required")?;

    if file_url.len() > MAX_FILE_URL_LEN {
        return Err("file_url too long");
    }

    let user_id = Uuid::parse_str(user_id).map_err(|_| "user_id must be a valid id")?;

    Ok((user_id, file_url))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
