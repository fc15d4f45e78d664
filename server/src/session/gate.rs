use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::AppState;
use crate::handlers::http::utils::{deliver_error_json, deliver_redirect};
use crate::session::policy::{Decision, PathClass, classify, decide};
use crate::session::resolver::resolve;

/// Outcome of screening a request at the edge.
pub enum Screen {
    /// Hand the request to the router unmodified.
    Continue,
    /// The gate produced the response itself; no handler runs.
    Respond(Response<BoxBody<Bytes, Infallible>>),
}

/// Screen one inbound request before any handler runs.
///
/// Steps: classify the path; pass the login submission through
/// unconditionally; resolve the cookie-borne session; apply the policy
/// table; translate the decision into continue / redirect / JSON error.
/// Stateless — every request is evaluated on its own.
///
/// When no signing secret is configured, protected APIs answer 503 and
/// page classes pass through unenforced. That asymmetry is deliberate
/// (navigation stays usable on a misconfigured deploy) and is flagged in
/// DESIGN.md — do not change one side without the other.
pub fn screen<B>(req: &Request<B>, state: &AppState) -> Result<Screen> {
    let path = req.uri().path();
    let class = classify(path);

    if class == PathClass::PublicAuth {
        return Ok(Screen::Continue);
    }

    let Some(secret) = state.jwt_secret.as_deref() else {
        return match class {
            PathClass::ProtectedApi => {
                warn!("Signing secret unset — answering 503 for {}", path);
                Ok(Screen::Respond(deliver_error_json(
                    "Server misconfiguration",
                    StatusCode::SERVICE_UNAVAILABLE,
                )?))
            }
            _ => Ok(Screen::Continue),
        };
    };

    let claims = resolve(req, Some(secret));

    match decide(class, claims.as_ref()) {
        Decision::Allow => Ok(Screen::Continue),
        Decision::Redirect(target) => {
            debug!("Gate redirecting {} -> {}", path, target);
            Ok(Screen::Respond(deliver_redirect(target)?))
        }
        Decision::Reject(status, message) => {
            warn!("Gate rejected {} {}: {}", status.as_u16(), path, message);
            Ok(Screen::Respond(deliver_error_json(message, status)?))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
