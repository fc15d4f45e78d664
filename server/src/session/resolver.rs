use hyper::Request;

use shared::types::SessionClaims;

use crate::session::{cookie, token};

/// Recover and validate the caller's session from the request cookie.
///
/// Absent cookie, bad signature, and expired token all come back as
/// `None`. The caller is never told why a session failed — the uniform
/// fail-closed signal keeps the responses from leaking which check broke.
pub fn resolve<B>(req: &Request<B>, secret: Option<&str>) -> Option<SessionClaims> {
    let secret = secret?;
    let session_token = cookie::session_token(req.headers())?;
    token::verify(&session_token, secret)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
