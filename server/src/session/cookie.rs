use anyhow::{Result, anyhow};
use hyper::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Name of the session cookie the panel issues and reads.
pub const COOKIE_NAME: &str = "td_admin_session";

/// Extract a cookie value by name from the `Cookie` header.
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                let name = parts.next()?.trim();
                let value = parts.next()?.trim();
                if name == cookie_name {
                    debug!("Cookie found: {}", cookie_name);
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}

/// Read the session token off an inbound request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    get_cookie(headers, COOKIE_NAME).filter(|v| !v.is_empty())
}

/// Build a `Set-Cookie` value.
///
/// `SameSite=Lax` so the dashboard survives top-level navigation from
/// other origins while cross-site subrequests still drop the cookie.
fn set_cookie(
    name: &str,
    value: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}; Max-Age={}; Path=/", name, value, max_age_secs);

    cookie.push_str("; HttpOnly");

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Lax");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| {
        warn!("Failed to create cookie header for {}: {}", name, e);
        anyhow!("Invalid cookie value: {}", e)
    })
}

/// The `Set-Cookie` header written at login. `max_age_secs` matches the
/// token ttl; `secure` comes from config (TLS deployments only).
pub fn create_session_cookie(
    token: &str,
    max_age_secs: u64,
    secure: bool,
) -> Result<HeaderValue> {
    set_cookie(COOKIE_NAME, token, max_age_secs, secure)
}

/// Clear the session cookie (logout).
///
/// This only removes the browser's copy. The token itself stays valid
/// until its embedded expiry — there is no server-side revocation.
pub fn clear_session_cookie() -> Result<HeaderValue> {
    set_cookie(COOKIE_NAME, "", 0, false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
