use serde::{Deserialize, Serialize};

/// The only privileged role string. The role set is closed (`"admin"` /
/// `"user"`); everything that is not `"admin"` is unprivileged here.
pub const ROLE_ADMIN: &str = "admin";

/// Claims embedded in every session token issued by the server.
///
/// Trustworthy only when the token's HMAC signature verifies under the
/// current signing secret AND `exp` is still in the future. Unsigned or
/// unverifiable claims are never treated as authenticated.
///
/// The token is self-contained: no server-side session table, no
/// revocation list. A leaked token stays valid until its `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Standard JWT subject — the account's stable id (`users.id` as a
    /// string).
    pub sub: String,

    /// Account email, carried for display and audit only. Never consulted
    /// for authorization.
    pub email: String,

    /// Role string. Only [`ROLE_ADMIN`] grants access to this panel.
    pub role: String,

    /// Standard JWT expiry (Unix timestamp, seconds).
    pub exp: usize,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: usize,
}

impl SessionClaims {
    /// Whether this session may use the admin surface.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
