use hyper::StatusCode;

use shared::types::SessionClaims;

// ---------------------------------------------------------------------------
// Path classification
// ---------------------------------------------------------------------------

/// Policy-relevant bucket a request path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// The login submission endpoint. Always allowed through so a stale
    /// cookie can never lock an admin out of re-authenticating.
    PublicAuth,
    /// The login form page.
    LoginPage,
    /// The dashboard and everything under it.
    ProtectedPage,
    /// Every other API route.
    ProtectedApi,
    /// Anything else: static assets, the health probe, unknown paths.
    Other,
}

pub fn classify(path: &str) -> PathClass {
    if path.starts_with("/api/auth/login") {
        PathClass::PublicAuth
    } else if path == "/login" || path.starts_with("/login/") {
        PathClass::LoginPage
    } else if path == "/dashboard" || path.starts_with("/dashboard/") {
        PathClass::ProtectedPage
    } else if path == "/api" || path.starts_with("/api/") {
        PathClass::ProtectedApi
    } else {
        PathClass::Other
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Per-request authorization decision. Computed fresh for every request,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
    Reject(StatusCode, &'static str),
}

/// Map (path class, resolved session) to a decision.
///
/// Page classes redirect — they serve browsers. API classes answer with
/// status codes so the calling page can render its own error: 401 means
/// "log in", 403 means "you lack permission".
pub fn decide(class: PathClass, claims: Option<&SessionClaims>) -> Decision {
    match class {
        PathClass::PublicAuth | PathClass::Other => Decision::Allow,

        // Any valid session skips the login form. A non-admin session is
        // bounced to the dashboard too; its API calls there answer 403.
        PathClass::LoginPage => match claims {
            Some(_) => Decision::Redirect("/dashboard"),
            None => Decision::Allow,
        },

        PathClass::ProtectedPage => match claims {
            Some(c) if c.is_admin() => Decision::Allow,
            _ => Decision::Redirect("/login"),
        },

        PathClass::ProtectedApi => match claims {
            None => Decision::Reject(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Some(c) if c.is_admin() => Decision::Allow,
            Some(_) => Decision::Reject(StatusCode::FORBIDDEN, "Forbidden"),
        },
    }
}

// ---------------------------------------------------------------------------
// Per-handler capability check
// ---------------------------------------------------------------------------

/// Failure of the per-handler capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No session, or one that failed verification — which one is not
    /// disclosed.
    Unauthenticated,
    /// Valid session, insufficient role.
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Unauthorized",
            Self::Forbidden => "Forbidden",
        }
    }
}

/// The one role check every protected handler performs itself, whether or
/// not the gate already ran — handlers stay safe when reached outside the
/// gate (direct invocation in tests, future internal routing).
pub fn require_admin(claims: Option<&SessionClaims>) -> Result<&SessionClaims, AuthError> {
    match claims {
        None => Err(AuthError::Unauthenticated),
        Some(c) if c.is_admin() => Ok(c),
        Some(_) => Err(AuthError::Forbidden),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
