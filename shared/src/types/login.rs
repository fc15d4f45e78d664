use http::StatusCode;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

/// Body returned on a successful login, alongside the session cookie.
#[derive(Debug, Serialize)]
pub struct LoginOk {
    pub ok: bool,
    pub email: String,
}

impl LoginOk {
    pub fn new(email: &str) -> Self {
        Self {
            ok: true,
            email: email.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Login errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong between receiving a login body and setting
/// the session cookie. Unknown account and wrong password share one variant
/// so their responses stay indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    InvalidBody,
    MissingCredentials,
    InvalidCredentials,
    NotAdmin,
    DatabaseUnavailable,
    DatabaseError,
    SecretUnavailable,
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody | Self::MissingCredentials => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotAdmin => StatusCode::FORBIDDEN,
            Self::DatabaseUnavailable | Self::SecretUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidBody => "Invalid JSON body",
            Self::MissingCredentials => "Email and password are required",
            Self::InvalidCredentials => "Invalid email or password",
            Self::NotAdmin => "Access denied. Admin role required.",
            Self::DatabaseUnavailable => "Database not configured",
            Self::DatabaseError => "Database error",
            Self::SecretUnavailable => "Server misconfiguration",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
