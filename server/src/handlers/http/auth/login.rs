use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use sqlx::PgPool;
use tracing::{error, info, warn};

use shared::types::{LoginData, LoginError, LoginOk, ROLE_ADMIN};

use crate::AppState;
use crate::database::{password, users};
use crate::handlers::http::utils::deliver_error_json;
use crate::session::{cookie, token};

/// POST /api/auth/login
///
/// The only endpoint the gate passes through unconditionally. Verifies
/// credentials against the users table, issues the session token, and
/// sets the session cookie.
pub async fn handle_login(
    req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing login request");

    let Some(db) = state.db.clone() else {
        warn!("Login attempted with no database configured");
        return deliver_login_error(LoginError::DatabaseUnavailable);
    };

    let login_data = match parse_login_json(req).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Login body rejected: {}", e.message());
            return deliver_login_error(e);
        }
    };

    if let Err(e) = validate_login(&login_data) {
        warn!("Login validation failed: {}", e.message());
        return deliver_login_error(e);
    }

    match attempt_login(&login_data, &state, &db).await {
        Ok((email, session_token)) => {
            info!("Admin logged in: {}", email);

            let session_cookie = cookie::create_session_cookie(
                &session_token,
                state.config.auth.token_ttl_secs,
                state.config.auth.secure_cookies,
            )
            .context("Failed to create session cookie")?;

            let json = serde_json::to_string(&LoginOk::new(&email))
                .context("Failed to serialize login response")?;

            let response = Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .header("set-cookie", session_cookie)
                .body(crate::handlers::http::utils::full(Bytes::from(json)))
                .context("Failed to build login response")?;

            Ok(response)
        }
        Err(e) => {
            warn!("Login failed: {}", e.message());
            deliver_login_error(e)
        }
    }
}

fn deliver_login_error(e: LoginError) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    deliver_error_json(e.message(), e.status())
}

/// Parse the JSON login body.
async fn parse_login_json(
    req: Request<IncomingBody>,
) -> std::result::Result<LoginData, LoginError> {
    let body = req
        .collect()
        .await
        .map_err(|_| LoginError::InvalidBody)?
        .to_bytes();

    serde_json::from_slice::<LoginData>(&body).map_err(|e| {
        warn!("Failed to parse login JSON: {}", e);
        LoginError::InvalidBody
    })
}

/// Validate login data
fn validate_login(data: &LoginData) -> std::result::Result<(), LoginError> {
    if data.email.trim().is_empty() || data.password.is_empty() {
        return Err(LoginError::MissingCredentials);
    }
    Ok(())
}

/// Verify credentials and issue the session token.
///
/// The role is checked before the password: a non-admin account answers
/// 403 regardless of the password supplied. Unknown email and wrong
/// password share one error variant.
async fn attempt_login(
    data: &LoginData,
    state: &AppState,
    db: &PgPool,
) -> std::result::Result<(String, String), LoginError> {
    let email = data.email.trim().to_lowercase();

    info!("Attempting login for: {}", email);

    let user_auth = users::get_auth_by_email(db, &email)
        .await
        .map_err(|e| {
            error!("Database error fetching account: {}", e);
            LoginError::DatabaseError
        })?
        .ok_or_else(|| {
            warn!("Unknown account: {}", email);
            LoginError::InvalidCredentials
        })?;

    if user_auth.role != ROLE_ADMIN {
        warn!("Non-admin account attempted login: {}", email);
        return Err(LoginError::NotAdmin);
    }

    let password_valid = password::verify_password(&user_auth.password_hash, &data.password)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            LoginError::DatabaseError
        })?;

    if !password_valid {
        warn!("Invalid password for: {}", email);
        return Err(LoginError::InvalidCredentials);
    }

    let session_token = token::issue(
        &user_auth.id.to_string(),
        &user_auth.email,
        &user_auth.role,
        state.config.auth.token_ttl_secs,
        state.jwt_secret.as_deref(),
    )
    .map_err(|e| {
        error!("Token issuance failed: {}", e);
        LoginError::SecretUnavailable
    })?;

    Ok((user_auth.email, session_token))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_email_fails_validation() {
        let data = LoginData {
            email: "  ".to_string(),
            password: "correct".to_string(),
        };
        assert_eq!(validate_login(&data), Err(LoginError::MissingCredentials));
    }

    #[test]
    fn missing_password_fails_validation() {
        let data = LoginData {
            email: "admin@x.com".to_string(),
            password: String::new(),
        };
        assert_eq!(validate_login(&data), Err(LoginError::MissingCredentials));
    }

    #[test]
    fn complete_credentials_pass_validation() {
        let data = LoginData {
            email: "admin@x.com".to_string(),
            password: "correct".to_string(),
        };
        assert!(validate_login(&data).is_ok());
    }

    #[test]
    fn email_lookup_is_normalized() {
        let data = LoginData {
            email: "  Admin@X.Com ".to_string(),
            password: "correct".to_string(),
        };
        assert_eq!(data.email.trim().to_lowercase(), "admin@x.com");
    }
}
