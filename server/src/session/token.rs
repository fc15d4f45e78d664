use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use shared::types::SessionClaims;

#[derive(Error, Debug)]
pub enum TokenError {
    /// No signing secret is configured. Issuance must abort — an unsigned
    /// token must never leave this module.
    #[error("signing secret is not configured")]
    SecretMissing,

    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Current Unix timestamp in seconds.
fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// Issue a signed session token for the given account.
///
/// `exp = now + ttl_secs`; HS256 under the process secret.
pub fn issue(
    subject_id: &str,
    email: &str,
    role: &str,
    ttl_secs: u64,
    secret: Option<&str>,
) -> Result<String, TokenError> {
    let secret = secret.ok_or(TokenError::SecretMissing)?;

    let now = now_secs();
    let claims = SessionClaims {
        sub: subject_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: now + ttl_secs as usize,
        iat: now,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Verify signature integrity and expiry.
///
/// Any malformed, truncated, tampered, or expired token comes back as
/// `None`. Callers treat that identically to "no session" — the reason a
/// token failed is never exposed. Pure function of `(token, secret, now)`,
/// safe to call repeatedly and concurrently.
pub fn verify(token: &str, secret: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact: a token one second past `exp` is dead.
    validation.leeway = 0;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn issue_admin(ttl_secs: u64) -> String {
        issue("u-1", "admin@x.com", "admin", ttl_secs, Some(SECRET)).unwrap()
    }

    /// Encode claims directly, bypassing `issue`, to control `exp` exactly.
    fn encode_with_exp(offset_from_now: i64) -> String {
        let now = now_secs() as i64;
        let claims = SessionClaims {
            sub: "u-1".to_string(),
            email: "admin@x.com".to_string(),
            role: "admin".to_string(),
            exp: (now + offset_from_now) as usize,
            iat: now as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_roundtrips_issued_claims() {
        let token = issue_admin(3600);
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email, "admin@x.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_valid_just_before_expiry() {
        // Boundary: expires_at - 1s must still verify.
        let token = encode_with_exp(1);
        assert!(verify(&token, SECRET).is_some());
    }

    #[test]
    fn token_invalid_just_after_expiry() {
        // Boundary: expires_at + 1s must fail, with zero leeway.
        let token = encode_with_exp(-1);
        assert!(verify(&token, SECRET).is_none());
    }

    #[test]
    fn long_expired_token_is_invalid() {
        let token = encode_with_exp(-86_400);
        assert!(verify(&token, SECRET).is_none());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = issue_admin(3600);
        assert!(verify(&token, "another-secret-another-secret-xx").is_none());
    }

    #[test]
    fn garbage_and_truncated_tokens_are_invalid() {
        assert!(verify("", SECRET).is_none());
        assert!(verify("not-a-token", SECRET).is_none());

        let token = issue_admin(3600);
        let truncated = &token[..token.len() / 2];
        assert!(verify(truncated, SECRET).is_none());
    }

    #[test]
    fn issue_without_secret_aborts() {
        let result = issue("u-1", "admin@x.com", "admin", 3600, None);
        assert!(matches!(result, Err(TokenError::SecretMissing)));
    }

    #[test]
    fn verify_is_idempotent() {
        let token = issue_admin(3600);
        let first = verify(&token, SECRET);
        let second = verify(&token, SECRET);
        assert_eq!(first, second);
    }

    proptest! {
        /// Verify(Issue(..)) returns the original claims for any account
        /// shape, as long as the ttl hasn't elapsed.
        #[test]
        fn roundtrip_for_arbitrary_accounts(
            sub in "[a-f0-9-]{1,40}",
            email in "[a-z]{1,12}@[a-z]{1,12}\\.com",
            role in prop_oneof![Just("admin".to_string()), Just("user".to_string())],
            ttl in 60u64..=86_400,
        ) {
            let token = issue(&sub, &email, &role, ttl, Some(SECRET)).unwrap();
            let claims = verify(&token, SECRET).unwrap();
            prop_assert_eq!(claims.sub, sub);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.role, role);
        }

        /// Changing any single byte of a valid token makes it invalid.
        #[test]
        fn tampering_with_any_byte_invalidates(
            index in 0usize..200,
            replacement in "[A-Za-z0-9]",
        ) {
            let token = issue("u-1", "admin@x.com", "admin", 3600, Some(SECRET)).unwrap();
            let index = index % token.len();
            let original = token.as_bytes()[index] as char;
            let replacement = replacement.chars().next().unwrap();
            prop_assume!(original != replacement);

            let mut tampered = token.into_bytes();
            tampered[index] = replacement as u8;
            let tampered = String::from_utf8(tampered).unwrap();

            prop_assert!(verify(&tampered, SECRET).is_none());
        }
    }
}
