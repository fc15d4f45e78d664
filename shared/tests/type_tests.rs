/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `login.rs` and `server_config.rs`).

// ---------------------------------------------------------------------------
// Session claims
// ---------------------------------------------------------------------------

mod claims_tests {
    use shared::types::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            sub: "6f1c0d52-7a44-4c5f-9b1e-2d29a1a0b7cd".to_string(),
            email: "admin@x.com".to_string(),
            role: "admin".to_string(),
            exp: 9_999_999_999,
            iat: 1_700_000_000,
        }
    }

    #[test]
    fn claims_serialize_and_deserialize_roundtrip() {
        let c = sample_claims();
        let json = serde_json::to_string(&c).unwrap();
        let back: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn claims_json_contains_expected_keys() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        for key in &["sub", "email", "role", "exp", "iat"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
    }

    #[test]
    fn admin_role_is_privileged() {
        assert!(sample_claims().is_admin());
    }

    #[test]
    fn any_other_role_is_not_privileged() {
        let mut c = sample_claims();
        c.role = "user".to_string();
        assert!(!c.is_admin());

        // Role comparison is exact — no trimming, no case folding.
        c.role = "Admin".to_string();
        assert!(!c.is_admin());
    }

    #[test]
    fn email_plays_no_part_in_privilege() {
        let mut c = sample_claims();
        c.email = "nobody@example.com".to_string();
        assert!(c.is_admin());
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

mod error_tests {
    use shared::types::ErrorResponse;

    #[test]
    fn error_body_has_single_error_key() {
        let json = serde_json::to_value(ErrorResponse::new("Unauthorized")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[test]
    fn error_body_roundtrips() {
        let back: ErrorResponse = serde_json::from_str(r#"{"error":"Forbidden"}"#).unwrap();
        assert_eq!(back.error, "Forbidden");
    }
}

// ---------------------------------------------------------------------------
// Login types
// ---------------------------------------------------------------------------

mod login_tests {
    use shared::types::*;

    #[test]
    fn login_data_accepts_json_body() {
        let data: LoginData =
            serde_json::from_str(r#"{"email":"admin@x.com","password":"correct"}"#).unwrap();
        assert_eq!(data.email, "admin@x.com");
        assert_eq!(data.password, "correct");
    }

    #[test]
    fn login_data_rejects_missing_password() {
        let result = serde_json::from_str::<LoginData>(r#"{"email":"admin@x.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn login_ok_carries_the_email_back() {
        let json = serde_json::to_value(LoginOk::new("admin@x.com")).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["email"], "admin@x.com");
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

mod config_tests {
    use shared::types::server_config::AppConfig;

    #[test]
    fn full_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
                [server]
                bind = "0.0.0.0"
                port = 4810
                max_connections = 200

                [paths]
                web_dir = "/var/www/admin"

                [auth]
                token_ttl_secs = 86400
                jwt_secret = "0123456789abcdef0123456789abcdef"
                secure_cookies = true

                [database]
                url = "postgres://admin:secret@db/tickets"
                pool_size = 8

                [storage]
                endpoint = "http://storage:8333"
                bucket = "td-tickets"
                public_base = "https://files.example.com/td-tickets"
                access_token = "gateway-token"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.addr(), "0.0.0.0:4810");
        assert_eq!(config.database.pool_size, 8);
        assert!(config.auth.secure_cookies);
        assert_eq!(config.storage.bucket.as_deref(), Some("td-tickets"));
    }

    #[test]
    fn database_and_storage_sections_are_optional() {
        let config: AppConfig = toml::from_str(
            r#"
                [server]
                bind = "127.0.0.1"

                [paths]
                web_dir = "web"

                [auth]
            "#,
        )
        .unwrap();

        assert!(config.database.url.is_none());
        assert!(config.storage.endpoint.is_none());
        assert!(config.storage.public_base.is_none());
    }
}
