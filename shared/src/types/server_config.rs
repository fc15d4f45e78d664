use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    /// Directory holding the login and dashboard pages.
    pub web_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Session lifetime — also the cookie `Max-Age`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// HMAC key used to sign and verify session tokens.
    ///
    /// Prefer loading this via the `JWT_SECRET` environment variable.  This
    /// config field is the fallback for deployments that cannot inject env
    /// vars at runtime.
    ///
    /// **Minimum length:** 32 characters when present.
    /// **Absence is a runtime state, not a startup error:** the gate
    /// answers 503 on protected APIs and lets page navigation through
    /// until a secret is provided (see the gate module).
    pub jwt_secret: Option<String>,

    /// Set when the panel is served over TLS so the session cookie carries
    /// the `Secure` attribute.
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Postgres connection URL. `DATABASE_URL` env var takes priority.
    /// When neither is set, data endpoints answer 503.
    pub url: Option<String>,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Base URL of the object-storage gateway, e.g. `http://storage:8333`.
    pub endpoint: Option<String>,

    /// Bucket the panel reads and writes, e.g. `td-tickets`.
    pub bucket: Option<String>,

    /// Public base URL uploaded objects are served from. Required for
    /// uploads only; the file proxy works without it.
    pub public_base: Option<String>,

    /// Static bearer token the gateway expects, if any.
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"0.0.0.0:4810"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl AuthConfig {
    /// Resolve the signing secret with the `JWT_SECRET` env var taking
    /// priority over the config file field.
    ///
    /// Returns `None` when neither source is set — the gate treats that as
    /// the misconfigured state rather than refusing to start.
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.jwt_secret.clone())
            .filter(|s| !s.is_empty())
    }
}

impl DatabaseConfig {
    /// Resolve the connection URL with `DATABASE_URL` taking priority.
    pub fn resolved_url(&self) -> Option<String> {
        std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.url.clone())
            .filter(|s| !s.is_empty())
    }
}

impl StorageConfig {
    pub fn resolved_endpoint(&self) -> Option<String> {
        env_or("OBJECT_STORE_ENDPOINT", &self.endpoint)
    }

    pub fn resolved_bucket(&self) -> Option<String> {
        env_or("OBJECT_STORE_BUCKET", &self.bucket)
    }

    pub fn resolved_public_base(&self) -> Option<String> {
        env_or("OBJECT_STORE_PUBLIC_URL", &self.public_base)
    }

    pub fn resolved_access_token(&self) -> Option<String> {
        env_or("OBJECT_STORE_TOKEN", &self.access_token)
    }
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.clone())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_port() -> u16 {
    4810
}

pub fn default_max_connections() -> usize {
    1000
}

/// 24 hours.
pub fn default_token_ttl() -> u64 {
    86_400
}

pub fn default_pool_size() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            [server]
            bind = "127.0.0.1"

            [paths]
            web_dir = "web"

            [auth]
        "#
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.server.port, 4810);
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(!config.auth.secure_cookies);
        assert!(config.database.url.is_none());
        assert!(config.storage.endpoint.is_none());
    }

    #[test]
    fn addr_joins_bind_and_port() {
        let config: AppConfig = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:4810");
    }

    #[test]
    fn storage_section_parses() {
        let config: AppConfig = toml::from_str(
            r#"
                [server]
                bind = "0.0.0.0"

                [paths]
                web_dir = "web"

                [auth]
                token_ttl_secs = 3600

                [storage]
                endpoint = "http://storage:8333"
                bucket = "td-tickets"
                public_base = "https://files.example.com/td-tickets"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(
            config.storage.resolved_bucket().as_deref(),
            Some("td-tickets")
        );
        assert!(config.storage.resolved_access_token().is_none());
    }

    #[test]
    fn empty_secret_field_resolves_to_none() {
        let auth = AuthConfig {
            token_ttl_secs: 60,
            jwt_secret: Some(String::new()),
            secure_cookies: false,
        };
        assert!(auth.resolved_jwt_secret().is_none());
    }
}
