pub mod claims;
pub mod json_error;
pub mod login;
pub mod server_config;

pub use self::claims::{ROLE_ADMIN, SessionClaims};
pub use self::json_error::ErrorResponse;
pub use self::login::{LoginData, LoginError, LoginOk};
pub use self::server_config::{AppConfig, ConfigError};
