use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Minimal data needed to verify an account's credentials.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Wire shape of a user row on the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Get account credentials by email. The caller normalizes the email
/// (trim + lowercase) before the lookup.
pub async fn get_auth_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<UserAuth>> {
    let row = sqlx::query(
        "SELECT id, email, password_hash, role FROM public.users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(UserAuth {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
        })),
        None => Ok(None),
    }
}

/// All users, newest first.
pub async fn list(pool: &PgPool) -> sqlx::Result<Vec<UserRecord>> {
    let rows = sqlx::query(
        "SELECT id, email, role, created_at FROM public.users ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(UserRecord {
                id: row.try_get("id")?,
                email: row.try_get("email")?,
                role: row.try_get("role")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}
