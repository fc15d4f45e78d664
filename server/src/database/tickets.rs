use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Wire shape of a ticket row, joined with its owner's email for display.
#[derive(Debug, Clone, Serialize)]
pub struct TicketRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub user_email: String,
}

/// All tickets with their owner's email, newest first.
pub async fn list(pool: &PgPool) -> sqlx::Result<Vec<TicketRecord>> {
    let rows = sqlx::query(
        "SELECT t.id, t.user_id, t.file_url, t.created_at, u.email AS user_email
         FROM public.tickets t
         JOIN public.users u ON u.id = t.user_id
         ORDER BY t.created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(TicketRecord {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                file_url: row.try_get("file_url")?,
                created_at: row.try_get("created_at")?,
                user_email: row.try_get("user_email")?,
            })
        })
        .collect()
}

/// Insert a ticket and return its id.
pub async fn create(pool: &PgPool, user_id: Uuid, file_url: &str) -> sqlx::Result<Uuid> {
    let row = sqlx::query(
        "INSERT INTO public.tickets (user_id, file_url) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(file_url)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_record_serializes_owner_email() {
        let record = TicketRecord {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            file_url: "https://files.example.com/td-tickets/1-a.pdf".to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            user_email: "user@x.com".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user_email"], "user@x.com");
        assert_eq!(json["file_url"], "https://files.example.com/td-tickets/1-a.pdf");
    }
}
