//! Chat repository for ticket conversation threads.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::ChatEntity;
use crate::metrics::QueryTimer;

/// Repository for ticket chat messages.
#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Creates a new ChatRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a chat message inside a transition transaction.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        ticket_id: Uuid,
        sender_id: Uuid,
        message: Option<&str>,
        file_urls: &[String],
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("insert_ticket_chat");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO ticket_chats (ticket_id, sender_id, message, file_urls)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(ticket_id)
        .bind(sender_id)
        .bind(message)
        .bind(file_urls)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Full conversation for a ticket, oldest first. Ties on the timestamp
    /// break on id so the order is stable.
    pub async fn list_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<ChatEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_ticket_chats");
        let result = sqlx::query_as::<_, ChatEntity>(
            r#"
            SELECT c.id, c.ticket_id, c.sender_id, u.full_name AS sender_name,
                   u.role AS sender_role, c.message, c.file_urls, c.created_at
            FROM ticket_chats c
            JOIN users u ON c.sender_id = u.id
            WHERE c.ticket_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
