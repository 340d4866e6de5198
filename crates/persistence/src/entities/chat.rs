//! Chat entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::chat::ChatMessage;
use domain::models::user::UserBrief;

use super::UserRoleDb;

/// Database row mapping for the ticket_chats table, with the sender's user
/// details joined in.
#[derive(Debug, Clone, FromRow)]
pub struct ChatEntity {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_role: UserRoleDb,
    pub message: Option<String>,
    pub file_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatEntity> for ChatMessage {
    fn from(e: ChatEntity) -> Self {
        ChatMessage {
            id: e.id,
            ticket_id: e.ticket_id,
            sender: UserBrief {
                id: e.sender_id,
                full_name: e.sender_name,
                role: e.sender_role.into(),
            },
            message: e.message,
            file_urls: e.file_urls,
            created_at: e.created_at,
        }
    }
}
