//! Chat entries: the append-only message log attached to a ticket.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::user::{UserBrief, UserRole};

/// A single chat entry. Never mutated or deleted once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChatMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender: UserBrief,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub file_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Finds the action-plan entry: the earliest chat sent by a non-customer.
///
/// `chats` must already be ordered ascending by creation time, which is the
/// only order storage ever returns.
pub fn action_plan_index(chats: &[ChatMessage]) -> Option<usize> {
    chats
        .iter()
        .position(|c| c.sender.role != UserRole::Customer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(role: UserRole, minutes: i64) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            ticket_id: Uuid::new_v4(),
            sender: UserBrief {
                id: Uuid::new_v4(),
                full_name: "Tester".to_string(),
                role,
            },
            message: Some("hello".to_string()),
            file_urls: vec![],
            created_at: Utc::now() + chrono::Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_action_plan_skips_customer_messages() {
        let chats = vec![
            chat(UserRole::Customer, 0),
            chat(UserRole::Staff, 1),
            chat(UserRole::Admin, 2),
        ];
        assert_eq!(action_plan_index(&chats), Some(1));
    }

    #[test]
    fn test_action_plan_none_when_only_customers() {
        let chats = vec![chat(UserRole::Customer, 0), chat(UserRole::Customer, 1)];
        assert_eq!(action_plan_index(&chats), None);
    }

    #[test]
    fn test_action_plan_empty_log() {
        assert_eq!(action_plan_index(&[]), None);
    }
}
