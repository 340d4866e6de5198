//! Ticket entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::ticket::{
    CompleteStatus, DelayStatus, ReceiptChannel, Ticket, TicketStatus,
};

/// Database enum for the primary ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "ticket_status")]
pub enum TicketStatusDb {
    #[sqlx(rename = "WAITING")]
    Waiting,
    #[sqlx(rename = "ACCEPTED")]
    Accepted,
    #[sqlx(rename = "IN_PROGRESS")]
    InProgress,
    #[sqlx(rename = "DELAYED")]
    Delayed,
    #[sqlx(rename = "REQUESTED")]
    Requested,
    #[sqlx(rename = "COMPLETED")]
    Completed,
}

impl From<TicketStatusDb> for TicketStatus {
    fn from(status: TicketStatusDb) -> Self {
        match status {
            TicketStatusDb::Waiting => TicketStatus::Waiting,
            TicketStatusDb::Accepted => TicketStatus::Accepted,
            TicketStatusDb::InProgress => TicketStatus::InProgress,
            TicketStatusDb::Delayed => TicketStatus::Delayed,
            TicketStatusDb::Requested => TicketStatus::Requested,
            TicketStatusDb::Completed => TicketStatus::Completed,
        }
    }
}

impl From<TicketStatus> for TicketStatusDb {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Waiting => TicketStatusDb::Waiting,
            TicketStatus::Accepted => TicketStatusDb::Accepted,
            TicketStatus::InProgress => TicketStatusDb::InProgress,
            TicketStatus::Delayed => TicketStatusDb::Delayed,
            TicketStatus::Requested => TicketStatusDb::Requested,
            TicketStatus::Completed => TicketStatusDb::Completed,
        }
    }
}

/// Database enum for the delay sub-workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delay_status")]
pub enum DelayStatusDb {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[sqlx(rename = "REJECTED")]
    Rejected,
}

impl From<DelayStatusDb> for DelayStatus {
    fn from(status: DelayStatusDb) -> Self {
        match status {
            DelayStatusDb::Pending => DelayStatus::Pending,
            DelayStatusDb::Approved => DelayStatus::Approved,
            DelayStatusDb::Rejected => DelayStatus::Rejected,
        }
    }
}

/// Database enum for the completion sub-workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "complete_status")]
pub enum CompleteStatusDb {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[sqlx(rename = "REJECTED")]
    Rejected,
}

impl From<CompleteStatusDb> for CompleteStatus {
    fn from(status: CompleteStatusDb) -> Self {
        match status {
            CompleteStatusDb::Pending => CompleteStatus::Pending,
            CompleteStatusDb::Approved => CompleteStatus::Approved,
            CompleteStatusDb::Rejected => CompleteStatus::Rejected,
        }
    }
}

/// Database enum for the receipt channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "receipt_channel")]
pub enum ReceiptChannelDb {
    #[sqlx(rename = "ONLINE")]
    Online,
    #[sqlx(rename = "PHONE")]
    Phone,
    #[sqlx(rename = "FAX")]
    Fax,
    #[sqlx(rename = "EMAIL")]
    Email,
}

impl From<ReceiptChannelDb> for ReceiptChannel {
    fn from(channel: ReceiptChannelDb) -> Self {
        match channel {
            ReceiptChannelDb::Online => ReceiptChannel::Online,
            ReceiptChannelDb::Phone => ReceiptChannel::Phone,
            ReceiptChannelDb::Fax => ReceiptChannel::Fax,
            ReceiptChannelDb::Email => ReceiptChannel::Email,
        }
    }
}

impl From<ReceiptChannel> for ReceiptChannelDb {
    fn from(channel: ReceiptChannel) -> Self {
        match channel {
            ReceiptChannel::Online => ReceiptChannelDb::Online,
            ReceiptChannel::Phone => ReceiptChannelDb::Phone,
            ReceiptChannel::Fax => ReceiptChannelDb::Fax,
            ReceiptChannel::Email => ReceiptChannelDb::Email,
        }
    }
}

/// Database row mapping for the tickets table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEntity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub requester_id: Uuid,
    pub customer_company_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub receipt_channel: ReceiptChannelDb,
    pub category: Option<String>,
    pub file_urls: Vec<String>,
    pub is_emergency: bool,
    pub emergency_reason: Option<String>,
    pub is_auto_assigned: bool,
    pub initial_end_date: NaiveDate,
    pub confirmed_end_date: Option<NaiveDate>,
    pub delay_requested_date: Option<NaiveDate>,
    pub processing_delay_reason: Option<String>,
    pub status: TicketStatusDb,
    pub delay_status: Option<DelayStatusDb>,
    pub delay_reason: Option<String>,
    pub delay_rejection_reason: Option<String>,
    pub complete_status: Option<CompleteStatusDb>,
    pub complete_rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketEntity> for Ticket {
    fn from(e: TicketEntity) -> Self {
        Ticket {
            id: e.id,
            project_id: e.project_id,
            requester_id: e.requester_id,
            customer_company_id: e.customer_company_id,
            title: e.title,
            description: e.description,
            receipt_channel: e.receipt_channel.into(),
            category: e.category,
            file_urls: e.file_urls,
            is_emergency: e.is_emergency,
            emergency_reason: e.emergency_reason,
            is_auto_assigned: e.is_auto_assigned,
            initial_end_date: e.initial_end_date,
            confirmed_end_date: e.confirmed_end_date,
            delay_requested_date: e.delay_requested_date,
            processing_delay_reason: e.processing_delay_reason,
            status: e.status.into(),
            delay_status: e.delay_status.map(Into::into),
            delay_reason: e.delay_reason,
            delay_rejection_reason: e.delay_rejection_reason,
            complete_status: e.complete_status.map(Into::into),
            complete_rejection_reason: e.complete_rejection_reason,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Database row mapping for the ticket_assignees join table, with the
/// assignee's user details for display.
#[derive(Debug, Clone, FromRow)]
pub struct TicketAssigneeEntity {
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub role: super::UserRoleDb,
    pub created_at: DateTime<Utc>,
}

/// List row with requester/project names joined in.
#[derive(Debug, Clone, FromRow)]
pub struct TicketSummaryEntity {
    pub id: Uuid,
    pub title: String,
    pub status: TicketStatusDb,
    pub is_emergency: bool,
    pub initial_end_date: NaiveDate,
    pub confirmed_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub project_name: String,
    pub requester_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_db_roundtrip() {
        for status in [
            TicketStatus::Waiting,
            TicketStatus::Accepted,
            TicketStatus::InProgress,
            TicketStatus::Delayed,
            TicketStatus::Requested,
            TicketStatus::Completed,
        ] {
            let db: TicketStatusDb = status.into();
            let back: TicketStatus = db.into();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_receipt_channel_db_roundtrip() {
        for channel in [
            ReceiptChannel::Online,
            ReceiptChannel::Phone,
            ReceiptChannel::Fax,
            ReceiptChannel::Email,
        ] {
            let db: ReceiptChannelDb = channel.into();
            let back: ReceiptChannel = db.into();
            assert_eq!(back, channel);
        }
    }
}
