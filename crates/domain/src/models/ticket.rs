//! Ticket domain model and request/response types for lifecycle operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chat::ChatMessage;
use crate::models::user::UserBrief;

/// Primary workflow status of a ticket.
///
/// DELAYED is a display bucket for overdue tickets; no transition sets it
/// directly, but it is a valid current state for every query and rule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Waiting,
    Accepted,
    InProgress,
    Delayed,
    Requested,
    Completed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Waiting => write!(f, "WAITING"),
            TicketStatus::Accepted => write!(f, "ACCEPTED"),
            TicketStatus::InProgress => write!(f, "IN_PROGRESS"),
            TicketStatus::Delayed => write!(f, "DELAYED"),
            TicketStatus::Requested => write!(f, "REQUESTED"),
            TicketStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// State of the delay approval sub-workflow. Orthogonal to [`TicketStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelayStatus {
    Pending,
    Approved,
    Rejected,
}

/// State of the completion approval sub-workflow. Orthogonal to [`TicketStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompleteStatus {
    Pending,
    Approved,
    Rejected,
}

/// Channel through which a ticket was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptChannel {
    Online,
    Phone,
    Fax,
    Email,
}

impl Default for ReceiptChannel {
    fn default() -> Self {
        ReceiptChannel::Online
    }
}

/// Full ticket aggregate snapshot, as read from storage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Ticket {
    pub id: Uuid,
    pub project_id: Uuid,
    pub requester_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_company_id: Option<Uuid>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub receipt_channel: ReceiptChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub file_urls: Vec<String>,
    pub is_emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_reason: Option<String>,
    pub is_auto_assigned: bool,
    /// Customer's first-requested completion date. Set once, never changes.
    pub initial_end_date: NaiveDate,
    /// The currently binding completion date; null until first acceptance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_requested_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_delay_reason: Option<String>,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_status: Option<DelayStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_status: Option<CompleteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// The completion date the ticket is currently measured against.
    pub fn effective_end_date(&self) -> NaiveDate {
        self.confirmed_end_date.unwrap_or(self.initial_end_date)
    }

    /// Overdue display rule: end date in the past while work is unfinished.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TicketStatus::Completed && self.effective_end_date() < today
    }
}

/// Request body for ticket intake.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTicketRequest {
    pub project_id: Uuid,
    #[validate(custom(function = "shared::validation::validate_non_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_channel: ReceiptChannel,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_file_urls"))]
    pub file_urls: Vec<String>,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub emergency_reason: Option<String>,
    /// Desired completion date; becomes the immutable initial_end_date.
    pub end_date: NaiveDate,
    /// Staff intake may pre-assign personnel, creating the ticket in ACCEPTED.
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
}

/// Request body for assigning personnel and confirming a date on an
/// ACCEPTED ticket that has no assignees yet.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AcceptTicketRequest {
    pub staff_ids: Vec<Uuid>,
    pub end_date: NaiveDate,
    /// Required when end_date slips past initial_end_date.
    #[serde(default)]
    pub delay_reason: Option<String>,
    /// Optional free-text note appended as a chat entry.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for starting work (ACCEPTED → IN_PROGRESS).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct StartWorkRequest {
    /// Action-plan message; always recorded as a chat entry.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_file_urls"))]
    pub file_urls: Vec<String>,
    /// Required when the ticket has no assignees yet.
    #[serde(default)]
    pub staff_ids: Vec<Uuid>,
    /// Defaults to initial_end_date when omitted.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub delay_reason: Option<String>,
}

/// Request body for appending a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_file_urls"))]
    pub file_urls: Vec<String>,
}

/// Request body for opening the delay sub-workflow.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RequestDelayRequest {
    pub requested_date: NaiveDate,
    #[validate(custom(function = "shared::validation::validate_reason"))]
    pub reason: String,
}

/// Request body for rejecting a delay or completion request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RejectRequest {
    #[validate(custom(function = "shared::validation::validate_reason"))]
    pub reason: String,
}

/// Query parameters for ticket listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTicketsQuery {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    shared::pagination::DEFAULT_PER_PAGE
}

/// List item with requester/project summaries and the overdue display flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TicketSummary {
    pub id: Uuid,
    pub title: String,
    pub status: TicketStatus,
    pub is_emergency: bool,
    pub is_overdue: bool,
    pub project_name: String,
    pub requester_name: String,
    pub initial_end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Response for listing tickets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTicketsResponse {
    pub tickets: Vec<TicketSummary>,
    pub pagination: shared::pagination::Pagination,
}

/// Full detail response: the ticket with its assignees and ordered chat log.
///
/// `action_plan_chat_id` points at the chat entry clients render as the
/// start-of-work plan, when one exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TicketDetailResponse {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub assignees: Vec<UserBrief>,
    pub chats: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_plan_chat_id: Option<Uuid>,
}
