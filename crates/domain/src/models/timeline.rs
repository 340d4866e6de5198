//! Timeline projection types.
//!
//! The timeline is a read-only derived view over stored lifecycle events and
//! the current status; it is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lifecycle stage recorded in the audit trail or synthesized as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineStage {
    Waiting,
    Accepted,
    InProgress,
    DelayRequested,
    DelayApproved,
    DelayRejected,
    CompleteRequested,
    CompleteRejected,
    Completed,
}

impl std::fmt::Display for TimelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimelineStage::Waiting => "WAITING",
            TimelineStage::Accepted => "ACCEPTED",
            TimelineStage::InProgress => "IN_PROGRESS",
            TimelineStage::DelayRequested => "DELAY_REQUESTED",
            TimelineStage::DelayApproved => "DELAY_APPROVED",
            TimelineStage::DelayRejected => "DELAY_REJECTED",
            TimelineStage::CompleteRequested => "COMPLETE_REQUESTED",
            TimelineStage::CompleteRejected => "COMPLETE_REJECTED",
            TimelineStage::Completed => "COMPLETED",
        };
        write!(f, "{}", s)
    }
}

/// A stored lifecycle event: one row per transition.
#[derive(Debug, Clone)]
pub struct TicketEvent {
    pub stage: TimelineStage,
    pub created_at: DateTime<Utc>,
}

/// Rendering state of a timeline marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerState {
    /// The stage happened; `occurred_at` is set.
    Done,
    /// Completion has been requested but not yet approved.
    Requested,
    /// Placeholder for a stage not yet reached.
    Pending,
}

/// One entry of the projected timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineMarker {
    pub stage: TimelineStage,
    pub state: MarkerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Response body for the timeline endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineResponse {
    pub markers: Vec<TimelineMarker>,
}
