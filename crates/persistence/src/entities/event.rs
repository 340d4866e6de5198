//! Ticket lifecycle event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::timeline::{TicketEvent, TimelineStage};

/// Database enum for lifecycle event stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_stage")]
pub enum EventStageDb {
    #[sqlx(rename = "WAITING")]
    Waiting,
    #[sqlx(rename = "ACCEPTED")]
    Accepted,
    #[sqlx(rename = "IN_PROGRESS")]
    InProgress,
    #[sqlx(rename = "DELAY_REQUESTED")]
    DelayRequested,
    #[sqlx(rename = "DELAY_APPROVED")]
    DelayApproved,
    #[sqlx(rename = "DELAY_REJECTED")]
    DelayRejected,
    #[sqlx(rename = "COMPLETE_REQUESTED")]
    CompleteRequested,
    #[sqlx(rename = "COMPLETE_REJECTED")]
    CompleteRejected,
    #[sqlx(rename = "COMPLETED")]
    Completed,
}

impl From<EventStageDb> for TimelineStage {
    fn from(stage: EventStageDb) -> Self {
        match stage {
            EventStageDb::Waiting => TimelineStage::Waiting,
            EventStageDb::Accepted => TimelineStage::Accepted,
            EventStageDb::InProgress => TimelineStage::InProgress,
            EventStageDb::DelayRequested => TimelineStage::DelayRequested,
            EventStageDb::DelayApproved => TimelineStage::DelayApproved,
            EventStageDb::DelayRejected => TimelineStage::DelayRejected,
            EventStageDb::CompleteRequested => TimelineStage::CompleteRequested,
            EventStageDb::CompleteRejected => TimelineStage::CompleteRejected,
            EventStageDb::Completed => TimelineStage::Completed,
        }
    }
}

impl From<TimelineStage> for EventStageDb {
    fn from(stage: TimelineStage) -> Self {
        match stage {
            TimelineStage::Waiting => EventStageDb::Waiting,
            TimelineStage::Accepted => EventStageDb::Accepted,
            TimelineStage::InProgress => EventStageDb::InProgress,
            TimelineStage::DelayRequested => EventStageDb::DelayRequested,
            TimelineStage::DelayApproved => EventStageDb::DelayApproved,
            TimelineStage::DelayRejected => EventStageDb::DelayRejected,
            TimelineStage::CompleteRequested => EventStageDb::CompleteRequested,
            TimelineStage::CompleteRejected => EventStageDb::CompleteRejected,
            TimelineStage::Completed => EventStageDb::Completed,
        }
    }
}

/// Database row mapping for the ticket_events audit trail.
#[derive(Debug, Clone, FromRow)]
pub struct TicketEventEntity {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub stage: EventStageDb,
    /// Null for system-triggered transitions (auto-escalation).
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<TicketEventEntity> for TicketEvent {
    fn from(e: TicketEventEntity) -> Self {
        TicketEvent {
            stage: e.stage.into(),
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_db_roundtrip() {
        for stage in [
            TimelineStage::Waiting,
            TimelineStage::Accepted,
            TimelineStage::InProgress,
            TimelineStage::DelayRequested,
            TimelineStage::DelayApproved,
            TimelineStage::DelayRejected,
            TimelineStage::CompleteRequested,
            TimelineStage::CompleteRejected,
            TimelineStage::Completed,
        ] {
            let db: EventStageDb = stage.into();
            let back: TimelineStage = db.into();
            assert_eq!(back, stage);
        }
    }
}
