//! Timeline projection.
//!
//! Derives an ordered sequence of timeline markers from a ticket's stored
//! lifecycle events and its current status. The projection is recomputed on
//! every read and never persisted, so the stored status remains the single
//! source of truth.

use crate::models::ticket::TicketStatus;
use crate::models::timeline::{MarkerState, TicketEvent, TimelineMarker, TimelineStage};

/// Stages that always appear at the head of the timeline, in order.
const CORE_STAGES: [TimelineStage; 3] = [
    TimelineStage::Waiting,
    TimelineStage::Accepted,
    TimelineStage::InProgress,
];

/// Projects the timeline for a ticket.
///
/// `events` must be ordered ascending by creation time. The head of the
/// result is always WAITING/ACCEPTED/IN_PROGRESS (done or pending), followed
/// by delay and completion events in chronological order, ending with a final
/// COMPLETED marker whose state reflects the current status.
pub fn project_timeline(events: &[TicketEvent], status: TicketStatus) -> Vec<TimelineMarker> {
    let mut markers: Vec<TimelineMarker> = Vec::with_capacity(events.len() + 4);

    for stage in CORE_STAGES {
        let occurred = events.iter().find(|e| e.stage == stage);
        markers.push(match occurred {
            Some(event) => TimelineMarker {
                stage,
                state: MarkerState::Done,
                occurred_at: Some(event.created_at),
            },
            None => TimelineMarker {
                stage,
                state: MarkerState::Pending,
                occurred_at: None,
            },
        });
    }

    for event in events {
        match event.stage {
            TimelineStage::DelayRequested
            | TimelineStage::DelayApproved
            | TimelineStage::DelayRejected
            | TimelineStage::CompleteRequested
            | TimelineStage::CompleteRejected => markers.push(TimelineMarker {
                stage: event.stage,
                state: MarkerState::Done,
                occurred_at: Some(event.created_at),
            }),
            _ => {}
        }
    }

    let completed_at = events
        .iter()
        .find(|e| e.stage == TimelineStage::Completed)
        .map(|e| e.created_at);
    let state = match status {
        TicketStatus::Completed => MarkerState::Done,
        TicketStatus::Requested => MarkerState::Requested,
        _ => MarkerState::Pending,
    };
    markers.push(TimelineMarker {
        stage: TimelineStage::Completed,
        state,
        occurred_at: completed_at,
    });

    markers
}
