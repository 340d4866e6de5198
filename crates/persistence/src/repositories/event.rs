//! Event repository for the ticket audit trail.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{EventStageDb, TicketEventEntity};
use crate::metrics::QueryTimer;

/// Repository for ticket lifecycle events.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a lifecycle event. Actor is None for system-initiated
    /// transitions such as the auto-escalation sweep.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        ticket_id: Uuid,
        stage: EventStageDb,
        actor_id: Option<Uuid>,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("insert_ticket_event");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO ticket_events (ticket_id, stage, actor_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(ticket_id)
        .bind(stage)
        .bind(actor_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Events for a ticket in chronological order.
    pub async fn list_for_ticket(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_ticket_events");
        let result = sqlx::query_as::<_, TicketEventEntity>(
            r#"
            SELECT id, ticket_id, stage, actor_id, created_at
            FROM ticket_events
            WHERE ticket_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
