//! Auto-escalation background job.
//!
//! WAITING tickets that nobody opened within the configured window move to
//! ACCEPTED automatically with `is_auto_assigned` set, and each escalation
//! writes an ACCEPTED audit event with no actor.

use sqlx::PgPool;
use tracing::info;

use persistence::entities::EventStageDb;
use persistence::repositories::{EventRepository, TicketRepository};

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_ticket_auto_escalated;

/// Background job that escalates stale WAITING tickets.
pub struct AutoEscalateJob {
    pool: PgPool,
    interval_mins: u64,
    after_hours: i64,
}

impl AutoEscalateJob {
    pub fn new(pool: PgPool, interval_mins: u64, after_hours: i64) -> Self {
        Self {
            pool,
            interval_mins,
            after_hours,
        }
    }

    /// One sweep: lock eligible tickets, escalate each, and write its audit
    /// event in the same transaction. SKIP LOCKED keeps concurrent instances
    /// from double-escalating.
    async fn escalate_stale_tickets(&self) -> Result<u64, sqlx::Error> {
        let tickets = TicketRepository::new(self.pool.clone());
        let events = EventRepository::new(self.pool.clone());

        let mut tx = self.pool.begin().await?;
        let ids = tickets
            .waiting_ticket_ids_older_than(&mut *tx, self.after_hours)
            .await?;

        let mut escalated: u64 = 0;
        for id in ids {
            if tickets.escalate_one(&mut *tx, id).await? > 0 {
                events
                    .insert(&mut *tx, id, EventStageDb::Accepted, None)
                    .await?;
                escalated += 1;
            }
        }
        tx.commit().await?;

        Ok(escalated)
    }
}

#[async_trait::async_trait]
impl Job for AutoEscalateJob {
    fn name(&self) -> &'static str {
        "auto_escalate"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_mins)
    }

    async fn execute(&self) -> Result<(), String> {
        let escalated = self
            .escalate_stale_tickets()
            .await
            .map_err(|e| format!("Auto-escalation sweep failed: {}", e))?;

        if escalated > 0 {
            for _ in 0..escalated {
                record_ticket_auto_escalated();
            }
            info!(escalated, after_hours = self.after_hours, "Escalated stale tickets");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_frequency_follows_config() {
        let freq = JobFrequency::Minutes(10);
        assert_eq!(freq.duration().as_secs(), 600);
    }
}
