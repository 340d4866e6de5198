//! Ticket repository for database operations.
//!
//! Lifecycle transitions are written inside a caller-owned transaction; the
//! write methods here take `&mut PgConnection` so status updates, assignee
//! rows, chat rows, and audit events commit or roll back together. Guarded
//! updates return the number of affected rows; zero means the optimistic
//! status precondition no longer held.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    ReceiptChannelDb, TicketAssigneeEntity, TicketEntity, TicketStatusDb, TicketSummaryEntity,
};
use crate::metrics::QueryTimer;

const TICKET_COLUMNS: &str = r#"id, project_id, requester_id, customer_company_id, title,
       description, receipt_channel, category, file_urls, is_emergency,
       emergency_reason, is_auto_assigned, initial_end_date, confirmed_end_date,
       delay_requested_date, processing_delay_reason, status, delay_status,
       delay_reason, delay_rejection_reason, complete_status,
       complete_rejection_reason, created_at, updated_at"#;

/// Fields for inserting a new ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
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
    pub initial_end_date: NaiveDate,
    pub status: TicketStatusDb,
}

/// Filters for ticket listing.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatusDb>,
    pub project_id: Option<Uuid>,
    /// Restricts results to projects of one customer company.
    pub customer_company_id: Option<Uuid>,
}

/// Repository for ticket-related database operations.
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Creates a new TicketRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new ticket.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        ticket: &NewTicket,
    ) -> Result<TicketEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_ticket");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            INSERT INTO tickets (project_id, requester_id, customer_company_id, title,
                                 description, receipt_channel, category, file_urls,
                                 is_emergency, emergency_reason, initial_end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket.project_id)
        .bind(ticket.requester_id)
        .bind(ticket.customer_company_id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.receipt_channel)
        .bind(&ticket.category)
        .bind(&ticket.file_urls)
        .bind(ticket.is_emergency)
        .bind(&ticket.emergency_reason)
        .bind(ticket.initial_end_date)
        .bind(ticket.status)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_ticket_by_id");
        let result = sqlx::query_as::<_, TicketEntity>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM tickets
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List ticket summaries, newest first.
    pub async fn list(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TicketSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_tickets");
        let result = sqlx::query_as::<_, TicketSummaryEntity>(
            r#"
            SELECT t.id, t.title, t.status, t.is_emergency, t.initial_end_date,
                   t.confirmed_end_date, t.created_at,
                   p.name AS project_name, u.full_name AS requester_name
            FROM tickets t
            JOIN projects p ON t.project_id = p.id
            JOIN users u ON t.requester_id = u.id
            WHERE ($1::ticket_status IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.project_id = $2)
              AND ($3::uuid IS NULL OR t.customer_company_id = $3)
            ORDER BY t.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.status)
        .bind(filter.project_id)
        .bind(filter.customer_company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count tickets matching a filter.
    pub async fn count(&self, filter: &TicketFilter) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_tickets");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM tickets t
            WHERE ($1::ticket_status IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.project_id = $2)
              AND ($3::uuid IS NULL OR t.customer_company_id = $3)
            "#,
        )
        .bind(filter.status)
        .bind(filter.project_id)
        .bind(filter.customer_company_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert assignee rows for a ticket.
    pub async fn insert_assignees(
        &self,
        conn: &mut PgConnection,
        ticket_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_ticket_assignees");
        let result = sqlx::query(
            r#"
            INSERT INTO ticket_assignees (ticket_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT (ticket_id, user_id) DO NOTHING
            "#,
        )
        .bind(ticket_id)
        .bind(user_ids)
        .execute(conn)
        .await
        .map(|_| ());
        timer.record();
        result
    }

    /// Count assignees on a ticket.
    pub async fn count_assignees(&self, ticket_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_ticket_assignees");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ticket_assignees WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List assignees with their user details.
    pub async fn list_assignees(
        &self,
        ticket_id: Uuid,
    ) -> Result<Vec<TicketAssigneeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_ticket_assignees");
        let result = sqlx::query_as::<_, TicketAssigneeEntity>(
            r#"
            SELECT ta.ticket_id, ta.user_id, u.full_name, u.role, ta.created_at
            FROM ticket_assignees ta
            JOIN users u ON ta.user_id = u.id
            WHERE ta.ticket_id = $1
            ORDER BY ta.created_at ASC
            "#,
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// WAITING → ACCEPTED for an internal viewer opening the ticket.
    /// Idempotent: returns 0 when the ticket already left WAITING.
    pub async fn mark_accepted(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_ticket_accepted");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'ACCEPTED', updated_at = NOW()
            WHERE id = $1 AND status = 'WAITING'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// Confirm the completion date on an ACCEPTED ticket.
    pub async fn confirm_end_date(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        confirmed_end_date: NaiveDate,
        processing_delay_reason: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("confirm_ticket_end_date");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET confirmed_end_date = $2, processing_delay_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'ACCEPTED'
            "#,
        )
        .bind(id)
        .bind(confirmed_end_date)
        .bind(processing_delay_reason)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// ACCEPTED → IN_PROGRESS with the resolved completion date.
    pub async fn start_work(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        confirmed_end_date: NaiveDate,
        processing_delay_reason: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("start_ticket_work");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'IN_PROGRESS', confirmed_end_date = $2,
                processing_delay_reason = COALESCE($3, processing_delay_reason),
                updated_at = NOW()
            WHERE id = $1 AND status = 'ACCEPTED'
            "#,
        )
        .bind(id)
        .bind(confirmed_end_date)
        .bind(processing_delay_reason)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// Open the delay sub-workflow. Guards against an already-pending delay
    /// or an outstanding completion request.
    pub async fn open_delay_request(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        requested_date: NaiveDate,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("open_delay_request");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET delay_status = 'PENDING', delay_requested_date = $2, delay_reason = $3,
                delay_rejection_reason = NULL, updated_at = NOW()
            WHERE id = $1
              AND status IN ('IN_PROGRESS', 'DELAYED')
              AND delay_status IS DISTINCT FROM 'PENDING'
              AND complete_status IS DISTINCT FROM 'PENDING'
            "#,
        )
        .bind(id)
        .bind(requested_date)
        .bind(reason)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// Approve a pending delay: the requested date becomes binding.
    pub async fn approve_delay(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("approve_delay");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET confirmed_end_date = delay_requested_date, delay_status = 'APPROVED',
                delay_requested_date = NULL, updated_at = NOW()
            WHERE id = $1 AND delay_status = 'PENDING' AND delay_requested_date IS NOT NULL
            "#,
        )
        .bind(id)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// Reject a pending delay; the confirmed date stays unchanged.
    pub async fn reject_delay(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reject_delay");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET delay_status = 'REJECTED', delay_rejection_reason = $2,
                delay_requested_date = NULL, updated_at = NOW()
            WHERE id = $1 AND delay_status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// IN_PROGRESS/DELAYED → REQUESTED with a pending completion request.
    pub async fn request_completion(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("request_completion");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'REQUESTED', complete_status = 'PENDING', updated_at = NOW()
            WHERE id = $1
              AND status IN ('IN_PROGRESS', 'DELAYED')
              AND delay_status IS DISTINCT FROM 'PENDING'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// REQUESTED → COMPLETED. Terminal.
    pub async fn approve_completion(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("approve_completion");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'COMPLETED', complete_status = 'APPROVED', updated_at = NOW()
            WHERE id = $1 AND complete_status = 'PENDING'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// REQUESTED → IN_PROGRESS on completion rejection.
    pub async fn reject_completion(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reject_completion");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'IN_PROGRESS', complete_status = 'REJECTED',
                complete_rejection_reason = $2, updated_at = NOW()
            WHERE id = $1 AND complete_status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }

    /// IDs of WAITING tickets eligible for escalation; used to write an
    /// ACCEPTED audit event per escalated ticket inside the sweep.
    pub async fn waiting_ticket_ids_older_than(
        &self,
        conn: &mut PgConnection,
        older_than_hours: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("waiting_ticket_ids_older_than");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM tickets
            WHERE status = 'WAITING'
              AND created_at < NOW() - make_interval(hours => $1::int)
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(older_than_hours)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Escalate one WAITING ticket inside the sweep transaction.
    pub async fn escalate_one(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("escalate_one_ticket");
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'ACCEPTED', is_auto_assigned = TRUE, updated_at = NOW()
            WHERE id = $1 AND status = 'WAITING'
            "#,
        )
        .bind(id)
        .execute(conn)
        .await
        .map(|r| r.rows_affected());
        timer.record();
        result
    }
}
