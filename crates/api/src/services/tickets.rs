//! Ticket lifecycle orchestration.
//!
//! Every transition runs in a single transaction: the guarded status update,
//! its audit event, and any chat entry commit together or not at all. A
//! guarded update that matches zero rows means another request changed the
//! ticket first and surfaces as a conflict.

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use domain::models::project::ProjectStaffResponse;
use domain::models::ticket::{
    AcceptTicketRequest, AddCommentRequest, CreateTicketRequest, ListTicketsQuery,
    ListTicketsResponse, RejectRequest, RequestDelayRequest, StartWorkRequest,
    TicketDetailResponse, TicketStatus, TicketSummary,
};
use domain::models::timeline::{TicketEvent, TimelineResponse};
use domain::models::user::UserBrief;
use domain::models::{Actor, ChatMessage, Ticket, UserRole};
use domain::services::calendar::BusinessCalendar;
use domain::services::{lifecycle, timeline};
use persistence::entities::{EventStageDb, TicketStatusDb};
use persistence::repositories::{
    ChatRepository, EventRepository, NewTicket, ProjectRepository, TicketFilter, TicketRepository,
    UserRepository,
};
use shared::pagination::{PageQuery, Pagination};

use crate::error::ApiError;
use crate::middleware::metrics::record_ticket_transition;

/// Orchestrates ticket lifecycle operations against the repositories.
pub struct TicketService {
    pool: PgPool,
    calendar: Arc<BusinessCalendar>,
    tickets: TicketRepository,
    chats: ChatRepository,
    events: EventRepository,
    users: UserRepository,
    projects: ProjectRepository,
}

impl TicketService {
    pub fn new(pool: PgPool, calendar: Arc<BusinessCalendar>) -> Self {
        Self {
            tickets: TicketRepository::new(pool.clone()),
            chats: ChatRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            pool,
            calendar,
        }
    }

    /// Transition 1: intake. Customer intake lands in WAITING; internal
    /// intake with assignees lands directly in ACCEPTED.
    pub async fn create_ticket(
        &self,
        actor: &Actor,
        request: CreateTicketRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        request.validate()?;

        let project = self
            .projects
            .find_by_id(request.project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
        if !project.is_active {
            return Err(ApiError::Validation("Project is not active".to_string()));
        }

        // Customers can only file tickets against their own company's projects.
        if actor.role == UserRole::Customer
            && project.customer_company_id != actor.customer_company_id
        {
            return Err(ApiError::NotFound("Project not found".to_string()));
        }

        let today = Utc::now().date_naive();
        let outcome = lifecycle::validate_intake(&request, actor.role, today, &self.calendar)?;

        if !outcome.assignee_ids.is_empty() {
            self.check_assignable(&outcome.assignee_ids).await?;
        }

        let new_ticket = NewTicket {
            project_id: project.id,
            requester_id: actor.user_id,
            customer_company_id: project.customer_company_id,
            title: request.title.clone(),
            description: request.description.clone(),
            receipt_channel: request.receipt_channel.into(),
            category: request.category.clone(),
            file_urls: request.file_urls.clone(),
            is_emergency: request.is_emergency,
            emergency_reason: request.emergency_reason.clone(),
            initial_end_date: request.end_date,
            status: outcome.status.into(),
        };

        let mut tx = self.pool.begin().await?;
        let entity = self.tickets.create(&mut *tx, &new_ticket).await?;
        let ticket_id = entity.id;

        if !outcome.assignee_ids.is_empty() {
            self.tickets
                .insert_assignees(&mut *tx, ticket_id, &outcome.assignee_ids)
                .await?;
        }

        self.events
            .insert(&mut *tx, ticket_id, EventStageDb::Waiting, Some(actor.user_id))
            .await?;
        if outcome.status == TicketStatus::Accepted {
            self.events
                .insert(&mut *tx, ticket_id, EventStageDb::Accepted, Some(actor.user_id))
                .await?;
        }
        tx.commit().await?;

        record_ticket_transition(&outcome.status.to_string());
        tracing::info!(
            ticket_id = %ticket_id,
            status = %outcome.status,
            is_emergency = request.is_emergency,
            "Ticket created"
        );

        self.assemble_detail(entity.into()).await
    }

    /// Paginated ticket listing. Customers only see their company's tickets.
    pub async fn list_tickets(
        &self,
        actor: &Actor,
        query: ListTicketsQuery,
    ) -> Result<ListTicketsResponse, ApiError> {
        let filter = TicketFilter {
            status: query.status.map(TicketStatusDb::from),
            project_id: query.project_id,
            customer_company_id: actor.customer_company_id,
        };
        let page = PageQuery {
            page: query.page,
            per_page: query.per_page,
        };

        let rows = self.tickets.list(&filter, page.limit(), page.offset()).await?;
        let total = self.tickets.count(&filter).await?;

        let today = Utc::now().date_naive();
        let tickets = rows
            .into_iter()
            .map(|row| {
                let status: TicketStatus = row.status.into();
                let effective = row.confirmed_end_date.unwrap_or(row.initial_end_date);
                TicketSummary {
                    id: row.id,
                    title: row.title,
                    is_overdue: status != TicketStatus::Completed && effective < today,
                    status,
                    is_emergency: row.is_emergency,
                    project_name: row.project_name,
                    requester_name: row.requester_name,
                    initial_end_date: row.initial_end_date,
                    confirmed_end_date: row.confirmed_end_date,
                    created_at: row.created_at,
                }
            })
            .collect();

        Ok(ListTicketsResponse {
            tickets,
            pagination: Pagination::new(&page, total),
        })
    }

    /// Full ticket detail with assignees and the ordered chat log.
    pub async fn get_ticket(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TicketDetailResponse, ApiError> {
        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 3: implicit acceptance when an internal viewer opens a
    /// WAITING ticket. Idempotent.
    pub async fn ensure_accepted(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TicketDetailResponse, ApiError> {
        require_staff(actor)?;
        let ticket = self.load_scoped(actor, ticket_id).await?;

        if lifecycle::should_ensure_accepted(&ticket) {
            let mut tx = self.pool.begin().await?;
            let updated = self.tickets.mark_accepted(&mut *tx, ticket_id).await?;
            if updated > 0 {
                self.events
                    .insert(&mut *tx, ticket_id, EventStageDb::Accepted, Some(actor.user_id))
                    .await?;
            }
            tx.commit().await?;

            if updated > 0 {
                record_ticket_transition("ACCEPTED");
                tracing::info!(ticket_id = %ticket_id, "Ticket accepted on first internal view");
            }
        }

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 4: assign personnel and confirm the completion date on an
    /// ACCEPTED ticket.
    pub async fn accept_ticket(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: AcceptTicketRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        require_staff(actor)?;
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;

        let today = Utc::now().date_naive();
        let outcome = lifecycle::validate_accept(&ticket, &request, today, &self.calendar)?;
        self.check_assignable(&request.staff_ids).await?;

        let mut tx = self.pool.begin().await?;
        let updated = self
            .tickets
            .confirm_end_date(
                &mut *tx,
                ticket_id,
                outcome.confirmed_end_date,
                outcome.processing_delay_reason.as_deref(),
            )
            .await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.tickets
            .insert_assignees(&mut *tx, ticket_id, &request.staff_ids)
            .await?;
        if let Some(note) = request.note.as_deref().filter(|n| !n.trim().is_empty()) {
            self.chats
                .insert(&mut *tx, ticket_id, actor.user_id, Some(note), &[])
                .await?;
        }
        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            confirmed_end_date = %outcome.confirmed_end_date,
            assignees = request.staff_ids.len(),
            "Personnel assigned and completion date confirmed"
        );

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 5: start work. The first message becomes the action plan
    /// entry in the chat log.
    pub async fn start_work(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: StartWorkRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        require_staff(actor)?;
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;

        let plan_message = request.message.trim();
        if plan_message.is_empty() && request.file_urls.is_empty() {
            return Err(ApiError::Validation(
                "message: starting work requires an action plan entry".to_string(),
            ));
        }

        let existing = self.tickets.count_assignees(ticket_id).await?;
        let today = Utc::now().date_naive();
        let outcome = lifecycle::validate_start_work(
            &ticket,
            &request,
            existing as usize,
            today,
            &self.calendar,
        )?;
        if !outcome.staff_to_assign.is_empty() {
            self.check_assignable(&outcome.staff_to_assign).await?;
        }

        let mut tx = self.pool.begin().await?;
        let updated = self
            .tickets
            .start_work(
                &mut *tx,
                ticket_id,
                outcome.confirmed_end_date,
                outcome.processing_delay_reason.as_deref(),
            )
            .await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        if !outcome.staff_to_assign.is_empty() {
            self.tickets
                .insert_assignees(&mut *tx, ticket_id, &outcome.staff_to_assign)
                .await?;
        }
        self.chats
            .insert(
                &mut *tx,
                ticket_id,
                actor.user_id,
                (!plan_message.is_empty()).then_some(plan_message),
                &request.file_urls,
            )
            .await?;
        self.events
            .insert(&mut *tx, ticket_id, EventStageDb::InProgress, Some(actor.user_id))
            .await?;
        tx.commit().await?;

        record_ticket_transition("IN_PROGRESS");
        tracing::info!(ticket_id = %ticket_id, "Work started");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 6: append a chat entry. No status change.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: AddCommentRequest,
    ) -> Result<ChatMessage, ApiError> {
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;
        lifecycle::validate_add_comment(&ticket, &request)?;

        let message = request.message.trim();
        let message = (!message.is_empty()).then_some(message);

        let mut tx = self.pool.begin().await?;
        let chat_id = self
            .chats
            .insert(&mut *tx, ticket_id, actor.user_id, message, &request.file_urls)
            .await?;
        tx.commit().await?;

        let chats = self.chats.list_for_ticket(ticket_id).await?;
        chats
            .into_iter()
            .map(ChatMessage::from)
            .find(|c| c.id == chat_id)
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Inserted chat entry not found")))
    }

    /// Transition 7: open the delay approval sub-workflow.
    pub async fn request_delay(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: RequestDelayRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        require_staff(actor)?;
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;
        lifecycle::validate_request_delay(&ticket, &request, &self.calendar)?;

        let mut tx = self.pool.begin().await?;
        let updated = self
            .tickets
            .open_delay_request(&mut *tx, ticket_id, request.requested_date, &request.reason)
            .await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(
                &mut *tx,
                ticket_id,
                EventStageDb::DelayRequested,
                Some(actor.user_id),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(
            ticket_id = %ticket_id,
            requested_date = %request.requested_date,
            "Delay requested"
        );

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 8: approve a pending delay. The requested date becomes the
    /// confirmed completion date.
    pub async fn approve_delay(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TicketDetailResponse, ApiError> {
        let ticket = self.load_scoped(actor, ticket_id).await?;
        require_customer_side(actor, &ticket)?;
        let new_date = lifecycle::validate_approve_delay(&ticket)?;

        let mut tx = self.pool.begin().await?;
        let updated = self.tickets.approve_delay(&mut *tx, ticket_id).await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(
                &mut *tx,
                ticket_id,
                EventStageDb::DelayApproved,
                Some(actor.user_id),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(ticket_id = %ticket_id, new_end_date = %new_date, "Delay approved");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 9: reject a pending delay. The confirmed date stays.
    pub async fn reject_delay(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: RejectRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;
        require_customer_side(actor, &ticket)?;
        lifecycle::validate_reject_delay(&ticket, &request.reason)?;

        let mut tx = self.pool.begin().await?;
        let updated = self
            .tickets
            .reject_delay(&mut *tx, ticket_id, &request.reason)
            .await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(
                &mut *tx,
                ticket_id,
                EventStageDb::DelayRejected,
                Some(actor.user_id),
            )
            .await?;
        tx.commit().await?;

        tracing::info!(ticket_id = %ticket_id, "Delay rejected");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 10: request completion approval (→ REQUESTED).
    pub async fn request_completion(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TicketDetailResponse, ApiError> {
        require_staff(actor)?;
        let ticket = self.load_scoped(actor, ticket_id).await?;
        lifecycle::validate_request_completion(&ticket)?;

        let mut tx = self.pool.begin().await?;
        let updated = self.tickets.request_completion(&mut *tx, ticket_id).await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(
                &mut *tx,
                ticket_id,
                EventStageDb::CompleteRequested,
                Some(actor.user_id),
            )
            .await?;
        tx.commit().await?;

        record_ticket_transition("REQUESTED");
        tracing::info!(ticket_id = %ticket_id, "Completion requested");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 11: approve completion. Terminal.
    pub async fn approve_completion(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TicketDetailResponse, ApiError> {
        let ticket = self.load_scoped(actor, ticket_id).await?;
        require_customer_side(actor, &ticket)?;
        lifecycle::validate_approve_completion(&ticket)?;

        let mut tx = self.pool.begin().await?;
        let updated = self.tickets.approve_completion(&mut *tx, ticket_id).await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(&mut *tx, ticket_id, EventStageDb::Completed, Some(actor.user_id))
            .await?;
        tx.commit().await?;

        record_ticket_transition("COMPLETED");
        tracing::info!(ticket_id = %ticket_id, "Ticket completed");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Transition 12: reject completion; the ticket reverts to IN_PROGRESS.
    pub async fn reject_completion(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
        request: RejectRequest,
    ) -> Result<TicketDetailResponse, ApiError> {
        request.validate()?;
        let ticket = self.load_scoped(actor, ticket_id).await?;
        require_customer_side(actor, &ticket)?;
        let revert_to = lifecycle::validate_reject_completion(&ticket, &request.reason)?;

        let mut tx = self.pool.begin().await?;
        let updated = self
            .tickets
            .reject_completion(&mut *tx, ticket_id, &request.reason)
            .await?;
        if updated == 0 {
            return Err(stale_ticket());
        }
        self.events
            .insert(
                &mut *tx,
                ticket_id,
                EventStageDb::CompleteRejected,
                Some(actor.user_id),
            )
            .await?;
        tx.commit().await?;

        record_ticket_transition(&revert_to.to_string());
        tracing::info!(ticket_id = %ticket_id, "Completion rejected");

        let ticket = self.load_scoped(actor, ticket_id).await?;
        self.assemble_detail(ticket).await
    }

    /// Stage markers projected from the audit trail.
    pub async fn timeline(
        &self,
        actor: &Actor,
        ticket_id: Uuid,
    ) -> Result<TimelineResponse, ApiError> {
        let ticket = self.load_scoped(actor, ticket_id).await?;
        let events: Vec<TicketEvent> = self
            .events
            .list_for_ticket(ticket_id)
            .await?
            .into_iter()
            .map(TicketEvent::from)
            .collect();
        Ok(TimelineResponse {
            markers: timeline::project_timeline(&events, ticket.status),
        })
    }

    /// Internal staff assigned to a project, for the assignee picker.
    pub async fn project_staff(
        &self,
        actor: &Actor,
        project_id: Uuid,
    ) -> Result<ProjectStaffResponse, ApiError> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
        if actor.role == UserRole::Customer
            && project.customer_company_id != actor.customer_company_id
        {
            return Err(ApiError::NotFound("Project not found".to_string()));
        }

        let staff = self
            .projects
            .staff_members(project_id)
            .await?
            .into_iter()
            .map(UserBrief::from)
            .collect();
        Ok(ProjectStaffResponse {
            project_id,
            staff,
        })
    }

    /// Loads a ticket, hiding other companies' tickets from customers.
    async fn load_scoped(&self, actor: &Actor, ticket_id: Uuid) -> Result<Ticket, ApiError> {
        let entity = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;
        let ticket: Ticket = entity.into();

        if actor.role == UserRole::Customer
            && ticket.customer_company_id != actor.customer_company_id
        {
            return Err(ApiError::NotFound("Ticket not found".to_string()));
        }
        Ok(ticket)
    }

    /// Rejects assignee lists containing unknown, inactive, or
    /// customer-role users.
    async fn check_assignable(&self, ids: &[Uuid]) -> Result<(), ApiError> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let found = self.users.find_assignable(&unique).await?;
        if found.len() != unique.len() {
            return Err(ApiError::Validation(
                "staff_ids: contains users who cannot be assigned".to_string(),
            ));
        }
        Ok(())
    }

    async fn assemble_detail(&self, ticket: Ticket) -> Result<TicketDetailResponse, ApiError> {
        let assignees = self
            .tickets
            .list_assignees(ticket.id)
            .await?
            .into_iter()
            .map(|a| UserBrief {
                id: a.user_id,
                full_name: a.full_name,
                role: a.role.into(),
            })
            .collect();
        let chats: Vec<ChatMessage> = self
            .chats
            .list_for_ticket(ticket.id)
            .await?
            .into_iter()
            .map(ChatMessage::from)
            .collect();
        let action_plan_chat_id =
            domain::models::chat::action_plan_index(&chats).map(|i| chats[i].id);
        Ok(TicketDetailResponse {
            ticket,
            assignees,
            chats,
            action_plan_chat_id,
        })
    }
}

/// A guarded update that matched no rows: the ticket moved on under us.
fn stale_ticket() -> ApiError {
    ApiError::Conflict("Ticket state changed concurrently, reload and retry".to_string())
}

fn require_staff(actor: &Actor) -> Result<(), ApiError> {
    if actor.role.is_staff_side() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "This operation requires an internal role".to_string(),
        ))
    }
}

/// Delay and completion approvals belong to the customer side of the ticket.
/// MASTER can act on the customer's behalf.
fn require_customer_side(actor: &Actor, ticket: &Ticket) -> Result<(), ApiError> {
    match actor.role {
        UserRole::Master => Ok(()),
        UserRole::Customer if actor.customer_company_id == ticket.customer_company_id => Ok(()),
        _ => Err(ApiError::Forbidden(
            "Approval belongs to the requesting customer".to_string(),
        )),
    }
}
