//! Ticket lifecycle rule set.
//!
//! Every transition is validated here as a pure function over a ticket
//! snapshot and the command data; the caller owns persistence and wraps the
//! resulting writes in one transaction. Rule checks distinguish two failure
//! classes: [`LifecycleError::Validation`] (bad request data, nothing should
//! be written) and [`LifecycleError::StateConflict`] (the ticket is no longer
//! in the state the client saw).

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ticket::{
    AcceptTicketRequest, AddCommentRequest, CompleteStatus, CreateTicketRequest, DelayStatus,
    RequestDelayRequest, StartWorkRequest, Ticket, TicketStatus,
};
use crate::models::user::UserRole;
use crate::services::calendar::BusinessCalendar;

/// Hours a WAITING ticket may sit before the auto-escalation sweep accepts it.
pub const AUTO_ESCALATE_AFTER_HOURS: i64 = 4;

/// Failure of a lifecycle rule check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Request data violates a precondition; nothing may be persisted.
    #[error("Validation failed on {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The transition's status precondition no longer holds.
    #[error("State conflict: {0}")]
    StateConflict(String),
}

fn validation(field: &'static str, message: impl Into<String>) -> LifecycleError {
    LifecycleError::Validation {
        field,
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> LifecycleError {
    LifecycleError::StateConflict(message.into())
}

/// Outcome of intake validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub status: TicketStatus,
    pub assignee_ids: Vec<Uuid>,
}

/// Outcome of assign-and-accept validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    pub confirmed_end_date: NaiveDate,
    pub processing_delay_reason: Option<String>,
}

/// Outcome of start-work validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartWorkOutcome {
    pub confirmed_end_date: NaiveDate,
    pub processing_delay_reason: Option<String>,
    /// Assignees to persist now; empty when the ticket already has some.
    pub staff_to_assign: Vec<Uuid>,
}

fn check_end_date(
    end_date: NaiveDate,
    is_emergency: bool,
    today: NaiveDate,
    calendar: &BusinessCalendar,
) -> Result<(), LifecycleError> {
    let min = calendar.min_end_date(today, is_emergency);
    if end_date < min {
        let tier = if is_emergency { "emergency" } else { "standard" };
        return Err(validation(
            "end_date",
            format!("{} tickets require an end date on or after {}", tier, min),
        ));
    }
    if !calendar.is_business_day(end_date) {
        return Err(validation("end_date", "End date must fall on a business day"));
    }
    Ok(())
}

fn check_reason(field: &'static str, reason: &str) -> Result<(), LifecycleError> {
    if reason.trim().is_empty() {
        Err(validation(field, "Reason must not be empty"))
    } else {
        Ok(())
    }
}

/// Transition 1: intake.
///
/// Non-customer intake with at least one assignee lands directly in ACCEPTED;
/// everything else starts in WAITING with no assignees.
pub fn validate_intake(
    request: &CreateTicketRequest,
    actor_role: UserRole,
    today: NaiveDate,
    calendar: &BusinessCalendar,
) -> Result<IntakeOutcome, LifecycleError> {
    if request.title.trim().is_empty() {
        return Err(validation("title", "Title is required"));
    }

    if request.is_emergency {
        match &request.emergency_reason {
            Some(reason) if !reason.trim().is_empty() => {}
            _ => {
                return Err(validation(
                    "emergency_reason",
                    "Emergency tickets require a reason",
                ))
            }
        }
    }

    check_end_date(request.end_date, request.is_emergency, today, calendar)?;

    if actor_role.is_staff_side() {
        if request.assignee_ids.is_empty() {
            return Err(validation(
                "assignee_ids",
                "Staff intake requires at least one assignee",
            ));
        }
        Ok(IntakeOutcome {
            status: TicketStatus::Accepted,
            assignee_ids: request.assignee_ids.clone(),
        })
    } else {
        Ok(IntakeOutcome {
            status: TicketStatus::Waiting,
            assignee_ids: Vec::new(),
        })
    }
}

/// Transition 3: implicit acceptance when an internal viewer opens a WAITING
/// ticket. Returns whether the status update should be applied; repeated
/// calls on a ticket already past WAITING are no-ops.
pub fn should_ensure_accepted(ticket: &Ticket) -> bool {
    ticket.status == TicketStatus::Waiting
}

/// Transition 4: staff assign personnel and confirm a date on an ACCEPTED
/// ticket that has no assignees yet.
pub fn validate_accept(
    ticket: &Ticket,
    request: &AcceptTicketRequest,
    today: NaiveDate,
    calendar: &BusinessCalendar,
) -> Result<AcceptOutcome, LifecycleError> {
    if ticket.status != TicketStatus::Accepted {
        return Err(conflict(format!(
            "Cannot assign personnel while ticket is {}",
            ticket.status
        )));
    }
    if request.staff_ids.is_empty() {
        return Err(validation("staff_ids", "At least one assignee is required"));
    }

    check_end_date(request.end_date, ticket.is_emergency, today, calendar)?;

    let processing_delay_reason = resolve_delay_reason(
        ticket.initial_end_date,
        request.end_date,
        request.delay_reason.as_deref(),
    )?;

    Ok(AcceptOutcome {
        confirmed_end_date: request.end_date,
        processing_delay_reason,
    })
}

/// Transition 5: start work (ACCEPTED → IN_PROGRESS).
pub fn validate_start_work(
    ticket: &Ticket,
    request: &StartWorkRequest,
    existing_assignee_count: usize,
    today: NaiveDate,
    calendar: &BusinessCalendar,
) -> Result<StartWorkOutcome, LifecycleError> {
    if ticket.status != TicketStatus::Accepted {
        return Err(conflict(format!(
            "Work can only start on an ACCEPTED ticket, current status is {}",
            ticket.status
        )));
    }

    let staff_to_assign = if existing_assignee_count == 0 {
        if request.staff_ids.is_empty() {
            return Err(validation(
                "staff_ids",
                "Ticket has no assignees; at least one is required to start work",
            ));
        }
        request.staff_ids.clone()
    } else {
        Vec::new()
    };

    // An omitted end date honors the customer's original request unchanged.
    let confirmed_end_date = match request.end_date {
        Some(date) => {
            check_end_date(date, ticket.is_emergency, today, calendar)?;
            date
        }
        None => ticket.initial_end_date,
    };

    let processing_delay_reason = resolve_delay_reason(
        ticket.initial_end_date,
        confirmed_end_date,
        request.delay_reason.as_deref(),
    )?;

    Ok(StartWorkOutcome {
        confirmed_end_date,
        processing_delay_reason,
        staff_to_assign,
    })
}

/// A confirmed date later than the customer's initial request needs an
/// explanation; otherwise none is stored.
fn resolve_delay_reason(
    initial_end_date: NaiveDate,
    confirmed_end_date: NaiveDate,
    delay_reason: Option<&str>,
) -> Result<Option<String>, LifecycleError> {
    if confirmed_end_date > initial_end_date {
        match delay_reason {
            Some(reason) if !reason.trim().is_empty() => Ok(Some(reason.to_string())),
            _ => Err(validation(
                "delay_reason",
                "Confirming a date later than the requested one requires a reason",
            )),
        }
    } else {
        Ok(None)
    }
}

/// Transition 6: append a comment. Available in every non-COMPLETED status
/// except ACCEPTED, which routes through start_work instead.
pub fn validate_add_comment(
    ticket: &Ticket,
    request: &AddCommentRequest,
) -> Result<(), LifecycleError> {
    match ticket.status {
        TicketStatus::Completed => {
            return Err(conflict("Completed tickets accept no further entries"))
        }
        TicketStatus::Accepted => {
            return Err(conflict(
                "Comments on an ACCEPTED ticket go through start-work",
            ))
        }
        _ => {}
    }
    if request.message.trim().is_empty() && request.file_urls.is_empty() {
        return Err(validation(
            "message",
            "A comment needs a message or at least one attachment",
        ));
    }
    Ok(())
}

/// Transition 7: open the delay sub-workflow.
pub fn validate_request_delay(
    ticket: &Ticket,
    request: &RequestDelayRequest,
    calendar: &BusinessCalendar,
) -> Result<(), LifecycleError> {
    match ticket.status {
        TicketStatus::Waiting | TicketStatus::Accepted => {
            return Err(conflict("Delay can only be requested after work has started"))
        }
        TicketStatus::Completed => {
            return Err(conflict("Completed tickets accept no further entries"))
        }
        TicketStatus::Requested => {
            return Err(conflict(
                "Cannot request a delay while completion approval is outstanding",
            ))
        }
        _ => {}
    }
    if ticket.delay_status == Some(DelayStatus::Pending) {
        return Err(conflict("A delay request is already pending"));
    }
    if ticket.complete_status == Some(CompleteStatus::Pending) {
        return Err(conflict(
            "Cannot request a delay while completion approval is outstanding",
        ));
    }

    check_reason("reason", &request.reason)?;

    let current = ticket.effective_end_date();
    if request.requested_date <= current {
        return Err(validation(
            "requested_date",
            format!("Requested date must be later than {}", current),
        ));
    }
    if !calendar.is_business_day(request.requested_date) {
        return Err(validation(
            "requested_date",
            "Requested date must fall on a business day",
        ));
    }
    Ok(())
}

/// Transition 8: approve a pending delay. Returns the new confirmed end date.
pub fn validate_approve_delay(ticket: &Ticket) -> Result<NaiveDate, LifecycleError> {
    if ticket.delay_status != Some(DelayStatus::Pending) {
        return Err(conflict("No delay request is pending"));
    }
    ticket
        .delay_requested_date
        .ok_or_else(|| conflict("Pending delay request carries no requested date"))
}

/// Transition 9: reject a pending delay.
pub fn validate_reject_delay(ticket: &Ticket, reason: &str) -> Result<(), LifecycleError> {
    if ticket.delay_status != Some(DelayStatus::Pending) {
        return Err(conflict("No delay request is pending"));
    }
    check_reason("reason", reason)
}

/// Transition 10: request completion approval (→ REQUESTED).
pub fn validate_request_completion(ticket: &Ticket) -> Result<(), LifecycleError> {
    match ticket.status {
        TicketStatus::Waiting | TicketStatus::Accepted => {
            return Err(conflict(
                "Completion can only be requested after work has started",
            ))
        }
        TicketStatus::Completed => return Err(conflict("Ticket is already completed")),
        TicketStatus::Requested => {
            return Err(conflict("Completion approval is already outstanding"))
        }
        _ => {}
    }
    if ticket.delay_status == Some(DelayStatus::Pending) {
        return Err(conflict(
            "Cannot request completion while a delay approval is outstanding",
        ));
    }
    Ok(())
}

/// Transition 11: approve completion. Terminal.
pub fn validate_approve_completion(ticket: &Ticket) -> Result<(), LifecycleError> {
    if ticket.complete_status != Some(CompleteStatus::Pending) {
        return Err(conflict("No completion request is pending"));
    }
    Ok(())
}

/// Transition 12: reject completion. Returns the status to revert to.
///
/// REQUESTED is reachable only from IN_PROGRESS (or its DELAYED display
/// equivalent), so the revert target is always IN_PROGRESS and no stored
/// previous-status field is needed.
pub fn validate_reject_completion(
    ticket: &Ticket,
    reason: &str,
) -> Result<TicketStatus, LifecycleError> {
    if ticket.complete_status != Some(CompleteStatus::Pending) {
        return Err(conflict("No completion request is pending"));
    }
    check_reason("reason", reason)?;
    Ok(TicketStatus::InProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::ReceiptChannel;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Monday, no nearby holidays in the empty calendar.
    fn today() -> NaiveDate {
        date(2026, 3, 9)
    }

    fn cal() -> BusinessCalendar {
        BusinessCalendar::from_iso_dates([])
    }

    fn ticket(status: TicketStatus) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            requester_id: Uuid::new_v4(),
            customer_company_id: None,
            title: "Batch job stuck".to_string(),
            description: None,
            receipt_channel: ReceiptChannel::Online,
            category: None,
            file_urls: vec![],
            is_emergency: false,
            emergency_reason: None,
            is_auto_assigned: false,
            initial_end_date: date(2026, 3, 16),
            confirmed_end_date: None,
            delay_requested_date: None,
            processing_delay_reason: None,
            status,
            delay_status: None,
            delay_reason: None,
            delay_rejection_reason: None,
            complete_status: None,
            complete_rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn intake_request() -> CreateTicketRequest {
        CreateTicketRequest {
            project_id: Uuid::new_v4(),
            title: "Batch job stuck".to_string(),
            description: None,
            receipt_channel: ReceiptChannel::Online,
            category: None,
            file_urls: vec![],
            is_emergency: false,
            emergency_reason: None,
            end_date: date(2026, 3, 16),
            assignee_ids: vec![],
        }
    }

    #[test]
    fn test_customer_intake_lands_in_waiting() {
        let outcome =
            validate_intake(&intake_request(), UserRole::Customer, today(), &cal()).unwrap();
        assert_eq!(outcome.status, TicketStatus::Waiting);
        assert!(outcome.assignee_ids.is_empty());
    }

    #[test]
    fn test_staff_intake_with_assignees_lands_in_accepted() {
        let mut req = intake_request();
        req.assignee_ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        req.is_emergency = true;
        req.emergency_reason = Some("Payroll run blocked".to_string());
        // Emergency tier allows 2 business days out.
        req.end_date = date(2026, 3, 11);

        let outcome = validate_intake(&req, UserRole::Staff, today(), &cal()).unwrap();
        assert_eq!(outcome.status, TicketStatus::Accepted);
        assert_eq!(outcome.assignee_ids.len(), 2);
    }

    #[test]
    fn test_staff_intake_without_assignees_rejected() {
        let err = validate_intake(&intake_request(), UserRole::Admin, today(), &cal())
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Validation {
                field: "assignee_ids",
                ..
            }
        ));
    }

    #[test]
    fn test_intake_blank_title_rejected() {
        let mut req = intake_request();
        req.title = "   ".to_string();
        let err = validate_intake(&req, UserRole::Customer, today(), &cal()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Validation { field: "title", .. }
        ));
    }

    #[test]
    fn test_intake_emergency_requires_reason() {
        let mut req = intake_request();
        req.is_emergency = true;
        req.emergency_reason = Some("".to_string());
        req.end_date = date(2026, 3, 10);
        let err = validate_intake(&req, UserRole::Customer, today(), &cal()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Validation {
                field: "emergency_reason",
                ..
            }
        ));

        // Without the flag no reason is required.
        req.is_emergency = false;
        req.emergency_reason = None;
        req.end_date = date(2026, 3, 16);
        assert!(validate_intake(&req, UserRole::Customer, today(), &cal()).is_ok());
    }

    #[test]
    fn test_intake_end_date_below_floor_rejected() {
        let mut req = intake_request();
        // Standard floor from Monday 03-09 is Thursday 03-12.
        req.end_date = date(2026, 3, 11);
        let err = validate_intake(&req, UserRole::Customer, today(), &cal()).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Validation {
                field: "end_date",
                ..
            }
        ));
    }

    #[test]
    fn test_intake_end_date_on_weekend_rejected() {
        let mut req = intake_request();
        req.end_date = date(2026, 3, 14); // Saturday
        assert!(validate_intake(&req, UserRole::Customer, today(), &cal()).is_err());
    }

    #[test]
    fn test_ensure_accepted_only_from_waiting() {
        assert!(should_ensure_accepted(&ticket(TicketStatus::Waiting)));
        assert!(!should_ensure_accepted(&ticket(TicketStatus::Accepted)));
        assert!(!should_ensure_accepted(&ticket(TicketStatus::InProgress)));
        assert!(!should_ensure_accepted(&ticket(TicketStatus::Completed)));
    }

    #[test]
    fn test_accept_requires_accepted_status() {
        let req = AcceptTicketRequest {
            staff_ids: vec![Uuid::new_v4()],
            end_date: date(2026, 3, 16),
            delay_reason: None,
            note: None,
        };
        let err = validate_accept(&ticket(TicketStatus::Waiting), &req, today(), &cal())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::StateConflict(_)));
    }

    #[test]
    fn test_accept_later_date_requires_delay_reason() {
        let t = ticket(TicketStatus::Accepted);
        let mut req = AcceptTicketRequest {
            staff_ids: vec![Uuid::new_v4()],
            end_date: date(2026, 3, 18), // past initial 03-16
            delay_reason: None,
            note: None,
        };
        assert!(matches!(
            validate_accept(&t, &req, today(), &cal()).unwrap_err(),
            LifecycleError::Validation {
                field: "delay_reason",
                ..
            }
        ));

        req.delay_reason = Some("Dependency delivery slipped".to_string());
        let outcome = validate_accept(&t, &req, today(), &cal()).unwrap();
        assert_eq!(outcome.confirmed_end_date, date(2026, 3, 18));
        assert!(outcome.processing_delay_reason.is_some());
    }

    #[test]
    fn test_accept_on_time_stores_no_delay_reason() {
        let t = ticket(TicketStatus::Accepted);
        let req = AcceptTicketRequest {
            staff_ids: vec![Uuid::new_v4()],
            end_date: date(2026, 3, 16),
            delay_reason: None,
            note: None,
        };
        let outcome = validate_accept(&t, &req, today(), &cal()).unwrap();
        assert!(outcome.processing_delay_reason.is_none());
    }

    #[test]
    fn test_start_work_defaults_to_initial_end_date() {
        let t = ticket(TicketStatus::Accepted);
        let req = StartWorkRequest {
            message: "Starting with log analysis".to_string(),
            file_urls: vec![],
            staff_ids: vec![Uuid::new_v4()],
            end_date: None,
            delay_reason: None,
        };
        let outcome = validate_start_work(&t, &req, 0, today(), &cal()).unwrap();
        assert_eq!(outcome.confirmed_end_date, t.initial_end_date);
        assert!(outcome.processing_delay_reason.is_none());
        assert_eq!(outcome.staff_to_assign.len(), 1);
    }

    #[test]
    fn test_start_work_requires_staff_when_unassigned() {
        let t = ticket(TicketStatus::Accepted);
        let req = StartWorkRequest {
            message: String::new(),
            file_urls: vec![],
            staff_ids: vec![],
            end_date: None,
            delay_reason: None,
        };
        assert!(matches!(
            validate_start_work(&t, &req, 0, today(), &cal()).unwrap_err(),
            LifecycleError::Validation {
                field: "staff_ids",
                ..
            }
        ));
        // With existing assignees no new staff are needed.
        let outcome = validate_start_work(&t, &req, 2, today(), &cal()).unwrap();
        assert!(outcome.staff_to_assign.is_empty());
    }

    #[test]
    fn test_start_work_wrong_status_conflicts() {
        let req = StartWorkRequest {
            message: String::new(),
            file_urls: vec![],
            staff_ids: vec![Uuid::new_v4()],
            end_date: None,
            delay_reason: None,
        };
        for status in [
            TicketStatus::Waiting,
            TicketStatus::InProgress,
            TicketStatus::Requested,
            TicketStatus::Completed,
        ] {
            assert!(matches!(
                validate_start_work(&ticket(status), &req, 1, today(), &cal()).unwrap_err(),
                LifecycleError::StateConflict(_)
            ));
        }
    }

    #[test]
    fn test_start_work_later_date_requires_reason() {
        let t = ticket(TicketStatus::Accepted);
        let req = StartWorkRequest {
            message: String::new(),
            file_urls: vec![],
            staff_ids: vec![],
            end_date: Some(date(2026, 3, 18)),
            delay_reason: None,
        };
        assert!(matches!(
            validate_start_work(&t, &req, 1, today(), &cal()).unwrap_err(),
            LifecycleError::Validation {
                field: "delay_reason",
                ..
            }
        ));
    }

    #[test]
    fn test_add_comment_rules() {
        let req = AddCommentRequest {
            message: "Status update".to_string(),
            file_urls: vec![],
        };
        assert!(validate_add_comment(&ticket(TicketStatus::InProgress), &req).is_ok());
        assert!(validate_add_comment(&ticket(TicketStatus::Waiting), &req).is_ok());
        assert!(validate_add_comment(&ticket(TicketStatus::Requested), &req).is_ok());
        assert!(validate_add_comment(&ticket(TicketStatus::Accepted), &req).is_err());
        assert!(validate_add_comment(&ticket(TicketStatus::Completed), &req).is_err());

        let empty = AddCommentRequest {
            message: "  ".to_string(),
            file_urls: vec![],
        };
        assert!(matches!(
            validate_add_comment(&ticket(TicketStatus::InProgress), &empty).unwrap_err(),
            LifecycleError::Validation { .. }
        ));

        // Attachments alone are enough.
        let files_only = AddCommentRequest {
            message: String::new(),
            file_urls: vec!["https://cdn.example/screenshot.png".to_string()],
        };
        assert!(validate_add_comment(&ticket(TicketStatus::InProgress), &files_only).is_ok());
    }

    #[test]
    fn test_request_delay_strictness() {
        // Equal or earlier dates are rejected.
        let mut t = ticket(TicketStatus::InProgress);
        t.confirmed_end_date = Some(date(2026, 3, 16));

        let equal = RequestDelayRequest {
            requested_date: date(2026, 3, 16),
            reason: "Vendor slipped".to_string(),
        };
        assert!(matches!(
            validate_request_delay(&t, &equal, &cal()).unwrap_err(),
            LifecycleError::Validation {
                field: "requested_date",
                ..
            }
        ));

        let later = RequestDelayRequest {
            requested_date: date(2026, 3, 18),
            reason: "Vendor slipped".to_string(),
        };
        assert!(validate_request_delay(&t, &later, &cal()).is_ok());
    }

    #[test]
    fn test_request_delay_blocked_states() {
        let later = RequestDelayRequest {
            requested_date: date(2026, 3, 20),
            reason: "Vendor slipped".to_string(),
        };
        for status in [
            TicketStatus::Waiting,
            TicketStatus::Accepted,
            TicketStatus::Completed,
            TicketStatus::Requested,
        ] {
            assert!(matches!(
                validate_request_delay(&ticket(status), &later, &cal()).unwrap_err(),
                LifecycleError::StateConflict(_)
            ));
        }

        // Already-pending delay blocks a second one.
        let mut t = ticket(TicketStatus::InProgress);
        t.confirmed_end_date = Some(date(2026, 3, 16));
        t.delay_status = Some(DelayStatus::Pending);
        assert!(matches!(
            validate_request_delay(&t, &later, &cal()).unwrap_err(),
            LifecycleError::StateConflict(_)
        ));

        // A pending completion request blocks a delay request.
        let mut t = ticket(TicketStatus::InProgress);
        t.confirmed_end_date = Some(date(2026, 3, 16));
        t.complete_status = Some(CompleteStatus::Pending);
        assert!(matches!(
            validate_request_delay(&t, &later, &cal()).unwrap_err(),
            LifecycleError::StateConflict(_)
        ));
    }

    #[test]
    fn test_request_delay_weekend_rejected() {
        let mut t = ticket(TicketStatus::InProgress);
        t.confirmed_end_date = Some(date(2026, 3, 16));
        let req = RequestDelayRequest {
            requested_date: date(2026, 3, 21), // Saturday
            reason: "Vendor slipped".to_string(),
        };
        assert!(validate_request_delay(&t, &req, &cal()).is_err());
    }

    #[test]
    fn test_approve_delay() {
        let mut t = ticket(TicketStatus::InProgress);
        assert!(matches!(
            validate_approve_delay(&t).unwrap_err(),
            LifecycleError::StateConflict(_)
        ));

        t.delay_status = Some(DelayStatus::Pending);
        t.delay_requested_date = Some(date(2026, 3, 20));
        assert_eq!(validate_approve_delay(&t).unwrap(), date(2026, 3, 20));
    }

    #[test]
    fn test_reject_delay_requires_reason() {
        let mut t = ticket(TicketStatus::InProgress);
        t.delay_status = Some(DelayStatus::Pending);
        assert!(validate_reject_delay(&t, "Deadline is contractual").is_ok());
        assert!(matches!(
            validate_reject_delay(&t, "  ").unwrap_err(),
            LifecycleError::Validation { .. }
        ));
        t.delay_status = Some(DelayStatus::Approved);
        assert!(matches!(
            validate_reject_delay(&t, "reason").unwrap_err(),
            LifecycleError::StateConflict(_)
        ));
    }

    #[test]
    fn test_request_completion_rules() {
        assert!(validate_request_completion(&ticket(TicketStatus::InProgress)).is_ok());
        assert!(validate_request_completion(&ticket(TicketStatus::Delayed)).is_ok());
        for status in [
            TicketStatus::Waiting,
            TicketStatus::Accepted,
            TicketStatus::Requested,
            TicketStatus::Completed,
        ] {
            assert!(matches!(
                validate_request_completion(&ticket(status)).unwrap_err(),
                LifecycleError::StateConflict(_)
            ));
        }

        // A pending delay request blocks a completion request.
        let mut t = ticket(TicketStatus::InProgress);
        t.delay_status = Some(DelayStatus::Pending);
        assert!(matches!(
            validate_request_completion(&t).unwrap_err(),
            LifecycleError::StateConflict(_)
        ));
    }

    #[test]
    fn test_approve_completion_requires_pending() {
        let mut t = ticket(TicketStatus::Requested);
        assert!(matches!(
            validate_approve_completion(&t).unwrap_err(),
            LifecycleError::StateConflict(_)
        ));
        t.complete_status = Some(CompleteStatus::Pending);
        assert!(validate_approve_completion(&t).is_ok());
    }

    #[test]
    fn test_reject_completion_reverts_to_in_progress() {
        let mut t = ticket(TicketStatus::Requested);
        t.complete_status = Some(CompleteStatus::Pending);
        assert_eq!(
            validate_reject_completion(&t, "Verification failed").unwrap(),
            TicketStatus::InProgress
        );
        assert!(validate_reject_completion(&t, "").is_err());

        t.complete_status = Some(CompleteStatus::Rejected);
        assert!(matches!(
            validate_reject_completion(&t, "again").unwrap_err(),
            LifecycleError::StateConflict(_)
        ));
    }
}
