//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod chat;
pub mod event;
pub mod project;
pub mod ticket;
pub mod user;

pub use chat::ChatEntity;
pub use event::{EventStageDb, TicketEventEntity};
pub use project::ProjectEntity;
pub use ticket::{
    CompleteStatusDb, DelayStatusDb, ReceiptChannelDb, TicketAssigneeEntity, TicketEntity,
    TicketStatusDb, TicketSummaryEntity,
};
pub use user::{UserEntity, UserRoleDb};
