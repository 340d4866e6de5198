//! Domain models for NuDesk.

pub mod chat;
pub mod project;
pub mod ticket;
pub mod timeline;
pub mod user;

pub use chat::ChatMessage;
pub use ticket::Ticket;
pub use timeline::{TimelineMarker, TimelineStage};
pub use user::{Actor, UserRole};
