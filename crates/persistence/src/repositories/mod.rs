//! Repository implementations for database operations.

pub mod chat;
pub mod event;
pub mod project;
pub mod ticket;
pub mod user;

pub use chat::ChatRepository;
pub use event::EventRepository;
pub use project::ProjectRepository;
pub use ticket::{NewTicket, TicketFilter, TicketRepository};
pub use user::UserRepository;
