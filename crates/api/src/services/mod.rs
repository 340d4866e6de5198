//! Application services orchestrating repositories and domain rules.

pub mod tickets;

#[allow(unused_imports)] // Re-exports for downstream use
pub use tickets::TicketService;
