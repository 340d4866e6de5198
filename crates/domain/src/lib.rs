//! Domain layer for the NuDesk backend.
//!
//! This crate contains:
//! - Domain models (Ticket, ChatMessage, Actor)
//! - The ticket lifecycle rule set
//! - The business-day calendar and timeline projection

pub mod models;
pub mod services;
