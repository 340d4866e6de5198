//! Shared utilities and common types for the NuDesk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session token validation (RS256 JWT from the identity provider)
//! - Offset pagination helpers
//! - Common validation logic

pub mod pagination;
pub mod session;
pub mod validation;
