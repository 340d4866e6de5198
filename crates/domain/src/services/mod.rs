//! Domain services for NuDesk.
//!
//! Services contain business logic that operates on domain models.

pub mod calendar;
pub mod lifecycle;
pub mod timeline;

pub use calendar::BusinessCalendar;
pub use lifecycle::LifecycleError;
