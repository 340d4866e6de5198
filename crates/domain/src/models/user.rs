//! User roles and the acting-user identity resolved per request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow role of a user.
///
/// MASTER has unrestricted visibility but is not a distinct workflow actor;
/// it passes every staff-side check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Master,
    Admin,
    Staff,
    Customer,
}

impl UserRole {
    /// True for internal roles that may accept, assign, and execute tickets.
    pub fn is_staff_side(&self) -> bool {
        !matches!(self, UserRole::Customer)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Master => write!(f, "MASTER"),
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Staff => write!(f, "STAFF"),
            UserRole::Customer => write!(f, "CUSTOMER"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MASTER" => Ok(UserRole::Master),
            "ADMIN" => Ok(UserRole::Admin),
            "STAFF" => Ok(UserRole::Staff),
            "CUSTOMER" => Ok(UserRole::Customer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The acting user behind a request, resolved from the session token.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Present only for CUSTOMER actors.
    pub customer_company_id: Option<Uuid>,
}

/// Brief user info embedded in ticket and chat responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserBrief {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRole,
}
