//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::user::{UserBrief, UserRole};

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRoleDb {
    #[sqlx(rename = "MASTER")]
    Master,
    #[sqlx(rename = "ADMIN")]
    Admin,
    #[sqlx(rename = "STAFF")]
    Staff,
    #[sqlx(rename = "CUSTOMER")]
    Customer,
}

impl From<UserRoleDb> for UserRole {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Master => UserRole::Master,
            UserRoleDb::Admin => UserRole::Admin,
            UserRoleDb::Staff => UserRole::Staff,
            UserRoleDb::Customer => UserRole::Customer,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Master => UserRoleDb::Master,
            UserRole::Admin => UserRoleDb::Admin,
            UserRole::Staff => UserRoleDb::Staff,
            UserRole::Customer => UserRoleDb::Customer,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub full_name: String,
    pub role: UserRoleDb,
    pub customer_company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserBrief {
    fn from(e: UserEntity) -> Self {
        UserBrief {
            id: e.id,
            full_name: e.full_name,
            role: e.role.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_roundtrip() {
        for role in [
            UserRole::Master,
            UserRole::Admin,
            UserRole::Staff,
            UserRole::Customer,
        ] {
            let db: UserRoleDb = role.into();
            let back: UserRole = db.into();
            assert_eq!(back, role);
        }
    }
}
