// User and role types
//
// The engine runs single-user: one fixed operator identity with a role check.
// Multi-tenant authorization is out of scope.

use serde::{Deserialize, Serialize};

/// Role of a platform user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Viewer,
    Host,
    Ops,
}

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl User {
    /// The fixed operator identity this deployment runs as
    pub fn current() -> Self {
        User {
            id: "u1".to_string(),
            name: "You".to_string(),
            role: UserRole::Ops,
        }
    }

    /// Whether this user hosts the session owned by `session_host_user_id`
    pub fn is_host(&self, session_host_user_id: &str) -> bool {
        self.id == session_host_user_id
    }

    /// Whether this user holds the ops role
    pub fn is_ops(&self) -> bool {
        self.role == UserRole::Ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_role_check() {
        let user = User::current();
        assert!(user.is_ops());
        assert!(user.is_host("u1"));
        assert!(!user.is_host("u2"));
    }
}
