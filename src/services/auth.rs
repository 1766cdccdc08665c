//! Authorization service
//!
//! Single-admin deployment: the role of a sender is derived from comparing
//! their id against the configured administrator id. The check runs before
//! any state inspection in the dispatcher.

/// Role derived from the sender id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    admin_id: i64,
}

impl AuthService {
    pub fn new(admin_id: i64) -> Self {
        Self { admin_id }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }

    pub fn role_of(&self, user_id: i64) -> Role {
        if self.is_admin(user_id) {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_derivation() {
        let auth = AuthService::new(42);
        assert!(auth.is_admin(42));
        assert!(!auth.is_admin(43));
        assert_eq!(auth.role_of(42), Role::Admin);
        assert_eq!(auth.role_of(1), Role::Member);
    }
}
