//! Authorization rules, independent of transport.

use uuid::Uuid;

use super::UserRole;
use crate::errors::{AppError, AppResult};

/// Allow the caller only if `role` is one of `allowed`.
pub fn require_role(role: UserRole, allowed: &[UserRole]) -> AppResult<()> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::unauthorized(format!(
            "User role {} is not authorized to access this route.",
            role
        )))
    }
}

/// Allow a mutation only when the caller created the resource.
pub fn require_owner(resource_owner_id: Uuid, caller_id: Uuid) -> AppResult<()> {
    if resource_owner_id == caller_id {
        Ok(())
    } else {
        Err(AppError::unauthorized("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_allowed() {
        assert!(require_role(UserRole::Admin, &[UserRole::Admin]).is_ok());
        assert!(require_role(UserRole::User, &[UserRole::User, UserRole::Admin]).is_ok());
    }

    #[test]
    fn test_role_denied() {
        let err = require_role(UserRole::User, &[UserRole::Admin]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User role user is not authorized to access this route."
        );
    }

    #[test]
    fn test_owner_check() {
        let owner = Uuid::new_v4();
        assert!(require_owner(owner, owner).is_ok());
        assert!(matches!(
            require_owner(owner, Uuid::new_v4()),
            Err(AppError::Unauthorized(_))
        ));
    }
}
