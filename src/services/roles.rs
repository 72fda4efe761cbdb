// sporty-service/src/services/roles.rs
//
// Role registry: maps user identity to a club-wide role and answers
// authorization questions for the rest of the service.

use crate::models::{Role, ServiceError, User};
use crate::utils::user_storage;
use log::{error, info};

// Resolve a user's role. An unknown user id is not an error; it simply
// carries the lowest privilege tier.
pub fn role_of(user_id: &str) -> Result<Role, ServiceError> {
    Ok(user_storage::find_user_by_id(user_id)?
        .map(|user| user.role)
        .unwrap_or(Role::Member))
}

pub fn is_admin(user_id: &str) -> Result<bool, ServiceError> {
    Ok(role_of(user_id)? == Role::Admin)
}

pub fn require_admin(user_id: &str) -> Result<(), ServiceError> {
    if !is_admin(user_id)? {
        error!("❌ User: {} lacks admin privileges", user_id);
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

// Change a user's club-wide role. Admin-only; promoting a user to the role
// they already hold succeeds without a write. Never touches any team.
pub fn promote(caller_id: &str, target_user_id: &str, new_role: Role) -> Result<User, ServiceError> {
    require_admin(caller_id)?;

    let mut user = match user_storage::find_user_by_id(target_user_id)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", target_user_id);
            return Err(ServiceError::NotFound);
        }
    };

    if user.role == new_role {
        // Redundant promote, nothing to write
        return Ok(user);
    }

    user.role = new_role;
    user_storage::save_user(&user)?;

    info!("✅ User: {} role set to {:?} by: {}", target_user_id, new_role, caller_id);

    Ok(user)
}
