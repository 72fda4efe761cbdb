// sporty-service/src/services/team_membership.rs
//
// Team membership engine: owns team records and their members/managers
// lists. Every mutation authorizes the caller, re-reads the team document
// under its lock, applies one delta, and writes the document once. The
// invariant held at every step: every manager of a team is also a member.

use crate::models::{Role, ServiceError, Team, TeamAccess, TeamData, TeamWithAccess, User};
use crate::services::roles;
use crate::utils::{team_storage, user_storage};
use chrono::Utc;
use log::{error, info};
use uuid::Uuid;

// A membership mutation is allowed for admins, or for managers of the team
// being mutated. Managers of other teams get nothing here.
fn authorize_membership_change(caller_id: &str, team: &Team) -> Result<(), ServiceError> {
    if roles::role_of(caller_id)? == Role::Admin || team.is_manager(caller_id) {
        return Ok(());
    }

    error!("❌ User: {} may not manage team: {}", caller_id, team.id);
    Err(ServiceError::Forbidden)
}

// Create a new team with empty membership lists. Admin-only.
pub fn create_team(caller_id: &str, data: &TeamData) -> Result<Team, ServiceError> {
    roles::require_admin(caller_id)?;

    let name = data.name.trim();
    if name.is_empty() {
        return Err(ServiceError::BadRequest("Team name cannot be empty".to_string()));
    }

    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        age_range: data.age_range.clone(),
        description: data.description.clone(),
        members: Vec::new(),
        managers: Vec::new(),
        created_by: caller_id.to_string(),
        created_at: Utc::now(),
    };

    team_storage::save_team(&team)?;

    info!("✅ Team created: {} ({}) by: {}", team.name, team.id, caller_id);

    Ok(team)
}

// Add a user to a team's members. Adding an existing member is a no-op
// success; the returned flag tells the caller whether anything changed.
pub fn add_member(
    caller_id: &str,
    team_id: &str,
    user_id: &str,
) -> Result<(Team, bool), ServiceError> {
    let team = team_storage::find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;
    authorize_membership_change(caller_id, &team)?;

    let (team, added) = team_storage::update_team(team_id, |team| {
        if team.is_member(user_id) {
            return false;
        }
        team.members.push(user_id.to_string());
        true
    })?;

    if added {
        info!("✅ User: {} added to team: {}", user_id, team_id);
    }

    Ok((team, added))
}

// Remove a user from a team. The user leaves both lists in the same write;
// a manager who loses membership cannot remain a manager. Removing a
// non-member is a no-op success.
pub fn remove_member(
    caller_id: &str,
    team_id: &str,
    user_id: &str,
) -> Result<(Team, bool), ServiceError> {
    let team = team_storage::find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;
    authorize_membership_change(caller_id, &team)?;

    let (team, removed) = team_storage::update_team(team_id, |team| {
        if !team.is_member(user_id) && !team.is_manager(user_id) {
            return false;
        }
        team.members.retain(|id| id != user_id);
        team.managers.retain(|id| id != user_id);
        true
    })?;

    if removed {
        info!("✅ User: {} removed from team: {}", user_id, team_id);
    }

    Ok((team, removed))
}

// Make a user a manager of a team. Manager status implies membership, so a
// non-member is added to members in the same write. Promoting an existing
// manager is a no-op success.
pub fn promote_to_manager(
    caller_id: &str,
    team_id: &str,
    user_id: &str,
) -> Result<(Team, bool), ServiceError> {
    let team = team_storage::find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;
    authorize_membership_change(caller_id, &team)?;

    let (team, promoted) = team_storage::update_team(team_id, |team| {
        if team.is_manager(user_id) {
            return false;
        }
        if !team.is_member(user_id) {
            team.members.push(user_id.to_string());
        }
        team.managers.push(user_id.to_string());
        true
    })?;

    if promoted {
        info!("✅ User: {} promoted to manager of team: {}", user_id, team_id);
    }

    Ok((team, promoted))
}

// All teams a user belongs to, labelled with their effective access.
// A manager is always also a member; the manager label wins.
pub fn teams_for_user(user_id: &str) -> Result<Vec<TeamWithAccess>, ServiceError> {
    let teams = team_storage::teams_containing_user(user_id)?;

    Ok(teams
        .into_iter()
        .map(|team| {
            let access = if team.is_manager(user_id) {
                TeamAccess::Manager
            } else {
                TeamAccess::Member
            };
            TeamWithAccess { team, access }
        })
        .collect())
}

// All registered users who are not yet members of the team, for the
// "add to team" picker.
pub fn available_users(team_id: &str) -> Result<Vec<User>, ServiceError> {
    let team = team_storage::find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    Ok(user_storage::all_users()?
        .into_iter()
        .filter(|user| !team.is_member(&user.id))
        .collect())
}
