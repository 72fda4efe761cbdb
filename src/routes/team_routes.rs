use crate::models::{MemberRequest, ServiceError, TeamData, UserInfo};
use crate::services::{roles, team_membership};
use crate::utils::{get_user_id_from_request, team_storage};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::{error, info};
use serde_json::json;

// Create a new team (admin only)
#[post("/teams")]
async fn create_team(req: HttpRequest, team_data: web::Json<TeamData>) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;

    info!("📝 Creating new team: {} for user: {}", team_data.name, caller_id);

    let team = team_membership::create_team(&caller_id, &team_data)?;

    Ok(HttpResponse::Ok().json(team))
}

// Get all teams for the current user, labelled with their access
#[get("/teams")]
async fn get_user_teams(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;

    info!("📋 Fetching teams for user: {}", caller_id);

    let teams = team_membership::teams_for_user(&caller_id)?;

    info!("✅ Found {} teams for user: {}", teams.len(), caller_id);

    Ok(HttpResponse::Ok().json(teams))
}

// Get every team in the club (admin only)
#[get("/teams/all")]
async fn list_all_teams(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;

    roles::require_admin(&caller_id)?;

    let teams = team_storage::all_teams()?;

    info!("✅ Found {} teams", teams.len());

    Ok(HttpResponse::Ok().json(teams))
}

// Get a specific team by ID
#[get("/teams/{team_id}")]
async fn get_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🔍 Fetching team: {} for user: {}", team_id, caller_id);

    let team = match team_storage::find_team_by_id(&team_id)? {
        Some(team) => team,
        None => {
            error!("❌ Team not found: {}", team_id);
            return Err(ServiceError::NotFound);
        }
    };

    // Only admins and people in the team can see its record
    if !roles::is_admin(&caller_id)? && !team.is_member(&caller_id) {
        error!("❌ User: {} doesn't have access to team: {}", caller_id, team_id);
        return Err(ServiceError::Forbidden);
    }

    Ok(HttpResponse::Ok().json(team))
}

// Add a user to a team
#[post("/teams/{team_id}/members")]
async fn add_team_member(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<MemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("👥 Adding user: {} to team: {}", data.user_id, team_id);

    let (team, added) = team_membership::add_member(&caller_id, &team_id, &data.user_id)?;

    let message = if added { "User added to team" } else { "User is already a member" };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "team": team
    })))
}

// Remove a member from a team (also drops any manager status)
#[delete("/teams/{team_id}/members/{user_id}")]
async fn remove_team_member(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let (team_id, target_user_id) = path.into_inner();

    info!("🗑️ Removing user: {} from team: {}", target_user_id, team_id);

    let (team, removed) = team_membership::remove_member(&caller_id, &team_id, &target_user_id)?;

    let message = if removed { "User removed from team" } else { "User was not a member" };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "team": team
    })))
}

// Promote a team member to manager
#[post("/teams/{team_id}/managers")]
async fn promote_team_manager(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<MemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("⭐ Promoting user: {} to manager of team: {}", data.user_id, team_id);

    let (team, promoted) = team_membership::promote_to_manager(&caller_id, &team_id, &data.user_id)?;

    let message = if promoted { "User promoted to manager" } else { "User is already a manager" };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "team": team
    })))
}

// Users not yet in the team, for the "add to team" picker
#[get("/teams/{team_id}/available-users")]
async fn get_available_users(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🔍 Fetching available users for team: {} by: {}", team_id, caller_id);

    let users: Vec<UserInfo> = team_membership::available_users(&team_id)?
        .iter()
        .map(UserInfo::from)
        .collect();

    info!("✅ Found {} available users", users.len());

    Ok(HttpResponse::Ok().json(users))
}

// Register all team routes.
// "/teams/all" is registered ahead of "/teams/{team_id}" so it is matched
// as a literal path rather than swallowed by the id parameter.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(list_all_teams)
        .service(get_team)
        .service(add_team_member)
        .service(remove_team_member)
        .service(promote_team_manager)
        .service(get_available_users);
}
