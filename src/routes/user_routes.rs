use crate::models::{RoleUpdateRequest, ServiceError, UserInfo};
use crate::services::roles;
use crate::utils::{get_user_id_from_request, user_storage};
use actix_web::{get, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// List all registered users (admin only, for the member management panel)
#[get("/users")]
async fn list_users(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;

    roles::require_admin(&caller_id)?;

    info!("📋 Listing users for admin: {}", caller_id);

    let users: Vec<UserInfo> = user_storage::all_users()?
        .iter()
        .map(UserInfo::from)
        .collect();

    info!("✅ Found {} users", users.len());

    Ok(HttpResponse::Ok().json(users))
}

// Change a user's club-wide role
#[put("/users/{user_id}/role")]
async fn update_user_role(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<RoleUpdateRequest>,
) -> Result<HttpResponse, ServiceError> {
    let caller_id = get_user_id_from_request(&req)?;
    let target_user_id = path.into_inner();

    info!("🔄 Setting role {:?} for user: {}", data.role, target_user_id);

    let user = roles::promote(&caller_id, &target_user_id, data.role)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("User role updated to: {:?}", user.role),
        "user_id": user.id,
        "role": user.role
    })))
}

// Register all user routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(update_user_role);
}
