use crate::models::{Claims, LoginResponse, RegisterRequest, Role, ServiceError, User, UserCredentials};
use crate::utils::{jwt, password, user_storage};
use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use std::sync::Mutex;
use uuid::Uuid;

// Serializes the email-uniqueness check with the user write; without this,
// two concurrent registrations of the same email could both pass the check
lazy_static::lazy_static! {
    static ref REGISTER_LOCK: Mutex<()> = Mutex::new(());
}

// Register a new user. First sign-in provisions the user record with the
// lowest role; only an admin can raise it afterwards.
#[post("/auth/register")]
async fn register(request: web::Json<RegisterRequest>) -> Result<HttpResponse, ServiceError> {
    info!("📝 Register request for email: {}", request.email);

    let _guard = REGISTER_LOCK.lock().map_err(|e| {
        error!("Register lock poisoned: {:?}", e);
        ServiceError::InternalServerError
    })?;

    // Check if the email already exists
    if user_storage::find_user_by_email(&request.email)?.is_some() {
        error!("❌ Email already registered: {}", request.email);
        return Err(ServiceError::BadRequest("Email already registered".to_string()));
    }

    // Create a new user
    let user_id = Uuid::new_v4().to_string();
    let user = User {
        id: user_id.clone(),
        name: request.name.clone(),
        email: request.email.clone(),
        password_hash: password::hash_password(&request.password)?,
        role: Role::Member,
        created_at: Utc::now(),
    };

    // Save the user
    user_storage::save_user(&user)?;

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

// Login and get JWT token
#[post("/auth/login")]
async fn login(credentials: web::Json<UserCredentials>) -> Result<HttpResponse, ServiceError> {
    info!("🔑 Login request for email: {}", credentials.email);

    // Find the user by email
    let user = match user_storage::find_user_by_email(&credentials.email)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(ServiceError::Unauthorized);
        }
    };

    // Verify password
    if !password::verify_password(&credentials.password, &user.password_hash)? {
        error!("❌ Invalid password for user: {}", credentials.email);
        return Err(ServiceError::Unauthorized);
    }

    // Generate JWT token
    let token = jwt::generate_token(&user)?;

    info!("✅ User logged in successfully: {}", user.id);

    // Return token in headers as well as response body
    let response = LoginResponse {
        token: token.clone(),
        user_id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    };

    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(response))
}

// Get current user info (requires authentication)
#[get("/auth/me")]
async fn me(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    debug!("👤 Get user info request");

    // Extract user claims from request extensions
    if let Some(claims) = req.extensions().get::<Claims>() {
        // Get user details from storage
        if let Some(user) = user_storage::find_user_by_id(&claims.sub)? {
            info!("✅ Found user: {}", user.id);
            return Ok(HttpResponse::Ok().json(json!({
                "user_id": user.id,
                "name": user.name,
                "email": user.email,
                "role": user.role,
                // Same epoch-seconds representation as the stored document
                "created_at": user.created_at.timestamp()
            })));
        }
    }

    error!("❌ Unauthorized access to /auth/me");
    Err(ServiceError::Unauthorized)
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(me);
}
