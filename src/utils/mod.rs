use crate::models::{Claims, ServiceError, User};
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::env;
use std::fs;
use std::path::Path;

pub mod team_storage;

pub use auth_middleware::Authentication;

// JWT utility functions
pub mod jwt {
    use super::*;

    // Get JWT secret from environment or use default
    fn get_jwt_secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| "sporty_super_secret_key".to_string())
    }

    // Generate a new JWT token for a user
    pub fn generate_token(user: &User) -> Result<String, ServiceError> {
        let secret = get_jwt_secret();
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(7))
            .ok_or(ServiceError::InternalServerError)?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
            .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str) -> Result<Claims, ServiceError> {
        let secret = get_jwt_secret();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Password utility functions
pub mod password {
    use super::*;

    // Hash a password using bcrypt
    pub fn hash_password(password: &str) -> Result<String, ServiceError> {
        hash(password, DEFAULT_COST)
            .map_err(|_| ServiceError::InternalServerError)
    }

    // Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
        verify(password, hash)
            .map_err(|_| ServiceError::InternalServerError)
    }
}

// Resolve the caller's user id for a request. Prefers claims inserted by the
// auth middleware, falls back to decoding the Authorization header directly.
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    if let Some(claims) = req.extensions().get::<Claims>() {
        return Ok(claims.sub.clone());
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ServiceError::Unauthorized)?;

    let token = jwt::extract_token_from_header(auth_header)?;
    let claims = jwt::decode_token(&token)?;

    Ok(claims.sub)
}

// User storage utilities
pub mod user_storage {
    use super::*;
    use log::{error, warn};

    const USERS_DIR: &str = "./storage/users";

    // Initialize users directory
    pub fn ensure_users_dir() -> std::io::Result<()> {
        let dir = Path::new(USERS_DIR);
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    // Save a user document. Same temp-file + rename discipline as team
    // documents, so a role change is never observed half-written.
    pub fn save_user(user: &User) -> Result<(), ServiceError> {
        ensure_users_dir().map_err(|e| {
            error!("Failed to create users directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let user_path = format!("{}/{}.json", USERS_DIR, user.id);
        let tmp_path = format!("{}.tmp", user_path);

        let user_json = serde_json::to_string_pretty(user).map_err(|e| {
            error!("Failed to serialize user: {:?}", e);
            ServiceError::InternalServerError
        })?;

        fs::write(&tmp_path, user_json).map_err(|e| {
            error!("Failed to write user file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        fs::rename(&tmp_path, &user_path).map_err(|e| {
            error!("Failed to move user file into place: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    // Find a user by ID
    pub fn find_user_by_id(id: &str) -> Result<Option<User>, ServiceError> {
        let user_path = format!("{}/{}.json", USERS_DIR, id);
        let path = Path::new(&user_path);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read user file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let user: User = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse user JSON: {:?}", e);
            ServiceError::InternalServerError
        })?;

        Ok(Some(user))
    }

    // Find a user by email
    pub fn find_user_by_email(email: &str) -> Result<Option<User>, ServiceError> {
        Ok(all_users()?
            .into_iter()
            .find(|user| user.email.to_lowercase() == email.to_lowercase()))
    }

    // Get all registered users
    pub fn all_users() -> Result<Vec<User>, ServiceError> {
        ensure_users_dir().map_err(|e| {
            error!("Failed to ensure users directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let mut users = Vec::new();

        for entry_result in fs::read_dir(USERS_DIR).map_err(|e| {
            error!("Failed to read users directory: {:?}", e);
            ServiceError::InternalServerError
        })? {
            let entry = entry_result.map_err(|e| {
                error!("Failed to read directory entry: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let path = entry.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path).map_err(|e| {
                    error!("Failed to read user file: {:?}", e);
                    ServiceError::InternalServerError
                })?;

                match serde_json::from_str::<User>(&content) {
                    Ok(user) => users.push(user),
                    Err(e) => {
                        warn!("Failed to parse user JSON: {:?}", e);
                        continue;
                    }
                }
            }
        }

        Ok(users)
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::{error::ErrorUnauthorized, Error};
    use futures::future::{ready, Ready};
    use std::future::Future;
    use std::pin::Pin;

    // Endpoints reachable without a token
    const PUBLIC_PATHS: &[&str] = &["/auth/register", "/auth/login"];

    pub struct Authentication;

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ready(Ok(AuthenticationMiddleware { service }))
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            // Let sign-in endpoints and CORS preflights through untouched
            if req.method() == actix_web::http::Method::OPTIONS
                || PUBLIC_PATHS.contains(&req.path())
            {
                let fut = self.service.call(req);
                return Box::pin(async move { fut.await });
            }

            // Get Authorization header
            let auth_header = req.headers().get(header::AUTHORIZATION);

            if let Some(auth_header) = auth_header {
                if let Ok(auth_str) = auth_header.to_str() {
                    if let Ok(token) = jwt::extract_token_from_header(auth_str) {
                        if let Ok(claims) = jwt::decode_token(&token) {
                            // Add the claims to the request extensions
                            req.extensions_mut().insert(claims);
                            let fut = self.service.call(req);
                            return Box::pin(async move {
                                fut.await
                            });
                        }
                    }
                }
            }

            Box::pin(async move {
                Err(ErrorUnauthorized("Unauthorized"))
            })
        }
    }
}
