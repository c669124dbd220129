use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use rently_core::user::{User, UserPatch, UserPublic};

use crate::error::AppError;
use crate::middleware::auth::{issue_tokens, AuthUser};
use crate::state::AppState;

const BCRYPT_COST: u32 = 12;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/auth/profile", get(profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

fn validate_register(req: &RegisterRequest) -> Result<(), AppError> {
    if req.first_name.trim().is_empty() {
        return Err(AppError::ValidationError("First name is required".to_string()));
    }
    if req.last_name.trim().is_empty() {
        return Err(AppError::ValidationError("Last name is required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("A valid email is required".to_string()));
    }
    if req.password.len() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register(&req)?;

    if state.store.user_by_email(&req.email).await?.is_some() {
        return Err(AppError::ValidationError(
            "User already exists with this email".to_string(),
        ));
    }

    let hash = bcrypt::hash(&req.password, BCRYPT_COST)?;
    let user = User::new(req.first_name, req.last_name, req.email, hash, req.phone);
    let user = state.store.create_user(user).await?;
    let tokens = issue_tokens(&state, user.id)?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "user": UserPublic::from(user), "tokens": tokens },
            "message": "User registered successfully",
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .user_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Invalid email or password".to_string()))?;

    if !bcrypt::verify(&req.password, &user.password)? {
        return Err(AppError::AuthenticationError("Invalid email or password".to_string()));
    }

    let patch = UserPatch { last_active_at: Some(chrono::Utc::now()), ..Default::default() };
    let user = state
        .store
        .update_user(user.id, patch)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Invalid email or password".to_string()))?;

    let tokens = issue_tokens(&state, user.id)?;

    Ok(Json(json!({
        "success": true,
        "data": { "user": UserPublic::from(user), "tokens": tokens },
        "message": "Login successful",
    })))
}

async fn profile(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": UserPublic::from(user),
        "message": "Profile retrieved successfully",
    })))
}
