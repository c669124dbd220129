use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use rently_core::booking::BookingStatus;
use rently_core::item::ItemPatch;
use rently_core::user::{Role, UserPatch, UserPublic};

use crate::error::AppError;
use crate::state::AppState;

/// Moderation surface. The admin auth middleware is layered on in
/// `app()`, so every handler here already has a verified admin caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/{id}/status", put(update_user_status))
        .route("/items", get(list_items))
        .route("/items/{id}/status", put(update_item_status))
        .route("/items/{id}", delete(delete_item))
}

async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.store.all_users().await?;
    let items = state.store.active_items().await?;
    let bookings = state.store.all_bookings().await?;

    let stats = json!({
        "totalUsers": users.len(),
        "activeUsers": users.iter().filter(|u| u.is_verified).count(),
        "totalItems": items.len(),
        "activeItems": items.iter().filter(|i| i.is_active).count(),
        "totalBookings": bookings.len(),
        "activeBookings": bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Active | BookingStatus::Confirmed))
            .count(),
        "adminUsers": users.iter().filter(|u| u.role == Role::Admin).count(),
    });

    Ok(Json(json!({
        "success": true,
        "data": stats,
        "message": "Admin stats retrieved successfully",
    })))
}

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserPublic> = state
        .store
        .all_users()
        .await?
        .into_iter()
        .map(UserPublic::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": users,
        "message": "Users retrieved successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatusRequest {
    is_verified: bool,
}

async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = UserPatch { is_verified: Some(req.is_verified), ..Default::default() };
    let user = state
        .store
        .update_user(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": UserPublic::from(user),
        "message": "User status updated successfully",
    })))
}

async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = state.store.active_items().await?;

    Ok(Json(json!({
        "success": true,
        "data": items,
        "message": "Items retrieved successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemStatusRequest {
    is_active: bool,
}

async fn update_item_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ItemStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = ItemPatch { is_active: Some(req.is_active), ..Default::default() };
    let item = state
        .store
        .update_item(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": item,
        "message": "Item status updated successfully",
    })))
}

/// Soft delete: flips the active flag, never removes the row.
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let patch = ItemPatch { is_active: Some(false), ..Default::default() };
    state
        .store
        .update_item(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Item deleted successfully",
    })))
}
