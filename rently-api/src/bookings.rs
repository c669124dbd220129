use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use rently_core::booking::{
    self, Booking, BookingPatch, BookingRequest,
};
use rently_core::user::UserPublic;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/status", put(update_booking_status))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(AuthUser(renter_id)): Extension<AuthUser>,
    Json(req): Json<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .store
        .item_by_id(req.item_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    booking::validate_request(&item, renter_id, req.start_date, req.end_date, Utc::now())?;

    // Reject date-range collisions with live bookings on the same item.
    let existing = state.store.bookings_by_item(item.id).await?;
    if booking::overlaps_existing(&existing, req.start_date, req.end_date) {
        return Err(AppError::ConflictError(
            "Item is already booked for part of this period".to_string(),
        ));
    }

    let created = state
        .store
        .create_booking(Booking::from_request(req, item.owner_id, renter_id))
        .await?;

    tracing::info!("Booking {} created for item {}", created.id, created.item_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": created,
            "message": "Booking request created successfully",
        })),
    ))
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BookingView {
    #[default]
    Renter,
    Owner,
}

#[derive(Debug, Default, Deserialize)]
struct ListBookingsQuery {
    #[serde(rename = "type", default)]
    view: BookingView,
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(params): Query<ListBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut bookings = match params.view {
        BookingView::Owner => {
            let all = state.store.all_bookings().await?;
            all.into_iter().filter(|b| b.owner_id == user_id).collect()
        }
        BookingView::Renter => state.store.bookings_by_renter(user_id).await?,
    };

    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({
        "success": true,
        "data": bookings,
        "message": "Bookings retrieved successfully",
    })))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .store
        .booking_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if !booking.involves(user_id) {
        return Err(AppError::AuthorizationError(
            "Not authorized to view this booking".to_string(),
        ));
    }

    let item = state.store.item_by_id(booking.item_id).await?;
    let renter = state
        .store
        .user_by_id(booking.renter_id)
        .await?
        .map(UserPublic::from);
    let owner = state
        .store
        .user_by_id(booking.owner_id)
        .await?
        .map(UserPublic::from);

    Ok(Json(json!({
        "success": true,
        "data": { "booking": booking, "item": item, "renter": renter, "owner": owner },
        "message": "Booking retrieved successfully",
    })))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BookingPatch>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .store
        .booking_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    // Payment-only updates still require being a party to the booking.
    if !booking.involves(user_id) {
        return Err(AppError::AuthorizationError(
            "Not authorized to update this booking".to_string(),
        ));
    }

    if let Some(target) = patch.status {
        booking::authorize_transition(&booking, target, user_id)?;
    }

    let updated = state
        .store
        .update_booking(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": updated,
        "message": "Booking updated successfully",
    })))
}
