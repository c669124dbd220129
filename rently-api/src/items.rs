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

use rently_core::item::{
    Availability, Item, ItemCategory, ItemCondition, ItemLocation, ItemPatch, Policies, Pricing,
    Ratings,
};
use rently_core::search::{self, SearchFilters, SortKey, DEFAULT_PAGE_SIZE};
use rently_core::user::{UserPatch, UserPublic};

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items))
        .route("/api/items/featured", get(featured_items))
        .route("/api/items/{id}", get(get_item))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", post(create_item))
        .route("/api/items/user/my-items", get(my_items))
        .route("/api/items/{id}", put(update_item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemRequest {
    title: String,
    description: String,
    category: ItemCategory,
    sub_category: Option<String>,
    images: Option<Vec<String>>,
    condition: ItemCondition,
    pricing: Pricing,
    location: ItemLocation,
    specifications: Option<serde_json::Value>,
    policies: Option<Policies>,
}

async fn create_item(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::ValidationError("Description is required".to_string()));
    }
    if req.location.city.trim().is_empty() {
        return Err(AppError::ValidationError("City is required".to_string()));
    }
    if req.location.state.trim().is_empty() {
        return Err(AppError::ValidationError("State is required".to_string()));
    }
    req.pricing.validate()?;

    let now = Utc::now();
    let item = Item {
        id: Uuid::new_v4(),
        owner_id: user_id,
        title: req.title,
        description: req.description,
        category: req.category,
        sub_category: req.sub_category,
        images: req.images.unwrap_or_default(),
        condition: req.condition,
        pricing: req.pricing,
        availability: Availability::default(),
        location: req.location,
        specifications: req.specifications,
        policies: req.policies.unwrap_or_default(),
        ratings: Ratings::default(),
        created_at: now,
        updated_at: now,
        is_active: true,
    };

    let item = state.store.create_item(item).await?;

    // Keep the owner's listing counter in step with their catalog.
    if let Some(owner) = state.store.user_by_id(user_id).await? {
        let patch = UserPatch {
            total_listings: Some(owner.total_listings + 1),
            ..Default::default()
        };
        state.store.update_user(user_id, patch).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": item,
            "message": "Item created successfully",
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsQuery {
    query: Option<String>,
    category: Option<ItemCategory>,
    condition: Option<ItemCondition>,
    city: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort_by: Option<SortKey>,
    page: Option<usize>,
    limit: Option<usize>,
}

async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = SearchFilters {
        query: params.query,
        category: params.category,
        condition: params.condition,
        city: params.city,
        min_price: params.min_price,
        max_price: params.max_price,
    };

    let mut items = state.store.search_items(&filters).await?;
    search::sort_items(&mut items, params.sort_by.unwrap_or_default());
    let page = search::paginate(
        items,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    Ok(Json(json!({
        "success": true,
        "data": { "items": page.items, "pagination": page.pagination },
        "message": "Items retrieved successfully",
    })))
}

async fn featured_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = state.store.active_items().await?;
    let featured = search::featured_items(items);

    Ok(Json(json!({
        "success": true,
        "data": featured,
        "message": "Featured items retrieved successfully",
    })))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .store
        .item_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    let owner = state
        .store
        .user_by_id(item.owner_id)
        .await?
        .map(UserPublic::from);
    let reviews = state.store.reviews_by_item(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "item": item, "owner": owner, "reviews": reviews },
        "message": "Item retrieved successfully",
    })))
}

async fn my_items(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.store.items_by_owner(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": items,
        "message": "User items retrieved successfully",
    })))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ItemPatch>,
) -> Result<impl IntoResponse, AppError> {
    let item = state
        .store
        .item_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    if item.owner_id != user_id {
        return Err(AppError::AuthorizationError(
            "Not authorized to update this item".to_string(),
        ));
    }

    if let Some(pricing) = &patch.pricing {
        pricing.validate()?;
    }

    let updated = state
        .store
        .update_item(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Item not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": updated,
        "message": "Item updated successfully",
    })))
}
