use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingPatch};
use crate::error::StoreError;
use crate::item::{Item, ItemPatch};
use crate::review::Review;
use crate::search::SearchFilters;
use crate::user::{User, UserPatch};

/// One interface over users, items, bookings and reviews, with a
/// map-backed and a PostgreSQL-backed implementation selected at
/// startup. Absence is `Ok(None)` / empty vec; `Err` is reserved for
/// structural failures.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError>;
    async fn all_users(&self) -> Result<Vec<User>, StoreError>;

    // Items
    async fn create_item(&self, item: Item) -> Result<Item, StoreError>;
    async fn item_by_id(&self, id: Uuid) -> Result<Option<Item>, StoreError>;
    async fn items_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, StoreError>;
    /// Filter semantics follow [`SearchFilters::matches`]; the SQL
    /// backend must translate them faithfully (ILIKE substring, cast
    /// comparison for the price range).
    async fn search_items(&self, filters: &SearchFilters) -> Result<Vec<Item>, StoreError>;
    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<Option<Item>, StoreError>;
    /// Active items only.
    async fn active_items(&self) -> Result<Vec<Item>, StoreError>;

    // Bookings
    async fn create_booking(&self, booking: Booking) -> Result<Booking, StoreError>;
    async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    async fn bookings_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, StoreError>;
    async fn bookings_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, StoreError>;
    async fn update_booking(
        &self,
        id: Uuid,
        patch: BookingPatch,
    ) -> Result<Option<Booking>, StoreError>;
    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    // Reviews
    async fn create_review(&self, review: Review) -> Result<Review, StoreError>;
    async fn reviews_by_item(&self, item_id: Uuid) -> Result<Vec<Review>, StoreError>;
    async fn reviews_by_reviewer(&self, user_id: Uuid) -> Result<Vec<Review>, StoreError>;
}
