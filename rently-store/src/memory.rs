use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use rently_core::booking::{Booking, BookingPatch};
use rently_core::error::StoreError;
use rently_core::item::{Item, ItemPatch};
use rently_core::review::Review;
use rently_core::search::SearchFilters;
use rently_core::store::Store;
use rently_core::user::{User, UserPatch};

/// Map-backed store for development and tests. Owns exclusive
/// mutation rights over its collections; single process only, not
/// persisted across restarts.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    items: RwLock<HashMap<Uuid, Item>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn create_item(&self, item: Item) -> Result<Item, StoreError> {
        self.items.write().await.insert(item.id, item.clone());
        Ok(item)
    }

    async fn item_by_id(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn items_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn search_items(&self, filters: &SearchFilters) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|i| filters.matches(i))
            .cloned()
            .collect())
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        let mut items = self.items.write().await;
        Ok(items.get_mut(&id).map(|item| {
            patch.apply(item);
            item.clone()
        }))
    }

    async fn active_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|i| i.is_active)
            .cloned()
            .collect())
    }

    async fn create_booking(&self, booking: Booking) -> Result<Booking, StoreError> {
        self.bookings.write().await.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn bookings_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.renter_id == renter_id)
            .cloned()
            .collect())
    }

    async fn bookings_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn update_booking(
        &self,
        id: Uuid,
        patch: BookingPatch,
    ) -> Result<Option<Booking>, StoreError> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.get_mut(&id).map(|booking| {
            patch.apply(booking);
            booking.clone()
        }))
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.bookings.read().await.values().cloned().collect())
    }

    async fn create_review(&self, review: Review) -> Result<Review, StoreError> {
        self.reviews.write().await.insert(review.id, review.clone());
        Ok(review)
    }

    async fn reviews_by_item(&self, item_id: Uuid) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn reviews_by_reviewer(&self, user_id: Uuid) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .reviews
            .read()
            .await
            .values()
            .filter(|r| r.reviewer_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rently_core::item::{
        Availability, ItemCategory, ItemCondition, ItemLocation, Policies, Pricing, Ratings,
    };
    use rently_core::user::Coordinates;
    use chrono::Utc;

    fn sample_item(owner: Uuid, title: &str, daily: f64) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: title.to_string(),
            description: "test".to_string(),
            category: ItemCategory::Electronics,
            sub_category: None,
            images: vec![],
            condition: ItemCondition::Good,
            pricing: Pricing {
                hourly: None,
                daily,
                weekly: None,
                monthly: None,
                security_deposit: 10.0,
            },
            availability: Availability::default(),
            location: ItemLocation {
                city: "Portland".to_string(),
                state: "OR".to_string(),
                address: None,
                coordinates: Coordinates { lat: 0.0, lng: 0.0 },
            },
            specifications: None,
            policies: Policies::default(),
            ratings: Ratings::default(),
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_user_round_trip_and_email_lookup() {
        let store = MemoryStore::new();
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
            None,
        );
        let id = user.id;
        store.create_user(user).await.unwrap();

        assert!(store.user_by_id(id).await.unwrap().is_some());
        assert!(store.user_by_email("ADA@example.com").await.unwrap().is_some());
        assert!(store.user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_entity_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_item(Uuid::new_v4(), ItemPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_search_applies_core_filters() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_item(sample_item(owner, "Camera", 80.0)).await.unwrap();
        store.create_item(sample_item(owner, "Tripod", 12.0)).await.unwrap();
        let mut hidden = sample_item(owner, "Camera bag", 8.0);
        hidden.is_active = false;
        store.create_item(hidden).await.unwrap();

        let filters = SearchFilters { query: Some("camera".to_string()), ..Default::default() };
        let found = store.search_items(&filters).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Camera");
    }

    #[tokio::test]
    async fn test_soft_deactivated_item_leaves_active_view() {
        let store = MemoryStore::new();
        let item = sample_item(Uuid::new_v4(), "Kayak", 35.0);
        let id = item.id;
        store.create_item(item).await.unwrap();
        assert_eq!(store.active_items().await.unwrap().len(), 1);

        let patch = ItemPatch { is_active: Some(false), ..Default::default() };
        store.update_item(id, patch).await.unwrap();

        assert!(store.active_items().await.unwrap().is_empty());
        // Row is still there, only the flag flipped.
        assert!(store.item_by_id(id).await.unwrap().is_some());
    }
}
