use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Furniture,
    Electronics,
    Tools,
    Sports,
    Books,
    Musical,
    Appliances,
    Vehicles,
    Party,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
    NeedsRepair,
}

/// Price points per rental period. `daily` and `security_deposit` are
/// required and non-negative; the rest are optional tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub hourly: Option<f64>,
    pub daily: f64,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
    pub security_deposit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub calendar: Vec<BookingPeriod>,
}

impl Default for Availability {
    fn default() -> Self {
        Self { available: true, calendar: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemLocation {
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupDelivery {
    Pickup,
    Delivery,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    Flexible,
    Moderate,
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policies {
    pub pickup_delivery: PickupDelivery,
    pub cancellation_policy: CancellationPolicy,
    pub additional_rules: Option<String>,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            pickup_delivery: PickupDelivery::Pickup,
            cancellation_policy: CancellationPolicy::Flexible,
            additional_rules: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub average: f64,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    /// Immutable after creation.
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ItemCategory,
    pub sub_category: Option<String>,
    pub images: Vec<String>,
    pub condition: ItemCondition,
    pub pricing: Pricing,
    pub availability: Availability,
    pub location: ItemLocation,
    pub specifications: Option<serde_json::Value>,
    pub policies: Policies,
    pub ratings: Ratings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Mutable item fields, updated by the owner. The active flag is also
/// flipped by the admin surface; ownership and timestamps are not
/// patchable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ItemCategory>,
    pub sub_category: Option<String>,
    pub images: Option<Vec<String>>,
    pub condition: Option<ItemCondition>,
    pub pricing: Option<Pricing>,
    pub availability: Option<Availability>,
    pub location: Option<ItemLocation>,
    pub specifications: Option<serde_json::Value>,
    pub policies: Option<Policies>,
    pub is_active: Option<bool>,
}

impl ItemPatch {
    pub fn apply(self, item: &mut Item) {
        if let Some(v) = self.title {
            item.title = v;
        }
        if let Some(v) = self.description {
            item.description = v;
        }
        if let Some(v) = self.category {
            item.category = v;
        }
        if let Some(v) = self.sub_category {
            item.sub_category = Some(v);
        }
        if let Some(v) = self.images {
            item.images = v;
        }
        if let Some(v) = self.condition {
            item.condition = v;
        }
        if let Some(v) = self.pricing {
            item.pricing = v;
        }
        if let Some(v) = self.availability {
            item.availability = v;
        }
        if let Some(v) = self.location {
            item.location = v;
        }
        if let Some(v) = self.specifications {
            item.specifications = Some(v);
        }
        if let Some(v) = self.policies {
            item.policies = v;
        }
        if let Some(v) = self.is_active {
            item.is_active = v;
        }
        item.updated_at = Utc::now();
    }
}

impl Pricing {
    /// `daily` and `security_deposit` must be present and non-negative.
    pub fn validate(&self) -> Result<(), crate::error::DomainError> {
        if self.daily < 0.0 {
            return Err(crate::error::DomainError::Validation(
                "Daily price must be non-negative".to_string(),
            ));
        }
        if self.security_deposit < 0.0 {
            return Err(crate::error::DomainError::Validation(
                "Security deposit must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
