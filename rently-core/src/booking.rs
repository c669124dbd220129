use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    /// Reserved: declared in the wire format but no caller role may
    /// transition into it yet.
    Active,
    Completed,
    Cancelled,
    /// Reserved, same as `Active`.
    Disputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    PartialRefund,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupMethod {
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupDetails {
    pub method: PickupMethod,
    pub address: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDetails {
    pub returned_at: Option<DateTime<Utc>>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub damage_reported: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub attachments: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub item_id: Uuid,
    pub renter_id: Uuid,
    /// Copied from the item at creation so the booking stays coherent
    /// if the item record changes later.
    pub owner_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub security_deposit: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub pickup_details: Option<PickupDetails>,
    pub return_details: Option<ReturnDetails>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable booking fields. Status changes go through
/// [`authorize_transition`] before a patch is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub pickup_details: Option<PickupDetails>,
    pub return_details: Option<ReturnDetails>,
}

impl BookingPatch {
    pub fn apply(self, booking: &mut Booking) {
        if let Some(v) = self.status {
            booking.status = v;
        }
        if let Some(v) = self.payment_status {
            booking.payment_status = v;
        }
        if let Some(v) = self.pickup_details {
            booking.pickup_details = Some(v);
        }
        if let Some(v) = self.return_details {
            booking.return_details = Some(v);
        }
        booking.updated_at = Utc::now();
    }
}

/// Validated inputs for a booking request. Amounts are echoed from the
/// client; the date and ownership rules are what the engine enforces.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub item_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_amount: f64,
    pub security_deposit: f64,
    pub pickup_details: Option<PickupDetails>,
}

/// Fail-fast validation of a create request against item state and
/// temporal rules. Each rule is reported independently.
pub fn validate_request(
    item: &Item,
    renter_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if !item.availability.available {
        return Err(DomainError::InvalidState(
            "Item is not available for booking".to_string(),
        ));
    }
    if item.owner_id == renter_id {
        return Err(DomainError::Forbidden(
            "You cannot book your own item".to_string(),
        ));
    }
    if start >= end {
        return Err(DomainError::Validation(
            "End date must be after start date".to_string(),
        ));
    }
    if start < now {
        return Err(DomainError::Validation(
            "Start date cannot be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Statuses that block a date range from being booked again.
fn blocks_range(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Active
    )
}

/// True when `[start, end)` intersects any blocking booking on the
/// item. Back-to-back ranges (one ending exactly where the next
/// starts) do not collide.
pub fn overlaps_existing(
    existing: &[Booking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    existing
        .iter()
        .filter(|b| blocks_range(b.status))
        .any(|b| start < b.end_date && end > b.start_date)
}

/// Role gate for status transitions: confirmed/cancelled are owner
/// moves, completed may come from either side, and everything else
/// (including the reserved active/disputed states) is closed.
pub fn authorize_transition(
    booking: &Booking,
    target: BookingStatus,
    caller_id: Uuid,
) -> Result<(), DomainError> {
    match target {
        BookingStatus::Confirmed | BookingStatus::Cancelled => {
            if booking.owner_id != caller_id {
                return Err(DomainError::Forbidden(
                    "Only the item owner can change this status".to_string(),
                ));
            }
        }
        BookingStatus::Completed => {
            if booking.owner_id != caller_id && booking.renter_id != caller_id {
                return Err(DomainError::Forbidden(
                    "Not authorized to update this booking".to_string(),
                ));
            }
        }
        _ => {
            return Err(DomainError::Forbidden(
                "This status cannot be set directly".to_string(),
            ));
        }
    }
    Ok(())
}

impl Booking {
    /// Builds a pending booking from a validated request, denormalizing
    /// the owner from the item.
    pub fn from_request(req: BookingRequest, owner_id: Uuid, renter_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_id: req.item_id,
            renter_id,
            owner_id,
            start_date: req.start_date,
            end_date: req.end_date,
            total_amount: req.total_amount,
            security_deposit: req.security_deposit,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            pickup_details: req.pickup_details,
            return_details: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.renter_id == user_id || self.owner_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{
        Availability, Item, ItemCategory, ItemCondition, ItemLocation, Policies, Pricing, Ratings,
    };
    use crate::user::Coordinates;
    use chrono::Duration;

    fn item_owned_by(owner: Uuid) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::new_v4(),
            owner_id: owner,
            title: "Pressure washer".to_string(),
            description: "2000 PSI electric".to_string(),
            category: ItemCategory::Tools,
            sub_category: None,
            images: vec![],
            condition: ItemCondition::Good,
            pricing: Pricing {
                hourly: None,
                daily: 40.0,
                weekly: None,
                monthly: None,
                security_deposit: 150.0,
            },
            availability: Availability::default(),
            location: ItemLocation {
                city: "Denver".to_string(),
                state: "CO".to_string(),
                address: None,
                coordinates: Coordinates { lat: 39.7, lng: -104.9 },
            },
            specifications: None,
            policies: Policies::default(),
            ratings: Ratings::default(),
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    fn booking_between(
        item: &Item,
        renter: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Booking {
        let mut b = Booking::from_request(
            BookingRequest {
                item_id: item.id,
                start_date: start,
                end_date: end,
                total_amount: 80.0,
                security_deposit: 150.0,
                pickup_details: None,
            },
            item.owner_id,
            renter,
        );
        b.status = status;
        b
    }

    #[test]
    fn test_create_rejects_unavailable_item() {
        let now = Utc::now();
        let mut item = item_owned_by(Uuid::new_v4());
        item.availability.available = false;

        let err = validate_request(&item, Uuid::new_v4(), now + Duration::days(1), now + Duration::days(2), now)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn test_create_rejects_own_item() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let item = item_owned_by(owner);

        let err = validate_request(&item, owner, now + Duration::days(1), now + Duration::days(2), now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn test_create_rejects_inverted_dates() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());

        let err = validate_request(&item, Uuid::new_v4(), now + Duration::days(2), now + Duration::days(1), now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Equal start/end is also rejected.
        let err = validate_request(&item, Uuid::new_v4(), now + Duration::days(1), now + Duration::days(1), now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_past_start() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());

        let err = validate_request(&item, Uuid::new_v4(), now - Duration::days(1), now + Duration::days(1), now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_create_accepts_valid_request() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());

        assert!(validate_request(
            &item,
            Uuid::new_v4(),
            now + Duration::days(1),
            now + Duration::days(3),
            now
        )
        .is_ok());
    }

    #[test]
    fn test_overlap_detected_for_blocking_statuses() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let existing = vec![booking_between(
            &item,
            Uuid::new_v4(),
            now + Duration::days(10),
            now + Duration::days(15),
            BookingStatus::Confirmed,
        )];

        assert!(overlaps_existing(&existing, now + Duration::days(12), now + Duration::days(20)));
        assert!(overlaps_existing(&existing, now + Duration::days(8), now + Duration::days(11)));
        // Fully outside.
        assert!(!overlaps_existing(&existing, now + Duration::days(20), now + Duration::days(25)));
        // Back-to-back is allowed.
        assert!(!overlaps_existing(&existing, now + Duration::days(15), now + Duration::days(18)));
    }

    #[test]
    fn test_cancelled_booking_does_not_block() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let existing = vec![booking_between(
            &item,
            Uuid::new_v4(),
            now + Duration::days(10),
            now + Duration::days(15),
            BookingStatus::Cancelled,
        )];

        assert!(!overlaps_existing(&existing, now + Duration::days(12), now + Duration::days(14)));
    }

    #[test]
    fn test_only_owner_confirms_or_cancels() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let renter = Uuid::new_v4();
        let booking = booking_between(
            &item,
            renter,
            now + Duration::days(1),
            now + Duration::days(3),
            BookingStatus::Pending,
        );

        assert!(authorize_transition(&booking, BookingStatus::Confirmed, item.owner_id).is_ok());
        assert!(authorize_transition(&booking, BookingStatus::Cancelled, item.owner_id).is_ok());
        assert!(authorize_transition(&booking, BookingStatus::Confirmed, renter).is_err());
        assert!(authorize_transition(&booking, BookingStatus::Cancelled, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_either_party_completes() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let renter = Uuid::new_v4();
        let booking = booking_between(
            &item,
            renter,
            now + Duration::days(1),
            now + Duration::days(3),
            BookingStatus::Confirmed,
        );

        assert!(authorize_transition(&booking, BookingStatus::Completed, item.owner_id).is_ok());
        assert!(authorize_transition(&booking, BookingStatus::Completed, renter).is_ok());
        assert!(authorize_transition(&booking, BookingStatus::Completed, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_reserved_states_are_closed() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let renter = Uuid::new_v4();
        let booking = booking_between(
            &item,
            renter,
            now + Duration::days(1),
            now + Duration::days(3),
            BookingStatus::Confirmed,
        );

        for target in [BookingStatus::Active, BookingStatus::Disputed, BookingStatus::Pending] {
            assert!(authorize_transition(&booking, target, item.owner_id).is_err());
            assert!(authorize_transition(&booking, target, renter).is_err());
        }
    }

    #[test]
    fn test_new_booking_starts_pending() {
        let now = Utc::now();
        let item = item_owned_by(Uuid::new_v4());
        let booking = booking_between(
            &item,
            Uuid::new_v4(),
            now + Duration::days(1),
            now + Duration::days(2),
            BookingStatus::Pending,
        );

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert!(booking.messages.is_empty());
        assert!(booking.start_date < booking.end_date);
        assert_eq!(booking.owner_id, item.owner_id);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let raw = serde_json::json!({ "status": "confirmed", "renterId": "nope" });
        assert!(serde_json::from_value::<BookingPatch>(raw).is_err());
    }

    #[test]
    fn test_invalid_payment_status_rejected_at_parse() {
        let raw = serde_json::json!({ "paymentStatus": "gold-pressed-latinum" });
        assert!(serde_json::from_value::<BookingPatch>(raw).is_err());
    }
}
