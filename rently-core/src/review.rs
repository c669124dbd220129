use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Item,
    User,
}

/// Append-only rating attached to a completed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub item_id: Uuid,
    /// 1..=5 inclusive.
    pub rating: i32,
    pub comment: String,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn validate(&self) -> Result<(), crate::error::DomainError> {
        if !(1..=5).contains(&self.rating) {
            return Err(crate::error::DomainError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut review = Review {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            reviewer_id: Uuid::new_v4(),
            reviewee_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            rating: 5,
            comment: "Great drill".to_string(),
            review_type: ReviewType::Item,
            created_at: Utc::now(),
        };
        assert!(review.validate().is_ok());

        review.rating = 0;
        assert!(review.validate().is_err());
        review.rating = 6;
        assert!(review.validate().is_err());
    }
}
