use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
}

/// Per-channel verification flags, independent of the aggregate
/// `is_verified` toggle the admin surface flips.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Verifications {
    pub email: bool,
    pub phone: bool,
    pub identity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash, never a cleartext password.
    pub password: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub location: Option<UserLocation>,
    pub is_verified: bool,
    pub verifications: Verifications,
    /// Reputation aggregate, 0.0..=5.0.
    pub trust_score: f64,
    pub total_rentals: i32,
    pub total_listings: i32,
    pub joined_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: String, last_name: String, email: String, password_hash: String, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            password: password_hash,
            phone,
            avatar: None,
            bio: None,
            role: Role::User,
            location: None,
            is_verified: false,
            verifications: Verifications::default(),
            trust_score: 0.0,
            total_rentals: 0,
            total_listings: 0,
            joined_at: now,
            last_active_at: now,
        }
    }
}

/// Response projection of a user with the password hash stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub location: Option<UserLocation>,
    pub is_verified: bool,
    pub verifications: Verifications,
    pub trust_score: f64,
    pub total_rentals: i32,
    pub total_listings: i32,
    pub joined_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            avatar: u.avatar,
            bio: u.bio,
            role: u.role,
            location: u.location,
            is_verified: u.is_verified,
            verifications: u.verifications,
            trust_score: u.trust_score,
            total_rentals: u.total_rentals,
            total_listings: u.total_listings,
            joined_at: u.joined_at,
            last_active_at: u.last_active_at,
        }
    }
}

/// Mutable user fields. Identity, email, password and role are managed
/// by dedicated flows and deliberately absent here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<UserLocation>,
    pub is_verified: Option<bool>,
    pub verifications: Option<Verifications>,
    pub trust_score: Option<f64>,
    pub total_rentals: Option<i32>,
    pub total_listings: Option<i32>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.phone {
            user.phone = Some(v);
        }
        if let Some(v) = self.avatar {
            user.avatar = Some(v);
        }
        if let Some(v) = self.bio {
            user.bio = Some(v);
        }
        if let Some(v) = self.location {
            user.location = Some(v);
        }
        if let Some(v) = self.is_verified {
            user.is_verified = v;
        }
        if let Some(v) = self.verifications {
            user.verifications = v;
        }
        if let Some(v) = self.trust_score {
            user.trust_score = v;
        }
        if let Some(v) = self.total_rentals {
            user.total_rentals = v;
        }
        if let Some(v) = self.total_listings {
            user.total_listings = v;
        }
        if let Some(v) = self.last_active_at {
            user.last_active_at = v;
        }
    }
}
