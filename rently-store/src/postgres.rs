use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use rently_core::booking::{
    Booking, BookingPatch, BookingStatus, Message, PaymentStatus, PickupDetails, ReturnDetails,
};
use rently_core::error::StoreError;
use rently_core::item::{
    Availability, Item, ItemCategory, ItemCondition, ItemLocation, ItemPatch, Policies, Pricing,
    Ratings,
};
use rently_core::review::{Review, ReviewType};
use rently_core::search::SearchFilters;
use rently_core::store::Store;
use rently_core::user::{Role, User, UserLocation, UserPatch, Verifications};

/// Relational store. Flexible blocks (pricing, availability, location,
/// policies, message threads) live in JSONB columns; enums are stored
/// as their wire-format strings.
pub struct PgStore {
    pool: PgPool,
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Enum <-> TEXT bridging through the serde wire names, so the column
/// values match what the API serializes.
fn enum_to_str<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn enum_from_str<T: DeserializeOwned>(s: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StoreError::Corrupt(format!("bad enum value {s:?}: {e}")))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    avatar: Option<String>,
    bio: Option<String>,
    role: String,
    location: Option<Json<UserLocation>>,
    is_verified: bool,
    verifications: Json<Verifications>,
    trust_score: f64,
    total_rentals: i32,
    total_listings: i32,
    joined_at: chrono::DateTime<chrono::Utc>,
    last_active_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            phone: self.phone,
            avatar: self.avatar,
            bio: self.bio,
            role: enum_from_str::<Role>(&self.role)?,
            location: self.location.map(|l| l.0),
            is_verified: self.is_verified,
            verifications: self.verifications.0,
            trust_score: self.trust_score,
            total_rentals: self.total_rentals,
            total_listings: self.total_listings,
            joined_at: self.joined_at,
            last_active_at: self.last_active_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    category: String,
    sub_category: Option<String>,
    images: Json<Vec<String>>,
    condition: String,
    pricing: Json<Pricing>,
    availability: Json<Availability>,
    location: Json<ItemLocation>,
    specifications: Option<Json<serde_json::Value>>,
    policies: Json<Policies>,
    ratings: Json<Ratings>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    is_active: bool,
}

impl ItemRow {
    fn into_item(self) -> Result<Item, StoreError> {
        Ok(Item {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            category: enum_from_str::<ItemCategory>(&self.category)?,
            sub_category: self.sub_category,
            images: self.images.0,
            condition: enum_from_str::<ItemCondition>(&self.condition)?,
            pricing: self.pricing.0,
            availability: self.availability.0,
            location: self.location.0,
            specifications: self.specifications.map(|s| s.0),
            policies: self.policies.0,
            ratings: self.ratings.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_active: self.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    item_id: Uuid,
    renter_id: Uuid,
    owner_id: Uuid,
    start_date: chrono::DateTime<chrono::Utc>,
    end_date: chrono::DateTime<chrono::Utc>,
    total_amount: f64,
    security_deposit: f64,
    status: String,
    payment_status: String,
    pickup_details: Option<Json<PickupDetails>>,
    return_details: Option<Json<ReturnDetails>>,
    messages: Json<Vec<Message>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        Ok(Booking {
            id: self.id,
            item_id: self.item_id,
            renter_id: self.renter_id,
            owner_id: self.owner_id,
            start_date: self.start_date,
            end_date: self.end_date,
            total_amount: self.total_amount,
            security_deposit: self.security_deposit,
            status: enum_from_str::<BookingStatus>(&self.status)?,
            payment_status: enum_from_str::<PaymentStatus>(&self.payment_status)?,
            pickup_details: self.pickup_details.map(|p| p.0),
            return_details: self.return_details.map(|r| r.0),
            messages: self.messages.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    booking_id: Uuid,
    reviewer_id: Uuid,
    reviewee_id: Uuid,
    item_id: Uuid,
    rating: i32,
    comment: String,
    review_type: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, StoreError> {
        Ok(Review {
            id: self.id,
            booking_id: self.booking_id,
            reviewer_id: self.reviewer_id,
            reviewee_id: self.reviewee_id,
            item_id: self.item_id,
            rating: self.rating,
            comment: self.comment,
            review_type: enum_from_str::<ReviewType>(&self.review_type)?,
            created_at: self.created_at,
        })
    }
}

const USER_COLS: &str = "id, first_name, last_name, email, password, phone, avatar, bio, role, location, is_verified, verifications, trust_score, total_rentals, total_listings, joined_at, last_active_at";
const ITEM_COLS: &str = "id, owner_id, title, description, category, sub_category, images, condition, pricing, availability, location, specifications, policies, ratings, created_at, updated_at, is_active";
const BOOKING_COLS: &str = "id, item_id, renter_id, owner_id, start_date, end_date, total_amount, security_deposit, status, payment_status, pickup_details, return_details, messages, created_at, updated_at";
const REVIEW_COLS: &str = "id, booking_id, reviewer_id, reviewee_id, item_id, rating, comment, review_type, created_at";

/// Column-level UPDATE for a user patch. Seeded with a self-assignment
/// on `id`, which no patch field can name, so every real column gets
/// assigned at most once.
fn user_update_query(id: Uuid, patch: UserPatch) -> QueryBuilder<'static, sqlx::Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET id = id");
    if let Some(v) = patch.first_name {
        qb.push(", first_name = ").push_bind(v);
    }
    if let Some(v) = patch.last_name {
        qb.push(", last_name = ").push_bind(v);
    }
    if let Some(v) = patch.phone {
        qb.push(", phone = ").push_bind(v);
    }
    if let Some(v) = patch.avatar {
        qb.push(", avatar = ").push_bind(v);
    }
    if let Some(v) = patch.bio {
        qb.push(", bio = ").push_bind(v);
    }
    if let Some(v) = patch.location {
        qb.push(", location = ").push_bind(Json(v));
    }
    if let Some(v) = patch.is_verified {
        qb.push(", is_verified = ").push_bind(v);
    }
    if let Some(v) = patch.verifications {
        qb.push(", verifications = ").push_bind(Json(v));
    }
    if let Some(v) = patch.trust_score {
        qb.push(", trust_score = ").push_bind(v);
    }
    if let Some(v) = patch.total_rentals {
        qb.push(", total_rentals = ").push_bind(v);
    }
    if let Some(v) = patch.total_listings {
        qb.push(", total_listings = ").push_bind(v);
    }
    if let Some(v) = patch.last_active_at {
        qb.push(", last_active_at = ").push_bind(v);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(format!(" RETURNING {USER_COLS}"));
    qb
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the four tables plus lookup indexes if they don't
    /// exist. Run once at startup.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                phone TEXT,
                avatar TEXT,
                bio TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                location JSONB,
                is_verified BOOLEAN NOT NULL DEFAULT FALSE,
                verifications JSONB NOT NULL DEFAULT '{"email": false, "phone": false, "identity": false}',
                trust_score DOUBLE PRECISION NOT NULL DEFAULT 0,
                total_rentals INTEGER NOT NULL DEFAULT 0,
                total_listings INTEGER NOT NULL DEFAULT 0,
                joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_active_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id UUID PRIMARY KEY,
                owner_id UUID NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                sub_category TEXT,
                images JSONB NOT NULL DEFAULT '[]',
                condition TEXT NOT NULL,
                pricing JSONB NOT NULL,
                availability JSONB NOT NULL DEFAULT '{"available": true, "calendar": []}',
                location JSONB NOT NULL,
                specifications JSONB,
                policies JSONB NOT NULL,
                ratings JSONB NOT NULL DEFAULT '{"average": 0.0, "count": 0}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY,
                item_id UUID NOT NULL REFERENCES items(id),
                renter_id UUID NOT NULL REFERENCES users(id),
                owner_id UUID NOT NULL REFERENCES users(id),
                start_date TIMESTAMPTZ NOT NULL,
                end_date TIMESTAMPTZ NOT NULL,
                total_amount DOUBLE PRECISION NOT NULL,
                security_deposit DOUBLE PRECISION NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                payment_status TEXT NOT NULL DEFAULT 'pending',
                pickup_details JSONB,
                return_details JSONB,
                messages JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id UUID PRIMARY KEY,
                booking_id UUID NOT NULL REFERENCES bookings(id),
                reviewer_id UUID NOT NULL REFERENCES users(id),
                reviewee_id UUID NOT NULL REFERENCES users(id),
                item_id UUID NOT NULL REFERENCES items(id),
                rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
                comment TEXT NOT NULL DEFAULT '',
                review_type TEXT NOT NULL DEFAULT 'item',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for stmt in [
            "CREATE INDEX IF NOT EXISTS idx_items_category ON items(category)",
            "CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner_id)",
            "CREATE INDEX IF NOT EXISTS idx_bookings_renter ON bookings(renter_id)",
            "CREATE INDEX IF NOT EXISTS idx_bookings_item ON bookings(item_id)",
            "CREATE INDEX IF NOT EXISTS idx_reviews_item ON reviews(item_id)",
        ] {
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        tracing::info!("Database schema initialized");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, phone, avatar, bio, role, location, is_verified, verifications, trust_score, total_rentals, total_listings, joined_at, last_active_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(&user.avatar)
        .bind(&user.bio)
        .bind(enum_to_str(&user.role))
        .bind(user.location.as_ref().map(Json))
        .bind(user.is_verified)
        .bind(Json(&user.verifications))
        .bind(user.trust_score)
        .bind(user.total_rentals)
        .bind(user.total_listings)
        .bind(user.joined_at)
        .bind(user.last_active_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let row = user_update_query(id, patch)
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLS} FROM users ORDER BY joined_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn create_item(&self, item: Item) -> Result<Item, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO items (id, owner_id, title, description, category, sub_category, images, condition, pricing, availability, location, specifications, policies, ratings, created_at, updated_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(item.id)
        .bind(item.owner_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(enum_to_str(&item.category))
        .bind(&item.sub_category)
        .bind(Json(&item.images))
        .bind(enum_to_str(&item.condition))
        .bind(Json(&item.pricing))
        .bind(Json(&item.availability))
        .bind(Json(&item.location))
        .bind(item.specifications.as_ref().map(Json))
        .bind(Json(&item.policies))
        .bind(Json(&item.ratings))
        .bind(item.created_at)
        .bind(item.updated_at)
        .bind(item.is_active)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(item)
    }

    async fn item_by_id(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn items_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLS} FROM items WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    /// Same predicate semantics as the in-memory path: ILIKE substring
    /// for text, cast comparison over the JSONB daily price.
    async fn search_items(&self, filters: &SearchFilters) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            SELECT {ITEM_COLS} FROM items
            WHERE is_active = TRUE
              AND ($1::TEXT IS NULL OR title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::TEXT IS NULL OR condition = $3)
              AND ($4::TEXT IS NULL OR location->>'city' ILIKE '%' || $4 || '%')
              AND ($5::DOUBLE PRECISION IS NULL OR (pricing->>'daily')::DOUBLE PRECISION >= $5)
              AND ($6::DOUBLE PRECISION IS NULL OR (pricing->>'daily')::DOUBLE PRECISION <= $6)
            "#
        ))
        .bind(&filters.query)
        .bind(filters.category.as_ref().map(enum_to_str))
        .bind(filters.condition.as_ref().map(enum_to_str))
        .bind(&filters.city)
        .bind(filters.min_price)
        .bind(filters.max_price)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn update_item(&self, id: Uuid, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        let mut qb = QueryBuilder::new("UPDATE items SET updated_at = NOW()");
        if let Some(v) = patch.title {
            qb.push(", title = ").push_bind(v);
        }
        if let Some(v) = patch.description {
            qb.push(", description = ").push_bind(v);
        }
        if let Some(v) = patch.category {
            qb.push(", category = ").push_bind(enum_to_str(&v));
        }
        if let Some(v) = patch.sub_category {
            qb.push(", sub_category = ").push_bind(v);
        }
        if let Some(v) = patch.images {
            qb.push(", images = ").push_bind(Json(v));
        }
        if let Some(v) = patch.condition {
            qb.push(", condition = ").push_bind(enum_to_str(&v));
        }
        if let Some(v) = patch.pricing {
            qb.push(", pricing = ").push_bind(Json(v));
        }
        if let Some(v) = patch.availability {
            qb.push(", availability = ").push_bind(Json(v));
        }
        if let Some(v) = patch.location {
            qb.push(", location = ").push_bind(Json(v));
        }
        if let Some(v) = patch.specifications {
            qb.push(", specifications = ").push_bind(Json(v));
        }
        if let Some(v) = patch.policies {
            qb.push(", policies = ").push_bind(Json(v));
        }
        if let Some(v) = patch.is_active {
            qb.push(", is_active = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {ITEM_COLS}"));

        let row = qb
            .build_query_as::<ItemRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn active_items(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLS} FROM items WHERE is_active = TRUE ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn create_booking(&self, booking: Booking) -> Result<Booking, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, item_id, renter_id, owner_id, start_date, end_date, total_amount, security_deposit, status, payment_status, pickup_details, return_details, messages, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(booking.id)
        .bind(booking.item_id)
        .bind(booking.renter_id)
        .bind(booking.owner_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_amount)
        .bind(booking.security_deposit)
        .bind(enum_to_str(&booking.status))
        .bind(enum_to_str(&booking.payment_status))
        .bind(booking.pickup_details.as_ref().map(Json))
        .bind(booking.return_details.as_ref().map(Json))
        .bind(Json(&booking.messages))
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(booking)
    }

    async fn booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn bookings_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE renter_id = $1 ORDER BY created_at DESC"
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn bookings_by_item(&self, item_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE item_id = $1 ORDER BY created_at DESC"
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn update_booking(
        &self,
        id: Uuid,
        patch: BookingPatch,
    ) -> Result<Option<Booking>, StoreError> {
        let mut qb = QueryBuilder::new("UPDATE bookings SET updated_at = NOW()");
        if let Some(v) = patch.status {
            qb.push(", status = ").push_bind(enum_to_str(&v));
        }
        if let Some(v) = patch.payment_status {
            qb.push(", payment_status = ").push_bind(enum_to_str(&v));
        }
        if let Some(v) = patch.pickup_details {
            qb.push(", pickup_details = ").push_bind(Json(v));
        }
        if let Some(v) = patch.return_details {
            qb.push(", return_details = ").push_bind(Json(v));
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {BOOKING_COLS}"));

        let row = qb
            .build_query_as::<BookingRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn create_review(&self, review: Review) -> Result<Review, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, reviewer_id, reviewee_id, item_id, rating, comment, review_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(review.id)
        .bind(review.booking_id)
        .bind(review.reviewer_id)
        .bind(review.reviewee_id)
        .bind(review.item_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(enum_to_str(&review.review_type))
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(review)
    }

    async fn reviews_by_item(&self, item_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLS} FROM reviews WHERE item_id = $1 ORDER BY created_at DESC"
        ))
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    async fn reviews_by_reviewer(&self, user_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLS} FROM reviews WHERE reviewer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // Postgres rejects an UPDATE that assigns the same column twice,
    // and login patches last_active_at on every call.
    #[test]
    fn test_user_update_assigns_last_active_at_once() {
        let patch = UserPatch { last_active_at: Some(Utc::now()), ..Default::default() };
        let mut qb = user_update_query(Uuid::new_v4(), patch);
        let sql = qb.sql();

        assert_eq!(sql.matches("last_active_at =").count(), 1);
        assert!(sql.contains("RETURNING"));
    }

    #[test]
    fn test_empty_user_patch_builds_valid_update() {
        let mut qb = user_update_query(Uuid::new_v4(), UserPatch::default());
        let sql = qb.sql();

        assert!(sql.starts_with("UPDATE users SET id = id WHERE id = "));
        assert_eq!(sql.matches(" = $").count(), 1);
    }
}
