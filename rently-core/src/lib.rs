pub mod booking;
pub mod error;
pub mod item;
pub mod review;
pub mod search;
pub mod store;
pub mod user;

pub use booking::{Booking, BookingPatch, BookingStatus, PaymentStatus};
pub use error::{DomainError, StoreError};
pub use item::{Item, ItemCategory, ItemCondition, ItemPatch};
pub use review::Review;
pub use search::{SearchFilters, SortKey};
pub use store::Store;
pub use user::{Role, User, UserPatch, UserPublic};
