//! Domain models for the ratings API.
//!
//! Request payloads (`*Input`) are deserialized leniently and validated into
//! typed values (`New*`) before any repository is called.

pub mod rating;
pub mod store;
pub mod user;
pub mod validation;

pub use rating::{OwnerRatings, Rating, RatingInput, RatingWrite, ReceivedRating};
pub use store::{NewStore, Store, StoreFilter, StoreInput, StoreSummary};
pub use user::{NewUser, User, UserDetail, UserFilter, UserInput};
pub use validation::{FieldError, ValidationErrors};
