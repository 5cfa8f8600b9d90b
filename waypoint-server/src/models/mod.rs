//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod pagination;
pub mod place;
pub mod user;
pub mod validation;

pub use pagination::{Pagination, PaginationParams};
pub use place::{Place, PlaceDraft, PlaceInput, PlacePatch};
pub use user::{Password, User, Username};
pub use validation::ValidationError;
