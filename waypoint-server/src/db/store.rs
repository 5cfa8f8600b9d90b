//! Storage seam shared by the Postgres and in-memory backends

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Pagination, Place, PlaceDraft, PlacePatch, User, Username};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("already exists: {resource} '{id}'")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn place_not_found(id: Uuid) -> Self {
        Self::NotFound {
            resource: "place",
            id: id.to_string(),
        }
    }
}

/// Place documents. Every call is scoped to the owning username; a place
/// owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait PlaceStore: Send + Sync + 'static {
    /// Owner's places, newest first.
    async fn list_places(&self, owner: &str, page: Pagination) -> Result<Vec<Place>, DbError>;

    async fn get_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError>;

    async fn create_place(&self, owner: &str, draft: PlaceDraft) -> Result<Place, DbError>;

    /// Apply a partial update and return the updated place.
    async fn update_place(&self, owner: &str, id: Uuid, patch: PlacePatch)
        -> Result<Place, DbError>;

    /// Delete and return the deleted place.
    async fn delete_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError>;
}

/// User accounts
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a user; `DbError::Conflict` if the username is taken.
    async fn create_user(&self, username: &Username, password_hash: &str)
        -> Result<User, DbError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, DbError>;
}

/// Full backend used by the HTTP layer
#[async_trait]
pub trait Store: PlaceStore + UserStore {
    /// Cheap liveness check for `/health`.
    async fn ping(&self) -> Result<(), DbError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
