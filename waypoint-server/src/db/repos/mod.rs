//! Postgres repositories and the `PgStore` backend built on them

pub mod places;
pub mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub use places::PlaceRepo;
pub use users::UserRepo;

use super::{DbError, PlaceStore, Store, UserStore};
use crate::models::{Pagination, Place, PlaceDraft, PlacePatch, User, Username};

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, run migrations and wrap the pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DbError> {
        let pool = super::pool::create_pool_with_options(database_url, max_connections).await?;
        super::migrations::run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl PlaceStore for PgStore {
    async fn list_places(&self, owner: &str, page: Pagination) -> Result<Vec<Place>, DbError> {
        PlaceRepo::new(&self.pool).list(owner, page).await
    }

    async fn get_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        PlaceRepo::new(&self.pool).get(owner, id).await
    }

    async fn create_place(&self, owner: &str, draft: PlaceDraft) -> Result<Place, DbError> {
        PlaceRepo::new(&self.pool).create(owner, draft).await
    }

    async fn update_place(
        &self,
        owner: &str,
        id: Uuid,
        patch: PlacePatch,
    ) -> Result<Place, DbError> {
        PlaceRepo::new(&self.pool).update(owner, id, patch).await
    }

    async fn delete_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        PlaceRepo::new(&self.pool).delete(owner, id).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, DbError> {
        UserRepo::new(&self.pool).create(username, password_hash).await
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DbError> {
        UserRepo::new(&self.pool).find(username).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
