//! Place repository
//!
//! Every query carries `username = $n` so one user can never read or
//! mutate another user's rows:
//! - update: COALESCE per column (absent fields keep their value)
//! - delete: DELETE ... RETURNING (single round trip)

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::DbError;
use crate::models::{Pagination, Place, PlaceDraft, PlacePatch};

/// Place repository
pub struct PlaceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PlaceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's places, newest first.
    pub async fn list(&self, owner: &str, page: Pagination) -> Result<Vec<Place>, DbError> {
        let places = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, username, name, country, kind, image, url, description,
                   season_to_go, visited, created_at, updated_at
            FROM places
            WHERE username = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(places)
    }

    pub async fn get(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        sqlx::query_as::<_, Place>(
            r#"
            SELECT id, username, name, country, kind, image, url, description,
                   season_to_go, visited, created_at, updated_at
            FROM places
            WHERE id = $1 AND username = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::place_not_found(id))
    }

    pub async fn create(&self, owner: &str, draft: PlaceDraft) -> Result<Place, DbError> {
        let place = sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places
                (username, name, country, kind, image, url, description, season_to_go, visited)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, username, name, country, kind, image, url, description,
                      season_to_go, visited, created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(draft.name)
        .bind(draft.country)
        .bind(draft.kind)
        .bind(draft.image)
        .bind(draft.url)
        .bind(draft.description)
        .bind(draft.season_to_go)
        .bind(draft.visited)
        .fetch_one(self.pool)
        .await?;

        Ok(place)
    }

    pub async fn update(&self, owner: &str, id: Uuid, patch: PlacePatch) -> Result<Place, DbError> {
        sqlx::query_as::<_, Place>(
            r#"
            UPDATE places SET
                name = COALESCE($3, name),
                country = COALESCE($4, country),
                kind = COALESCE($5, kind),
                image = COALESCE($6, image),
                url = COALESCE($7, url),
                description = COALESCE($8, description),
                season_to_go = COALESCE($9, season_to_go),
                visited = COALESCE($10, visited),
                updated_at = NOW()
            WHERE id = $1 AND username = $2
            RETURNING id, username, name, country, kind, image, url, description,
                      season_to_go, visited, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.name)
        .bind(patch.country)
        .bind(patch.kind)
        .bind(patch.image)
        .bind(patch.url)
        .bind(patch.description)
        .bind(patch.season_to_go)
        .bind(patch.visited)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::place_not_found(id))
    }

    pub async fn delete(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        sqlx::query_as::<_, Place>(
            r#"
            DELETE FROM places
            WHERE id = $1 AND username = $2
            RETURNING id, username, name, country, kind, image, url, description,
                      season_to_go, visited, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::place_not_found(id))
    }
}
