//! In-memory store for development (`waypoint serve --memory`) and tests.
//!
//! Data lives for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DbError, PlaceStore, Store, UserStore};
use crate::models::{Pagination, Place, PlaceDraft, PlacePatch, User, Username};

#[derive(Default)]
pub struct MemoryStore {
    places: RwLock<HashMap<Uuid, Place>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    async fn list_places(&self, owner: &str, page: Pagination) -> Result<Vec<Place>, DbError> {
        let places = self.places.read().await;
        let mut owned: Vec<Place> = places
            .values()
            .filter(|p| p.username == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn get_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        self.places
            .read()
            .await
            .get(&id)
            .filter(|p| p.username == owner)
            .cloned()
            .ok_or_else(|| DbError::place_not_found(id))
    }

    async fn create_place(&self, owner: &str, draft: PlaceDraft) -> Result<Place, DbError> {
        let now = Utc::now();
        let place = Place {
            id: Uuid::new_v4(),
            username: owner.to_owned(),
            name: draft.name,
            country: draft.country,
            kind: draft.kind,
            image: draft.image,
            url: draft.url,
            description: draft.description,
            season_to_go: draft.season_to_go,
            visited: draft.visited,
            created_at: now,
            updated_at: now,
        };

        self.places.write().await.insert(place.id, place.clone());
        Ok(place)
    }

    async fn update_place(
        &self,
        owner: &str,
        id: Uuid,
        patch: PlacePatch,
    ) -> Result<Place, DbError> {
        let mut places = self.places.write().await;
        let place = places
            .get_mut(&id)
            .filter(|p| p.username == owner)
            .ok_or_else(|| DbError::place_not_found(id))?;

        patch.apply(place);
        place.updated_at = Utc::now();
        Ok(place.clone())
    }

    async fn delete_place(&self, owner: &str, id: Uuid) -> Result<Place, DbError> {
        let mut places = self.places.write().await;
        match places.get(&id) {
            Some(p) if p.username == owner => {}
            _ => return Err(DbError::place_not_found(id)),
        }
        places.remove(&id).ok_or_else(|| DbError::place_not_found(id))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let mut users = self.users.write().await;
        if users.contains_key(username.as_str()) {
            return Err(DbError::Conflict {
                resource: "user",
                id: username.as_str().to_owned(),
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.as_str().to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: Utc::now(),
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DbError> {
        Ok(self.users.read().await.get(username).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
