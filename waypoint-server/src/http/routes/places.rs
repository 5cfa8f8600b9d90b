//! Place endpoints
//!
//! Every handler takes an [`AuthUser`]; the session's username is the owner
//! used to scope the store call. An owner field in the body is ignored.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, JsonBody, QueryParams, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams, Place, PlaceDraft, PlaceInput, PlacePatch};

/// Place response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub season_to_go: Option<String>,
    pub visited: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Place> for PlaceResponse {
    fn from(p: Place) -> Self {
        Self {
            id: p.id,
            username: p.username,
            name: p.name,
            country: p.country,
            kind: p.kind,
            image: p.image,
            url: p.url,
            description: p.description,
            season_to_go: p.season_to_go,
            visited: p.visited,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// GET /place - the caller's places, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    QueryParams(params): QueryParams<PaginationParams>,
) -> Result<Json<Vec<PlaceResponse>>, ApiError> {
    let page = Pagination::from(params);
    let places = state.store.list_places(&user.username, page).await?;

    Ok(Json(places.into_iter().map(PlaceResponse::from).collect()))
}

/// POST /place - create a place owned by the caller
async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(input): JsonBody<PlaceInput>,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    let draft = PlaceDraft::validate(input)?;
    let place = state.store.create_place(&user.username, draft).await?;
    tracing::debug!(id = %place.id, owner = %place.username, "place created");

    Ok((StatusCode::CREATED, Json(PlaceResponse::from(place))))
}

/// GET /place/{id}
async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state.store.get_place(&user.username, id).await?;
    Ok(Json(PlaceResponse::from(place)))
}

/// PUT /place/{id} - partial update, returns the updated place
async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidUuid(id): ValidUuid,
    JsonBody(input): JsonBody<PlaceInput>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let patch = PlacePatch::validate(input)?;

    let place = if patch.is_empty() {
        state.store.get_place(&user.username, id).await?
    } else {
        state.store.update_place(&user.username, id, patch).await?
    };

    Ok(Json(PlaceResponse::from(place)))
}

/// DELETE /place/{id} - returns the deleted place
async fn destroy(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidUuid(id): ValidUuid,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state.store.delete_place(&user.username, id).await?;
    tracing::debug!(id = %place.id, owner = %place.username, "place deleted");

    Ok(Json(PlaceResponse::from(place)))
}

/// Place routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/place", get(index).post(create))
        .route("/place/{id}", get(show).put(update).delete(destroy))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::http::test_support::{app, body_json, post_json, send, session, state};
    use crate::http::{build_router, ServerConfig};
    use crate::models::Username;

    fn kyoto() -> Value {
        json!({
            "name": "Kyoto",
            "country": "Japan",
            "type": "city",
            "image": "https://example.com/kyoto.jpg",
            "seasonToGo": "spring",
            "visited": false
        })
    }

    #[tokio::test]
    async fn requires_session() {
        let app = app();
        for (method, uri) in [
            ("GET", "/place"),
            ("POST", "/place"),
            ("GET", "/place/8d3c1f3e-0000-4000-8000-000000000000"),
            ("PUT", "/place/8d3c1f3e-0000-4000-8000-000000000000"),
            ("DELETE", "/place/8d3c1f3e-0000-4000-8000-000000000000"),
        ] {
            let body = matches!(method, "POST" | "PUT").then(kyoto);
            let response = send(&app, method, uri, None, body).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            assert_eq!(body_json(response).await["error"], "not_authorized");
        }
    }

    #[tokio::test]
    async fn forged_cookie_is_rejected() {
        let app = app();
        let response = send(&app, "GET", "/place", Some("token=e30.AAAA"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_cookie_is_rejected() {
        let state = state();
        let app = build_router(state.clone(), &ServerConfig::default());
        session(&app, "wanderer").await;

        let issued = chrono::Utc::now() - state.signer.ttl() - chrono::Duration::minutes(1);
        let token = state
            .signer
            .issue_at(&Username::new("wanderer").unwrap(), issued)
            .unwrap();
        let cookie = format!("token={}", token);

        let response = send(&app, "GET", "/place", Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "not_authorized");
    }

    #[tokio::test]
    async fn malformed_query_is_json_400() {
        let app = app();
        let cookie = session(&app, "wanderer").await;

        for uri in ["/place?page=-1", "/place?per_page=lots"] {
            let response = send(&app, "GET", uri, Some(cookie.as_str()), None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body_json(response).await["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let app = app();
        let cookie = session(&app, "wanderer").await;

        // Create
        let response = post_json(&app, "/place", Some(cookie.as_str()), kyoto()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["name"], "Kyoto");
        assert_eq!(created["type"], "city");
        assert_eq!(created["seasonToGo"], "spring");
        assert_eq!(created["username"], "wanderer");
        let id = created["_id"].as_str().unwrap().to_owned();

        // Index
        let response = send(&app, "GET", "/place", Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        // Show
        let uri = format!("/place/{}", id);
        let response = send(&app, "GET", &uri, Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        // Update only `visited`
        let response = send(&app, "PUT", &uri, Some(cookie.as_str()), Some(json!({ "visited": true }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["visited"], true);
        assert_eq!(updated["name"], "Kyoto");

        // Delete returns the document
        let response = send(&app, "DELETE", &uri, Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["_id"], id.as_str());

        let response = send(&app, "GET", &uri, Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn places_are_private() {
        let app = app();
        let alice = session(&app, "alice").await;
        let bob = session(&app, "bob").await;

        let created = body_json(post_json(&app, "/place", Some(alice.as_str()), kyoto()).await).await;
        let uri = format!("/place/{}", created["_id"].as_str().unwrap());

        let list = body_json(send(&app, "GET", "/place", Some(bob.as_str()), None).await).await;
        assert!(list.as_array().unwrap().is_empty());

        for method in ["GET", "DELETE"] {
            let response = send(&app, method, &uri, Some(bob.as_str()), None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        let response = send(&app, "PUT", &uri, Some(bob.as_str()), Some(json!({ "visited": true }))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Untouched for the owner
        let place = body_json(send(&app, "GET", &uri, Some(alice.as_str()), None).await).await;
        assert_eq!(place["visited"], false);
    }

    #[tokio::test]
    async fn owner_in_body_is_ignored() {
        let app = app();
        let cookie = session(&app, "wanderer").await;

        let mut body = kyoto();
        body["username"] = json!("someone-else");
        let created = body_json(post_json(&app, "/place", Some(cookie.as_str()), body).await).await;
        assert_eq!(created["username"], "wanderer");
    }

    #[tokio::test]
    async fn bearer_header_works() {
        let app = app();
        let cookie = session(&app, "wanderer").await;
        let token = cookie.trim_start_matches("token=");

        let request = axum::http::Request::builder()
            .uri("/place")
            .header("authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_input() {
        let app = app();
        let cookie = session(&app, "wanderer").await;

        let response = post_json(&app, "/place", Some(cookie.as_str()), json!({ "name": "  " })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["field"], "name");

        let response = send(&app, "GET", "/place/not-a-uuid", Some(cookie.as_str()), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_update_returns_place_unchanged() {
        let app = app();
        let cookie = session(&app, "wanderer").await;
        let created = body_json(post_json(&app, "/place", Some(cookie.as_str()), kyoto()).await).await;
        let uri = format!("/place/{}", created["_id"].as_str().unwrap());

        let response = send(&app, "PUT", &uri, Some(cookie.as_str()), Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["updatedAt"], created["updatedAt"]);
    }

    #[tokio::test]
    async fn index_paginates() {
        let app = app();
        let cookie = session(&app, "wanderer").await;
        for _ in 0..3 {
            post_json(&app, "/place", Some(cookie.as_str()), kyoto()).await;
        }

        let page = body_json(send(&app, "GET", "/place?page=2&per_page=2", Some(cookie.as_str()), None).await).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
    }
}
