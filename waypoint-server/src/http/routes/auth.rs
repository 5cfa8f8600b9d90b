//! Signup, login, logout and session introspection

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, JsonBody};
use crate::http::server::AppState;
use crate::models::{Password, User, Username};

/// Signup / login body
#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Public view of a user (no hash)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// POST /auth/signup - create an account
async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let username = Username::new(&req.username)?;
    let password = Password::new(req.password)?;

    let hasher = state.hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

    let user = state.store.create_user(&username, &hash).await?;
    tracing::info!(username = %user.username, "user signed up");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /auth/login - verify credentials and set the session cookie
///
/// Unknown usernames and wrong passwords get the same 401.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    JsonBody(req): JsonBody<Credentials>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let username = Username::new(&req.username).ok();
    let password = Password::new(req.password).ok();

    let stored = match &username {
        Some(username) => state
            .store
            .find_user(username.as_str())
            .await?
            .map(|user| user.password_hash),
        None => None,
    };

    // Every rejected login pays for one Argon2 verification
    let hasher = state.hasher.clone();
    let matches = tokio::task::spawn_blocking(move || match (&password, stored) {
        (Some(password), Some(stored)) => hasher.verify(password, &stored),
        (password, _) => Ok(hasher.verify_dummy(password.as_ref())),
    })
    .await??;

    let username = match username {
        Some(username) if matches => username,
        _ => {
            tracing::info!(username = %req.username, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.signer.issue(&username)?;
    tracing::info!(username = %username, "user logged in");

    Ok((
        jar.add(state.cookies.session(token)),
        Json(SessionResponse {
            status: "logged in",
            username: Some(username.into_string()),
        }),
    ))
}

/// GET|POST /auth/logout - clear the session cookie
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    (
        jar.remove(state.cookies.removal()),
        Json(SessionResponse {
            status: "logged out",
            username: None,
        }),
    )
}

/// GET /auth/me - who the session belongs to
async fn me(user: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        status: "logged in",
        username: Some(user.username),
    })
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout).post(logout))
        .route("/auth/me", get(me))
}
