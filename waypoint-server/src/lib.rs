//! waypoint-server: HTTP backend for saved travel places
//!
//! A small JSON API over one resource, `place`, owned per user. Accounts
//! sign up and log in; login sets an HttpOnly `token` cookie carrying a
//! signed session token, and every `/place` route is scoped to the
//! username inside it.
//!
//! Storage is pluggable behind [`db::Store`]: Postgres via sqlx in
//! production, an in-memory map for development and tests.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;

pub use auth::{AuthConfig, AuthError};
pub use db::{DbError, MemoryStore, PgStore, Store};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
