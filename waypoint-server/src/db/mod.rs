//! Database layer - storage traits and their backends
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Ownership is part of every place query, not a separate check

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use repos::PgStore;
pub use store::{DbError, PlaceStore, Store, UserStore};
