//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, typed row structs, and repository functions
//! for the hookflow schema. No business logic lives here; the engine crate
//! owns domain types and only *reads* workflow rows through this crate
//! (workflow creation and editing belong to the management API, which is a
//! separate service).

pub mod error;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use pool::DbPool;
