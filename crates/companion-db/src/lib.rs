//! Database layer for the companion backend.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization
//! and embedded SQL migrations. The character service is the only writer;
//! the chat pipeline never touches the database.
//!
//! Migrations are compiled into the binary via `include_str!` so the schema
//! ships with the code that reads it.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
