//! `PostgreSQL` storage for the Actions API.
//!
//! This crate provides:
//!
//! - [`PostgresActionStore`]: one JSONB document per action, implementing
//!   [`ActionStore`](actions_core::ActionStore)
//! - [`PostgresAncestorLookup`]: `COUNT(1)` existence checks against the
//!   customer, interaction and action-plan tables, implementing
//!   [`AncestorLookup`](actions_core::AncestorLookup)
//! - [`TableNames`]: configurable, validated table names
//!
//! Both types share one `sqlx` connection pool.
//!
//! # Example
//!
//! ```no_run
//! use actions_postgres::{PostgresActionStore, PostgresAncestorLookup, TableNames};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/actions").await?;
//! let tables = TableNames::default();
//!
//! let store = PostgresActionStore::new(pool.clone(), &tables)?;
//! store.migrate().await?;
//! let ancestors = PostgresAncestorLookup::new(pool, tables)?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ancestors;
pub mod store;
pub mod tables;

pub use ancestors::PostgresAncestorLookup;
pub use store::PostgresActionStore;
pub use tables::{InvalidTableName, TableNames};
