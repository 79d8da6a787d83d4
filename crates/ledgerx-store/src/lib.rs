//! LedgerX Store - SQLite persistence for the joined-table account mapping
//!
//! Provides:
//! - Validated connection settings loaded from the environment or a builder
//! - The service registry owning the connection target
//! - Schema generation (`none`, `validate`, `update`, `create`, `create-drop`)
//! - Session factory, sessions and transaction-scoped units of work
//! - The session provider: a lazily built, cached factory

pub mod config;
pub mod db;
pub mod errors;
pub mod metadata;
pub mod provider;
pub mod registry;
pub mod schema;
pub mod session;
mod sql_log;

// Re-export key types
pub use config::{SchemaGeneration, Settings};
pub use errors::Result;
pub use provider::SessionProvider;
pub use session::{Session, SessionFactory, UnitOfWork};
