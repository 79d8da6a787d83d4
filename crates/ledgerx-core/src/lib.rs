//! LedgerX Core - in-memory side of the joined-table persistence layer
//!
//! This crate provides:
//! - The canonical error facility (`ExError`, `ExErrorKind`) and the mapping
//!   error taxonomy (`LedgerXError`)
//! - The structured logging facility
//! - The mapping model: entity descriptors, rows, and hierarchy validation
//! - The mapped account hierarchy (`Account`, `CreditAccount`, `DebitAccount`)
//!
//! Nothing here touches a database; `ledgerx-store` turns the model into
//! tables and statements.

pub mod errors;
pub mod logging_facility;
pub mod mapping;
pub mod model;

// Used by the logging macros from dependent crates
pub use ledgerx_core_types;
#[doc(hidden)]
pub use tracing;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, LedgerXError, Result};
pub use mapping::{Entity, MappingModel, MappingModelBuilder, Polymorphic, Row, Value};
pub use model::{Account, AccountKind, AnyAccount, CreditAccount, DebitAccount};
