//! Schema generation from the mapping model
//!
//! Every mapped entity owns one table. A root table keys on an
//! `INTEGER PRIMARY KEY` the store assigns; a subclass table's key is also a
//! foreign key to its parent's key, so a subclass row can never exist
//! without the matching parent row.

pub mod ddl;
pub mod generator;

pub use ddl::{create_table_sql, drop_table_sql, fingerprint, render_ddl};
pub use generator::{apply, teardown, validate};
