//! Joined-table mapping model
//!
//! Entities describe themselves with a static [`EntityDescriptor`]: the table
//! holding the columns they declare, the identifier column, and the parent
//! entity they extend. Every entity in a hierarchy owns one table; a subclass
//! table's primary key is also a foreign key to its parent's primary key.
//! No discriminator column is ever mapped.

pub mod descriptor;
pub mod entity;
pub mod model;
pub mod value;

pub use descriptor::{ColumnDef, ColumnType, EntityDescriptor};
pub use entity::{Entity, Polymorphic};
pub use model::{MappingModel, MappingModelBuilder};
pub use value::{Row, Value};
