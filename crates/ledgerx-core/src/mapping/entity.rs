use super::descriptor::EntityDescriptor;
use super::value::Row;
use crate::errors::Result;

/// A type persisted through the joined-table mapping
///
/// `to_row` must supply a value for every column declared along the
/// entity's chain (its own and all inherited ones); `from_row` receives the
/// same set plus the shared identifier.
pub trait Entity: Sized {
    fn descriptor() -> &'static EntityDescriptor;

    /// Identifier, `None` until the store assigns one
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    fn to_row(&self) -> Row;

    fn from_row(row: &Row) -> Result<Self>;
}

/// Result type of a polymorphic query rooted at `base()`
///
/// The session resolves the most-derived entity whose table holds the id and
/// hands its name and row here; no discriminator value is involved.
pub trait Polymorphic: Sized {
    fn base() -> &'static EntityDescriptor;

    fn from_concrete(entity: &str, row: &Row) -> Result<Self>;
}
