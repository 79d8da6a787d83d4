use serde::Serialize;

/// Storage class of a mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// SQL type name used in generated DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A non-identifier column declared by one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
        }
    }
}

/// Static mapping of one entity to its own table
///
/// `columns` lists only the columns this entity declares; inherited columns
/// live in the ancestors' tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub columns: &'static [ColumnDef],
    pub parent: Option<&'static str>,
}

impl EntityDescriptor {
    /// True when this entity roots a hierarchy
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Look up a declared column by name
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}
