use ledgerx_core_types::SessionId;
use thiserror::Error;

/// Result type alias using LedgerXError
pub type Result<T> = std::result::Result<T, LedgerXError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Mapping
    DuplicateMapping,
    MissingMapping,
    CycleDetected,
    /// A row was reachable through more than one sibling subclass table
    InvariantViolation,

    // Configuration / bootstrap
    Configuration,
    UnsupportedDriver,
    Connectivity,
    SchemaMismatch,
    /// The service registry behind a factory or session was already released
    RegistryDestroyed,

    // Integration
    Serialization,
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::DuplicateMapping => "ERR_DUPLICATE_MAPPING",
            ExErrorKind::MissingMapping => "ERR_MISSING_MAPPING",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::UnsupportedDriver => "ERR_UNSUPPORTED_DRIVER",
            ExErrorKind::Connectivity => "ERR_CONNECTIVITY",
            ExErrorKind::SchemaMismatch => "ERR_SCHEMA_MISMATCH",
            ExErrorKind::RegistryDestroyed => "ERR_REGISTRY_DESTROYED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the mapping
/// context (entity, table, row id) needed to debug a failed statement.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    table: Option<String>,
    entity_id: Option<i64>,
    session_id: Option<SessionId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            table: None,
            entity_id: None,
            session_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add mapped entity name context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add table name context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add row identifier context
    pub fn with_entity_id(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Add session context
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn entity_id(&self) -> Option<i64> {
        self.entity_id
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(id) = self.entity_id {
            write!(f, " (id: {})", id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Mapping and entity-conversion errors raised by the in-memory model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerXError {
    // ===== Mapping model =====
    /// No entity was registered before building the model
    #[error("Mapping model has no registered entities")]
    EmptyModel,

    /// The same entity name was registered twice
    #[error("Entity mapped more than once: {entity}")]
    DuplicateEntity { entity: String },

    /// Two entities claim the same table
    #[error("Table {table} is mapped by both {first} and {second}")]
    DuplicateTable {
        table: String,
        first: String,
        second: String,
    },

    /// A subclass names a parent that was never registered
    #[error("Entity {entity} extends unregistered entity {parent}")]
    UnknownParent { entity: String, parent: String },

    /// Following parent links from an entity leads back to itself
    #[error("Inheritance cycle detected at entity {entity}")]
    InheritanceCycle { entity: String },

    /// A subclass declares a column already declared up its chain
    #[error("Column {column} of {entity} collides with an inherited column")]
    ColumnCollision { entity: String, column: String },

    /// An operation referenced an entity the model does not know
    #[error("Entity is not mapped: {entity}")]
    UnmappedEntity { entity: String },

    // ===== Row conversion =====
    /// A required column was absent from a row
    #[error("Row for {entity} is missing column {column}")]
    MissingColumn { entity: String, column: String },

    /// A column held a value of the wrong type
    #[error("Column {column} of {entity} is not {expected}")]
    ColumnType {
        entity: String,
        column: String,
        expected: String,
    },

    /// The entity has no identifier yet
    #[error("{entity} has no identifier")]
    MissingId { entity: String },

    /// A base row matched more than one sibling subclass table
    #[error("Row {id} of {entity} matches several subclasses: {candidates:?}")]
    AmbiguousConcreteType {
        entity: String,
        id: i64,
        candidates: Vec<String>,
    },
}

/// Conversion from LedgerXError to ExError
impl From<LedgerXError> for ExError {
    fn from(err: LedgerXError) -> Self {
        let message = err.to_string();
        match err {
            LedgerXError::EmptyModel => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            LedgerXError::DuplicateEntity { entity } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_entity(entity)
                    .with_message(message)
            }

            LedgerXError::DuplicateTable { table, second, .. } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_entity(second)
                    .with_table(table)
                    .with_message(message)
            }

            LedgerXError::UnknownParent { entity, .. } => {
                ExError::new(ExErrorKind::MissingMapping)
                    .with_entity(entity)
                    .with_message(message)
            }

            LedgerXError::InheritanceCycle { entity } => {
                ExError::new(ExErrorKind::CycleDetected)
                    .with_entity(entity)
                    .with_message(message)
            }

            LedgerXError::ColumnCollision { entity, .. } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_entity(entity)
                    .with_message(message)
            }

            LedgerXError::UnmappedEntity { entity } => ExError::new(ExErrorKind::MissingMapping)
                .with_entity(entity)
                .with_message(message),

            LedgerXError::MissingColumn { entity, .. }
            | LedgerXError::ColumnType { entity, .. } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_entity(entity)
                    .with_message(message)
            }

            LedgerXError::MissingId { entity } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity(entity)
                .with_message(message),

            LedgerXError::AmbiguousConcreteType { entity, id, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_entity(entity)
                    .with_entity_id(id)
                    .with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_error_kind_codes() {
        let cases = [
            (ExErrorKind::Configuration, "ERR_CONFIGURATION"),
            (ExErrorKind::UnsupportedDriver, "ERR_UNSUPPORTED_DRIVER"),
            (ExErrorKind::Connectivity, "ERR_CONNECTIVITY"),
            (ExErrorKind::SchemaMismatch, "ERR_SCHEMA_MISMATCH"),
            (ExErrorKind::RegistryDestroyed, "ERR_REGISTRY_DESTROYED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("update")
            .with_entity("CreditAccount")
            .with_entity_id(7)
            .with_message("no row to update");

        let text = err.to_string();
        assert!(text.starts_with("[ERR_NOT_FOUND] in operation 'update'"));
        assert!(text.contains("(entity: CreditAccount)"));
        assert!(text.contains("(id: 7)"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error;

        let cause = ExError::new(ExErrorKind::Connectivity).with_message("unable to open");
        let err = ExError::new(ExErrorKind::Configuration).with_source(cause);

        assert_eq!(
            err.source_error().map(|s| s.kind()),
            Some(ExErrorKind::Connectivity)
        );
        assert!(err.source().is_some());
    }
}
