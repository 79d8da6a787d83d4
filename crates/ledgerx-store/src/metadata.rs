//! Metadata sources: which entity types a registry maps
//!
//! ```
//! use std::sync::Arc;
//! use ledgerx_core::{Account, CreditAccount, DebitAccount};
//! use ledgerx_store::config::{SchemaGeneration, Settings};
//! use ledgerx_store::metadata::MetadataSources;
//! use ledgerx_store::registry::ServiceRegistryBuilder;
//!
//! let settings = Settings::builder()
//!     .driver("sqlite")
//!     .url("sqlite::memory:")
//!     .schema_generation(SchemaGeneration::Create)
//!     .build()?;
//! let registry = Arc::new(ServiceRegistryBuilder::new().apply_settings(settings).build()?);
//! let factory = MetadataSources::new(registry)
//!     .add_annotated_class::<Account>()
//!     .add_annotated_class::<CreditAccount>()
//!     .add_annotated_class::<DebitAccount>()
//!     .build_metadata()?
//!     .session_factory_builder()
//!     .build()?;
//! assert_eq!(factory.model().len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use ledgerx_core::mapping::{Entity, MappingModel, MappingModelBuilder};

use crate::errors::Result;
use crate::registry::ServiceRegistry;
use crate::session::SessionFactoryBuilder;

/// Collects mapped entity types for one registry
#[derive(Debug)]
pub struct MetadataSources {
    registry: Arc<ServiceRegistry>,
    model: MappingModelBuilder,
}

impl MetadataSources {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            model: MappingModelBuilder::new(),
        }
    }

    /// Register an entity type
    pub fn add_annotated_class<E: Entity>(mut self) -> Self {
        self.model = self.model.add::<E>();
        self
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Validate the registered hierarchy
    ///
    /// # Errors
    ///
    /// Mapping errors (`DuplicateMapping`, `MissingMapping`,
    /// `CycleDetected`, `InvalidInput` for an empty model).
    pub fn build_metadata(self) -> Result<Metadata> {
        let model = self
            .model
            .build()
            .map_err(|e| ledgerx_core::ExError::from(e).with_op("build_metadata"))?;
        Ok(Metadata {
            registry: self.registry,
            model: Arc::new(model),
        })
    }
}

/// Validated mapping bound to a registry
#[derive(Debug, Clone)]
pub struct Metadata {
    registry: Arc<ServiceRegistry>,
    model: Arc<MappingModel>,
}

impl Metadata {
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn model(&self) -> &Arc<MappingModel> {
        &self.model
    }

    pub fn session_factory_builder(self) -> SessionFactoryBuilder {
        SessionFactoryBuilder::new(self)
    }
}
