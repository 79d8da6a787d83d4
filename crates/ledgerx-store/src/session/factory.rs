//! Session factory

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ledgerx_core::mapping::MappingModel;
use ledgerx_core::{log_op_end, log_op_error, log_op_start};
use ledgerx_core_types::FactoryId;

use super::session::Session;
use crate::config::{SchemaGeneration, Settings};
use crate::errors::{registry_destroyed, Result};
use crate::metadata::Metadata;
use crate::registry::ServiceRegistry;
use crate::schema;

/// Runs schema generation and produces the [`SessionFactory`]
#[derive(Debug)]
pub struct SessionFactoryBuilder {
    metadata: Metadata,
}

impl SessionFactoryBuilder {
    pub(crate) fn new(metadata: Metadata) -> Self {
        Self { metadata }
    }

    /// Apply the configured schema-generation mode, then hand out the factory
    ///
    /// # Errors
    ///
    /// - `RegistryDestroyed` if the registry was already released
    /// - `SchemaMismatch` when `validate` fails
    /// - `Persistence` when DDL fails
    pub fn build(self) -> Result<SessionFactory> {
        let start = Instant::now();
        log_op_start!("session_factory_build");

        let registry = self.metadata.registry().clone();
        let model = self.metadata.model().clone();
        let settings = registry.settings();

        let result = registry.acquire().and_then(|mut conn| {
            schema::apply(
                &mut conn,
                &model,
                settings.schema_generation,
                settings.show_sql,
            )
        });

        let duration_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => {
                let factory = SessionFactory {
                    inner: Arc::new(FactoryInner {
                        id: FactoryId::new(),
                        registry,
                        model,
                        closed: AtomicBool::new(false),
                    }),
                };
                log_op_end!(
                    "session_factory_build",
                    duration_ms = duration_ms,
                    factory_id = factory.id().as_str()
                );
                Ok(factory)
            }
            Err(err) => {
                log_op_error!("session_factory_build", err.clone(), duration_ms = duration_ms);
                Err(err)
            }
        }
    }
}

#[derive(Debug)]
struct FactoryInner {
    id: FactoryId,
    registry: Arc<ServiceRegistry>,
    model: Arc<MappingModel>,
    closed: AtomicBool,
}

/// Cloneable handle to one factory build
///
/// Clones share state: closing one closes all of them.
#[derive(Debug, Clone)]
pub struct SessionFactory {
    inner: Arc<FactoryInner>,
}

impl SessionFactory {
    pub fn id(&self) -> &FactoryId {
        &self.inner.id
    }

    pub fn model(&self) -> &MappingModel {
        &self.inner.model
    }

    pub fn settings(&self) -> &Settings {
        self.inner.registry.settings()
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.inner.registry
    }

    /// True when both handles come from the same build
    pub fn ptr_eq(a: &SessionFactory, b: &SessionFactory) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst) || self.inner.registry.is_destroyed()
    }

    /// Open a session with its own connection
    ///
    /// # Errors
    ///
    /// `RegistryDestroyed` once closed; `Connectivity` if the connection
    /// cannot be opened.
    pub fn open_session(&self) -> Result<Session> {
        self.ensure_open("open_session")?;
        let conn = self.inner.registry.acquire()?;
        Ok(Session::new(conn, self.clone()))
    }

    /// Close the factory and release its registry
    ///
    /// Under `create-drop` the mapped tables are dropped first. Only the first
    /// call does anything; it returns `true`.
    pub fn close(&self) -> bool {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        let start = Instant::now();
        log_op_start!("session_factory_close", factory_id = self.id().as_str());

        let settings = self.settings();
        if settings.schema_generation == SchemaGeneration::CreateDrop {
            let dropped = self.inner.registry.acquire().and_then(|conn| {
                schema::teardown(&conn, &self.inner.model, settings.show_sql)
            });
            if let Err(err) = dropped {
                log_op_error!(
                    "session_factory_close",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
            }
        }

        let released = self.inner.registry.destroy();
        log_op_end!(
            "session_factory_close",
            duration_ms = start.elapsed().as_millis() as u64,
            registry_released = released
        );
        true
    }

    pub(crate) fn ensure_open(&self, op: &str) -> Result<()> {
        if self.is_closed() {
            return Err(registry_destroyed(op));
        }
        Ok(())
    }
}
