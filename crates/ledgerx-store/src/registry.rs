//! Service registry: the connection-owning resource behind a session factory
//!
//! Building the registry validates settings, resolves the connection target
//! and proves it reachable. For in-memory targets the registry's anchor
//! connection is what keeps the database alive, so destroying the registry
//! discards the data.

use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use ledgerx_core::{log_op_end, log_op_error, log_op_start};

use crate::config::Settings;
use crate::db::{self, ConnectionTarget, Endpoint};
use crate::errors::{registry_destroyed, Result};

/// Applies settings and builds a [`ServiceRegistry`]
#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    settings: Option<Settings>,
}

impl ServiceRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Validate settings and open the anchor connection
    ///
    /// # Errors
    ///
    /// - `Configuration` / `UnsupportedDriver` for invalid settings
    /// - `Connectivity` when the database cannot be opened
    pub fn build(self) -> Result<ServiceRegistry> {
        let start = Instant::now();
        log_op_start!("registry_build");

        let result = self.build_inner();
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(registry) => log_op_end!(
                "registry_build",
                duration_ms = duration_ms,
                in_memory = registry.endpoint.is_in_memory()
            ),
            Err(err) => log_op_error!("registry_build", err.clone(), duration_ms = duration_ms),
        }
        result
    }

    fn build_inner(self) -> Result<ServiceRegistry> {
        let settings = self.settings.unwrap_or_else(|| Settings::builder().build_unchecked());
        settings.validate()?;

        let endpoint = ConnectionTarget::parse(&settings.url)?.endpoint();

        if !settings.username.is_empty() {
            // SQLite has no authentication; credentials are accepted and ignored
            tracing::debug!(username = %settings.username, "sqlite driver ignores credentials");
        }

        let anchor = endpoint.open()?;
        db::probe(&anchor)?;

        Ok(ServiceRegistry {
            settings,
            endpoint,
            anchor: Mutex::new(Some(anchor)),
            destroyed: AtomicBool::new(false),
        })
    }
}

/// Owner of the connection target for one factory build
#[derive(Debug)]
pub struct ServiceRegistry {
    settings: Settings,
    endpoint: Endpoint,
    anchor: Mutex<Option<Connection>>,
    destroyed: AtomicBool,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Open a new configured connection for a session
    ///
    /// # Errors
    ///
    /// `RegistryDestroyed` after [`destroy`](Self::destroy); `Connectivity`
    /// when the target cannot be opened.
    pub fn acquire(&self) -> Result<Connection> {
        if self.is_destroyed() {
            return Err(registry_destroyed("acquire"));
        }
        self.endpoint.open()
    }

    /// Release the anchor connection
    ///
    /// Only the first call releases anything; it returns `true`, every later
    /// call returns `false`.
    pub fn destroy(&self) -> bool {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return false;
        }

        let start = Instant::now();
        log_op_start!("registry_destroy");
        let anchor = self
            .anchor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(conn) = anchor {
            if let Err((_, err)) = conn.close() {
                tracing::warn!(error = %err, "anchor connection did not close cleanly");
            }
        }
        log_op_end!(
            "registry_destroy",
            duration_ms = start.elapsed().as_millis() as u64
        );
        true
    }
}

impl Drop for ServiceRegistry {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaGeneration;
    use ledgerx_core::ExErrorKind;

    fn memory_settings() -> Settings {
        Settings::builder()
            .driver("sqlite")
            .url("sqlite::memory:")
            .schema_generation(SchemaGeneration::Create)
            .build()
            .unwrap()
    }

    #[test]
    fn test_destroy_happens_once() {
        let registry = ServiceRegistry::builder()
            .apply_settings(memory_settings())
            .build()
            .unwrap();

        assert!(registry.destroy());
        assert!(!registry.destroy());
        assert!(registry.is_destroyed());
    }

    #[test]
    fn test_acquire_after_destroy_fails() {
        let registry = ServiceRegistry::builder()
            .apply_settings(memory_settings())
            .build()
            .unwrap();
        assert!(registry.acquire().is_ok());

        registry.destroy();
        let err = registry.acquire().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::RegistryDestroyed);
    }

    #[test]
    fn test_memory_database_shared_while_anchored() {
        let registry = ServiceRegistry::builder()
            .apply_settings(memory_settings())
            .build()
            .unwrap();

        let writer = registry.acquire().unwrap();
        writer
            .execute_batch("CREATE TABLE probe (x INTEGER); INSERT INTO probe VALUES (7);")
            .unwrap();
        drop(writer);

        let reader = registry.acquire().unwrap();
        let x: i64 = reader
            .query_row("SELECT x FROM probe", [], |row| row.get(0))
            .unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn test_missing_settings_is_configuration_error() {
        let err = ServiceRegistry::builder().build().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_unsupported_driver_rejected() {
        let settings = Settings::builder()
            .driver("com.mysql.cj.jdbc.Driver")
            .url("sqlite::memory:")
            .build_unchecked();
        let err = ServiceRegistry::builder()
            .apply_settings(settings)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnsupportedDriver);
    }
}
