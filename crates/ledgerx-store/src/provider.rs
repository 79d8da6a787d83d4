//! Persistence session provider
//!
//! Builds the session factory lazily on first request and hands out the
//! same handle afterwards. Construction is serialized by a mutex, so
//! concurrent first callers trigger one build. A failed build leaves the
//! provider uninitialized and returns the error; the next call retries.
//!
//! ```
//! use ledgerx_store::config::{SchemaGeneration, Settings};
//! use ledgerx_store::provider::SessionProvider;
//! use ledgerx_store::session::SessionFactory;
//!
//! let provider = SessionProvider::new(
//!     Settings::builder()
//!         .driver("sqlite")
//!         .url("sqlite::memory:")
//!         .schema_generation(SchemaGeneration::Create)
//!         .build()?,
//! );
//! let first = provider.get_factory()?;
//! let again = provider.get_factory()?;
//! assert!(SessionFactory::ptr_eq(&first, &again));
//! assert!(provider.shutdown());
//! assert!(!provider.shutdown());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Instant;

use ledgerx_core::errors::{ExError, ExErrorKind};
use ledgerx_core::{log_op_end, log_op_error, log_op_start};
use ledgerx_core::{Account, CreditAccount, DebitAccount};

use crate::config::Settings;
use crate::errors::Result;
use crate::metadata::MetadataSources;
use crate::registry::ServiceRegistryBuilder;
use crate::session::SessionFactory;

/// Registers the entity types a provider maps
pub type SourcesFn = fn(MetadataSources) -> MetadataSources;

/// The account hierarchy: `Account`, `CreditAccount`, `DebitAccount`
pub fn account_sources(sources: MetadataSources) -> MetadataSources {
    sources
        .add_annotated_class::<Account>()
        .add_annotated_class::<CreditAccount>()
        .add_annotated_class::<DebitAccount>()
}

#[derive(Debug, Default)]
struct ProviderState {
    factory: Option<SessionFactory>,
}

/// Lazily built, cached session factory
#[derive(Debug)]
pub struct SessionProvider {
    settings: Settings,
    sources: SourcesFn,
    state: Mutex<ProviderState>,
    builds: AtomicUsize,
}

impl SessionProvider {
    /// Provider mapping the account hierarchy
    pub fn new(settings: Settings) -> Self {
        Self::with_sources(settings, account_sources)
    }

    pub fn with_sources(settings: Settings, sources: SourcesFn) -> Self {
        Self {
            settings,
            sources,
            state: Mutex::new(ProviderState::default()),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The shared session factory, built on first call
    ///
    /// # Errors
    ///
    /// Any configuration, connectivity, mapping or schema error from the
    /// build. The provider stays uninitialized after a failure.
    pub fn get_factory(&self) -> Result<SessionFactory> {
        let mut state = self.lock_state();
        if let Some(factory) = state.factory.as_ref().filter(|f| !f.is_closed()) {
            return Ok(factory.clone());
        }

        let start = Instant::now();
        log_op_start!("get_factory");

        match self.build() {
            Ok(factory) => {
                let builds = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
                state.factory = Some(factory.clone());
                log_op_end!(
                    "get_factory",
                    duration_ms = start.elapsed().as_millis() as u64,
                    factory_id = factory.id().as_str(),
                    builds = builds as u64
                );
                Ok(factory)
            }
            Err(err) => {
                state.factory = None;
                log_op_error!(
                    "get_factory",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    /// Release the cached factory and its registry
    ///
    /// Returns `true` only for the call that performed the release; later
    /// calls, or calls before any build, return `false`. A later
    /// [`get_factory`](Self::get_factory) builds a fresh factory.
    pub fn shutdown(&self) -> bool {
        let taken = self.lock_state().factory.take();
        let Some(factory) = taken else {
            return false;
        };

        let start = Instant::now();
        log_op_start!("shutdown", factory_id = factory.id().as_str());
        let released = factory.close();
        log_op_end!(
            "shutdown",
            duration_ms = start.elapsed().as_millis() as u64,
            released = released
        );
        released
    }

    /// Number of successful builds so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// True while a usable factory is cached
    pub fn is_ready(&self) -> bool {
        self.lock_state()
            .factory
            .as_ref()
            .is_some_and(|f| !f.is_closed())
    }

    fn build(&self) -> Result<SessionFactory> {
        let registry = Arc::new(
            ServiceRegistryBuilder::new()
                .apply_settings(self.settings.clone())
                .build()?,
        );

        let result = (self.sources)(MetadataSources::new(Arc::clone(&registry)))
            .build_metadata()
            .and_then(|metadata| metadata.session_factory_builder().build());

        if result.is_err() {
            registry.destroy();
        }
        result
    }

    fn lock_state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

static GLOBAL: OnceLock<SessionProvider> = OnceLock::new();

/// Install the process-wide provider
///
/// # Errors
///
/// `AlreadyExists` if a provider was installed (or lazily loaded) before.
pub fn install(settings: Settings) -> Result<&'static SessionProvider> {
    let mut installed = false;
    let provider = GLOBAL.get_or_init(|| {
        installed = true;
        SessionProvider::new(settings)
    });
    if installed {
        Ok(provider)
    } else {
        Err(ExError::new(ExErrorKind::AlreadyExists)
            .with_op("install")
            .with_message("A session provider is already installed"))
    }
}

/// The process-wide provider
///
/// Falls back to settings from the environment when nothing was installed.
///
/// # Errors
///
/// `Configuration` when no provider is installed and the environment does
/// not hold valid settings.
pub fn global() -> Result<&'static SessionProvider> {
    if let Some(provider) = GLOBAL.get() {
        return Ok(provider);
    }
    let settings = Settings::load()?;
    Ok(GLOBAL.get_or_init(|| SessionProvider::new(settings)))
}

/// [`SessionProvider::get_factory`] on the process-wide provider
///
/// # Errors
///
/// See [`global`] and [`SessionProvider::get_factory`].
pub fn get_session_factory() -> Result<SessionFactory> {
    global()?.get_factory()
}

/// [`SessionProvider::shutdown`] on the process-wide provider, if any
pub fn shutdown() -> bool {
    GLOBAL.get().is_some_and(SessionProvider::shutdown)
}
