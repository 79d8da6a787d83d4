//! Connection settings for the session provider
//!
//! Settings come either from the environment (`LEDGERX__` prefix, `__`
//! separating nested keys, `.env` honored) or from [`SettingsBuilder`].
//! Both paths validate before handing settings out.
//!
//! # Example
//!
//! ```
//! use ledgerx_store::config::{SchemaGeneration, Settings};
//!
//! let settings = Settings::builder()
//!     .driver("sqlite")
//!     .url("sqlite::memory:")
//!     .schema_generation(SchemaGeneration::Create)
//!     .build()
//!     .expect("valid settings");
//! assert!(settings.schema_generation.is_destructive());
//! ```

mod error;

pub use error::{ConfigError, ValidationError};

use ledgerx_core_types::Sensitive;
use serde::Deserialize;
use std::fmt;

use crate::db::{ConnectionTarget, Driver};

/// Environment prefix for every setting
pub const ENV_PREFIX: &str = "LEDGERX";

/// What happens to mapped tables when a session factory is built
///
/// Defaults to `None`; the destructive modes must be chosen explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaGeneration {
    /// Leave the schema untouched
    #[default]
    None,
    /// Fail the build unless every mapped table and column exists
    Validate,
    /// Create missing tables, keep existing ones
    Update,
    /// Drop and recreate every mapped table
    Create,
    /// As `Create`, and drop the tables again when the factory closes
    #[serde(alias = "create_drop")]
    CreateDrop,
}

impl SchemaGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaGeneration::None => "none",
            SchemaGeneration::Validate => "validate",
            SchemaGeneration::Update => "update",
            SchemaGeneration::Create => "create",
            SchemaGeneration::CreateDrop => "create-drop",
        }
    }

    /// True for modes that discard existing rows
    pub fn is_destructive(&self) -> bool {
        matches!(self, SchemaGeneration::Create | SchemaGeneration::CreateDrop)
    }
}

impl fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to reach the store and prepare its schema
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Driver name, e.g. `sqlite`
    pub driver: String,

    /// Connection URL, e.g. `sqlite://data/ledger.db?mode=rwc`
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: Sensitive<String>,

    #[serde(default)]
    pub schema_generation: SchemaGeneration,

    /// Emit every executed statement under the `ledgerx::sql` target
    #[serde(default)]
    pub show_sql: bool,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads `LEDGERX__*` variables (`LEDGERX__URL`, `LEDGERX__SHOW_SQL`, ...)
    /// 3. Deserializes and validates
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when required values are missing, cannot be
    /// parsed, or fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        Self::from_config(source)
    }

    /// The `LEDGERX__*` source; values stay strings until serde sees them
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).separator("__")
    }

    /// Deserialize and validate settings from an assembled config source
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on missing/invalid values.
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let settings: Settings = source.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check driver and URL before any connection is attempted
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.driver.trim().is_empty() {
            return Err(ValidationError::MissingRequired("driver"));
        }
        if Driver::resolve(&self.driver).is_none() {
            return Err(ValidationError::UnsupportedDriver(self.driver.clone()));
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("url"));
        }
        ConnectionTarget::parse(&self.url)?;
        Ok(())
    }
}

/// Programmatic construction of [`Settings`]
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    driver: Option<String>,
    url: Option<String>,
    username: String,
    password: Sensitive<String>,
    schema_generation: SchemaGeneration,
    show_sql: bool,
}

impl SettingsBuilder {
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Sensitive::new(password.into());
        self
    }

    pub fn schema_generation(mut self, mode: SchemaGeneration) -> Self {
        self.schema_generation = mode;
        self
    }

    pub fn show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    /// Assemble without validating; the registry validates again at build
    pub fn build_unchecked(self) -> Settings {
        Settings {
            driver: self.driver.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            username: self.username,
            password: self.password,
            schema_generation: self.schema_generation,
            show_sql: self.show_sql,
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError` when driver or URL are missing or invalid.
    pub fn build(self) -> Result<Settings, ValidationError> {
        let settings = self.build_unchecked();
        settings.validate()?;
        Ok(settings)
    }
}
