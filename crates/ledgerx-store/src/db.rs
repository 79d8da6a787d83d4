//! Database connection management
//!
//! Parses connection URLs, opens SQLite connections with the flags the URL
//! asks for, and applies the per-connection pragmas every session relies on.

use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ValidationError;
use crate::errors::{connectivity_error, from_rusqlite, Result};

/// Supported database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

impl Driver {
    /// Accepted driver names, including the JDBC-style class name
    pub const SQLITE_ALIASES: &'static [&'static str] = &["sqlite", "sqlite3", "org.sqlite.JDBC"];

    pub fn resolve(name: &str) -> Option<Driver> {
        let name = name.trim();
        Self::SQLITE_ALIASES
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(name))
            .then_some(Driver::Sqlite)
    }
}

/// How a file database is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
    ReadWriteCreate,
}

impl OpenMode {
    fn flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            OpenMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            OpenMode::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
            OpenMode::ReadWriteCreate => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }
}

/// Where a connection URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// Private in-memory database living as long as its registry
    Memory,
    File { path: PathBuf, mode: OpenMode },
}

impl ConnectionTarget {
    /// Parse `sqlite::memory:`, `sqlite://<path>[?mode=ro|rw|rwc]` or
    /// `sqlite:<path>`
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidUrl` for other schemes, an empty
    /// path, or unknown options.
    pub fn parse(url: &str) -> std::result::Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        if trimmed == "sqlite::memory:" || trimmed == "sqlite://:memory:" {
            return Ok(ConnectionTarget::Memory);
        }

        let rest = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .ok_or_else(|| invalid("expected a sqlite: URL"))?;

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        if path.is_empty() {
            return Err(invalid("missing database path"));
        }

        let mut mode = OpenMode::ReadWriteCreate;
        for option in query.into_iter().flat_map(|q| q.split('&')).filter(|o| !o.is_empty()) {
            match option.split_once('=') {
                Some(("mode", "ro")) => mode = OpenMode::ReadOnly,
                Some(("mode", "rw")) => mode = OpenMode::ReadWrite,
                Some(("mode", "rwc")) => mode = OpenMode::ReadWriteCreate,
                _ => return Err(invalid(&format!("unsupported option '{}'", option))),
            }
        }

        Ok(ConnectionTarget::File {
            path: PathBuf::from(path),
            mode,
        })
    }

    /// Resolve into something connections can be opened against
    ///
    /// Every call for `Memory` names a fresh database.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ConnectionTarget::Memory => Endpoint {
                uri: format!("file:ledgerx-{}?mode=memory&cache=shared", Uuid::now_v7()),
                flags: OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                in_memory: true,
            },
            ConnectionTarget::File { path, mode } => Endpoint {
                uri: path.to_string_lossy().into_owned(),
                flags: mode.flags(),
                in_memory: false,
            },
        }
    }
}

/// A concrete database location plus open flags
#[derive(Debug, Clone)]
pub struct Endpoint {
    uri: String,
    flags: OpenFlags,
    in_memory: bool,
}

impl Endpoint {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Open and configure a new connection
    ///
    /// # Errors
    ///
    /// `Connectivity` when SQLite refuses to open the target.
    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.uri, self.flags)
            .map_err(|e| connectivity_error(&self.uri, e))?;
        configure(&conn, self.in_memory)?;
        Ok(conn)
    }
}

/// Configure a connection with the settings sessions rely on
pub fn configure(conn: &Connection, in_memory: bool) -> Result<()> {
    // Subclass rows reference the base row
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(from_rusqlite)?;

    if !in_memory {
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(from_rusqlite)?;
    }

    Ok(())
}

/// Cheap round trip proving the connection is usable
pub fn probe(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(from_rusqlite)
}
