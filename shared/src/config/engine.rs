//! Database engine identification.
//!
//! Hue stores its database engine as a Django backend name. Both the short
//! form (`mysql`) and the dotted form (`django.db.backends.mysql`) show up
//! in real configurations.

/// Broad family of a configured engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFamily {
    /// `SQLite` (`sqlite3`).
    Sqlite,
    /// `MySQL` or `MariaDB`.
    Mysql,
    /// `PostgreSQL` (`postgresql_psycopg2`, `postgresql`).
    Postgres,
    /// Oracle.
    Oracle,
    /// Anything else.
    Unknown,
}

impl std::fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Mysql => write!(f, "mysql"),
            Self::Postgres => write!(f, "postgres"),
            Self::Oracle => write!(f, "oracle"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The configured database engine name.
///
/// # Example
///
/// ```
/// use shared::config::{DatabaseEngine, EngineFamily};
///
/// let engine = DatabaseEngine::new("django.db.backends.oracle");
/// assert!(engine.is_oracle_family());
/// assert_eq!(engine.family(), EngineFamily::Oracle);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseEngine(String);

impl DatabaseEngine {
    /// Wraps an engine name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the engine name as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the engine family.
    #[must_use]
    pub fn family(&self) -> EngineFamily {
        let name = self.0.to_ascii_lowercase();
        if name.contains("oracle") {
            EngineFamily::Oracle
        } else if name.contains("sqlite") {
            EngineFamily::Sqlite
        } else if name.contains("mysql") {
            EngineFamily::Mysql
        } else if name.contains("postgres") {
            EngineFamily::Postgres
        } else {
            EngineFamily::Unknown
        }
    }

    /// Returns true for engines without boolean literals.
    #[must_use]
    pub fn is_oracle_family(&self) -> bool {
        self.family() == EngineFamily::Oracle
    }
}

impl Default for DatabaseEngine {
    fn default() -> Self {
        Self::new("sqlite3")
    }
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
