use std::fmt;
use crate::core::{Result, RomError};

/// Storage adapter behind a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Memory,
}

impl Adapter {
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
        }
    }

    fn from_scheme(scheme: &str) -> Result<Self> {
        match scheme {
            "memory" => Ok(Self::Memory),
            other => Err(RomError::Config(format!("unsupported adapter '{}'", other))),
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheme())
    }
}

/// Repository configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage adapter
    pub adapter: Adapter,

    /// Database name
    pub database: String,

    /// Reject tuples carrying attributes the relation does not declare
    pub strict_attributes: bool,
}

impl RepositoryConfig {
    /// Create a configuration for an in-memory database
    pub fn memory(database: &str) -> Self {
        Self {
            adapter: Adapter::Memory,
            database: database.to_string(),
            strict_attributes: true,
        }
    }

    /// Set the database name
    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    /// Set attribute strictness
    pub fn strict_attributes(mut self, strict: bool) -> Self {
        self.strict_attributes = strict;
        self
    }

    /// Parse from a repository URL
    ///
    /// Format: "adapter://database", e.g. "memory://test". A `?strict=false`
    /// query turns attribute checks off.
    pub fn from_url(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| RomError::Config(format!("invalid repository URL '{}'", url)))?;

        let adapter = Adapter::from_scheme(scheme)?;

        let (database, query) = match rest.split_once('?') {
            Some((database, query)) => (database, Some(query)),
            None => (rest, None),
        };

        if database.is_empty() {
            return Err(RomError::Config(format!(
                "repository URL '{}' names no database",
                url
            )));
        }

        let mut config = Self {
            adapter,
            database: database.to_string(),
            strict_attributes: true,
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            match pair.split_once('=') {
                Some(("strict", "true")) => config.strict_attributes = true,
                Some(("strict", "false")) => config.strict_attributes = false,
                _ => {
                    return Err(RomError::Config(format!(
                        "unknown repository option '{}'",
                        pair
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Convert back to URL form
    pub fn to_url(&self) -> String {
        if self.strict_attributes {
            format!("{}://{}", self.adapter, self.database)
        } else {
            format!("{}://{}?strict=false", self.adapter, self.database)
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::memory("default")
    }
}
