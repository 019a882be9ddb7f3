//! Generation configuration
//!
//! [`GenConfig`] is built once and handed by reference to every emitter.
//! All library-specific spellings (`__isl_take`, `isl::boolean`,
//! `ISL_ON_ERROR_CONTINUE`, ...) are derived from its namespace and C prefix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML document is malformed or has unknown keys
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the generator cannot work with
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Immutable generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Report failures by throwing (`true`) or through tri-state returns
    pub exceptions: bool,
    /// Emit enum casts, context wrappers and operator overloads
    pub extensions: bool,
    /// Target namespace (e.g., "isl")
    pub namespace: String,
    /// C identifier prefix (e.g., "isl_")
    pub c_prefix: String,
    /// Inline namespace used for the non-throwing flavour
    pub noexceptions_namespace: String,
    /// Method names that must not appear verbatim in the output
    pub renames: BTreeMap<String, String>,
    /// Include guard wrapped around the stream
    pub header_guard: Option<String>,
    /// Headers included before the namespace
    pub includes: Vec<String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        let renames = [("union", "unite"), ("delete", "del")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            exceptions: true,
            extensions: true,
            namespace: "isl".to_string(),
            c_prefix: "isl_".to_string(),
            noexceptions_namespace: "noexceptions".to_string(),
            renames,
            header_guard: None,
            includes: Vec::new(),
        }
    }
}

impl GenConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GenConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Enable or disable exceptions
    pub fn with_exceptions(mut self, enabled: bool) -> Self {
        self.exceptions = enabled;
        self
    }

    /// Enable or disable extended conveniences
    pub fn with_extensions(mut self, enabled: bool) -> Self {
        self.extensions = enabled;
        self
    }

    /// Set the target namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the C identifier prefix
    pub fn c_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.c_prefix = prefix.into();
        self
    }

    /// Add a method rename
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Wrap the output in an include guard
    pub fn header_guard(mut self, guard: impl Into<String>) -> Self {
        self.header_guard = Some(guard.into());
        self
    }

    /// Add an include line
    pub fn include(mut self, header: impl Into<String>) -> Self {
        self.includes.push(header.into());
        self
    }

    /// Check that the derived spellings will be usable identifiers
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.namespace) {
            return Err(ConfigError::Invalid {
                field: "namespace",
                reason: format!("'{}' is not an identifier", self.namespace),
            });
        }
        if !is_identifier(&self.noexceptions_namespace) {
            return Err(ConfigError::Invalid {
                field: "noexceptions_namespace",
                reason: format!("'{}' is not an identifier", self.noexceptions_namespace),
            });
        }
        if self.c_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "c_prefix",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some((from, _)) = self.renames.iter().find(|(_, to)| !is_identifier(to)) {
            return Err(ConfigError::Invalid {
                field: "renames",
                reason: format!("'{}' is renamed to a non-identifier", from),
            });
        }
        Ok(())
    }

    /// Public method name after keyword renaming
    pub fn rename_method<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Target name of a C identifier: the prefix length is cut off
    pub fn strip_prefix<'a>(&self, c_name: &'a str) -> &'a str {
        c_name.get(self.c_prefix.len()..).unwrap_or(c_name)
    }

    /// Namespace-qualified name
    pub fn qualified(&self, name: &str) -> String {
        format!("{}::{}", self.namespace, name)
    }

    /// Ownership annotation macro, e.g. `__isl_take`
    pub fn annotation(&self, kind: &str) -> String {
        format!("__{}{}", self.c_prefix, kind)
    }

    /// Prefixed C identifier, e.g. `isl_stat_ok`
    pub fn c_name(&self, name: &str) -> String {
        format!("{}{}", self.c_prefix, name)
    }

    /// Return type of boolean queries
    pub fn bool_type(&self) -> String {
        if self.exceptions {
            "bool".to_string()
        } else {
            self.qualified("boolean")
        }
    }

    /// Return type of status-returning functions
    pub fn stat_type(&self) -> String {
        if self.exceptions {
            "void".to_string()
        } else {
            self.qualified("stat")
        }
    }

    /// Error handler setting that keeps the library quiet
    pub fn on_error_continue(&self) -> String {
        format!("{}ON_ERROR_CONTINUE", self.c_prefix.to_uppercase())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
