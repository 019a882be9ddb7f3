//! BindingsBuilder for build.rs scripts
//!
//! Reads a class table, generates the C++ bindings and writes them into
//! `OUT_DIR`, printing the `cargo:rerun-if-changed` directives that keep the
//! output current.

use crate::codegen::{CppGenerator, GenError};
use crate::config::{ConfigError, GenConfig};
use crate::ir::ClassTable;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while building bindings
#[derive(Debug, Error)]
pub enum BuildError {
    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarMissing(String),

    /// Class table not found
    #[error("Class table not found: {0}")]
    TableNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed or invalid class table
    #[error("Invalid class table {path}: {source}")]
    TableError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Generation error
    #[error("Generation error: {0}")]
    GenError(#[from] GenError),
}

/// Read and validate a class table from a JSON file
pub fn load_table(path: impl AsRef<Path>) -> Result<ClassTable, BuildError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(BuildError::TableNotFound(path.to_path_buf()));
    }

    let json = fs::read_to_string(path)?;
    let table = ClassTable::from_json(&json).map_err(|source| BuildError::TableError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), classes = table.len(), "loaded class table");
    Ok(table)
}

/// Builder for generated C++ bindings
///
/// # Example
/// ```ignore
/// use cwrap::build::BindingsBuilder;
/// use cwrap::GenConfig;
///
/// fn main() {
///     BindingsBuilder::new("interface/isl.json")
///         .config(GenConfig::new().header_guard("ISL_CPP"))
///         .output_name("isl.hpp")
///         .build()
///         .expect("Failed to generate bindings");
/// }
/// ```
pub struct BindingsBuilder {
    table_path: PathBuf,
    config: GenConfig,
    output_name: String,
    additional_watch: Vec<PathBuf>,
}

impl BindingsBuilder {
    /// Create a new builder for the class table at `table_path`
    pub fn new(table_path: impl AsRef<Path>) -> Self {
        Self {
            table_path: table_path.as_ref().to_path_buf(),
            config: GenConfig::default(),
            output_name: "bindings.hpp".to_string(),
            additional_watch: Vec::new(),
        }
    }

    /// Set the generation configuration
    pub fn config(mut self, config: GenConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the file name of the generated header
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Add a path to watch for changes
    pub fn watch(mut self, path: impl AsRef<Path>) -> Self {
        self.additional_watch.push(path.as_ref().to_path_buf());
        self
    }

    /// Generate into `OUT_DIR`
    ///
    /// A relative table path is resolved against `CARGO_MANIFEST_DIR`.
    pub fn build(self) -> Result<BuildOutput, BuildError> {
        let out_dir = env::var("OUT_DIR")
            .map_err(|_| BuildError::EnvVarMissing("OUT_DIR".to_string()))?;
        let manifest_dir = env::var("CARGO_MANIFEST_DIR")
            .map_err(|_| BuildError::EnvVarMissing("CARGO_MANIFEST_DIR".to_string()))?;

        let table_path = Path::new(&manifest_dir).join(&self.table_path);
        println!("cargo:rerun-if-changed={}", self.table_path.display());
        for watch_path in &self.additional_watch {
            println!("cargo:rerun-if-changed={}", watch_path.display());
        }

        let builder = Self {
            table_path,
            ..self
        };
        builder.build_to(out_dir)
    }

    /// Generate into an explicit directory
    pub fn build_to(self, dir: impl AsRef<Path>) -> Result<BuildOutput, BuildError> {
        let dir = dir.as_ref();
        self.config.validate()?;

        let table = load_table(&self.table_path)?;
        let bindings = CppGenerator::new(&table, &self.config).generate()?;

        fs::create_dir_all(dir)?;
        let path = dir.join(&self.output_name);
        fs::write(&path, &bindings)?;
        debug!(path = %path.display(), "wrote bindings");

        Ok(BuildOutput {
            bindings: path,
            classes: table.len(),
        })
    }
}

/// Result of a successful build
#[derive(Debug)]
pub struct BuildOutput {
    /// Path to the generated header
    pub bindings: PathBuf,
    /// Number of classes emitted
    pub classes: usize,
}
