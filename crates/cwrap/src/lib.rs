//! cwrap: C++ wrapper generation for handle-based C libraries
//!
//! Given a table describing the classes of a C library (object types,
//! constructors, methods with ownership-annotated parameters, callbacks),
//! this crate emits C++ wrapper classes with value semantics: handles are
//! freed exactly once, failures turn into exceptions (or tri-state results
//! when exceptions are disabled) and callbacks accept `std::function`.
//!
//! # Architecture
//!
//! - `ir`: class table, function and type descriptors
//! - `config`: generation settings
//! - `codegen`: type classification, ownership, callbacks, methods, classes
//! - `build`: build script utilities
//!
//! # Usage
//!
//! ```rust,ignore
//! use cwrap::{ClassTable, CppGenerator, GenConfig};
//!
//! let table = ClassTable::from_json(&std::fs::read_to_string("isl.json")?)?;
//! let config = GenConfig::new().with_exceptions(false);
//! let header = CppGenerator::new(&table, &config).generate()?;
//! ```

pub mod build;
pub mod codegen;
pub mod config;
pub mod ir;

// Re-export commonly used types
pub use build::{load_table, BindingsBuilder, BuildError, BuildOutput};
pub use codegen::{
    CallbackAdapter, Category, ClassEmitter, CppGenerator, GenError, MethodSynthesizer,
    OwnershipPolicy, TypeClassifier,
};
pub use config::{ConfigError, GenConfig};
pub use ir::{
    CType, CallbackArg, CallbackType, ClassDescriptor, ClassRole, ClassTable, FunctionRef,
    MethodKind, Ownership, ParamDescriptor, TableBuilder, TableError,
};
