//! Intermediate representation of the wrapped C library
//!
//! The class table and its descriptors are produced by an introspection
//! front end and consumed read-only by the code generators.

pub mod types;
pub mod symbol;
pub mod class;
pub mod table;

pub use types::*;
pub use symbol::*;
pub use class::*;
pub use table::*;
