//! Build utilities
//!
//! This module provides helpers for build.rs scripts that generate C++
//! bindings from a class table as part of a cargo build.

pub mod bindings;

pub use bindings::{load_table, BindingsBuilder, BuildError, BuildOutput};
