//! Code generation for C++ wrapper classes
//!
//! This module provides:
//! - type classification (C types to C++ types and categories)
//! - ownership rules for handles crossing the C boundary
//! - callback adaptation (data holders and trampolines)
//! - method synthesis (constructors, static and member functions)
//! - class emission and the top-level C++ generator

pub mod callback;
pub mod class;
pub mod classify;
pub mod cpp;
pub mod error;
pub mod method;
pub mod ownership;

pub use callback::CallbackAdapter;
pub use class::ClassEmitter;
pub use classify::{Category, Translated, TypeClassifier};
pub use cpp::CppGenerator;
pub use error::GenError;
pub use method::{ErrorContext, MethodSynthesizer};
pub use ownership::{Access, OwnershipPolicy, Passing, Role};
