//! Type descriptors for the C side of a binding
//!
//! The introspection front end hands every parameter and return value over
//! as a [`CType`]: a closed set of shapes the emitter knows how to wrap.
//! Anything the front end could not place in one of those shapes arrives as
//! [`CType::Other`] and is rejected when the classifier is asked to
//! translate it.
//!
//! # Shapes
//!
//! | Descriptor | C spelling (prefix `isl_`) | Notes |
//! |------------|----------------------------|-------|
//! | `handle{name}` | `isl_set *` | opaque library object |
//! | `context` | `isl_ctx *` | library context, never freed by wrappers |
//! | `bool` | `isl_bool` | tri-state status (true/false/error) |
//! | `stat` | `isl_stat` | ok/error status |
//! | `enum{name}` | `enum isl_dim_type` | spelling kept as given |
//! | `integer{name}` | `unsigned int` | passed through unchanged |
//! | `string` | `const char *` | |
//! | `callback{..}` | `isl_stat (*)(isl_map *, void *)` | last argument is user data |
//! | `user_data` | `void *` | only valid right after a callback |
//!
//! Spellings that depend on the library prefix are produced by
//! [`crate::codegen::TypeClassifier::c_spelling`], which knows the prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ownership annotation of a parameter or callback argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// The callee takes over the object (`__isl_take`)
    Take,
    /// The callee only borrows the object for the duration of the call (`__isl_keep`)
    #[default]
    Keep,
}

impl Ownership {
    /// Whether ownership is transferred into the callee
    pub fn is_take(self) -> bool {
        matches!(self, Ownership::Take)
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Take => write!(f, "take"),
            Ownership::Keep => write!(f, "keep"),
        }
    }
}

/// C type descriptor as handed over by the front end
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CType {
    /// Pointer to an opaque library object, e.g. `isl_set *`
    Handle { name: String },

    /// Pointer to the library context
    Context,

    /// Tri-state boolean status
    Bool,

    /// ok/error status
    Stat,

    /// C enumeration, spelled as in C (e.g. `enum isl_dim_type`)
    Enum { name: String },

    /// Plain integer type, spelled as in C (e.g. `int`, `unsigned int`)
    Integer { name: String },

    /// `const char *`
    String,

    /// Function pointer taking a trailing user-data pointer
    Callback(CallbackType),

    /// `void *` user-data slot accompanying a callback
    UserData,

    /// Anything the front end could not classify
    Other { spelling: String },
}

impl CType {
    /// Create a handle type
    pub fn handle(name: impl Into<String>) -> Self {
        CType::Handle { name: name.into() }
    }

    /// Create an enum type
    pub fn enumeration(name: impl Into<String>) -> Self {
        CType::Enum { name: name.into() }
    }

    /// Create an integer type
    pub fn integer(name: impl Into<String>) -> Self {
        CType::Integer { name: name.into() }
    }

    /// Create an `int`
    pub fn int() -> Self {
        Self::integer("int")
    }

    /// Create a callback type
    pub fn callback(callback: CallbackType) -> Self {
        CType::Callback(callback)
    }

    /// Create an unclassified type
    pub fn other(spelling: impl Into<String>) -> Self {
        CType::Other {
            spelling: spelling.into(),
        }
    }

    /// Name of the handle's C type, if this is a handle
    pub fn handle_name(&self) -> Option<&str> {
        match self {
            CType::Handle { name } => Some(name),
            _ => None,
        }
    }

    /// Check if this is a library object handle (contexts excluded)
    pub fn is_handle(&self) -> bool {
        matches!(self, CType::Handle { .. })
    }

    /// Check if this is the library context
    pub fn is_context(&self) -> bool {
        matches!(self, CType::Context)
    }

    /// Check if this is a callback
    pub fn is_callback(&self) -> bool {
        matches!(self, CType::Callback(_))
    }

    /// Check if this is a user-data slot
    pub fn is_user_data(&self) -> bool {
        matches!(self, CType::UserData)
    }

    /// Callback signature, if this is a callback
    pub fn as_callback(&self) -> Option<&CallbackType> {
        match self {
            CType::Callback(cb) => Some(cb),
            _ => None,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Handle { name } => write!(f, "{} *", name),
            CType::Context => write!(f, "context"),
            CType::Bool => write!(f, "bool"),
            CType::Stat => write!(f, "stat"),
            CType::Enum { name } | CType::Integer { name } => write!(f, "{}", name),
            CType::String => write!(f, "const char *"),
            CType::Callback(cb) => write!(f, "{}", cb),
            CType::UserData => write!(f, "void *"),
            CType::Other { spelling } => write!(f, "{}", spelling),
        }
    }
}

/// One raw argument of a callback signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackArg {
    /// Argument type
    #[serde(rename = "type")]
    pub ty: CType,
    /// Whether the callback receives ownership of the argument
    #[serde(default)]
    pub ownership: Ownership,
}

impl CallbackArg {
    /// Borrowed callback argument
    pub fn keep(ty: CType) -> Self {
        Self {
            ty,
            ownership: Ownership::Keep,
        }
    }

    /// Owned callback argument
    pub fn take(ty: CType) -> Self {
        Self {
            ty,
            ownership: Ownership::Take,
        }
    }
}

/// Raw C callback signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackType {
    /// Return type of the callback
    pub return_type: Box<CType>,
    /// All raw arguments, including the trailing user-data pointer
    pub args: Vec<CallbackArg>,
}

impl CallbackType {
    /// Create a callback signature with the given return type
    pub fn new(return_type: CType) -> Self {
        Self {
            return_type: Box::new(return_type),
            args: Vec::new(),
        }
    }

    /// Add a raw argument
    pub fn arg(mut self, arg: CallbackArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Append the trailing user-data argument
    pub fn with_user_data(self) -> Self {
        self.arg(CallbackArg::keep(CType::UserData))
    }

    /// Arguments visible to the wrapped closure (user data elided)
    pub fn public_args(&self) -> &[CallbackArg] {
        match self.args.split_last() {
            Some((last, rest)) if last.ty.is_user_data() => rest,
            _ => &self.args,
        }
    }

    /// Whether the signature ends in a user-data pointer
    pub fn has_trailing_user_data(&self) -> bool {
        self.args.last().is_some_and(|a| a.ty.is_user_data())
    }
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.ty.to_string()).collect();
        write!(f, "{} (*)({})", self.return_type, args.join(", "))
    }
}
