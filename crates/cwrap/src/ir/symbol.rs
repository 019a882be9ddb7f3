//! Function and parameter metadata
//!
//! A [`FunctionRef`] is the C-level signature of one library function as
//! discovered by the front end. It is never mutated once the class table
//! has been built.

use crate::ir::{CType, CallbackType, Ownership};
use serde::{Deserialize, Serialize};

/// One parameter of a C function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name, reused verbatim in the wrapper
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: CType,
    /// Ownership annotation
    #[serde(default)]
    pub ownership: Ownership,
}

impl ParamDescriptor {
    /// Create a new borrowed parameter
    pub fn new(name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            ty,
            ownership: Ownership::Keep,
        }
    }

    /// Mark the parameter as `take`
    pub fn take(mut self) -> Self {
        self.ownership = Ownership::Take;
        self
    }

    /// Mark the parameter as `keep`
    pub fn keep(mut self) -> Self {
        self.ownership = Ownership::Keep;
        self
    }

    /// Check if the parameter is `keep`-annotated
    pub fn keeps(&self) -> bool {
        !self.ownership.is_take()
    }

    /// Callback signature, if this parameter is a callback
    pub fn callback(&self) -> Option<&CallbackType> {
        self.ty.as_callback()
    }
}

/// The C-level signature of a library function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    /// C function name (e.g., "isl_set_intersect")
    pub name: String,
    /// Return type
    pub return_type: CType,
    /// Whether the caller receives ownership of the result
    #[serde(default)]
    pub gives_result: bool,
    /// Parameters in positional order
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
}

impl FunctionRef {
    /// Create a new function returning an `int`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: CType::int(),
            gives_result: false,
            params: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: CType) -> Self {
        self.return_type = ty;
        self
    }

    /// Set the return type and mark the result as owned by the caller
    pub fn gives(mut self, ty: CType) -> Self {
        self.return_type = ty;
        self.gives_result = true;
        self
    }

    /// Check if any parameter is a callback
    pub fn has_callback(&self) -> bool {
        self.params.iter().any(|p| p.ty.is_callback())
    }

    /// Iterate over the callback parameters
    pub fn callback_params(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params.iter().filter(|p| p.ty.is_callback())
    }

    /// First parameter, if any
    pub fn first_param(&self) -> Option<&ParamDescriptor> {
        self.params.first()
    }
}

/// How a function is exposed on its wrapper class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Fills the handle of a freshly created object
    Constructor,
    /// Class-level function, all parameters exposed
    StaticMethod,
    /// Member function, the first parameter binds `this`
    InstanceMethod,
}

impl MethodKind {
    /// Whether the first raw parameter is the receiver
    pub fn has_receiver(self) -> bool {
        matches!(self, MethodKind::InstanceMethod)
    }
}
