//! Generation errors

use crate::ir::TableError;
use thiserror::Error;

/// Errors that abort a generation run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// A type outside the set of wrappable shapes
    #[error("cannot convert type {0} to C++ type")]
    UnsupportedType(String),

    /// A callback signature the adapter cannot wrap
    #[error("malformed callback {param}: {reason}")]
    MalformedCallback { param: String, reason: String },

    /// A failure must be reported but no context is reachable
    #[error("no context available to report failures")]
    MissingContext,

    /// The class table failed validation
    #[error(transparent)]
    Table(#[from] TableError),

    /// An error attributed to the C function being wrapped
    #[error("{function}: {source}")]
    Function {
        function: String,
        #[source]
        source: Box<GenError>,
    },
}

impl GenError {
    /// Attribute the error to a C function
    pub fn in_function(self, function: &str) -> Self {
        match self {
            GenError::Function { .. } => self,
            other => GenError::Function {
                function: function.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type of the generators
pub type Result<T> = std::result::Result<T, GenError>;
