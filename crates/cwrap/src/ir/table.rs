//! The class table
//!
//! [`ClassTable`] is the read-only input of the generator: every wrapper
//! class keyed by its C-level class name. Iteration follows key order, which
//! is what makes two generation runs over the same table byte-identical.

use crate::ir::{ClassDescriptor, ClassRole, FunctionRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors that can occur while building or validating a class table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A class has an empty C name
    #[error("class name cannot be empty")]
    EmptyName,

    /// Two classes share the same key
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// A superclass reference points nowhere
    #[error("class {class} refers to unknown superclass {superclass}")]
    UnknownSuperclass { class: String, superclass: String },

    /// A tag-based view without a root carrying a tag accessor
    #[error("subclass {class} needs class {base} with a type tag accessor")]
    MissingTaggedRoot { class: String, base: String },

    /// A function with an empty name
    #[error("class {class} lists a function without a name")]
    UnnamedFunction { class: String },

    /// The same C function appears twice in one overload group
    #[error("method group {class}::{method} lists {function} twice")]
    DuplicateOverload {
        class: String,
        method: String,
        function: String,
    },

    /// A callback parameter not followed by its user-data slot
    #[error("callback parameter {param} of {function} is not followed by a user data parameter")]
    CallbackWithoutUserData { function: String, param: String },

    /// A callback signature whose last argument is not user data
    #[error("callback parameter {param} of {function} does not end in a user data argument")]
    CallbackSignatureWithoutUserData { function: String, param: String },

    /// An equality hook with no method group to call from `operator==`
    #[error("equality hook {function} of {class} has no method group {method}")]
    MissingEqualityMethod {
        class: String,
        function: String,
        method: String,
    },

    /// A user-data parameter that does not belong to a callback
    #[error("user data parameter {param} of {function} does not follow a callback")]
    DanglingUserData { function: String, param: String },
}

/// Serialized form: a plain list of classes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawTable {
    #[serde(default)]
    classes: Vec<ClassDescriptor>,
}

/// Read-only table of all wrapper classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct ClassTable {
    classes: BTreeMap<String, ClassDescriptor>,
}

impl TryFrom<RawTable> for ClassTable {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        ClassTable::from_classes(raw.classes)
    }
}

impl From<ClassTable> for RawTable {
    fn from(table: ClassTable) -> Self {
        RawTable {
            classes: table.classes.into_values().collect(),
        }
    }
}

impl ClassTable {
    /// Build a table from a list of classes and validate it
    pub fn from_classes(
        classes: impl IntoIterator<Item = ClassDescriptor>,
    ) -> Result<Self, TableError> {
        let mut table = ClassTable::default();
        for class in classes {
            if class.name.is_empty() {
                return Err(TableError::EmptyName);
            }
            let key = class.subclass_name().to_string();
            if table.classes.contains_key(&key) {
                return Err(TableError::DuplicateClass(key));
            }
            table.classes.insert(key, class);
        }
        table.validate()?;
        Ok(table)
    }

    /// Parse and validate a table from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a class by its C-level class name
    pub fn get(&self, key: &str) -> Option<&ClassDescriptor> {
        self.classes.get(key)
    }

    /// Iterate over the classes in key order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the table holds no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Check if the class with C type `subclass` is a (transitive) subclass of `class`
    pub fn is_subclass(&self, subclass: &str, class: &ClassDescriptor) -> bool {
        let target = class.subclass_name();
        let mut seen = BTreeSet::new();
        let mut pending: Vec<&str> = match self.classes.get(subclass) {
            Some(c) => c.superclasses.iter().map(String::as_str).collect(),
            None => return false,
        };

        while let Some(candidate) = pending.pop() {
            if candidate == target {
                return true;
            }
            if !seen.insert(candidate) {
                continue;
            }
            if let Some(parent) = self.classes.get(candidate) {
                pending.extend(parent.superclasses.iter().map(String::as_str));
            }
        }

        false
    }

    /// Validate cross-class references and function shapes
    pub fn validate(&self) -> Result<(), TableError> {
        for (key, class) in &self.classes {
            for superclass in &class.superclasses {
                if !self.classes.contains_key(superclass) {
                    return Err(TableError::UnknownSuperclass {
                        class: key.clone(),
                        superclass: superclass.clone(),
                    });
                }
            }

            if let ClassRole::TaggedView { base, .. } = class.role() {
                let has_root = self
                    .classes
                    .get(base)
                    .is_some_and(|root| root.type_tag_accessor.is_some());
                if !has_root {
                    return Err(TableError::MissingTaggedRoot {
                        class: key.clone(),
                        base: base.to_string(),
                    });
                }
            }

            if let Some(equality) = &class.equality {
                let method = class.method_name(equality);
                if !class.methods.contains_key(method) {
                    return Err(TableError::MissingEqualityMethod {
                        class: key.clone(),
                        function: equality.name.clone(),
                        method: method.to_string(),
                    });
                }
            }

            for (method, overloads) in &class.methods {
                let mut names = BTreeSet::new();
                for f in overloads {
                    if !names.insert(f.name.as_str()) {
                        return Err(TableError::DuplicateOverload {
                            class: key.clone(),
                            method: method.clone(),
                            function: f.name.clone(),
                        });
                    }
                }
            }

            for f in class.functions() {
                if f.name.is_empty() {
                    return Err(TableError::UnnamedFunction { class: key.clone() });
                }
                validate_callbacks(f)?;
            }
        }

        Ok(())
    }
}

/// Check that callbacks and user-data slots come in adjacent pairs
fn validate_callbacks(f: &FunctionRef) -> Result<(), TableError> {
    for (i, param) in f.params.iter().enumerate() {
        if let Some(cb) = param.callback() {
            if !cb.has_trailing_user_data() {
                return Err(TableError::CallbackSignatureWithoutUserData {
                    function: f.name.clone(),
                    param: param.name.clone(),
                });
            }
            let followed = f.params.get(i + 1).is_some_and(|p| p.ty.is_user_data());
            if !followed {
                return Err(TableError::CallbackWithoutUserData {
                    function: f.name.clone(),
                    param: param.name.clone(),
                });
            }
        } else if param.ty.is_user_data() {
            let preceded = i > 0 && f.params[i - 1].ty.is_callback();
            if !preceded {
                return Err(TableError::DanglingUserData {
                    function: f.name.clone(),
                    param: param.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Builder for constructing a [`ClassTable`] class by class
#[derive(Debug, Default)]
pub struct TableBuilder {
    classes: Vec<ClassDescriptor>,
}

impl TableBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class
    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    /// Build and validate the table
    pub fn build(self) -> Result<ClassTable, TableError> {
        ClassTable::from_classes(self.classes)
    }
}
