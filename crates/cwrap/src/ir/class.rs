//! Class metadata
//!
//! A [`ClassDescriptor`] describes one wrapper class: the C object type it
//! manages, its constructors and its method groups. Classes that take part
//! in a tag-based hierarchy are described by [`ClassRole`], a closed set of
//! shapes instead of an open inheritance graph:
//!
//! - a *tagged root* owns the handle and exposes the runtime tag accessor
//!   used by `isa`/`as`,
//! - a *tagged view* shares the root's C type, owns no handle of its own and
//!   is identified by its tag constant.

use crate::ir::{CType, FunctionRef, MethodKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a class in a tag-based hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRole<'a> {
    /// Ordinary class owning its handle
    Plain,
    /// Class owning its handle whose runtime tag selects a view
    TaggedRoot { tag_accessor: &'a FunctionRef },
    /// View over the handle of `base`, selected by `tag`
    TaggedView { base: &'a str, tag: &'a str },
}

impl ClassRole<'_> {
    /// Whether objects of this class own their handle
    pub fn owns_handle(&self) -> bool {
        !matches!(self, ClassRole::TaggedView { .. })
    }
}

/// Metadata for one wrapper class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// C object type (e.g., "isl_set"); shared by a root and its views
    pub name: String,

    /// C-level name of a tag-based subclass (e.g., "isl_schedule_node_band").
    /// Doubles as the subclass' tag constant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass_name: Option<String>,

    /// C types of the classes this class is a subclass of
    #[serde(default)]
    pub superclasses: Vec<String>,

    /// Function returning the runtime tag of an object (roots only)
    #[serde(default)]
    pub type_tag_accessor: Option<FunctionRef>,

    /// Equality hook
    #[serde(default)]
    pub equality: Option<FunctionRef>,

    /// String conversion hook
    #[serde(default)]
    pub stringify: Option<FunctionRef>,

    /// Functions exposed as constructors
    #[serde(default)]
    pub constructors: Vec<FunctionRef>,

    /// Method groups keyed by public name; each group holds the overloads
    #[serde(default)]
    pub methods: BTreeMap<String, Vec<FunctionRef>>,
}

impl ClassDescriptor {
    /// Create a new class for the C type `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subclass_name: None,
            superclasses: Vec::new(),
            type_tag_accessor: None,
            equality: None,
            stringify: None,
            constructors: Vec::new(),
            methods: BTreeMap::new(),
        }
    }

    /// Create a tag-based view `subclass_name` over the C type `base`
    pub fn tagged_view(base: impl Into<String>, subclass_name: impl Into<String>) -> Self {
        let base = base.into();
        let mut class = Self::new(base.clone());
        class.subclass_name = Some(subclass_name.into());
        class.superclasses.push(base);
        class
    }

    /// Set the runtime tag accessor
    pub fn with_type_tag(mut self, accessor: FunctionRef) -> Self {
        self.type_tag_accessor = Some(accessor);
        self
    }

    /// Add a superclass
    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclasses.push(name.into());
        self
    }

    /// Set the equality hook
    pub fn with_equality(mut self, f: FunctionRef) -> Self {
        self.equality = Some(f);
        self
    }

    /// Set the string conversion hook
    pub fn with_stringify(mut self, f: FunctionRef) -> Self {
        self.stringify = Some(f);
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, f: FunctionRef) -> Self {
        self.constructors.push(f);
        self
    }

    /// Add an overload to the method group `name`
    pub fn method(mut self, name: impl Into<String>, f: FunctionRef) -> Self {
        self.methods.entry(name.into()).or_default().push(f);
        self
    }

    /// The C-level class identifier, subclass name included
    pub fn subclass_name(&self) -> &str {
        self.subclass_name.as_deref().unwrap_or(self.name.as_str())
    }

    /// Check if this class is a view selected by a runtime tag
    pub fn is_type_subclass(&self) -> bool {
        self.subclass_name
            .as_deref()
            .is_some_and(|sub| sub != self.name)
    }

    /// Position of this class in a tag-based hierarchy
    pub fn role(&self) -> ClassRole<'_> {
        if self.is_type_subclass() {
            ClassRole::TaggedView {
                base: &self.name,
                tag: self.subclass_name(),
            }
        } else if let Some(accessor) = &self.type_tag_accessor {
            ClassRole::TaggedRoot {
                tag_accessor: accessor,
            }
        } else {
            ClassRole::Plain
        }
    }

    /// Derive a method's public name from its C name by dropping the class prefix
    pub fn method_name<'a>(&self, f: &'a FunctionRef) -> &'a str {
        [self.subclass_name(), self.name.as_str()]
            .iter()
            .find_map(|prefix| {
                f.name
                    .strip_prefix(*prefix)
                    .and_then(|rest| rest.strip_prefix('_'))
            })
            .unwrap_or(f.name.as_str())
    }

    /// Kind of a function listed in the method groups
    ///
    /// A function whose first parameter is a handle of this class' C type
    /// binds `this`; everything else is a static method.
    pub fn method_kind(&self, f: &FunctionRef) -> MethodKind {
        match f.first_param().map(|p| &p.ty) {
            Some(CType::Handle { name }) if *name == self.name => MethodKind::InstanceMethod,
            _ => MethodKind::StaticMethod,
        }
    }

    /// Iterate over all functions of this class, constructors first
    pub fn functions(&self) -> impl Iterator<Item = &FunctionRef> {
        self.constructors
            .iter()
            .chain(self.methods.values().flatten())
    }
}
