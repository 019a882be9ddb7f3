//! Type classification
//!
//! Maps C type descriptors onto C++ type names and semantic categories.
//! Every lookup is a pure function of the descriptor and the configuration.

use crate::codegen::error::{GenError, Result};
use crate::config::GenConfig;
use crate::ir::{CType, CallbackType, ClassDescriptor, Ownership, ParamDescriptor};

/// Semantic category of a parameter or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Library object whose ownership moves into the callee
    OwnedHandle,
    /// Library object lent to the callee
    BorrowedHandle,
    /// Library context
    Context,
    /// Tri-state boolean status
    Bool,
    /// ok/error status
    Stat,
    /// C enumeration
    Enum,
    /// Plain integer
    Integer,
    /// Character string
    String,
    /// Function pointer with user data
    Callback,
}

impl Category {
    /// Whether this category carries a library object
    pub fn is_handle(self) -> bool {
        matches!(self, Category::OwnedHandle | Category::BorrowedHandle)
    }
}

/// A classified type together with its C++ spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub category: Category,
    pub name: String,
}

/// Translates C types into their C++ counterparts
#[derive(Debug, Clone, Copy)]
pub struct TypeClassifier<'a> {
    config: &'a GenConfig,
}

impl<'a> TypeClassifier<'a> {
    /// Create a classifier for the given configuration
    pub fn new(config: &'a GenConfig) -> Self {
        Self { config }
    }

    /// The configuration this classifier translates for
    pub fn config(&self) -> &'a GenConfig {
        self.config
    }

    /// Classify a type with the given ownership annotation
    pub fn classify(&self, ty: &CType, ownership: Ownership) -> Result<Translated> {
        let category = match ty {
            CType::Handle { .. } if ownership.is_take() => Category::OwnedHandle,
            CType::Handle { .. } => Category::BorrowedHandle,
            CType::Context => Category::Context,
            CType::Bool => Category::Bool,
            CType::Stat => Category::Stat,
            CType::Enum { .. } => Category::Enum,
            CType::Integer { .. } => Category::Integer,
            CType::String => Category::String,
            CType::Callback(_) => Category::Callback,
            CType::UserData | CType::Other { .. } => {
                return Err(GenError::UnsupportedType(ty.to_string()))
            }
        };

        Ok(Translated {
            category,
            name: self.translate(ty)?,
        })
    }

    /// Classify a parameter
    pub fn classify_param(&self, param: &ParamDescriptor) -> Result<Translated> {
        self.classify(&param.ty, param.ownership)
    }

    /// C++ spelling of a C type
    pub fn translate(&self, ty: &CType) -> Result<String> {
        let config = self.config;

        let name = match ty {
            CType::Handle { name } => self.handle_type(name),
            CType::Bool => config.bool_type(),
            CType::Stat => config.stat_type(),
            CType::Enum { name } if config.extensions => self.enum_type(name),
            CType::Context if config.extensions => config.qualified("ctx"),
            CType::Context => self.raw_context(),
            CType::Enum { name } | CType::Integer { name } => name.clone(),
            CType::String => "std::string".to_string(),
            CType::Callback(cb) => self.callback_type(cb)?,
            CType::UserData | CType::Other { .. } => {
                return Err(GenError::UnsupportedType(ty.to_string()))
            }
        };

        Ok(name)
    }

    /// Wrapper type of the C object type `c_name` (e.g., `isl::set`)
    pub fn handle_type(&self, c_name: &str) -> String {
        self.config.qualified(self.config.strip_prefix(c_name))
    }

    /// Unqualified C++ name of a class, subclass name included
    pub fn class_name<'c>(&self, class: &'c ClassDescriptor) -> &'c str {
        self.config.strip_prefix(class.subclass_name())
    }

    /// Unqualified C++ name of the class owning the handle of `class`
    pub fn base_class_name<'c>(&self, class: &'c ClassDescriptor) -> &'c str {
        self.config.strip_prefix(&class.name)
    }

    /// Enum spelling with the first C prefix replaced by the namespace
    pub fn enum_type(&self, name: &str) -> String {
        let namespace = format!("{}::", self.config.namespace);
        name.replacen(&self.config.c_prefix, &namespace, 1)
    }

    /// `std::function` type of a callback, user data elided
    pub fn callback_type(&self, cb: &CallbackType) -> Result<String> {
        let ret = self.translate(&cb.return_type)?;
        let args = cb
            .public_args()
            .iter()
            .map(|arg| self.translate(&arg.ty))
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("std::function<{}({})>", ret, args.join(", ")))
    }

    /// Spelling of a type on the C side of the boundary
    pub fn c_spelling(&self, ty: &CType) -> Result<String> {
        let config = self.config;

        let spelling = match ty {
            CType::Handle { name } => format!("{} *", name),
            CType::Context => self.raw_context(),
            CType::Bool => config.c_name("bool"),
            CType::Stat => config.c_name("stat"),
            CType::Enum { name } | CType::Integer { name } => name.clone(),
            CType::String => "const char *".to_string(),
            CType::UserData => "void *".to_string(),
            CType::Other { spelling } => spelling.clone(),
            CType::Callback(_) => return Err(GenError::UnsupportedType(ty.to_string())),
        };

        Ok(spelling)
    }

    /// C declaration of a variable of type `ty`
    pub fn c_declarator(&self, ty: &CType, name: &str) -> Result<String> {
        let spelling = self.c_spelling(ty)?;
        if spelling.ends_with('*') {
            Ok(format!("{}{}", spelling, name))
        } else {
            Ok(format!("{} {}", spelling, name))
        }
    }

    fn raw_context(&self) -> String {
        format!("{} *", self.config.c_name("ctx"))
    }
}
