//! Ownership and parameter passing
//!
//! Decides how a wrapper hands a library object to the C function it calls,
//! and how each parameter appears in a wrapper signature.
//!
//! | role | keep | take |
//! |------|------|------|
//! | receiver | `get()` | `copy()` |
//! | argument | `x.get()` | `x.release()` |
//!
//! A receiver must survive the call, so a `take` receiver hands over a copy.
//! Explicit arguments are already by-value copies and may be released.

use crate::codegen::callback::CallbackAdapter;
use crate::codegen::classify::{Category, TypeClassifier};
use crate::codegen::error::{GenError, Result};
use crate::config::GenConfig;
use crate::ir::{CType, Ownership, ParamDescriptor};

/// Where a handle comes from inside a wrapper method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The implicit `this` object
    Receiver,
    /// An explicit method argument
    Argument,
}

/// How a wrapper object gives up its handle for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Lend the handle
    Borrow,
    /// Hand over a fresh copy, keeping the original
    Copy,
    /// Hand over the handle itself
    Release,
}

impl Access {
    /// Access mode for a handle in the given role
    pub fn of(role: Role, ownership: Ownership) -> Self {
        match (role, ownership) {
            (_, Ownership::Keep) => Access::Borrow,
            (Role::Receiver, Ownership::Take) => Access::Copy,
            (Role::Argument, Ownership::Take) => Access::Release,
        }
    }

    /// Accessor call on the wrapper object
    pub fn accessor(self) -> &'static str {
        match self {
            Access::Borrow => "get()",
            Access::Copy => "copy()",
            Access::Release => "release()",
        }
    }
}

/// How a parameter appears in a wrapper signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    /// Passed by value
    Value,
    /// Passed by const reference
    ConstRef,
}

impl Passing {
    /// Passing mode for a parameter of the given category
    pub fn of(category: Category, ownership: Ownership) -> Self {
        match category {
            Category::String | Category::Callback => Passing::ConstRef,
            Category::BorrowedHandle => Passing::ConstRef,
            Category::Context if !ownership.is_take() => Passing::ConstRef,
            _ => Passing::Value,
        }
    }

    /// Declare a parameter of C++ type `ty`
    pub fn declare(self, ty: &str, name: &str) -> String {
        match self {
            Passing::Value if ty.ends_with('*') => format!("{}{}", ty, name),
            Passing::Value => format!("{} {}", ty, name),
            Passing::ConstRef => format!("const {} &{}", ty, name),
        }
    }
}

/// Expression handing the handle of `name` to a C function
pub fn handle_use(role: Role, name: &str, ownership: Ownership) -> String {
    let accessor = Access::of(role, ownership).accessor();
    match role {
        Role::Receiver => accessor.to_string(),
        Role::Argument => format!("{}.{}", name, accessor),
    }
}

/// Factory wrapping a raw handle: adopt it when owned, copy it when borrowed
pub fn wrap_factory(ownership: Ownership) -> &'static str {
    if ownership.is_take() {
        "manage"
    } else {
        "manage_copy"
    }
}

/// C tri-state value of the boolean wrapper `expr`
pub fn boolean_to_c(config: &GenConfig, expr: &str) -> String {
    format!(
        "{expr}.is_error() ? {error} : {expr}.is_true() ? {yes} : {no}",
        expr = expr,
        error = config.c_name("bool_error"),
        yes = config.c_name("bool_true"),
        no = config.c_name("bool_false")
    )
}

/// Parameter rendering on top of the classifier
#[derive(Debug, Clone, Copy)]
pub struct OwnershipPolicy<'a> {
    classifier: TypeClassifier<'a>,
}

impl<'a> OwnershipPolicy<'a> {
    pub fn new(classifier: TypeClassifier<'a>) -> Self {
        Self { classifier }
    }

    /// Declaration of a parameter in a wrapper signature
    pub fn param_decl(&self, param: &ParamDescriptor) -> Result<String> {
        let translated = self.classifier.classify_param(param)?;
        if translated.category == Category::Stat {
            return Err(GenError::UnsupportedType(param.ty.to_string()));
        }

        let passing = if self.raw_context(&param.ty) {
            Passing::Value
        } else {
            Passing::of(translated.category, param.ownership)
        };

        Ok(passing.declare(&translated.name, &param.name))
    }

    /// Expression passing a parameter to the underlying C function
    pub fn param_use(&self, param: &ParamDescriptor, role: Role) -> Result<String> {
        let config = self.classifier.config();
        let name = &param.name;

        let expr = match &param.ty {
            CType::Handle { .. } => handle_use(role, name, param.ownership),
            CType::Context if self.raw_context(&param.ty) => name.clone(),
            CType::Context => handle_use(role, name, param.ownership),
            CType::Enum { name: c_enum } if config.extensions => {
                format!("static_cast<{}>({})", c_enum, name)
            }
            CType::Enum { .. } | CType::Integer { .. } => name.clone(),
            CType::String => format!("{}.c_str()", name),
            CType::Bool if config.exceptions => format!(
                "{} ? {} : {}",
                name,
                config.c_name("bool_true"),
                config.c_name("bool_false")
            ),
            CType::Bool => boolean_to_c(config, name),
            CType::Callback(_) => CallbackAdapter::new(self.classifier).call_args(name),
            CType::Stat | CType::UserData | CType::Other { .. } => {
                return Err(GenError::UnsupportedType(param.ty.to_string()))
            }
        };

        Ok(expr)
    }

    fn raw_context(&self, ty: &CType) -> bool {
        ty.is_context() && !self.classifier.config().extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;

    #[test]
    fn test_access_table() {
        assert_eq!(Access::of(Role::Receiver, Ownership::Keep), Access::Borrow);
        assert_eq!(Access::of(Role::Receiver, Ownership::Take), Access::Copy);
        assert_eq!(Access::of(Role::Argument, Ownership::Keep), Access::Borrow);
        assert_eq!(Access::of(Role::Argument, Ownership::Take), Access::Release);
    }

    #[test]
    fn test_handle_use() {
        assert_eq!(handle_use(Role::Receiver, "set", Ownership::Keep), "get()");
        assert_eq!(handle_use(Role::Receiver, "set", Ownership::Take), "copy()");
        assert_eq!(handle_use(Role::Argument, "set2", Ownership::Keep), "set2.get()");
        assert_eq!(handle_use(Role::Argument, "set2", Ownership::Take), "set2.release()");
    }

    #[test]
    fn test_param_decls() {
        let config = GenConfig::default();
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));

        let take = ParamDescriptor::new("set2", CType::handle("isl_set")).take();
        let keep = ParamDescriptor::new("set2", CType::handle("isl_set"));
        let pos = ParamDescriptor::new("pos", CType::integer("unsigned int"));
        let s = ParamDescriptor::new("str", CType::String);
        let ctx = ParamDescriptor::new("ctx", CType::Context);

        assert_eq!(policy.param_decl(&take).unwrap(), "isl::set set2");
        assert_eq!(policy.param_decl(&keep).unwrap(), "const isl::set &set2");
        assert_eq!(policy.param_decl(&pos).unwrap(), "unsigned int pos");
        assert_eq!(policy.param_decl(&s).unwrap(), "const std::string &str");
        assert_eq!(policy.param_decl(&ctx).unwrap(), "const isl::ctx &ctx");
    }

    #[test]
    fn test_raw_context_without_extensions() {
        let config = GenConfig::default().with_extensions(false);
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));
        let ctx = ParamDescriptor::new("ctx", CType::Context);

        assert_eq!(policy.param_decl(&ctx).unwrap(), "isl_ctx *ctx");
        assert_eq!(policy.param_use(&ctx, Role::Argument).unwrap(), "ctx");
    }

    #[test]
    fn test_param_uses() {
        let config = GenConfig::default();
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));

        let dim = ParamDescriptor::new("type", CType::enumeration("enum isl_dim_type"));
        assert_eq!(
            policy.param_use(&dim, Role::Argument).unwrap(),
            "static_cast<enum isl_dim_type>(type)"
        );

        let s = ParamDescriptor::new("str", CType::String);
        assert_eq!(policy.param_use(&s, Role::Argument).unwrap(), "str.c_str()");

        let b = ParamDescriptor::new("flag", CType::Bool);
        assert_eq!(
            policy.param_use(&b, Role::Argument).unwrap(),
            "flag ? isl_bool_true : isl_bool_false"
        );

        let stat = ParamDescriptor::new("st", CType::Stat);
        assert!(policy.param_use(&stat, Role::Argument).is_err());
        assert!(policy.param_decl(&stat).is_err());
    }

    #[test]
    fn test_bool_use_without_exceptions() {
        let config = GenConfig::default().with_exceptions(false);
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));
        let b = ParamDescriptor::new("flag", CType::Bool);

        assert_eq!(policy.param_decl(&b).unwrap(), "isl::boolean flag");
        assert_eq!(
            policy.param_use(&b, Role::Argument).unwrap(),
            "flag.is_error() ? isl_bool_error : flag.is_true() ? isl_bool_true : isl_bool_false"
        );
    }

    #[test]
    fn test_callback_use() {
        let config = GenConfig::default();
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));
        let cb = crate::ir::CallbackType::new(CType::Stat)
            .arg(crate::ir::CallbackArg::take(CType::handle("isl_map")))
            .with_user_data();
        let fn_param = ParamDescriptor::new("fn", CType::callback(cb));

        assert_eq!(
            policy.param_use(&fn_param, Role::Argument).unwrap(),
            "fn_lambda, &fn_data"
        );
    }

    #[test]
    fn test_enum_use_without_extensions() {
        let config = GenConfig::default().with_extensions(false);
        let policy = OwnershipPolicy::new(TypeClassifier::new(&config));
        let dim = ParamDescriptor::new("type", CType::enumeration("enum isl_dim_type"));
        assert_eq!(policy.param_use(&dim, Role::Argument).unwrap(), "type");
    }

    #[test]
    fn test_wrap_factory() {
        assert_eq!(wrap_factory(Ownership::Take), "manage");
        assert_eq!(wrap_factory(Ownership::Keep), "manage_copy");
    }
}
