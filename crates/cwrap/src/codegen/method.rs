//! Method synthesis
//!
//! Turns one C function into a C++ constructor, static method or member
//! function. A definition is emitted in fixed phases:
//!
//! 1. signature (the receiver and user data slots are hidden)
//! 2. null checks of every object argument
//! 3. capture of the context used to report failures
//! 4. a scope keeping the library from printing its own diagnostics
//! 5. callback locals followed by the call itself
//! 6. rethrow of captured callback exceptions, then the failure check
//! 7. conversion of the raw result
//!
//! Phases 2, 3, 4 and 6 only exist when exceptions are enabled.

use crate::codegen::callback::CallbackAdapter;
use crate::codegen::classify::{Category, TypeClassifier};
use crate::codegen::error::{GenError, Result};
use crate::codegen::ownership::{OwnershipPolicy, Role};
use crate::config::GenConfig;
use crate::ir::{CType, ClassDescriptor, ClassTable, FunctionRef, MethodKind, Ownership};

/// Where the context used to report a failure comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext<'f> {
    /// The receiver's own context
    Receiver,
    /// A context parameter, used directly
    Param(&'f str),
    /// The context of object parameter `param`, saved on entry into `local`
    Saved { param: &'f str, local: &'static str },
}

impl ErrorContext<'_> {
    /// Expression naming the context inside the method body
    pub fn expr(&self) -> &str {
        match self {
            ErrorContext::Receiver => "get_ctx()",
            ErrorContext::Param(name) => name,
            ErrorContext::Saved { local, .. } => local,
        }
    }
}

/// Synthesizes declarations and definitions of wrapper methods
#[derive(Debug, Clone, Copy)]
pub struct MethodSynthesizer<'a> {
    config: &'a GenConfig,
    table: &'a ClassTable,
    classifier: TypeClassifier<'a>,
    policy: OwnershipPolicy<'a>,
    callbacks: CallbackAdapter<'a>,
}

impl<'a> MethodSynthesizer<'a> {
    /// Create a synthesizer over a class table
    pub fn new(config: &'a GenConfig, table: &'a ClassTable) -> Self {
        let classifier = TypeClassifier::new(config);
        Self {
            config,
            table,
            classifier,
            policy: OwnershipPolicy::new(classifier),
            callbacks: CallbackAdapter::new(classifier),
        }
    }

    /// In-class declaration of `f` exposed under `name`
    pub fn declaration(
        &self,
        class: &ClassDescriptor,
        name: &str,
        f: &FunctionRef,
        kind: MethodKind,
    ) -> Result<String> {
        self.header(class, name, f, kind, true)
            .map_err(|e| e.in_function(&f.name))
    }

    /// Out-of-class definition of `f` exposed under `name`
    pub fn definition(
        &self,
        class: &ClassDescriptor,
        name: &str,
        f: &FunctionRef,
        kind: MethodKind,
    ) -> Result<String> {
        self.body(class, name, f, kind)
            .map_err(|e| e.in_function(&f.name))
    }

    /// Check if a constructor converts implicitly from a subclass object
    pub fn is_implicit_conversion(&self, class: &ClassDescriptor, f: &FunctionRef) -> bool {
        match f.params.as_slice() {
            [param] => param
                .ty
                .handle_name()
                .is_some_and(|sub| self.table.is_subclass(sub, class)),
            _ => false,
        }
    }

    /// Context used to report a failure, if one can be reached
    pub fn error_context<'f>(&self, f: &'f FunctionRef, kind: MethodKind) -> Option<ErrorContext<'f>> {
        if kind.has_receiver() {
            return Some(ErrorContext::Receiver);
        }
        if let Some(first) = f.first_param().filter(|p| p.ty.is_context()) {
            return Some(ErrorContext::Param(&first.name));
        }
        if let Some(handle) = f.params.iter().find(|p| p.ty.is_handle()) {
            // the local must not shadow a parameter
            let local = if f.params.iter().any(|p| p.name == "ctx") {
                "saved_ctx"
            } else {
                "ctx"
            };
            return Some(ErrorContext::Saved {
                param: &handle.name,
                local,
            });
        }
        f.params
            .iter()
            .find(|p| p.ty.is_context())
            .map(|p| ErrorContext::Param(&p.name))
    }

    /// C++ return type, narrowed to the subclass for tag-based views
    ///
    /// Returns the type and whether the raw result must be downcast.
    pub fn return_type(&self, class: &ClassDescriptor, f: &FunctionRef) -> Result<(String, bool)> {
        let ty = self.classifier.translate(&f.return_type)?;
        if class.is_type_subclass() && ty == self.classifier.handle_type(&class.name) {
            return Ok((self.classifier.handle_type(class.subclass_name()), true));
        }
        Ok((ty, false))
    }

    fn header(
        &self,
        class: &ClassDescriptor,
        name: &str,
        f: &FunctionRef,
        kind: MethodKind,
        is_declaration: bool,
    ) -> Result<String> {
        let class_name = self.classifier.class_name(class);
        let mut output = String::new();

        if is_declaration {
            output.push_str("  ");
            if kind == MethodKind::StaticMethod {
                output.push_str("static ");
            }
            output.push_str("inline ");
            if kind == MethodKind::Constructor {
                if self.is_implicit_conversion(class, f) {
                    output.push_str("/* implicit */ ");
                } else {
                    output.push_str("explicit ");
                }
            }
        }

        if kind != MethodKind::Constructor {
            let (ret, _) = self.return_type(class, f)?;
            output.push_str(&ret);
            output.push(' ');
        }

        if !is_declaration {
            output.push_str(&format!("{}::", class_name));
        }

        if kind == MethodKind::Constructor {
            output.push_str(class_name);
        } else {
            output.push_str(self.config.rename_method(name));
        }

        let skip = usize::from(kind.has_receiver());
        let params = f
            .params
            .iter()
            .skip(skip)
            .filter(|p| !p.ty.is_user_data())
            .map(|p| self.policy.param_decl(p))
            .collect::<Result<Vec<_>>>()?;
        output.push_str(&format!("({})", params.join(", ")));

        if kind.has_receiver() {
            output.push_str(" const");
        }
        if is_declaration {
            output.push(';');
        }
        output.push('\n');
        Ok(output)
    }

    fn body(
        &self,
        class: &ClassDescriptor,
        name: &str,
        f: &FunctionRef,
        kind: MethodKind,
    ) -> Result<String> {
        let mut output = self.header(class, name, f, kind, false)?;
        output.push_str("{\n");

        if self.config.exceptions {
            output.push_str(&self.validity_check(f, kind));
            let needs_check = kind == MethodKind::Constructor || self.checks_result(f);
            match self.error_context(f, kind) {
                Some(ctx) => {
                    if let ErrorContext::Saved { param, local } = ctx {
                        output.push_str(&format!("  auto {} = {}.get_ctx();\n", local, param));
                    }
                    output.push_str(&format!(
                        "  options_scoped_set_on_error saved_on_error({}, {});\n",
                        ctx.expr(),
                        self.config.on_error_continue()
                    ));
                }
                None if needs_check => return Err(GenError::MissingContext),
                None => {}
            }
        }

        for param in f.callback_params() {
            output.push_str(&self.callbacks.locals(param)?);
        }

        output.push_str(&self.invocation(f, kind)?);

        if self.config.exceptions {
            output.push_str(&self.post_call_check(f, kind)?);
        }

        output.push_str(&self.result(class, f, kind)?);
        output.push_str("}\n");
        Ok(output)
    }

    fn validity_check(&self, f: &FunctionRef, kind: MethodKind) -> String {
        let checks: Vec<String> = f
            .params
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                if i == 0 && kind.has_receiver() {
                    Some("!ptr".to_string())
                } else if p.ty.is_handle() {
                    Some(format!("{}.is_null()", p.name))
                } else {
                    None
                }
            })
            .collect();

        if checks.is_empty() {
            return String::new();
        }

        let mut output = format!("  if ({})\n", checks.join(" || "));
        output.push_str(&throw_null_input(self.config));
        output
    }

    fn invocation(&self, f: &FunctionRef, kind: MethodKind) -> Result<String> {
        let args = f
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.ty.is_user_data())
            .map(|(i, p)| {
                let role = if i == 0 && kind.has_receiver() {
                    Role::Receiver
                } else {
                    Role::Argument
                };
                self.policy.param_use(p, role)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("  auto res = {}({});\n", f.name, args.join(", ")))
    }

    /// Whether the raw result carries a failure convention
    fn checks_result(&self, f: &FunctionRef) -> bool {
        matches!(f.return_type, CType::Stat | CType::Bool | CType::Handle { .. })
    }

    fn post_call_check(&self, f: &FunctionRef, kind: MethodKind) -> Result<String> {
        let mut output = String::new();
        for param in f.callback_params() {
            output.push_str(&self.callbacks.rethrow_check(&param.name));
        }

        let condition = match f.return_type {
            CType::Stat | CType::Bool => "res < 0",
            CType::Handle { .. } => "!res",
            _ => return Ok(output),
        };
        let ctx = self.error_context(f, kind).ok_or(GenError::MissingContext)?;

        output.push_str(&format!("  if ({})\n", condition));
        output.push_str(&format!(
            "    throw exception::create_from_last_error({});\n",
            ctx.expr()
        ));
        Ok(output)
    }

    fn result(&self, class: &ClassDescriptor, f: &FunctionRef, kind: MethodKind) -> Result<String> {
        if kind == MethodKind::Constructor {
            return Ok("  ptr = res;\n".to_string());
        }

        let exceptions = self.config.exceptions;
        let translated = self.classifier.classify(&f.return_type, Ownership::Take)?;
        let (ret, downcast) = self.return_type(class, f)?;

        let line = match translated.category {
            Category::OwnedHandle if downcast => format!("  return manage(res).as<{}>();\n", ret),
            Category::OwnedHandle => "  return manage(res);\n".to_string(),
            Category::Bool if !exceptions => "  return manage(res);\n".to_string(),
            Category::Stat if exceptions => String::new(),
            Category::Stat => format!("  return {}(res);\n", ret),
            Category::String => {
                let mut output = "  std::string tmp(res);\n".to_string();
                if f.gives_result {
                    output.push_str("  free(res);\n");
                }
                output.push_str("  return tmp;\n");
                output
            }
            Category::Enum if self.config.extensions => {
                format!("  return static_cast<{}>(res);\n", ret)
            }
            _ if f.has_callback() && translated.category != Category::Enum => {
                format!("  return {};\n", convert(&ret, "res"))
            }
            _ => "  return res;\n".to_string(),
        };

        Ok(line)
    }
}

/// Conversion of `expr` to the C++ type `ty`
fn convert(ty: &str, expr: &str) -> String {
    let simple = ty.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    if simple {
        format!("{}({})", ty, expr)
    } else {
        format!("static_cast<{}>({})", ty, expr)
    }
}

/// Statement throwing the invalid-input exception
pub fn throw_null_input(config: &GenConfig) -> String {
    format!(
        "    throw {}::create({},\n        \"NULL input\", __FILE__, __LINE__);\n",
        config.qualified("exception"),
        config.c_name("error_invalid")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CallbackArg, CallbackType, ParamDescriptor, TableBuilder};
    use pretty_assertions::assert_eq;

    fn table() -> ClassTable {
        TableBuilder::new()
            .class(ClassDescriptor::new("isl_union_set"))
            .class(ClassDescriptor::new("isl_set").superclass("isl_union_set"))
            .class(ClassDescriptor::new("isl_basic_set").superclass("isl_set"))
            .class(ClassDescriptor::new("isl_map"))
            .class(
                ClassDescriptor::new("isl_schedule_node")
                    .with_type_tag(FunctionRef::new("isl_schedule_node_get_type")),
            )
            .class(ClassDescriptor::tagged_view(
                "isl_schedule_node",
                "isl_schedule_node_band",
            ))
            .build()
            .unwrap()
    }

    fn intersect() -> FunctionRef {
        FunctionRef::new("isl_set_intersect")
            .param(ParamDescriptor::new("set1", CType::handle("isl_set")).take())
            .param(ParamDescriptor::new("set2", CType::handle("isl_set")).take())
            .gives(CType::handle("isl_set"))
    }

    fn foreach_map() -> FunctionRef {
        FunctionRef::new("isl_union_map_foreach_map")
            .returns(CType::Stat)
            .param(ParamDescriptor::new("umap", CType::handle("isl_union_map")))
            .param(ParamDescriptor::new(
                "fn",
                CType::callback(
                    CallbackType::new(CType::Stat)
                        .arg(CallbackArg::take(CType::handle("isl_map")))
                        .with_user_data(),
                ),
            ))
            .param(ParamDescriptor::new("user", CType::UserData))
    }

    /// Call argument text for a two-handle function with the given annotations
    fn call_args(receiver: Ownership, argument: Ownership) -> String {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let mut first = ParamDescriptor::new("set1", CType::handle("isl_set"));
        first.ownership = receiver;
        let mut second = ParamDescriptor::new("set2", CType::handle("isl_set"));
        second.ownership = argument;
        let f = FunctionRef::new("isl_set_op")
            .param(first)
            .param(second)
            .gives(CType::handle("isl_set"));

        let body = synth
            .definition(set, "op", &f, MethodKind::InstanceMethod)
            .unwrap();
        body.lines()
            .find(|l| l.starts_with("  auto res = "))
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_ownership_table_in_calls() {
        assert_eq!(
            call_args(Ownership::Keep, Ownership::Keep),
            "  auto res = isl_set_op(get(), set2.get());"
        );
        assert_eq!(
            call_args(Ownership::Take, Ownership::Keep),
            "  auto res = isl_set_op(copy(), set2.get());"
        );
        assert_eq!(
            call_args(Ownership::Keep, Ownership::Take),
            "  auto res = isl_set_op(get(), set2.release());"
        );
        assert_eq!(
            call_args(Ownership::Take, Ownership::Take),
            "  auto res = isl_set_op(copy(), set2.release());"
        );
    }

    #[test]
    fn test_member_method() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        assert_eq!(
            synth
                .declaration(set, "intersect", &intersect(), MethodKind::InstanceMethod)
                .unwrap(),
            "  inline isl::set intersect(isl::set set2) const;\n"
        );

        let expected = "isl::set set::intersect(isl::set set2) const\n\
                        {\n\
                        \x20 if (!ptr || set2.is_null())\n\
                        \x20   throw isl::exception::create(isl_error_invalid,\n\
                        \x20       \"NULL input\", __FILE__, __LINE__);\n\
                        \x20 options_scoped_set_on_error saved_on_error(get_ctx(), ISL_ON_ERROR_CONTINUE);\n\
                        \x20 auto res = isl_set_intersect(copy(), set2.release());\n\
                        \x20 if (!res)\n\
                        \x20   throw exception::create_from_last_error(get_ctx());\n\
                        \x20 return manage(res);\n\
                        }\n";
        assert_eq!(
            synth
                .definition(set, "intersect", &intersect(), MethodKind::InstanceMethod)
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_member_method_without_exceptions() {
        let config = GenConfig::default().with_exceptions(false);
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let expected = "isl::set set::intersect(isl::set set2) const\n\
                        {\n\
                        \x20 auto res = isl_set_intersect(copy(), set2.release());\n\
                        \x20 return manage(res);\n\
                        }\n";
        assert_eq!(
            synth
                .definition(set, "intersect", &intersect(), MethodKind::InstanceMethod)
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_static_method_saves_context() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let universe = FunctionRef::new("isl_set_universe")
            .param(ParamDescriptor::new("space", CType::handle("isl_space")).take())
            .gives(CType::handle("isl_set"));

        assert_eq!(
            synth
                .declaration(set, "universe", &universe, MethodKind::StaticMethod)
                .unwrap(),
            "  static inline isl::set universe(isl::space space);\n"
        );

        let body = synth
            .definition(set, "universe", &universe, MethodKind::StaticMethod)
            .unwrap();
        assert!(body.starts_with("isl::set set::universe(isl::space space)\n{\n"));
        assert!(body.contains("  if (space.is_null())\n"));
        assert!(body.contains("  auto ctx = space.get_ctx();\n"));
        assert!(body.contains("saved_on_error(ctx, ISL_ON_ERROR_CONTINUE)"));
        assert!(body.contains("    throw exception::create_from_last_error(ctx);\n"));
        assert!(body.contains("  auto res = isl_set_universe(space.release());\n"));
    }

    #[test]
    fn test_context_from_first_handle_parameter() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let combine = FunctionRef::new("isl_set_combine")
            .param(ParamDescriptor::new("n", CType::int()))
            .param(ParamDescriptor::new("space", CType::handle("isl_space")).take())
            .param(ParamDescriptor::new("other", CType::handle("isl_set")))
            .gives(CType::handle("isl_set"));

        assert_eq!(
            synth.error_context(&combine, MethodKind::StaticMethod),
            Some(ErrorContext::Saved {
                param: "space",
                local: "ctx"
            })
        );

        let body = synth
            .definition(set, "combine", &combine, MethodKind::StaticMethod)
            .unwrap();
        assert!(body.contains("  if (space.is_null() || other.is_null())\n"));
        assert!(body.contains("  auto ctx = space.get_ctx();\n"));
        assert!(!body.contains("other.get_ctx()"));
        assert!(body.contains("saved_on_error(ctx, ISL_ON_ERROR_CONTINUE)"));
        assert!(body.contains("    throw exception::create_from_last_error(ctx);\n"));
    }

    #[test]
    fn test_saved_context_does_not_shadow_parameter() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let from_parts = FunctionRef::new("isl_set_from_parts")
            .param(ParamDescriptor::new("n", CType::int()))
            .param(ParamDescriptor::new("space", CType::handle("isl_space")).take())
            .param(ParamDescriptor::new("ctx", CType::Context))
            .gives(CType::handle("isl_set"));

        let body = synth
            .definition(set, "from_parts", &from_parts, MethodKind::StaticMethod)
            .unwrap();
        assert!(body.starts_with(
            "isl::set set::from_parts(int n, isl::space space, const isl::ctx &ctx)\n"
        ));
        assert!(body.contains("  auto saved_ctx = space.get_ctx();\n"));
        assert!(!body.contains("auto ctx ="));
        assert!(body.contains("saved_on_error(saved_ctx, ISL_ON_ERROR_CONTINUE)"));
        assert!(body.contains("    throw exception::create_from_last_error(saved_ctx);\n"));
        assert!(body.contains("  auto res = isl_set_from_parts(n, space.release(), ctx.get());\n"));
    }

    #[test]
    fn test_constructor_from_context() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let read = FunctionRef::new("isl_set_read_from_str")
            .param(ParamDescriptor::new("ctx", CType::Context))
            .param(ParamDescriptor::new("str", CType::String))
            .gives(CType::handle("isl_set"));

        assert_eq!(
            synth
                .declaration(set, "read_from_str", &read, MethodKind::Constructor)
                .unwrap(),
            "  inline explicit set(const isl::ctx &ctx, const std::string &str);\n"
        );

        let expected = "set::set(const isl::ctx &ctx, const std::string &str)\n\
                        {\n\
                        \x20 options_scoped_set_on_error saved_on_error(ctx, ISL_ON_ERROR_CONTINUE);\n\
                        \x20 auto res = isl_set_read_from_str(ctx.get(), str.c_str());\n\
                        \x20 if (!res)\n\
                        \x20   throw exception::create_from_last_error(ctx);\n\
                        \x20 ptr = res;\n\
                        }\n";
        assert_eq!(
            synth
                .definition(set, "read_from_str", &read, MethodKind::Constructor)
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_implicit_conversion_constructor() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let union_set = table.get("isl_union_set").unwrap();

        let from_basic = FunctionRef::new("isl_union_set_from_basic_set")
            .param(ParamDescriptor::new("bset", CType::handle("isl_basic_set")).take())
            .gives(CType::handle("isl_union_set"));
        let from_map = FunctionRef::new("isl_union_set_from_map")
            .param(ParamDescriptor::new("map", CType::handle("isl_map")).take())
            .gives(CType::handle("isl_union_set"));

        assert!(synth.is_implicit_conversion(union_set, &from_basic));
        assert!(!synth.is_implicit_conversion(union_set, &from_map));
        assert_eq!(
            synth
                .declaration(union_set, "from_basic_set", &from_basic, MethodKind::Constructor)
                .unwrap(),
            "  inline /* implicit */ union_set(isl::basic_set bset);\n"
        );
        assert_eq!(
            synth
                .declaration(union_set, "from_map", &from_map, MethodKind::Constructor)
                .unwrap(),
            "  inline explicit union_set(isl::map map);\n"
        );
    }

    #[test]
    fn test_callback_method() {
        let config = GenConfig::default();
        let table = TableBuilder::new()
            .class(ClassDescriptor::new("isl_union_map"))
            .build()
            .unwrap();
        let synth = MethodSynthesizer::new(&config, &table);
        let umap = table.get("isl_union_map").unwrap();

        assert_eq!(
            synth
                .declaration(umap, "foreach_map", &foreach_map(), MethodKind::InstanceMethod)
                .unwrap(),
            "  inline void foreach_map(const std::function<void(isl::map)> &fn) const;\n"
        );

        let body = synth
            .definition(umap, "foreach_map", &foreach_map(), MethodKind::InstanceMethod)
            .unwrap();
        let call = body.find("  auto res = isl_union_map_foreach_map(get(), fn_lambda, &fn_data);\n");
        let holder = body.find("  struct fn_data {\n");
        let rethrow = body.find("  if (fn_data.eptr)\n    std::rethrow_exception(fn_data.eptr);\n");
        let check = body.find("  if (res < 0)\n");

        assert!(holder.unwrap() < call.unwrap());
        assert!(call.unwrap() < rethrow.unwrap());
        assert!(rethrow.unwrap() < check.unwrap());
        assert!(
            body.ends_with("  if (res < 0)\n    throw exception::create_from_last_error(get_ctx());\n}\n"),
            "stat methods return void:\n{}",
            body
        );
    }

    #[test]
    fn test_callback_method_without_exceptions() {
        let config = GenConfig::default().with_exceptions(false);
        let table = TableBuilder::new()
            .class(ClassDescriptor::new("isl_union_map"))
            .build()
            .unwrap();
        let synth = MethodSynthesizer::new(&config, &table);
        let umap = table.get("isl_union_map").unwrap();

        let body = synth
            .definition(umap, "foreach_map", &foreach_map(), MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.starts_with(
            "isl::stat union_map::foreach_map(const std::function<isl::stat(isl::map)> &fn) const\n"
        ));
        assert!(!body.contains("eptr"));
        assert!(!body.contains("saved_on_error"));
        assert!(!body.contains("is_null"));
        assert!(!body.contains("res < 0"));
        assert!(body.ends_with("  return isl::stat(res);\n}\n"));
    }

    #[test]
    fn test_integer_result_is_never_checked() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let dim = FunctionRef::new("isl_set_dim")
            .returns(CType::integer("isl_size"))
            .param(ParamDescriptor::new("set", CType::handle("isl_set")))
            .param(ParamDescriptor::new("type", CType::enumeration("enum isl_dim_type")));
        let body = synth
            .definition(set, "dim", &dim, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.contains("  auto res = isl_set_dim(get(), static_cast<enum isl_dim_type>(type));\n"));
        assert!(!body.contains("if (res"));
        assert!(body.ends_with("  return res;\n}\n"));

        let count = FunctionRef::new("isl_set_count_basic_sets")
            .returns(CType::int())
            .param(ParamDescriptor::new("set", CType::handle("isl_set")))
            .param(ParamDescriptor::new(
                "fn",
                CType::callback(
                    CallbackType::new(CType::Stat)
                        .arg(CallbackArg::take(CType::handle("isl_basic_set")))
                        .with_user_data(),
                ),
            ))
            .param(ParamDescriptor::new("user", CType::UserData));
        let body = synth
            .definition(set, "count_basic_sets", &count, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.contains("std::rethrow_exception(fn_data.eptr)"));
        assert!(!body.contains("if (res"));
        assert!(body.ends_with("  return int(res);\n}\n"));
    }

    #[test]
    fn test_bool_results() {
        let table = table();
        let is_empty = FunctionRef::new("isl_set_is_empty")
            .returns(CType::Bool)
            .param(ParamDescriptor::new("set", CType::handle("isl_set")));

        let config = GenConfig::default();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let body = synth
            .definition(set, "is_empty", &is_empty, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.starts_with("bool set::is_empty() const\n"));
        assert!(body.contains("  if (res < 0)\n"));
        assert!(body.ends_with("  return res;\n}\n"));

        let config = GenConfig::default().with_exceptions(false);
        let synth = MethodSynthesizer::new(&config, &table);
        let body = synth
            .definition(set, "is_empty", &is_empty, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.starts_with("isl::boolean set::is_empty() const\n"));
        assert!(body.ends_with("  return manage(res);\n}\n"));
    }

    #[test]
    fn test_string_and_enum_results() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let name = FunctionRef::new("isl_set_get_tuple_name")
            .returns(CType::String)
            .param(ParamDescriptor::new("set", CType::handle("isl_set")));
        let body = synth
            .definition(set, "get_tuple_name", &name, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.ends_with("  std::string tmp(res);\n  return tmp;\n}\n"));

        let owned = FunctionRef::new("isl_set_to_str")
            .gives(CType::String)
            .param(ParamDescriptor::new("set", CType::handle("isl_set")));
        let body = synth
            .definition(set, "to_str", &owned, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.ends_with("  std::string tmp(res);\n  free(res);\n  return tmp;\n}\n"));

        let node = table.get("isl_schedule_node").unwrap();
        let ty = FunctionRef::new("isl_schedule_node_get_type")
            .returns(CType::enumeration("enum isl_schedule_node_type"))
            .param(ParamDescriptor::new("node", CType::handle("isl_schedule_node")));
        let body = synth
            .definition(node, "get_type", &ty, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.starts_with("enum isl::schedule_node_type schedule_node::get_type() const\n"));
        assert!(body.ends_with("  return static_cast<enum isl::schedule_node_type>(res);\n}\n"));
    }

    #[test]
    fn test_subclass_result_is_downcast() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let band = table.get("isl_schedule_node_band").unwrap();

        let split = FunctionRef::new("isl_schedule_node_band_split")
            .param(ParamDescriptor::new("node", CType::handle("isl_schedule_node")).take())
            .param(ParamDescriptor::new("pos", CType::int()))
            .gives(CType::handle("isl_schedule_node"));

        assert_eq!(
            synth
                .declaration(band, "split", &split, MethodKind::InstanceMethod)
                .unwrap(),
            "  inline isl::schedule_node_band split(int pos) const;\n"
        );
        let body = synth
            .definition(band, "split", &split, MethodKind::InstanceMethod)
            .unwrap();
        assert!(body.starts_with("isl::schedule_node_band schedule_node_band::split(int pos) const\n"));
        assert!(body.ends_with("  return manage(res).as<isl::schedule_node_band>();\n}\n"));
    }

    #[test]
    fn test_keyword_rename() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();
        let union = FunctionRef::new("isl_set_union")
            .param(ParamDescriptor::new("set1", CType::handle("isl_set")).take())
            .param(ParamDescriptor::new("set2", CType::handle("isl_set")).take())
            .gives(CType::handle("isl_set"));

        assert_eq!(
            synth
                .declaration(set, "union", &union, MethodKind::InstanceMethod)
                .unwrap(),
            "  inline isl::set unite(isl::set set2) const;\n"
        );
    }

    #[test]
    fn test_missing_context() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let orphan = FunctionRef::new("isl_set_orphan")
            .param(ParamDescriptor::new("n", CType::int()))
            .gives(CType::handle("isl_set"));
        let err = synth
            .definition(set, "orphan", &orphan, MethodKind::StaticMethod)
            .unwrap_err();
        assert_eq!(err, GenError::MissingContext.in_function("isl_set_orphan"));

        let plain = FunctionRef::new("isl_set_plain")
            .returns(CType::int())
            .param(ParamDescriptor::new("n", CType::int()));
        let body = synth
            .definition(set, "plain", &plain, MethodKind::StaticMethod)
            .unwrap();
        assert!(!body.contains("saved_on_error"));
    }

    #[test]
    fn test_unsupported_parameter_names_function() {
        let config = GenConfig::default();
        let table = table();
        let synth = MethodSynthesizer::new(&config, &table);
        let set = table.get("isl_set").unwrap();

        let dump = FunctionRef::new("isl_set_print")
            .param(ParamDescriptor::new("set", CType::handle("isl_set")))
            .param(ParamDescriptor::new("out", CType::other("FILE *")));
        let err = synth
            .declaration(set, "print", &dump, MethodKind::InstanceMethod)
            .unwrap_err();
        assert_eq!(err.to_string(), "isl_set_print: cannot convert type FILE * to C++ type");
    }
}
