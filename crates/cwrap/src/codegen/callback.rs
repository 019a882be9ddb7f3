//! Callback adaptation
//!
//! A C function taking `isl_stat (*fn)(isl_map *, void *)` plus a user
//! pointer is exposed with a `std::function` parameter instead. Each call
//! emits a data holder capturing the closure (and, when exceptions are
//! enabled, a slot for an escaping exception) followed by a capture-less
//! lambda matching the raw C signature:
//!
//! ```text
//!   struct fn_data {
//!     const std::function<void(isl::map)> *func;
//!     std::exception_ptr eptr;
//!   } fn_data = { &fn };
//!   auto fn_lambda = [](isl_map *arg_0, void *arg_1) -> isl_stat {
//!     auto *data = static_cast<struct fn_data *>(arg_1);
//!     try {
//!       (*data->func)(isl::manage(arg_0));
//!       return isl_stat_ok;
//!     } catch (...) {
//!       data->eptr = std::current_exception();
//!       return isl_stat_error;
//!     }
//!   };
//! ```
//!
//! After the C call returns, a stored exception is rethrown before the
//! result is looked at.

use crate::codegen::classify::TypeClassifier;
use crate::codegen::error::{GenError, Result};
use crate::codegen::ownership::{boolean_to_c, wrap_factory};
use crate::ir::{CType, CallbackArg, CallbackType, ParamDescriptor};

/// Emits the per-call adaptation of callback parameters
#[derive(Debug, Clone, Copy)]
pub struct CallbackAdapter<'a> {
    classifier: TypeClassifier<'a>,
}

impl<'a> CallbackAdapter<'a> {
    pub fn new(classifier: TypeClassifier<'a>) -> Self {
        Self { classifier }
    }

    /// Data holder and trampoline for a callback parameter
    pub fn locals(&self, param: &ParamDescriptor) -> Result<String> {
        let cb = self.callback(param)?;
        let mut output = String::new();
        output.push_str(&self.data_holder(&param.name, cb)?);
        output.push_str(&self.trampoline(&param.name, cb)?);
        Ok(output)
    }

    /// Per-call structure capturing the closure
    pub fn data_holder(&self, name: &str, cb: &CallbackType) -> Result<String> {
        let mut output = String::new();
        output.push_str(&format!("  struct {}_data {{\n", name));
        output.push_str(&format!(
            "    const {} *func;\n",
            self.classifier.callback_type(cb)?
        ));
        if self.classifier.config().exceptions {
            output.push_str("    std::exception_ptr eptr;\n");
        }
        output.push_str(&format!("  }} {}_data = {{ &{} }};\n", name, name));
        Ok(output)
    }

    /// Capture-less lambda with the raw C callback signature
    pub fn trampoline(&self, name: &str, cb: &CallbackType) -> Result<String> {
        let params = self.trampoline_params(name, cb)?;
        let ret = self.classifier.c_spelling(&cb.return_type)?;
        let last = params.len() - 1;

        let mut output = String::new();
        output.push_str(&format!(
            "  auto {}_lambda = []({}) -> {} {{\n",
            name,
            params.join(", "),
            ret
        ));
        output.push_str(&format!(
            "    auto *data = static_cast<struct {}_data *>(arg_{});\n",
            name, last
        ));
        output.push_str(&self.wrapped_call(name, cb)?);
        output.push_str("  };\n");
        Ok(output)
    }

    /// Raw parameters of the trampoline, user data included
    pub fn trampoline_params(&self, name: &str, cb: &CallbackType) -> Result<Vec<String>> {
        if !cb.has_trailing_user_data() {
            return Err(GenError::MalformedCallback {
                param: name.to_string(),
                reason: "last argument is not a user data pointer".to_string(),
            });
        }

        cb.args
            .iter()
            .enumerate()
            .map(|(i, arg)| self.classifier.c_declarator(&arg.ty, &format!("arg_{}", i)))
            .collect()
    }

    /// Invocation of the captured closure on the converted raw arguments
    pub fn closure_call(&self, name: &str, cb: &CallbackType) -> Result<String> {
        let args = cb
            .public_args()
            .iter()
            .enumerate()
            .map(|(i, arg)| self.closure_arg(name, i, arg))
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("(*data->func)({})", args.join(", ")))
    }

    /// Argument list passed to the C function in place of the callback
    pub fn call_args(&self, name: &str) -> String {
        format!("{}_lambda, &{}_data", name, name)
    }

    /// Rethrow of an exception captured by the trampoline
    pub fn rethrow_check(&self, name: &str) -> String {
        format!(
            "  if ({}_data.eptr)\n    std::rethrow_exception({}_data.eptr);\n",
            name, name
        )
    }

    fn callback<'p>(&self, param: &'p ParamDescriptor) -> Result<&'p CallbackType> {
        param.callback().ok_or_else(|| GenError::MalformedCallback {
            param: param.name.clone(),
            reason: "not a callback".to_string(),
        })
    }

    fn closure_arg(&self, name: &str, i: usize, arg: &CallbackArg) -> Result<String> {
        let config = self.classifier.config();
        let raw = format!("arg_{}", i);

        let expr = match &arg.ty {
            CType::Handle { .. } => {
                format!("{}({})", config.qualified(wrap_factory(arg.ownership)), raw)
            }
            CType::Context if config.extensions => format!("{}({})", config.qualified("ctx"), raw),
            CType::Enum { name } if config.extensions => {
                format!("static_cast<{}>({})", self.classifier.enum_type(name), raw)
            }
            CType::Context | CType::Enum { .. } | CType::Integer { .. } | CType::String => raw,
            other => {
                return Err(GenError::MalformedCallback {
                    param: name.to_string(),
                    reason: format!("cannot pass {} to the closure", other),
                })
            }
        };

        Ok(expr)
    }

    fn wrapped_call(&self, name: &str, cb: &CallbackType) -> Result<String> {
        let config = self.classifier.config();
        let call = self.closure_call(name, cb)?;

        let (ok, failure) = match cb.return_type.as_ref() {
            CType::Stat => (config.c_name("stat_ok"), config.c_name("stat_error")),
            CType::Bool => (
                format!(
                    "ret ? {} : {}",
                    config.c_name("bool_true"),
                    config.c_name("bool_false")
                ),
                config.c_name("bool_error"),
            ),
            CType::Handle { .. } => ("ret.release()".to_string(), "NULL".to_string()),
            other => {
                return Err(GenError::MalformedCallback {
                    param: name.to_string(),
                    reason: format!("unsupported return type {}", other),
                })
            }
        };
        let is_stat = matches!(cb.return_type.as_ref(), CType::Stat);

        let mut output = String::new();
        if !config.exceptions {
            output.push_str(&format!("    auto ret = {};\n", call));
            let converted = match cb.return_type.as_ref() {
                CType::Stat => format!("{}(ret)", config.c_name("stat")),
                CType::Bool => boolean_to_c(config, "ret"),
                _ => "ret.release()".to_string(),
            };
            output.push_str(&format!("    return {};\n", converted));
            return Ok(output);
        }

        output.push_str("    try {\n");
        if is_stat {
            output.push_str(&format!("      {};\n", call));
        } else {
            output.push_str(&format!("      auto ret = {};\n", call));
        }
        output.push_str(&format!("      return {};\n", ok));
        output.push_str("    } catch (...) {\n");
        output.push_str("      data->eptr = std::current_exception();\n");
        output.push_str(&format!("      return {};\n", failure));
        output.push_str("    }\n");
        Ok(output)
    }
}
