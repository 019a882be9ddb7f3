//! C++ bindings generator
//!
//! Produces the complete output stream: namespace wrapper, forward
//! declarations, class declarations and class implementations. The
//! declaration and implementation passes are independent functions over the
//! same read-only table.

use crate::codegen::class::ClassEmitter;
use crate::codegen::error::Result;
use crate::config::GenConfig;
use crate::ir::ClassTable;
use tracing::{debug, info};

/// Generator for the C++ bindings of a class table
pub struct CppGenerator<'a> {
    table: &'a ClassTable,
    config: &'a GenConfig,
}

impl<'a> CppGenerator<'a> {
    /// Create a new generator
    pub fn new(table: &'a ClassTable, config: &'a GenConfig) -> Self {
        Self { table, config }
    }

    /// Generate the complete output
    ///
    /// Nothing is returned unless every class was emitted successfully.
    pub fn generate(&self) -> Result<String> {
        self.table.validate()?;

        let forward = self.forward_declarations();
        let declarations = self.declarations()?;
        let implementations = self.implementations()?;

        let mut output = String::new();

        if let Some(guard) = &self.config.header_guard {
            output.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
        }
        for header in &self.config.includes {
            if header.starts_with('<') || header.starts_with('"') {
                output.push_str(&format!("#include {}\n", header));
            } else {
                output.push_str(&format!("#include <{}>\n", header));
            }
        }

        output.push('\n');
        output.push_str(&format!("namespace {} {{\n\n", self.config.namespace));
        if !self.config.exceptions {
            output.push_str(&format!(
                "inline namespace {} {{\n\n",
                self.config.noexceptions_namespace
            ));
        }

        output.push_str(&forward);
        output.push('\n');
        output.push_str(&declarations);
        output.push('\n');
        output.push_str(&implementations);

        if !self.config.exceptions {
            output.push_str(&format!(
                "}} // namespace {}\n",
                self.config.noexceptions_namespace
            ));
        }
        output.push_str(&format!("}} // namespace {}\n", self.config.namespace));

        if let Some(guard) = &self.config.header_guard {
            output.push_str(&format!("\n#endif /* {} */\n", guard));
        }

        info!(
            classes = self.table.len(),
            bytes = output.len(),
            "generated C++ bindings"
        );
        Ok(output)
    }

    /// Forward declarations of all classes
    pub fn forward_declarations(&self) -> String {
        let emitter = self.emitter();
        let mut output = String::from("// forward declarations\n");
        for class in self.table.iter() {
            output.push_str(&emitter.forward_declaration(class));
        }
        output
    }

    /// Declarations of all classes, separated by blank lines
    pub fn declarations(&self) -> Result<String> {
        info!(classes = self.table.len(), "emitting declarations");
        let emitter = self.emitter();
        let parts = self
            .table
            .iter()
            .map(|class| {
                debug!(class = %class.subclass_name(), "declaring class");
                emitter.declaration(class)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("\n"))
    }

    /// Implementations of all classes, separated by blank lines
    pub fn implementations(&self) -> Result<String> {
        info!(classes = self.table.len(), "emitting implementations");
        let emitter = self.emitter();
        let parts = self
            .table
            .iter()
            .map(|class| {
                debug!(
                    class = %class.subclass_name(),
                    methods = class.methods.values().map(Vec::len).sum::<usize>(),
                    "implementing class"
                );
                emitter.implementation(class)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join("\n"))
    }

    fn emitter(&self) -> ClassEmitter<'a> {
        ClassEmitter::new(self.config, self.table)
    }
}
