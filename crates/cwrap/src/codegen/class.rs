//! Class emission
//!
//! Emits the declaration and the implementation of one wrapper class.
//! A class owning its handle gets the factory pair, the special members and
//! the raw pointer accessors. A tag-based view reuses all of those from the
//! class whose handle it shares and only adds its tag and friend grants.

use crate::codegen::classify::TypeClassifier;
use crate::codegen::error::Result;
use crate::codegen::method::{throw_null_input, MethodSynthesizer};
use crate::config::GenConfig;
use crate::ir::{ClassDescriptor, ClassRole, ClassTable, MethodKind};

/// Generator for the C++ code of a single class
#[derive(Debug, Clone, Copy)]
pub struct ClassEmitter<'a> {
    config: &'a GenConfig,
    classifier: TypeClassifier<'a>,
    methods: MethodSynthesizer<'a>,
}

impl<'a> ClassEmitter<'a> {
    /// Create an emitter over a class table
    pub fn new(config: &'a GenConfig, table: &'a ClassTable) -> Self {
        Self {
            config,
            classifier: TypeClassifier::new(config),
            methods: MethodSynthesizer::new(config, table),
        }
    }

    /// Forward declaration
    pub fn forward_declaration(&self, class: &ClassDescriptor) -> String {
        format!("class {};\n", self.classifier.class_name(class))
    }

    /// Full class declaration
    pub fn declaration(&self, class: &ClassDescriptor) -> Result<String> {
        let cpp = self.classifier.class_name(class);
        let owns_handle = class.role().owns_handle();
        let mut output = String::new();

        output.push_str(&format!(
            "// declarations for {}\n",
            self.config.qualified(cpp)
        ));
        output.push_str(&self.factory_declarations(class, ""));
        output.push('\n');

        output.push_str(&format!("class {} ", cpp));
        if !owns_handle {
            output.push_str(&format!(
                ": public {} ",
                self.classifier.base_class_name(class)
            ));
        }
        output.push_str("{\n");
        output.push_str(&self.subclass_type(class));
        output.push_str(&self.factory_declarations(class, "  friend "));
        output.push('\n');

        output.push_str("protected:\n");
        if owns_handle {
            output.push_str(&format!("  {} *ptr = nullptr;\n\n", class.name));
        }
        output.push_str(&format!(
            "  inline explicit {}({} {} *ptr);\n",
            cpp,
            self.config.annotation("take"),
            class.name
        ));
        output.push('\n');

        output.push_str("public:\n");
        output.push_str(&format!("  inline /* implicit */ {}();\n", cpp));
        output.push_str(&format!(
            "  inline /* implicit */ {}(const {} &obj);\n",
            cpp,
            self.config.qualified(cpp)
        ));
        for f in &class.constructors {
            output.push_str(&self.methods.declaration(class, &f.name, f, MethodKind::Constructor)?);
        }
        output.push_str(&format!(
            "  inline {} &operator=({} obj);\n",
            self.config.qualified(cpp),
            self.config.qualified(cpp)
        ));
        if owns_handle {
            output.push_str(&format!("  inline ~{}();\n", cpp));
            output.push_str(&self.ptr_declarations(class));
        }
        if let ClassRole::TaggedRoot { .. } = class.role() {
            output.push_str(&format!(
                "  template <class T> inline {} isa();\n",
                self.config.bool_type()
            ));
            output.push_str("  template <class T> inline T as();\n");
        }
        output.push_str(&format!(
            "  inline {} get_ctx() const;\n",
            self.config.qualified("ctx")
        ));
        if class.stringify.is_some() {
            output.push_str("  inline std::string to_str() const;\n");
        }
        output.push('\n');

        for (name, overloads) in &class.methods {
            for f in overloads {
                let kind = class.method_kind(f);
                output.push_str(&self.methods.declaration(class, name, f, kind)?);
            }
        }

        output.push_str(&format!(
            "  typedef {}* {};\n",
            class.name,
            self.config.c_name("ptr_t")
        ));
        output.push_str("};\n");
        Ok(output)
    }

    /// Full class implementation
    ///
    /// Sections are separated by one blank line; empty sections are dropped.
    pub fn implementation(&self, class: &ClassDescriptor) -> Result<String> {
        let cpp = self.classifier.class_name(class);
        let mut sections = Vec::new();

        sections.push(self.factory_implementations(class));
        sections.push(self.public_constructors(class));
        sections.push(self.protected_constructor(class));
        for f in &class.constructors {
            sections.push(self.methods.definition(class, &f.name, f, MethodKind::Constructor)?);
        }
        sections.push(self.copy_assignment(class));
        sections.push(self.destructor(class));
        sections.push(self.ptr_implementations(class));
        if self.config.extensions {
            sections.push(self.operators(class)?);
        }
        sections.push(self.to_str(class));
        sections.push(self.downcasts(class));
        sections.push(self.get_ctx(class));
        for (name, overloads) in &class.methods {
            for f in overloads {
                let kind = class.method_kind(f);
                sections.push(self.methods.definition(class, name, f, kind)?);
            }
        }

        let mut output = format!(
            "// implementations for {}\n",
            self.config.qualified(cpp)
        );
        let body: Vec<String> = sections.into_iter().filter(|s| !s.is_empty()).collect();
        output.push_str(&body.join("\n"));
        Ok(output)
    }

    fn factory_declarations(&self, class: &ClassDescriptor, prefix: &str) -> String {
        if !class.role().owns_handle() {
            return String::new();
        }

        let wrapper = self.config.qualified(self.classifier.class_name(class));
        format!(
            "{prefix}inline {wrapper} manage({take} {name} *ptr);\n\
             {prefix}inline {wrapper} manage_copy({keep} {name} *ptr);\n",
            prefix = prefix,
            wrapper = wrapper,
            take = self.config.annotation("take"),
            keep = self.config.annotation("keep"),
            name = class.name
        )
    }

    /// Friend grants and tag constant of a tag-based view
    fn subclass_type(&self, class: &ClassDescriptor) -> String {
        let ClassRole::TaggedView { tag, .. } = class.role() else {
            return String::new();
        };
        let cpp = self.classifier.class_name(class);
        let base = self.classifier.base_class_name(class);

        let mut output = String::new();
        output.push_str(&format!(
            "  friend {} {}::isa<{}>();\n",
            self.config.bool_type(),
            base,
            cpp
        ));
        output.push_str(&format!("  friend {} {}::as<{}>();\n", cpp, base, cpp));
        output.push_str(&format!("  static const auto type = {};\n", tag));
        output
    }

    fn ptr_declarations(&self, class: &ClassDescriptor) -> String {
        let name = &class.name;
        let give = self.config.annotation("give");
        let keep = self.config.annotation("keep");

        let mut output = String::new();
        output.push_str(&format!("  inline {} {} *copy() const &;\n", give, name));
        output.push_str(&format!("  inline {} {} *copy() && = delete;\n", give, name));
        output.push_str(&format!("  inline {} {} *get() const;\n", keep, name));
        output.push_str(&format!("  inline {} {} *release();\n", give, name));
        output.push_str("  inline bool is_null() const;\n");
        output.push_str("  inline explicit operator bool() const;\n");
        output
    }

    fn factory_implementations(&self, class: &ClassDescriptor) -> String {
        if !class.role().owns_handle() {
            return String::new();
        }

        let cpp = self.classifier.class_name(class);
        let wrapper = self.config.qualified(cpp);
        let name = &class.name;
        let exceptions = self.config.exceptions;
        let mut output = String::new();

        output.push_str(&format!(
            "{} manage({} {} *ptr) {{\n",
            wrapper,
            self.config.annotation("take"),
            name
        ));
        if exceptions {
            output.push_str("  if (!ptr)\n");
            output.push_str(&throw_null_input(self.config));
        }
        output.push_str(&format!("  return {}(ptr);\n", cpp));
        output.push_str("}\n");

        output.push_str(&format!(
            "{} manage_copy({} {} *ptr) {{\n",
            wrapper,
            self.config.annotation("keep"),
            name
        ));
        if exceptions {
            output.push_str("  if (!ptr)\n");
            output.push_str(&throw_null_input(self.config));
            output.push_str(&format!("  auto ctx = {}_get_ctx(ptr);\n", name));
        }
        output.push_str(&format!("  ptr = {}_copy(ptr);\n", name));
        if exceptions {
            output.push_str("  if (!ptr)\n");
            output.push_str("    throw exception::create_from_last_error(ctx);\n");
        }
        output.push_str(&format!("  return {}(ptr);\n", cpp));
        output.push_str("}\n");
        output
    }

    fn public_constructors(&self, class: &ClassDescriptor) -> String {
        let cpp = self.classifier.class_name(class);
        let base = self.classifier.base_class_name(class);
        let owns_handle = class.role().owns_handle();
        let mut output = String::new();

        output.push_str(&format!("{}::{}()\n", cpp, cpp));
        if owns_handle {
            output.push_str("    : ptr(nullptr) {}\n\n");
        } else {
            output.push_str(&format!("    : {}() {{}}\n\n", base));
        }

        output.push_str(&format!(
            "{}::{}(const {} &obj)\n",
            cpp,
            cpp,
            self.config.qualified(cpp)
        ));
        if owns_handle {
            output.push_str("    : ptr(obj.copy())\n");
        } else {
            output.push_str(&format!("    : {}(obj)\n", base));
        }
        output.push_str("{\n");
        if self.config.exceptions && owns_handle {
            output.push_str("  if (obj.ptr && !ptr)\n");
            output.push_str(&format!(
                "    throw exception::create_from_last_error({}_get_ctx(obj.ptr));\n",
                class.name
            ));
        }
        output.push_str("}\n");
        output
    }

    fn protected_constructor(&self, class: &ClassDescriptor) -> String {
        let cpp = self.classifier.class_name(class);
        let mut output = format!(
            "{}::{}({} {} *ptr)\n",
            cpp,
            cpp,
            self.config.annotation("take"),
            class.name
        );
        if class.role().owns_handle() {
            output.push_str("    : ptr(ptr) {}\n");
        } else {
            output.push_str(&format!(
                "    : {}(ptr) {{}}\n",
                self.classifier.base_class_name(class)
            ));
        }
        output
    }

    /// Copy-and-swap assignment
    fn copy_assignment(&self, class: &ClassDescriptor) -> String {
        let cpp = self.classifier.class_name(class);
        format!(
            "{cpp} &{cpp}::operator=({wrapper} obj) {{\n  std::swap(this->ptr, obj.ptr);\n  return *this;\n}}\n",
            cpp = cpp,
            wrapper = self.config.qualified(cpp)
        )
    }

    fn destructor(&self, class: &ClassDescriptor) -> String {
        if !class.role().owns_handle() {
            return String::new();
        }

        let cpp = self.classifier.class_name(class);
        format!(
            "{cpp}::~{cpp}() {{\n  if (ptr)\n    {name}_free(ptr);\n}}\n",
            cpp = cpp,
            name = class.name
        )
    }

    fn ptr_implementations(&self, class: &ClassDescriptor) -> String {
        if !class.role().owns_handle() {
            return String::new();
        }

        let cpp = self.classifier.class_name(class);
        let name = &class.name;
        let give = self.config.annotation("give");
        let keep = self.config.annotation("keep");
        let mut output = String::new();

        output.push_str(&format!("{} {} *{}::copy() const & {{\n", give, name, cpp));
        output.push_str(&format!("  return {}_copy(ptr);\n", name));
        output.push_str("}\n\n");
        output.push_str(&format!("{} {} *{}::get() const {{\n", keep, name, cpp));
        output.push_str("  return ptr;\n");
        output.push_str("}\n\n");
        output.push_str(&format!("{} {} *{}::release() {{\n", give, name, cpp));
        output.push_str(&format!("  {} *tmp = ptr;\n", name));
        output.push_str("  ptr = nullptr;\n");
        output.push_str("  return tmp;\n");
        output.push_str("}\n\n");
        output.push_str(&format!("bool {}::is_null() const {{\n", cpp));
        output.push_str("  return ptr == nullptr;\n");
        output.push_str("}\n");
        output.push_str(&format!("{}::operator bool() const\n", cpp));
        output.push_str("{\n");
        output.push_str("  return !is_null();\n");
        output.push_str("}\n");
        output
    }

    /// Stream insertion and equality, when the class has the hooks
    fn operators(&self, class: &ClassDescriptor) -> Result<String> {
        let cpp = self.classifier.class_name(class);
        let mut output = String::new();

        if class.stringify.is_some() {
            output.push_str(&format!(
                "inline std::ostream& operator<<(std::ostream& os, const {}& C) {{\n",
                cpp
            ));
            output.push_str("  os << C.to_str();\n");
            output.push_str("  return os;\n");
            output.push_str("}\n");
        }

        if let Some(equality) = &class.equality {
            if !output.is_empty() {
                output.push('\n');
            }
            let ret = self
                .classifier
                .translate(&equality.return_type)
                .map_err(|e| e.in_function(&equality.name))?;
            let method = self.config.rename_method(class.method_name(equality));
            output.push_str(&format!(
                "inline {} operator==(const {}& C1, const {}& C2) {{\n",
                ret, cpp, cpp
            ));
            output.push_str(&format!("  return C1.{}(C2);\n", method));
            output.push_str("}\n");
        }

        Ok(output)
    }

    fn to_str(&self, class: &ClassDescriptor) -> String {
        let Some(stringify) = &class.stringify else {
            return String::new();
        };

        let cpp = self.classifier.class_name(class);
        let mut output = String::new();
        output.push_str(&format!("std::string {}::to_str() const {{\n", cpp));
        output.push_str(&format!("  char *Tmp = {}(get());\n", stringify.name));
        output.push_str("  if (!Tmp)\n");
        output.push_str("    return \"\";\n");
        output.push_str("  std::string S(Tmp);\n");
        output.push_str("  free(Tmp);\n");
        output.push_str("  return S;\n");
        output.push_str("}\n");
        output
    }

    /// `isa`/`as` templates of a tagged root
    fn downcasts(&self, class: &ClassDescriptor) -> String {
        let ClassRole::TaggedRoot { tag_accessor } = class.role() else {
            return String::new();
        };

        let cpp = self.classifier.class_name(class);
        let mut output = String::new();

        output.push_str("template <class T>\n");
        output.push_str(&format!("{} {}::isa()\n", self.config.bool_type(), cpp));
        output.push_str("{\n");
        output.push_str("  if (is_null())\n");
        if self.config.exceptions {
            output.push_str(&throw_null_input(self.config));
        } else {
            output.push_str(&format!(
                "    return {}();\n",
                self.config.qualified("boolean")
            ));
        }
        output.push_str(&format!(
            "  return {}(get()) == T::type;\n",
            tag_accessor.name
        ));
        output.push_str("}\n");

        output.push_str("template <class T>\n");
        output.push_str(&format!("T {}::as()\n", cpp));
        output.push_str("{\n");
        if !self.config.exceptions {
            output.push_str("  if (is_null())\n");
            output.push_str("    return T();\n");
        }
        output.push_str("  return isa<T>() ? T(copy()) : T();\n");
        output.push_str("}\n");
        output
    }

    fn get_ctx(&self, class: &ClassDescriptor) -> String {
        let ctx = self.config.qualified("ctx");
        format!(
            "{ctx} {cpp}::get_ctx() const {{\n  return {ctx}({name}_get_ctx(ptr));\n}}\n",
            ctx = ctx,
            cpp = self.classifier.class_name(class),
            name = class.name
        )
    }
}
