//! Template engine based on MiniJinja

use std::collections::BTreeSet;

use fluxinstall_core::TemplateParameters;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::error::{tag_references, RenderError, Result, TemplateError, TemplateErrorKind};
use crate::functions::FunctionTable;
use crate::suggestions::{suggest_function, BUILTIN_GLOBALS};

/// Template engine builder
pub struct EngineBuilder {
    functions: FunctionTable,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            functions: FunctionTable::standard(),
        }
    }

    /// Replace the function table
    pub fn functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    /// Build the engine
    pub fn build(self) -> Engine {
        let env = create_environment(&self.functions);
        Engine {
            env,
            functions: self.functions,
        }
    }
}

/// A template that parsed and only references known names
pub struct CompiledTemplate {
    name: String,
    source: String,
    env: Environment<'static>,
}

impl CompiledTemplate {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The template engine
///
/// Holds a configured environment that every compiled template starts from.
/// The engine is immutable once built and can be shared between threads.
pub struct Engine {
    env: Environment<'static>,
    functions: FunctionTable,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(FunctionTable::standard())
    }
}

impl Engine {
    /// Create a strict engine with the given function table
    pub fn new(functions: FunctionTable) -> Self {
        EngineBuilder::new().functions(functions).build()
    }

    /// Create a builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Parse `source` and check every name it references
    ///
    /// Fails with [`RenderError::Parse`] when the syntax is invalid or when
    /// the template uses a top-level name that is neither a parameter field,
    /// a registered function, nor a MiniJinja builtin.
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate> {
        let parse_error = |e| RenderError::Parse {
            template: name.to_string(),
            source: TemplateError::from_minijinja(e, name, source),
        };

        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(parse_error)?;

        let undeclared = env
            .get_template(name)
            .map_err(parse_error)?
            .undeclared_variables(false);

        // Sorted so the reported name does not depend on hash order
        let undeclared: BTreeSet<String> = undeclared.into_iter().collect();
        if let Some(unknown) = undeclared.iter().find(|v| !self.is_known_name(v)) {
            let mut error = TemplateError::unknown_field(unknown, name, source);
            if is_call(source, unknown) {
                let available: Vec<&str> = self.functions.names().collect();
                error.kind = TemplateErrorKind::UnknownFunction;
                error.message = format!("unknown function `{}`", unknown);
                error.suggestion = suggest_function(unknown, &available);
            }
            return Err(RenderError::Parse {
                template: name.to_string(),
                source: error,
            });
        }

        Ok(CompiledTemplate {
            name: name.to_string(),
            source: source.to_string(),
            env,
        })
    }

    /// Execute a compiled template against the parameters
    ///
    /// Output is deterministic: the same template and parameters always
    /// produce the same bytes.
    pub fn render(&self, template: &CompiledTemplate, params: &TemplateParameters) -> Result<Vec<u8>> {
        let execution_error = |e| RenderError::Execution {
            template: template.name.clone(),
            source: TemplateError::from_minijinja(e, &template.name, &template.source),
        };

        let tmpl = template.env.get_template(&template.name).map_err(execution_error)?;
        let rendered = tmpl
            .render(Value::from_serialize(params))
            .map_err(execution_error)?;

        Ok(rendered.into_bytes())
    }

    /// Compile and render a single template string
    pub fn render_str(&self, name: &str, source: &str, params: &TemplateParameters) -> Result<String> {
        let compiled = self.compile(name, source)?;
        let bytes = self.render(&compiled, params)?;
        // Templates and parameters are UTF-8, so the output is too
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn is_known_name(&self, name: &str) -> bool {
        TemplateParameters::has_field(name)
            || self.functions.contains(name)
            || BUILTIN_GLOBALS.contains(&name)
    }
}

/// Create a configured MiniJinja environment
fn create_environment(functions: &FunctionTable) -> Environment<'static> {
    let mut env = Environment::new();

    // Undefined values fail the render
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    // Manifests are YAML; nothing is escaped, whatever the file name says
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    functions.install(&mut env);

    env
}

/// Whether `name` is called as `name(` inside a tag of the source
fn is_call(source: &str, name: &str) -> bool {
    tag_references(source, name)
        .any(|offset| source[offset + name.len()..].trim_start().starts_with('('))
}
