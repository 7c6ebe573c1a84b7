//! Engine error types with source-annotated diagnostics

use fluxinstall_core::CoreError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::suggestions::{extract_variable_name, suggest_field};

/// Errors raised while filling in the install templates
///
/// Each variant names the stage that failed; every per-template variant
/// carries the template name. All of them abort the whole render.
#[derive(Error, Debug, Diagnostic)]
pub enum RenderError {
    #[error("cannot walk embedded files: {0}")]
    #[diagnostic(code(fluxinstall::render::enumerate))]
    Enumeration(#[source] CoreError),

    #[error("cannot read embedded file {template:?}: {source}")]
    #[diagnostic(code(fluxinstall::render::read))]
    Read {
        template: String,
        #[source]
        source: CoreError,
    },

    #[error("cannot parse embedded file {template:?}: {source}")]
    #[diagnostic(code(fluxinstall::render::parse))]
    Parse {
        template: String,
        #[source]
        #[diagnostic_source]
        source: TemplateError,
    },

    #[error("cannot execute template for embedded file {template:?}: {source}")]
    #[diagnostic(code(fluxinstall::render::execute))]
    Execution {
        template: String,
        #[source]
        #[diagnostic_source]
        source: TemplateError,
    },

    #[error("output {name:?} produced by both {first:?} and {second:?}")]
    #[diagnostic(code(fluxinstall::render::duplicate_output))]
    DuplicateOutput {
        name: String,
        first: String,
        second: String,
    },
}

impl RenderError {
    /// Name of the template the error is about, if any
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Enumeration(_) => None,
            Self::Read { template, .. }
            | Self::Parse { template, .. }
            | Self::Execution { template, .. } => Some(template),
            Self::DuplicateOutput { second, .. } => Some(second),
        }
    }

    /// Short stage label, logged when a command fails
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Enumeration(_) => "enumerate",
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::Execution { .. } => "execute",
            Self::DuplicateOutput { .. } => "name",
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Error kind for categorizing template errors
///
/// Note: This enum is non-exhaustive - new variants may be added in future versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    /// Reference to a name that is not a template parameter (found at compile time)
    UnknownField,
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    InvalidOperation,
    Other,
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(fluxinstall::template))]
pub struct TemplateError {
    /// Error message
    pub message: String,

    /// Error kind for categorization
    pub kind: TemplateErrorKind,

    /// Template source code
    #[source_code]
    pub src: NamedSource<String>,

    /// Error location in source
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// Suggestion for fixing the error
    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Create a new template error from a MiniJinja error
    pub fn from_minijinja(err: minijinja::Error, template_name: &str, template_source: &str) -> Self {
        let (kind, message) = categorize_minijinja_error(&err);
        let span = err
            .line()
            .and_then(|line_num| calculate_span(template_source, line_num));
        let suggestion = generate_suggestion(&err, kind);

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion,
        }
    }

    /// A reference to `name` that no template parameter or function satisfies
    pub fn unknown_field(name: &str, template_name: &str, template_source: &str) -> Self {
        Self {
            message: format!("unknown template parameter `{}`", name),
            kind: TemplateErrorKind::UnknownField,
            src: NamedSource::new(template_name, template_source.to_string()),
            span: find_identifier_span(template_source, name),
            suggestion: suggest_field(name),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

/// Categorize a MiniJinja error into our error kinds
fn categorize_minijinja_error(err: &minijinja::Error) -> (TemplateErrorKind, String) {
    let kind = match err.kind() {
        minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
        minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
        minijinja::ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
        minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
        minijinja::ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
        minijinja::ErrorKind::NonPrimitive
        | minijinja::ErrorKind::NonKey
        | minijinja::ErrorKind::MissingArgument
        | minijinja::ErrorKind::TooManyArguments => TemplateErrorKind::TypeError,
        _ => TemplateErrorKind::Other,
    };

    let message = err
        .to_string()
        .replace("invalid operation: ", "")
        .replace("syntax error: ", "")
        .replace("undefined value", "undefined variable");

    (kind, message)
}

/// Calculate the source span for a given line number
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (current_line, line) in (1..).zip(source.lines()) {
        if current_line == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1; // +1 for newline
    }

    None
}

/// Offsets of whole-word occurrences of `name` inside `{{ }}` or `{% %}` tags
pub(crate) fn tag_references<'a>(source: &'a str, name: &'a str) -> impl Iterator<Item = usize> + 'a {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';

    source.match_indices(name).filter_map(move |(offset, _)| {
        let before = source[..offset].chars().next_back();
        let after = source[offset + name.len()..].chars().next();
        if before.is_some_and(is_ident) || after.is_some_and(is_ident) {
            return None;
        }

        let open = source[..offset].rfind('{');
        let close = source[..offset].rfind('}');
        let inside_tag = match (open, close) {
            (Some(o), Some(c)) => o > c,
            (Some(_), None) => true,
            _ => false,
        };
        inside_tag.then_some(offset)
    })
}

/// Span of the first reference to `name` inside a tag
fn find_identifier_span(source: &str, name: &str) -> Option<SourceSpan> {
    tag_references(source, name)
        .next()
        .map(|offset| SourceSpan::new(offset.into(), name.len()))
}

/// Generate suggestions based on error kind
fn generate_suggestion(err: &minijinja::Error, kind: TemplateErrorKind) -> Option<String> {
    let msg = err.to_string();

    match kind {
        TemplateErrorKind::UndefinedVariable => extract_variable_name(&msg)
            .and_then(|name| suggest_field(&name))
            .or_else(|| {
                Some("Variable is not defined. Templates may only use parameter fields.".to_string())
            }),

        TemplateErrorKind::UnknownFunction => Some(
            "Unknown function. Available functions: join, indent, base64enc".to_string(),
        ),

        TemplateErrorKind::SyntaxError => {
            if msg.contains('}') || msg.contains('%') {
                Some(
                    "Check bracket matching: `{{ }}` for expressions, `{% %}` for statements, `{# #}` for comments".to_string(),
                )
            } else if msg.contains("expected") {
                Some(
                    "Syntax error. Check for missing closing tags or mismatched brackets."
                        .to_string(),
                )
            } else {
                None
            }
        }

        TemplateErrorKind::TypeError => {
            Some("Check the number and types of the arguments passed to the function.".to_string())
        }

        _ => None,
    }
}
