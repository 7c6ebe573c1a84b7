//! CLI error types with exit code handling
//!
//! Every failure of a command maps to one of the codes in [`exit_codes`].

use fluxinstall_engine::RenderError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The flags do not describe a usable install
    #[error("Validation failed: {message}")]
    #[diagnostic(code(fluxinstall::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Filling in the embedded templates failed
    #[error("internal error filling embedded installation templates")]
    #[diagnostic(code(fluxinstall::cli::template))]
    Template(
        #[source]
        #[diagnostic_source]
        RenderError,
    ),

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(fluxinstall::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Template(_) => exit_codes::TEMPLATE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an IO error, prefixed with what was being done
    pub fn io_at(context: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context.into(), err),
        }
    }
}

impl From<RenderError> for CliError {
    fn from(err: RenderError) -> Self {
        CliError::Template(err)
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
