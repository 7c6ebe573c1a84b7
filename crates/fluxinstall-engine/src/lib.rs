//! fluxinstall Engine - renders the Flux install manifests
//!
//! This crate provides a MiniJinja-based pipeline with:
//! - A fixed function table (`join`, `indent`, `base64enc`)
//! - Compile-time checking of template names against the parameter record
//! - Feature-flag driven template selection
//! - Human-readable error messages with suggestions

pub mod engine;
pub mod error;
pub mod functions;
pub mod pipeline;
pub mod suggestions;

pub use engine::{CompiledTemplate, Engine, EngineBuilder};
pub use error::{RenderError, Result, TemplateError, TemplateErrorKind};
pub use functions::FunctionTable;
pub use pipeline::{include, output_name, render_all, render_all_from, RenderedManifests};
