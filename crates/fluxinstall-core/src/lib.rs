//! fluxinstall Core - parameter and asset types for the Flux install manifests
//!
//! This crate provides the foundational types shared by the engine and CLI:
//! - `TemplateParameters`: the record every install template is rendered against
//! - `AssetSource`: read-only enumeration of bundled template sources
//! - `EmbeddedAssets`: the template corpus compiled into the binary

pub mod assets;
pub mod error;
pub mod params;

pub use assets::{AssetEntry, AssetSource, EmbeddedAssets, MemoryAssets, TEMPLATE_SUFFIX};
pub use error::{CoreError, Result};
pub use params::{TemplateParameters, TemplateParametersBuilder};
